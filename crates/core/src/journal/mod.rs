//! Double-entry journal engine: validation, posting guards, and reversal.

pub mod error;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

pub use error::LedgerError;
pub use reversal::{plan_reversal, PlannedLine, ReversalPlan};
pub use service::{AccountInfo, JournalService, PeriodInfo};
pub use types::{EntryTotals, JournalEntry, JournalLine, NewLine};
