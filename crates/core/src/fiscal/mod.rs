//! Fiscal period gating and status transitions.

pub mod error;
pub mod period;
pub mod transition;

pub use error::FiscalError;
pub use period::{FiscalPeriod, FiscalPeriodStatus};
pub use transition::{validate_date_range, validate_no_overlap, validate_transition};
