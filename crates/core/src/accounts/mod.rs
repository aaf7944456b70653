//! Chart of accounts domain types and rules.

pub mod error;
pub mod types;

pub use error::AccountError;
pub use types::{Account, AccountType, EnsureOutcome, NormalBalance};
