//! Repository abstractions for data access.
//!
//! Repositories compose the pure guards from `ledgerline-core` inside
//! database transactions. Every mutation appends its audit record in the
//! same transaction; an audit failure rolls the mutation back.

pub mod account;
pub mod audit;
pub mod fiscal;
pub mod journal;

pub use account::AccountRepository;
pub use audit::AuditRepository;
pub use fiscal::FiscalRepository;
pub use journal::{EntryWithLines, JournalRepository};

/// JSON snapshot of a row for the audit log. `None` if serialization fails,
/// which for these plain structs it does not.
pub(crate) fn snapshot<T: serde::Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}
