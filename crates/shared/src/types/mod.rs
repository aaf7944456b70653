//! Common domain types.

pub mod id;

pub use id::{
    AccountId, AuditRecordId, FiscalPeriodId, JournalEntryId, JournalLineId, OrganizationId,
    UserId,
};
