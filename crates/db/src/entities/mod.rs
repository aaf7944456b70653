//! `SeaORM` entity definitions.

pub mod audit_log;
pub mod chart_of_accounts;
pub mod entry_sequences;
pub mod fiscal_periods;
pub mod journal_entries;
pub mod journal_lines;
pub mod sea_orm_active_enums;
