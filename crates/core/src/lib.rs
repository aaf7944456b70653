//! Core business logic for Ledgerline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and state-machine guards live here.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts types and rules
//! - `audit` - Audit log record types
//! - `context` - Explicit actor context and role checks
//! - `fiscal` - Fiscal period gating and status transitions
//! - `journal` - Double-entry journal validation, posting, and reversal

pub mod accounts;
pub mod audit;
pub mod context;
pub mod fiscal;
pub mod journal;
