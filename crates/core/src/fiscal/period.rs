//! Fiscal period types.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerline_shared::types::{FiscalPeriodId, OrganizationId, UserId};
use serde::{Deserialize, Serialize};

/// Status of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalPeriodStatus {
    /// Period is open for posting.
    Open,
    /// Period is closed; posting is rejected but the period can be reopened.
    Closed,
    /// Period is locked; terminal, no transition out.
    Locked,
}

impl std::fmt::Display for FiscalPeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Locked => "locked",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for FiscalPeriodStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "locked" => Ok(Self::Locked),
            _ => Err(format!("Unknown period status: {s}")),
        }
    }
}

/// A fiscal period: a named, non-overlapping date range per organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Organization this period belongs to.
    pub organization_id: OrganizationId,
    /// Period name (e.g., "2026-01").
    pub name: String,
    /// First postable date (inclusive).
    pub start_date: NaiveDate,
    /// Last postable date (inclusive).
    pub end_date: NaiveDate,
    /// Current status.
    pub status: FiscalPeriodStatus,
    /// Who closed the period, if closed or locked.
    pub closed_by: Option<UserId>,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl FiscalPeriod {
    /// Returns true if journal entries can be posted into this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == FiscalPeriodStatus::Open
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
