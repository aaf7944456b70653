//! Explicit actor context for every engine call.
//!
//! There is no ambient or thread-local actor state. Every operation takes an
//! `ActorContext` so that permission checks and audit attribution are always
//! explicit at the call site.

use ledgerline_shared::types::{OrganizationId, UserId};
use serde::{Deserialize, Serialize};

/// The closed set of roles an actor can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Full access, including privileged period reopening.
    SuperAdmin,
    /// Administrative access to accounts, periods, and posting.
    Admin,
    /// Can post and manage journal content, not master data.
    Moderator,
    /// Can create and post own journal entries.
    Author,
    /// Read-only access.
    Reader,
}

impl ActorRole {
    /// True if the role may create or deactivate accounts.
    #[must_use]
    pub const fn can_manage_accounts(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }

    /// True if the role may create, close, or lock fiscal periods.
    #[must_use]
    pub const fn can_manage_periods(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }

    /// True if the role may reopen a closed fiscal period.
    #[must_use]
    pub const fn can_reopen_periods(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }

    /// True if the role may create drafts and post journal entries.
    #[must_use]
    pub const fn can_post(self) -> bool {
        !matches!(self, Self::Reader)
    }

    /// True if the role may read ledger data. All roles can.
    #[must_use]
    pub const fn can_read(self) -> bool {
        true
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Author => "author",
            Self::Reader => "reader",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "author" => Ok(Self::Author),
            "reader" => Ok(Self::Reader),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// Who is performing an operation, and on whose behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Organization the operation is scoped to.
    pub organization_id: OrganizationId,
    /// The acting user.
    pub actor_id: UserId,
    /// The actor's effective role for this call.
    pub role: ActorRole,
}

impl ActorContext {
    /// Creates a new actor context.
    #[must_use]
    pub const fn new(organization_id: OrganizationId, actor_id: UserId, role: ActorRole) -> Self {
        Self {
            organization_id,
            actor_id,
            role,
        }
    }
}
