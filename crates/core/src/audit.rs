//! Audit log record types.
//!
//! Every mutation to a financial table produces exactly one audit record,
//! written inside the same database transaction as the mutation. The log is
//! append-only; the database rejects UPDATE and DELETE on it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::context::ActorContext;

/// The kind of mutation being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOperation {
    /// A row was created.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
    /// A journal entry was posted.
    Post,
    /// A journal entry was reversed.
    Reverse,
    /// A fiscal period reopen was attempted.
    Reopen,
}

impl AuditOperation {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Post => "post",
            Self::Reverse => "reverse",
            Self::Reopen => "reopen",
        }
    }
}

impl std::fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An audit record ready to be appended, before/after as JSON snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditRecord {
    /// Table the mutation touched.
    pub table_name: String,
    /// Primary key of the touched row.
    pub record_id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// Acting user.
    pub actor_id: Uuid,
    /// The actor's effective role at the time of the call.
    pub effective_role: String,
    /// Kind of mutation.
    pub operation: AuditOperation,
    /// Row state before the mutation, if any.
    pub before: Option<Value>,
    /// Row state after the mutation, if any.
    pub after: Option<Value>,
}

impl NewAuditRecord {
    /// Creates an audit record attributed to the given actor context.
    #[must_use]
    pub fn new(
        ctx: &ActorContext,
        table_name: &str,
        record_id: Uuid,
        operation: AuditOperation,
        before: Option<Value>,
        after: Option<Value>,
    ) -> Self {
        Self {
            table_name: table_name.to_string(),
            record_id,
            organization_id: ctx.organization_id.into_inner(),
            actor_id: ctx.actor_id.into_inner(),
            effective_role: ctx.role.to_string(),
            operation,
            before,
            after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ActorRole;
    use ledgerline_shared::types::{OrganizationId, UserId};
    use serde_json::json;

    #[test]
    fn test_operation_strings_are_stable() {
        assert_eq!(AuditOperation::Insert.as_str(), "insert");
        assert_eq!(AuditOperation::Update.as_str(), "update");
        assert_eq!(AuditOperation::Delete.as_str(), "delete");
        assert_eq!(AuditOperation::Post.as_str(), "post");
        assert_eq!(AuditOperation::Reverse.as_str(), "reverse");
        assert_eq!(AuditOperation::Reopen.as_str(), "reopen");
    }

    #[test]
    fn test_record_carries_actor_attribution() {
        let ctx = ActorContext::new(OrganizationId::new(), UserId::new(), ActorRole::Admin);
        let record_id = Uuid::new_v4();
        let record = NewAuditRecord::new(
            &ctx,
            "journal_entries",
            record_id,
            AuditOperation::Post,
            Some(json!({"posted": false})),
            Some(json!({"posted": true})),
        );

        assert_eq!(record.table_name, "journal_entries");
        assert_eq!(record.record_id, record_id);
        assert_eq!(record.organization_id, ctx.organization_id.into_inner());
        assert_eq!(record.actor_id, ctx.actor_id.into_inner());
        assert_eq!(record.effective_role, "admin");
        assert_eq!(record.operation, AuditOperation::Post);
    }
}
