//! Audit log repository.
//!
//! Appends happen inside other repositories' transactions via [`append`];
//! this repository only adds the read side.

use ledgerline_core::audit::NewAuditRecord;
use ledgerline_shared::types::AuditRecordId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::audit_log;

/// Appends one audit record on the given connection or transaction.
///
/// Callers pass their open transaction so the record commits with the
/// mutation or not at all.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn append<C: ConnectionTrait>(conn: &C, record: NewAuditRecord) -> Result<(), DbErr> {
    let model = audit_log::ActiveModel {
        id: Set(AuditRecordId::new().into_inner()),
        table_name: Set(record.table_name),
        record_id: Set(record.record_id),
        organization_id: Set(record.organization_id),
        actor_id: Set(record.actor_id),
        effective_role: Set(record.effective_role),
        operation: Set(record.operation.into()),
        before: Set(record.before),
        after: Set(record.after),
        recorded_at: Set(chrono::Utc::now().into()),
    };

    model.insert(conn).await?;
    Ok(())
}

/// Read-only access to the audit log.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists audit records for an organization, newest first.
    ///
    /// Optional filters narrow to one table and one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        table_name: Option<&str>,
        record_id: Option<Uuid>,
    ) -> Result<Vec<audit_log::Model>, DbErr> {
        let mut query = audit_log::Entity::find()
            .filter(audit_log::Column::OrganizationId.eq(organization_id));

        if let Some(table) = table_name {
            query = query.filter(audit_log::Column::TableName.eq(table));
        }
        if let Some(record) = record_id {
            query = query.filter(audit_log::Column::RecordId.eq(record));
        }

        query
            .order_by_desc(audit_log::Column::RecordedAt)
            .all(&self.db)
            .await
    }
}
