//! `SeaORM` Entity for the audit_log table.
//!
//! Append-only. The database rejects UPDATE and DELETE via trigger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AuditOperation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub table_name: String,
    pub record_id: Uuid,
    pub organization_id: Uuid,
    pub actor_id: Uuid,
    pub effective_role: String,
    pub operation: AuditOperation,
    pub before: Option<Json>,
    pub after: Option<Json>,
    pub recorded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
