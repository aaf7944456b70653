//! Fiscal period repository.
//!
//! Period gating is fail-closed: a date covered by no period rejects
//! posting exactly like a locked one.

use chrono::NaiveDate;
use ledgerline_core::audit::{AuditOperation, NewAuditRecord};
use ledgerline_core::context::ActorContext;
use ledgerline_core::fiscal::{
    validate_date_range, validate_no_overlap, validate_transition, FiscalError, FiscalPeriod,
    FiscalPeriodStatus,
};
use ledgerline_core::journal::PeriodInfo;
use ledgerline_shared::types::{FiscalPeriodId, OrganizationId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::{audit, snapshot};
use crate::entities::fiscal_periods;

fn db_err(err: sea_orm::DbErr) -> FiscalError {
    FiscalError::Database(err.to_string())
}

pub(crate) fn to_period(model: &fiscal_periods::Model) -> FiscalPeriod {
    FiscalPeriod {
        id: FiscalPeriodId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        name: model.name.clone(),
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status.clone().into(),
        closed_by: model.closed_by.map(UserId::from_uuid),
        closed_at: model.closed_at.map(|t| t.with_timezone(&chrono::Utc)),
    }
}

pub(crate) fn to_period_info(model: &fiscal_periods::Model) -> PeriodInfo {
    PeriodInfo {
        name: model.name.clone(),
        status: model.status.clone().into(),
    }
}

/// Repository for fiscal period operations.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a period. Ranges are inclusive and may not overlap any
    /// existing period of the organization.
    ///
    /// The overlap pre-check races are caught by the database exclusion
    /// constraint.
    ///
    /// # Errors
    ///
    /// - `InvalidDateRange` when `start >= end`
    /// - `OverlappingPeriod` naming the conflicting period
    pub async fn create_period(
        &self,
        ctx: &ActorContext,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<FiscalPeriod, FiscalError> {
        validate_date_range(start_date, end_date)?;

        let existing = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::OrganizationId.eq(ctx.organization_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        validate_no_overlap(
            start_date,
            end_date,
            existing
                .iter()
                .map(|p| (p.name.as_str(), p.start_date, p.end_date)),
        )?;

        let now = chrono::Utc::now();
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = fiscal_periods::ActiveModel {
            id: Set(FiscalPeriodId::new().into_inner()),
            organization_id: Set(ctx.organization_id.into_inner()),
            name: Set(name.to_string()),
            start_date: Set(start_date),
            end_date: Set(end_date),
            status: Set(FiscalPeriodStatus::Open.into()),
            closed_by: Set(None),
            closed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let inserted = model.insert(&txn).await.map_err(db_err)?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "fiscal_periods",
                inserted.id,
                AuditOperation::Insert,
                None,
                snapshot(&inserted),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            organization_id = %ctx.organization_id,
            name,
            %start_date,
            %end_date,
            "fiscal period created"
        );
        Ok(to_period(&inserted))
    }

    /// Finds the period covering a date, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period_for_date(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<FiscalPeriod>, FiscalError> {
        let model = Self::covering_period(&self.db, organization_id, date).await?;
        Ok(model.as_ref().map(to_period))
    }

    /// Returns true when posting on the given date is rejected.
    ///
    /// Fail-closed: a date with no covering period reports locked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_locked(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, FiscalError> {
        let period = Self::covering_period(&self.db, organization_id, date).await?;
        Ok(period.is_none_or(|p| {
            FiscalPeriodStatus::from(p.status) != FiscalPeriodStatus::Open
        }))
    }

    /// Closes an open period.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the period does not exist in this organization
    /// - `InvalidTransition` unless the period is open
    pub async fn close(
        &self,
        ctx: &ActorContext,
        period_id: Uuid,
    ) -> Result<FiscalPeriod, FiscalError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let model = Self::load(&txn, ctx, period_id).await?;
        validate_transition(model.status.clone().into(), FiscalPeriodStatus::Closed)?;

        let now = chrono::Utc::now();
        let before = snapshot(&model);
        let mut active: fiscal_periods::ActiveModel = model.into();
        active.status = Set(FiscalPeriodStatus::Closed.into());
        active.closed_by = Set(Some(ctx.actor_id.into_inner()));
        active.closed_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "fiscal_periods",
                updated.id,
                AuditOperation::Update,
                before,
                snapshot(&updated),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(period_id = %updated.id, name = %updated.name, "fiscal period closed");
        Ok(to_period(&updated))
    }

    /// Locks a closed period. Locked is terminal.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the period does not exist in this organization
    /// - `InvalidTransition` unless the period is closed
    pub async fn lock(
        &self,
        ctx: &ActorContext,
        period_id: Uuid,
    ) -> Result<FiscalPeriod, FiscalError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let model = Self::load(&txn, ctx, period_id).await?;
        validate_transition(model.status.clone().into(), FiscalPeriodStatus::Locked)?;

        let before = snapshot(&model);
        let mut active: fiscal_periods::ActiveModel = model.into();
        active.status = Set(FiscalPeriodStatus::Locked.into());
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "fiscal_periods",
                updated.id,
                AuditOperation::Update,
                before,
                snapshot(&updated),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(period_id = %updated.id, name = %updated.name, "fiscal period locked");
        Ok(to_period(&updated))
    }

    /// Reopens a closed period. Privileged; denied and invalid attempts are
    /// audited just like successful ones.
    ///
    /// # Errors
    ///
    /// - `PeriodNotFound` if the period does not exist in this organization
    /// - `ReopenForbidden` unless the actor's role permits reopening
    /// - `InvalidTransition` unless the period is closed
    pub async fn reopen(
        &self,
        ctx: &ActorContext,
        period_id: Uuid,
    ) -> Result<FiscalPeriod, FiscalError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let model = Self::load(&txn, ctx, period_id).await?;

        let allowed = if ctx.role.can_reopen_periods() {
            validate_transition(model.status.clone().into(), FiscalPeriodStatus::Open)
        } else {
            Err(FiscalError::ReopenForbidden)
        };

        if let Err(err) = allowed {
            // The attempt itself is recorded; only the audit row commits
            audit::append(
                &txn,
                NewAuditRecord::new(
                    ctx,
                    "fiscal_periods",
                    model.id,
                    AuditOperation::Reopen,
                    snapshot(&model),
                    None,
                ),
            )
            .await
            .map_err(db_err)?;
            txn.commit().await.map_err(db_err)?;

            warn!(
                period_id = %model.id,
                actor_id = %ctx.actor_id,
                role = %ctx.role,
                error = %err,
                "fiscal period reopen rejected"
            );
            return Err(err);
        }

        let before = snapshot(&model);
        let mut active: fiscal_periods::ActiveModel = model.into();
        active.status = Set(FiscalPeriodStatus::Open.into());
        active.closed_by = Set(None);
        active.closed_at = Set(None);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "fiscal_periods",
                updated.id,
                AuditOperation::Reopen,
                before,
                snapshot(&updated),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            period_id = %updated.id,
            name = %updated.name,
            actor_id = %ctx.actor_id,
            "fiscal period reopened"
        );
        Ok(to_period(&updated))
    }

    /// Lists the organization's periods ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_periods(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<FiscalPeriod>, FiscalError> {
        let models = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
            .order_by_asc(fiscal_periods::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.iter().map(to_period).collect())
    }

    pub(crate) async fn covering_period<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<fiscal_periods::Model>, FiscalError> {
        fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .one(conn)
            .await
            .map_err(db_err)
    }

    async fn load<C: ConnectionTrait>(
        conn: &C,
        ctx: &ActorContext,
        period_id: Uuid,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        fiscal_periods::Entity::find_by_id(period_id)
            .filter(fiscal_periods::Column::OrganizationId.eq(ctx.organization_id.into_inner()))
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(FiscalError::PeriodNotFound(period_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums;

    fn make_model(status: sea_orm_active_enums::FiscalPeriodStatus) -> fiscal_periods::Model {
        let now = chrono::Utc::now();
        fiscal_periods::Model {
            id: Uuid::now_v7(),
            organization_id: Uuid::now_v7(),
            name: "2026-01".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            status,
            closed_by: None,
            closed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_model_maps_to_domain_period() {
        let model = make_model(sea_orm_active_enums::FiscalPeriodStatus::Open);
        let period = to_period(&model);
        assert_eq!(period.id.into_inner(), model.id);
        assert_eq!(period.name, "2026-01");
        assert_eq!(period.status, FiscalPeriodStatus::Open);
        assert!(period.is_open());
        assert!(period.closed_by.is_none());
    }

    #[test]
    fn test_period_info_carries_name_and_status() {
        let model = make_model(sea_orm_active_enums::FiscalPeriodStatus::Locked);
        let info = to_period_info(&model);
        assert_eq!(info.name, "2026-01");
        assert_eq!(info.status, FiscalPeriodStatus::Locked);
    }
}
