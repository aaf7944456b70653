//! Chart of accounts repository.

use ledgerline_core::accounts::{Account, AccountError, AccountType, EnsureOutcome};
use ledgerline_core::accounts::types::validate_code;
use ledgerline_core::audit::{AuditOperation, NewAuditRecord};
use ledgerline_core::context::ActorContext;
use ledgerline_shared::types::{AccountId, OrganizationId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::{audit, snapshot};
use crate::entities::{
    chart_of_accounts, fiscal_periods, journal_entries, journal_lines, sea_orm_active_enums,
};

fn db_err(err: sea_orm::DbErr) -> AccountError {
    AccountError::Database(err.to_string())
}

pub(crate) fn to_account(model: &chart_of_accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        code: model.code.clone(),
        name: model.name.clone(),
        account_type: model.account_type.clone().into(),
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        updated_at: model.updated_at.with_timezone(&chrono::Utc),
    }
}

/// Repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    /// When true, deactivation is rejected for accounts referenced by
    /// journal lines in an open period.
    block_deactivation_in_use: bool,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, block_deactivation_in_use: bool) -> Self {
        Self {
            db,
            block_deactivation_in_use,
        }
    }

    /// Creates an account. The code must be unique within the organization.
    ///
    /// # Errors
    ///
    /// - `InvalidCode` if the code is malformed
    /// - `DuplicateCode` if the code is taken
    /// - `Database` on other failures
    pub async fn create(
        &self,
        ctx: &ActorContext,
        code: &str,
        name: &str,
        account_type: AccountType,
    ) -> Result<Account, AccountError> {
        validate_code(code)?;

        let now = chrono::Utc::now();
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = chart_of_accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            organization_id: Set(ctx.organization_id.into_inner()),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            account_type: Set(account_type.into()),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let inserted = match model.insert(&txn).await {
            Ok(inserted) => inserted,
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return Err(AccountError::DuplicateCode(code.to_string()));
                }
                return Err(db_err(err));
            }
        };

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "chart_of_accounts",
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
            code,
            account_type = %account_type,
            "account created"
        );
        Ok(to_account(&inserted))
    }

    /// Creates the account if absent; reports whether it already existed.
    ///
    /// The conflict is never swallowed silently: the outcome says which
    /// branch was taken, and an existing account is returned unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`], except `DuplicateCode` which this method
    /// resolves to `AlreadyExisted`.
    pub async fn ensure(
        &self,
        ctx: &ActorContext,
        code: &str,
        name: &str,
        account_type: AccountType,
    ) -> Result<EnsureOutcome, AccountError> {
        validate_code(code)?;

        if let Some(existing) = self.find_by_code(ctx.organization_id.into_inner(), code).await? {
            return Ok(EnsureOutcome::AlreadyExisted(to_account(&existing)));
        }

        match self.create(ctx, code, name, account_type).await {
            Ok(account) => Ok(EnsureOutcome::Created(account)),
            // Lost a creation race; the winner's row is the answer
            Err(AccountError::DuplicateCode(_)) => {
                let existing = self
                    .find_by_code(ctx.organization_id.into_inner(), code)
                    .await?
                    .ok_or_else(|| {
                        AccountError::Database(format!("account {code} vanished during ensure"))
                    })?;
                Ok(EnsureOutcome::AlreadyExisted(to_account(&existing)))
            }
            Err(err) => Err(err),
        }
    }

    /// Resolves an account code to an active account.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` for absent and deactivated codes alike.
    pub async fn resolve(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> Result<Account, AccountError> {
        let model = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::OrganizationId.eq(organization_id))
            .filter(chart_of_accounts::Column::Code.eq(code))
            .filter(chart_of_accounts::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AccountError::UnknownAccount(code.to_string()))?;

        Ok(to_account(&model))
    }

    /// Deactivates an account. Existing lines keep referencing it; it only
    /// stops accepting new ones. Idempotent.
    ///
    /// # Errors
    ///
    /// - `UnknownAccount` if no account has this code
    /// - `AccountInUse` when the blocking policy is on and the account has
    ///   lines in an open period
    pub async fn deactivate(&self, ctx: &ActorContext, code: &str) -> Result<Account, AccountError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::OrganizationId.eq(ctx.organization_id.into_inner()))
            .filter(chart_of_accounts::Column::Code.eq(code))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AccountError::UnknownAccount(code.to_string()))?;

        if !model.is_active {
            return Ok(to_account(&model));
        }

        if self.block_deactivation_in_use {
            Self::check_not_in_use(&txn, ctx.organization_id.into_inner(), model.id).await?;
        }

        let before = snapshot(&model);
        let mut active: chart_of_accounts::ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "chart_of_accounts",
                updated.id,
                AuditOperation::Update,
                before,
                snapshot(&updated),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(organization_id = %ctx.organization_id, code, "account deactivated");
        Ok(to_account(&updated))
    }

    /// Lists the organization's accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<Account>, AccountError> {
        let models = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::OrganizationId.eq(organization_id))
            .order_by_asc(chart_of_accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.iter().map(to_account).collect())
    }

    async fn find_by_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> Result<Option<chart_of_accounts::Model>, AccountError> {
        chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::OrganizationId.eq(organization_id))
            .filter(chart_of_accounts::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Rejects deactivation when the account has lines dated in an open
    /// period. Lines in closed or locked periods do not count.
    async fn check_not_in_use<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        account_id: Uuid,
    ) -> Result<(), AccountError> {
        let open_periods = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
            .filter(
                fiscal_periods::Column::Status.eq(sea_orm_active_enums::FiscalPeriodStatus::Open),
            )
            .all(conn)
            .await
            .map_err(db_err)?;

        if open_periods.is_empty() {
            return Ok(());
        }

        let mut in_open_period = Condition::any();
        for period in &open_periods {
            in_open_period = in_open_period
                .add(journal_entries::Column::EntryDate.between(period.start_date, period.end_date));
        }

        let referenced = journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(account_id))
            .inner_join(journal_entries::Entity)
            .filter(in_open_period)
            .count(conn)
            .await
            .map_err(db_err)?;

        if referenced > 0 {
            return Err(AccountError::AccountInUse(account_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_maps_to_domain_account() {
        let now = chrono::Utc::now();
        let model = chart_of_accounts::Model {
            id: Uuid::now_v7(),
            organization_id: Uuid::now_v7(),
            code: "1000".to_string(),
            name: "Cash".to_string(),
            account_type: sea_orm_active_enums::AccountType::Asset,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let account = to_account(&model);
        assert_eq!(account.id.into_inner(), model.id);
        assert_eq!(account.code, "1000");
        assert_eq!(account.account_type, AccountType::Asset);
        assert!(account.is_active);
        assert_eq!(account.created_at, now);
    }
}
