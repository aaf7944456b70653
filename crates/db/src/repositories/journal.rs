//! Journal entry repository.
//!
//! Drafts are mutable; posting and reversal run their guards inside the
//! transaction and take the state transition with a compare-and-set, so
//! concurrent posts or reversals lose cleanly instead of double-applying.
//! Every mutation reads the entry header FOR UPDATE, so line and header
//! changes serialize against a posting transaction validating the same
//! entry.

use std::collections::HashMap;

use chrono::NaiveDate;
use ledgerline_core::audit::{AuditOperation, NewAuditRecord};
use ledgerline_core::context::ActorContext;
use ledgerline_core::journal::{
    plan_reversal, AccountInfo, JournalEntry, JournalLine, JournalService, LedgerError, NewLine,
};
use ledgerline_core::journal::validation::validate_amounts;
use ledgerline_shared::types::{
    AccountId, JournalEntryId, JournalLineId, OrganizationId, UserId,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, Statement,
    TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{audit, fiscal, snapshot};
use crate::entities::{chart_of_accounts, journal_entries, journal_lines};

fn db_err(err: sea_orm::DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

pub(crate) fn to_entry(model: &journal_entries::Model) -> JournalEntry {
    JournalEntry {
        id: JournalEntryId::from_uuid(model.id),
        organization_id: OrganizationId::from_uuid(model.organization_id),
        entry_number: model.entry_number,
        entry_date: model.entry_date,
        description: model.description.clone(),
        posted: model.posted,
        posted_at: model.posted_at.map(|t| t.with_timezone(&chrono::Utc)),
        reverses_entry_id: model.reverses_entry_id.map(JournalEntryId::from_uuid),
        reversed_by_entry_id: model.reversed_by_entry_id.map(JournalEntryId::from_uuid),
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&chrono::Utc),
        updated_at: model.updated_at.with_timezone(&chrono::Utc),
    }
}

pub(crate) fn to_line(model: &journal_lines::Model) -> JournalLine {
    JournalLine {
        id: JournalLineId::from_uuid(model.id),
        entry_id: JournalEntryId::from_uuid(model.entry_id),
        account_id: AccountId::from_uuid(model.account_id),
        line_number: model.line_number,
        debit: model.debit,
        credit: model.credit,
        cost_center_id: model.cost_center_id,
        memo: model.memo.clone(),
    }
}

/// A journal entry header together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct EntryWithLines {
    /// The entry header.
    pub entry: JournalEntry,
    /// Lines ordered by line number.
    pub lines: Vec<JournalLine>,
}

/// Repository for journal entry operations.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an empty draft entry with a freshly allocated entry number.
    ///
    /// Numbers are monotonic per organization and never reused; a draft
    /// discarded later leaves a gap.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_draft(
        &self,
        ctx: &ActorContext,
        entry_date: NaiveDate,
        description: &str,
    ) -> Result<JournalEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let inserted = Self::insert_header(&txn, ctx, entry_date, description, None).await?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "journal_entries",
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
            entry_number = inserted.entry_number,
            "journal draft created"
        );
        Ok(to_entry(&inserted))
    }

    /// Creates a draft and all its lines in one transaction, ready to post.
    ///
    /// Line shapes are validated eagerly; the balance check happens at post
    /// time.
    ///
    /// # Errors
    ///
    /// - line-shape errors from amount validation
    /// - `UnknownAccount` for codes that do not resolve to an active account
    pub async fn create_balanced_entry(
        &self,
        ctx: &ActorContext,
        entry_date: NaiveDate,
        description: &str,
        lines: Vec<NewLine>,
    ) -> Result<EntryWithLines, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let header = Self::insert_header(&txn, ctx, entry_date, description, None).await?;

        let mut inserted_lines = Vec::with_capacity(lines.len());
        for (index, line) in lines.into_iter().enumerate() {
            let line_number = i32::try_from(index + 1)
                .map_err(|e| LedgerError::Internal(e.to_string()))?;
            let model =
                Self::insert_line(&txn, ctx.organization_id.into_inner(), header.id, line_number, &line)
                    .await?;
            inserted_lines.push(model);
        }

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "journal_entries",
                header.id,
                AuditOperation::Insert,
                None,
                snapshot(&header),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            organization_id = %ctx.organization_id,
            entry_number = header.entry_number,
            lines = inserted_lines.len(),
            "journal draft created with lines"
        );
        Ok(EntryWithLines {
            entry: to_entry(&header),
            lines: inserted_lines.iter().map(to_line).collect(),
        })
    }

    /// Adds a line to a draft entry.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry does not exist in this organization
    /// - `ImmutableEntry` if the entry is posted
    /// - line-shape errors from amount validation
    /// - `UnknownAccount` if the code does not resolve to an active account
    pub async fn add_line(
        &self,
        ctx: &ActorContext,
        entry_id: Uuid,
        line: NewLine,
    ) -> Result<JournalLine, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let header =
            Self::load_entry_for_update(&txn, ctx.organization_id.into_inner(), entry_id).await?;
        JournalService::validate_can_modify(&to_entry(&header))?;

        let existing = journal_lines::Entity::find()
            .filter(journal_lines::Column::EntryId.eq(entry_id))
            .count(&txn)
            .await
            .map_err(db_err)?;
        let line_number =
            i32::try_from(existing + 1).map_err(|e| LedgerError::Internal(e.to_string()))?;

        let inserted =
            Self::insert_line(&txn, ctx.organization_id.into_inner(), entry_id, line_number, &line)
                .await?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "journal_lines",
                inserted.id,
                AuditOperation::Insert,
                None,
                snapshot(&inserted),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(to_line(&inserted))
    }

    /// Updates a draft's header fields.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry does not exist in this organization
    /// - `ImmutableEntry` if the entry is posted
    pub async fn update_draft(
        &self,
        ctx: &ActorContext,
        entry_id: Uuid,
        description: Option<String>,
        entry_date: Option<NaiveDate>,
    ) -> Result<JournalEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let header =
            Self::load_entry_for_update(&txn, ctx.organization_id.into_inner(), entry_id).await?;
        JournalService::validate_can_modify(&to_entry(&header))?;

        let before = snapshot(&header);
        let mut active: journal_entries::ActiveModel = header.into();
        if let Some(description) = description {
            active.description = Set(description);
        }
        if let Some(entry_date) = entry_date {
            active.entry_date = Set(entry_date);
        }
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(&txn).await.map_err(db_err)?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "journal_entries",
                updated.id,
                AuditOperation::Update,
                before,
                snapshot(&updated),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(to_entry(&updated))
    }

    /// Deletes a draft entry and its lines. The entry number is not reused.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry does not exist in this organization
    /// - `ImmutableEntry` if the entry is posted
    pub async fn delete_draft(&self, ctx: &ActorContext, entry_id: Uuid) -> Result<(), LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let header =
            Self::load_entry_for_update(&txn, ctx.organization_id.into_inner(), entry_id).await?;
        JournalService::validate_can_delete(&to_entry(&header))?;

        let before = snapshot(&header);
        let entry_number = header.entry_number;

        // Lines go via ON DELETE CASCADE
        journal_entries::Entity::delete_by_id(entry_id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "journal_entries",
                entry_id,
                AuditOperation::Delete,
                before,
                None,
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            organization_id = %ctx.organization_id,
            entry_number,
            "journal draft deleted, entry number not reused"
        );
        Ok(())
    }

    /// Posts a draft entry, making it immutable.
    ///
    /// The header row is locked for the whole transaction, so the lines the
    /// guards validate are the lines that get frozen; a concurrent `add_line`
    /// or `update_draft` waits and then sees the posted flag. The flag itself
    /// flips with a compare-and-set so a concurrent post of the same entry
    /// gets `AlreadyPosted`.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound`, `AlreadyPosted`, `InsufficientLines`
    /// - line-shape errors, `UnknownAccount`, `UnbalancedEntry`
    /// - `NoFiscalPeriod`, `PeriodLocked`
    pub async fn post(&self, ctx: &ActorContext, entry_id: Uuid) -> Result<JournalEntry, LedgerError> {
        let organization_id = ctx.organization_id.into_inner();
        let txn = self.db.begin().await.map_err(db_err)?;

        let header = Self::load_entry_for_update(&txn, organization_id, entry_id).await?;
        let line_models = Self::load_lines(&txn, entry_id).await?;

        let entry = to_entry(&header);
        let lines: Vec<JournalLine> = line_models.iter().map(to_line).collect();

        let accounts = Self::load_accounts(&txn, &line_models).await?;
        let period = fiscal::FiscalRepository::covering_period(&txn, organization_id, entry.entry_date)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        let period_info = period.as_ref().map(fiscal::to_period_info);

        let totals = JournalService::validate_for_posting(
            &entry,
            &lines,
            |id| {
                accounts
                    .get(&id)
                    .map(|m| AccountInfo {
                        id: m.id,
                        code: m.code.clone(),
                        is_active: m.is_active,
                    })
                    .ok_or_else(|| LedgerError::UnknownAccount(id.to_string()))
            },
            |_date| period_info.clone(),
        )?;

        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let result = journal_entries::Entity::update_many()
            .col_expr(journal_entries::Column::Posted, Expr::value(true))
            .col_expr(journal_entries::Column::PostedAt, Expr::value(now))
            .col_expr(journal_entries::Column::UpdatedAt, Expr::value(now))
            .filter(journal_entries::Column::Id.eq(entry_id))
            .filter(journal_entries::Column::Posted.eq(false))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::AlreadyPosted(entry_id));
        }

        let posted = Self::load_entry(&txn, organization_id, entry_id).await?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "journal_entries",
                entry_id,
                AuditOperation::Post,
                snapshot(&header),
                snapshot(&posted),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            organization_id = %ctx.organization_id,
            entry_number = posted.entry_number,
            debit = %totals.debit,
            credit = %totals.credit,
            "journal entry posted"
        );
        Ok(to_entry(&posted))
    }

    /// Reverses a posted entry by creating and posting the inverse entry,
    /// linked bidirectionally. The original's lines are never touched.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound`, `NotPosted`, `AlreadyReversed`
    /// - `ReversalPredatesOriginal`
    /// - `NoFiscalPeriod`, `PeriodLocked` for the reversal date
    pub async fn reverse(
        &self,
        ctx: &ActorContext,
        entry_id: Uuid,
        reversal_date: NaiveDate,
        reason: &str,
    ) -> Result<EntryWithLines, LedgerError> {
        let organization_id = ctx.organization_id.into_inner();
        let txn = self.db.begin().await.map_err(db_err)?;

        let original = Self::load_entry_for_update(&txn, organization_id, entry_id).await?;
        let original_lines = Self::load_lines(&txn, entry_id).await?;
        let lines: Vec<JournalLine> = original_lines.iter().map(to_line).collect();

        let period = fiscal::FiscalRepository::covering_period(&txn, organization_id, reversal_date)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;
        let period_info = period.as_ref().map(fiscal::to_period_info);

        let plan = plan_reversal(
            &to_entry(&original),
            &lines,
            reversal_date,
            reason,
            |_date| period_info.clone(),
        )?;

        let reversal = Self::insert_header(
            &txn,
            ctx,
            plan.reversal_date,
            &plan.description,
            Some(entry_id),
        )
        .await?;

        let mut reversal_lines = Vec::with_capacity(plan.lines.len());
        for planned in &plan.lines {
            let model = journal_lines::ActiveModel {
                id: Set(JournalLineId::new().into_inner()),
                entry_id: Set(reversal.id),
                account_id: Set(planned.account_id.into_inner()),
                line_number: Set(planned.line_number),
                debit: Set(planned.debit),
                credit: Set(planned.credit),
                cost_center_id: Set(planned.cost_center_id),
                memo: Set(planned.memo.clone()),
            };
            reversal_lines.push(model.insert(&txn).await.map_err(db_err)?);
        }

        // The header flips to posted only after its lines are in; the line
        // freeze trigger checks the owning entry's posted flag on insert.
        let now = chrono::Utc::now();
        let mut active: journal_entries::ActiveModel = reversal.into();
        active.posted = Set(true);
        active.posted_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let posted_reversal = active.update(&txn).await.map_err(db_err)?;

        // Back-link CAS: a concurrent reversal of the same entry loses here
        // and the whole transaction, reversal rows included, rolls back.
        let result = journal_entries::Entity::update_many()
            .col_expr(
                journal_entries::Column::ReversedByEntryId,
                Expr::value(posted_reversal.id),
            )
            .col_expr(
                journal_entries::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            )
            .filter(journal_entries::Column::Id.eq(entry_id))
            .filter(journal_entries::Column::ReversedByEntryId.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(LedgerError::AlreadyReversed(entry_id));
        }

        let reversed_original = Self::load_entry(&txn, organization_id, entry_id).await?;

        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "journal_entries",
                posted_reversal.id,
                AuditOperation::Insert,
                None,
                snapshot(&posted_reversal),
            ),
        )
        .await
        .map_err(db_err)?;
        audit::append(
            &txn,
            NewAuditRecord::new(
                ctx,
                "journal_entries",
                entry_id,
                AuditOperation::Reverse,
                snapshot(&original),
                snapshot(&reversed_original),
            ),
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            organization_id = %ctx.organization_id,
            original_entry_number = reversed_original.entry_number,
            reversal_entry_number = posted_reversal.entry_number,
            "journal entry reversed"
        );
        Ok(EntryWithLines {
            entry: to_entry(&posted_reversal),
            lines: reversal_lines.iter().map(to_line).collect(),
        })
    }

    /// Fetches an entry and its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist in this
    /// organization.
    pub async fn get_entry(
        &self,
        organization_id: Uuid,
        entry_id: Uuid,
    ) -> Result<EntryWithLines, LedgerError> {
        let header = Self::load_entry(&self.db, organization_id, entry_id).await?;
        let lines = Self::load_lines(&self.db, entry_id).await?;
        Ok(EntryWithLines {
            entry: to_entry(&header),
            lines: lines.iter().map(to_line).collect(),
        })
    }

    /// Lists the organization's entries, newest entry number first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<JournalEntry>, LedgerError> {
        let models = journal_entries::Entity::find()
            .filter(journal_entries::Column::OrganizationId.eq(organization_id))
            .order_by_desc(journal_entries::Column::EntryNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.iter().map(to_entry).collect())
    }

    /// Allocates the next entry number for an organization with an atomic
    /// upsert on the sequence row.
    async fn allocate_entry_number<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
    ) -> Result<i64, LedgerError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO entry_sequences (organization_id, next_entry_number)
             VALUES ($1, 2)
             ON CONFLICT (organization_id)
             DO UPDATE SET next_entry_number = entry_sequences.next_entry_number + 1
             RETURNING next_entry_number",
            [organization_id.into()],
        );
        let row = conn
            .query_one(stmt)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                LedgerError::Internal("entry number allocation returned no row".to_string())
            })?;
        let next: i64 = row.try_get("", "next_entry_number").map_err(db_err)?;
        Ok(next - 1)
    }

    async fn insert_header<C: ConnectionTrait>(
        txn: &C,
        ctx: &ActorContext,
        entry_date: NaiveDate,
        description: &str,
        reverses_entry_id: Option<Uuid>,
    ) -> Result<journal_entries::Model, LedgerError> {
        let entry_number =
            Self::allocate_entry_number(txn, ctx.organization_id.into_inner()).await?;
        let now = chrono::Utc::now();

        let model = journal_entries::ActiveModel {
            id: Set(JournalEntryId::new().into_inner()),
            organization_id: Set(ctx.organization_id.into_inner()),
            entry_number: Set(entry_number),
            entry_date: Set(entry_date),
            description: Set(description.to_string()),
            posted: Set(false),
            posted_at: Set(None),
            reverses_entry_id: Set(reverses_entry_id),
            reversed_by_entry_id: Set(None),
            created_by: Set(ctx.actor_id.into_inner()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        model.insert(txn).await.map_err(db_err)
    }

    async fn insert_line<C: ConnectionTrait>(
        txn: &C,
        organization_id: Uuid,
        entry_id: Uuid,
        line_number: i32,
        line: &NewLine,
    ) -> Result<journal_lines::Model, LedgerError> {
        let (debit, credit) = validate_amounts(line.debit, line.credit)?;
        let account = Self::resolve_account(txn, organization_id, &line.account_code).await?;

        let model = journal_lines::ActiveModel {
            id: Set(JournalLineId::new().into_inner()),
            entry_id: Set(entry_id),
            account_id: Set(account.id),
            line_number: Set(line_number),
            debit: Set(debit),
            credit: Set(credit),
            cost_center_id: Set(line.cost_center_id),
            memo: Set(line.memo.clone()),
        };
        model.insert(txn).await.map_err(db_err)
    }

    async fn resolve_account<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        code: &str,
    ) -> Result<chart_of_accounts::Model, LedgerError> {
        chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::OrganizationId.eq(organization_id))
            .filter(chart_of_accounts::Column::Code.eq(code))
            .filter(chart_of_accounts::Column::IsActive.eq(true))
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::UnknownAccount(code.to_string()))
    }

    async fn load_entry<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        entry_id: Uuid,
    ) -> Result<journal_entries::Model, LedgerError> {
        journal_entries::Entity::find_by_id(entry_id)
            .filter(journal_entries::Column::OrganizationId.eq(organization_id))
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::EntryNotFound(entry_id))
    }

    fn locked_entry_query(
        organization_id: Uuid,
        entry_id: Uuid,
    ) -> Select<journal_entries::Entity> {
        journal_entries::Entity::find_by_id(entry_id)
            .filter(journal_entries::Column::OrganizationId.eq(organization_id))
            .lock_exclusive()
    }

    /// Reads the entry header FOR UPDATE. Mutations go through here so a
    /// post cannot validate lines while another transaction is adding one,
    /// and a draft edit cannot land between a post's guards and its commit.
    async fn load_entry_for_update<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        entry_id: Uuid,
    ) -> Result<journal_entries::Model, LedgerError> {
        Self::locked_entry_query(organization_id, entry_id)
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::EntryNotFound(entry_id))
    }

    async fn load_lines<C: ConnectionTrait>(
        conn: &C,
        entry_id: Uuid,
    ) -> Result<Vec<journal_lines::Model>, LedgerError> {
        journal_lines::Entity::find()
            .filter(journal_lines::Column::EntryId.eq(entry_id))
            .order_by_asc(journal_lines::Column::LineNumber)
            .all(conn)
            .await
            .map_err(db_err)
    }

    async fn load_accounts<C: ConnectionTrait>(
        conn: &C,
        lines: &[journal_lines::Model],
    ) -> Result<HashMap<Uuid, chart_of_accounts::Model>, LedgerError> {
        let account_ids: Vec<Uuid> = lines.iter().map(|l| l.account_id).collect();
        let models = chart_of_accounts::Entity::find()
            .filter(chart_of_accounts::Column::Id.is_in(account_ids))
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(|m| (m.id, m)).collect())
    }
}
