//! Initial database migration.
//!
//! Creates the enums, ledger tables, CHECK constraints, indexes, and the
//! immutability triggers for the audit log and posted journal entries.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: FISCAL PERIODS
        // ============================================================
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;

        // ============================================================
        // PART 4: JOURNAL ENTRIES & LINES
        // ============================================================
        db.execute_unprepared(ENTRY_SEQUENCES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 5: AUDIT LOG
        // ============================================================
        db.execute_unprepared(AUDIT_LOG_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account types
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Fiscal period statuses
CREATE TYPE fiscal_period_status AS ENUM (
    'open',
    'closed',
    'locked'
);

-- Audit operations
CREATE TYPE audit_operation AS ENUM (
    'insert',
    'update',
    'delete',
    'post',
    'reverse',
    'reopen'
);
";

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_accounts_org_code UNIQUE (organization_id, code)
);

CREATE INDEX idx_accounts_org_active ON chart_of_accounts (organization_id, is_active);
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE EXTENSION IF NOT EXISTS btree_gist;

CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    name VARCHAR(64) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status fiscal_period_status NOT NULL DEFAULT 'open',
    closed_by UUID,
    closed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_period_range CHECK (start_date < end_date),
    -- Periods of one organization never overlap (inclusive bounds)
    CONSTRAINT excl_period_overlap EXCLUDE USING gist (
        organization_id WITH =,
        daterange(start_date, end_date, '[]') WITH &&
    )
);

CREATE INDEX idx_periods_org_dates ON fiscal_periods (organization_id, start_date, end_date);
";

const ENTRY_SEQUENCES_SQL: &str = r"
CREATE TABLE entry_sequences (
    organization_id UUID PRIMARY KEY,
    next_entry_number BIGINT NOT NULL DEFAULT 1,

    CONSTRAINT chk_sequence_positive CHECK (next_entry_number >= 1)
);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    entry_number BIGINT NOT NULL,
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    posted BOOLEAN NOT NULL DEFAULT FALSE,
    posted_at TIMESTAMPTZ,
    reverses_entry_id UUID REFERENCES journal_entries(id),
    reversed_by_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_entries_org_number UNIQUE (organization_id, entry_number),
    CONSTRAINT chk_posted_has_timestamp CHECK (NOT posted OR posted_at IS NOT NULL)
);

CREATE INDEX idx_entries_org_date ON journal_entries (organization_id, entry_date);
CREATE INDEX idx_entries_org_posted ON journal_entries (organization_id, posted);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    line_number INTEGER NOT NULL,
    debit NUMERIC(18, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(18, 2) NOT NULL DEFAULT 0,
    cost_center_id UUID,
    memo TEXT,

    CONSTRAINT chk_line_nonnegative CHECK (debit >= 0 AND credit >= 0),
    -- Exactly one side is non-zero per line
    CONSTRAINT chk_line_one_side CHECK (
        (debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0)
    ),
    CONSTRAINT uq_lines_entry_number UNIQUE (entry_id, line_number)
);

CREATE INDEX idx_lines_entry ON journal_lines (entry_id);
CREATE INDEX idx_lines_account ON journal_lines (account_id);
";

const AUDIT_LOG_SQL: &str = r"
CREATE TABLE audit_log (
    id UUID PRIMARY KEY,
    table_name VARCHAR(64) NOT NULL,
    record_id UUID NOT NULL,
    organization_id UUID NOT NULL,
    actor_id UUID NOT NULL,
    effective_role VARCHAR(32) NOT NULL,
    operation audit_operation NOT NULL,
    before JSONB,
    after JSONB,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_audit_org_record ON audit_log (organization_id, table_name, record_id, recorded_at DESC);
";

const TRIGGERS_SQL: &str = r"
-- The audit log is append-only
CREATE OR REPLACE FUNCTION reject_audit_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'audit_log is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_audit_log_immutable
    BEFORE UPDATE OR DELETE ON audit_log
    FOR EACH ROW EXECUTE FUNCTION reject_audit_mutation();

-- Posted entries are immutable: the only permitted header change is
-- setting reversed_by_entry_id (and the updated_at touch that goes with it)
CREATE OR REPLACE FUNCTION reject_posted_entry_mutation()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        IF OLD.posted THEN
            RAISE EXCEPTION 'posted journal entries cannot be deleted';
        END IF;
        RETURN OLD;
    END IF;

    IF OLD.posted THEN
        IF NEW.entry_number IS DISTINCT FROM OLD.entry_number
            OR NEW.entry_date IS DISTINCT FROM OLD.entry_date
            OR NEW.description IS DISTINCT FROM OLD.description
            OR NEW.posted IS DISTINCT FROM TRUE
            OR NEW.posted_at IS DISTINCT FROM OLD.posted_at
            OR NEW.reverses_entry_id IS DISTINCT FROM OLD.reverses_entry_id
            OR NEW.created_by IS DISTINCT FROM OLD.created_by
            OR NEW.organization_id IS DISTINCT FROM OLD.organization_id
        THEN
            RAISE EXCEPTION 'posted journal entries are immutable';
        END IF;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_entries_immutable
    BEFORE UPDATE OR DELETE ON journal_entries
    FOR EACH ROW EXECUTE FUNCTION reject_posted_entry_mutation();

-- Lines of a posted entry are frozen with it
CREATE OR REPLACE FUNCTION reject_posted_line_mutation()
RETURNS TRIGGER AS $$
DECLARE
    entry_posted BOOLEAN;
    target_entry UUID;
BEGIN
    IF TG_OP = 'INSERT' THEN
        target_entry := NEW.entry_id;
    ELSE
        target_entry := OLD.entry_id;
    END IF;

    SELECT posted INTO entry_posted FROM journal_entries WHERE id = target_entry;
    IF entry_posted THEN
        RAISE EXCEPTION 'lines of a posted journal entry are immutable';
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_lines_frozen
    BEFORE INSERT OR UPDATE OR DELETE ON journal_lines
    FOR EACH ROW EXECUTE FUNCTION reject_posted_line_mutation();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS audit_log CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS entry_sequences CASCADE;
DROP TABLE IF EXISTS fiscal_periods CASCADE;
DROP TABLE IF EXISTS chart_of_accounts CASCADE;

DROP FUNCTION IF EXISTS reject_audit_mutation CASCADE;
DROP FUNCTION IF EXISTS reject_posted_entry_mutation CASCADE;
DROP FUNCTION IF EXISTS reject_posted_line_mutation CASCADE;

DROP TYPE IF EXISTS audit_operation;
DROP TYPE IF EXISTS fiscal_period_status;
DROP TYPE IF EXISTS account_type;
";
