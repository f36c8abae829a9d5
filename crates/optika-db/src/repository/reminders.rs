//! # Reminder Generator
//!
//! Derives customer-outreach tasks from the operational data: expiring
//! prescriptions, upcoming birthdays, inactive customers and cashback
//! about to expire.
//!
//! ## Generation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  generate_all(branch)                                               │
//! │       │                                                             │
//! │       ├──► prescriptions expiring within N days                     │
//! │       ├──► birthdays exactly N days out (month-day match)           │
//! │       ├──► customers with no completed sale for N days              │
//! │       └──► cashback credits expiring within N days                  │
//! │                                                                     │
//! │  Each generator is independently toggled per branch and runs        │
//! │  dedup'd: a customer with an OPEN reminder of the same kind never   │
//! │  gets a second one, so the nightly job is safe to rerun.            │
//! │  Birthdays additionally skip customers already greeted this year.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reminders carry a JSON metadata snapshot taken at generation time, so
//! the task history stays meaningful after the source records change.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::start_of_day;
use optika_core::validation::{validate_day_window, validate_scope_id};
use optika_core::{
    Reminder, ReminderConfig, ReminderConfigUpdate, ReminderKind, ReminderRunSummary,
    ReminderStatus, DEFAULT_BIRTHDAY_DAYS_BEFORE, DEFAULT_CASHBACK_DAYS_BEFORE,
    DEFAULT_INACTIVE_AFTER_DAYS, DEFAULT_PRESCRIPTION_DAYS_BEFORE,
};

// =============================================================================
// Candidate Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PrescriptionCandidate {
    customer_id: String,
    customer_name: String,
    expires_at: NaiveDate,
}

#[derive(Debug, sqlx::FromRow)]
struct BirthdayCandidate {
    customer_id: String,
    customer_name: String,
    birth_date: NaiveDate,
}

#[derive(Debug, sqlx::FromRow)]
struct InactiveCandidate {
    customer_id: String,
    customer_name: String,
    last_purchase_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CashbackCandidate {
    customer_id: String,
    customer_name: String,
    expiring_cents: i64,
    first_expiry: DateTime<Utc>,
}

// =============================================================================
// Reminder Repository
// =============================================================================

/// Repository for reminder generation and the reminder workflow.
#[derive(Debug, Clone)]
pub struct ReminderRepository {
    pool: SqlitePool,
}

impl ReminderRepository {
    /// Creates a new ReminderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReminderRepository { pool }
    }

    // =========================================================================
    // Config
    // =========================================================================

    /// Gets a branch's reminder policy, creating one with defaults on
    /// first access.
    pub async fn get_or_create_config(&self, branch_id: &str) -> DbResult<ReminderConfig> {
        validate_scope_id("branch_id", branch_id)?;

        if let Some(config) = self.get_config(branch_id).await? {
            return Ok(config);
        }

        debug!(branch_id = %branch_id, "Creating default reminder config");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO reminder_configs (
                id, branch_id,
                prescription_enabled, prescription_days_before,
                birthday_enabled, birthday_days_before,
                inactive_enabled, inactive_after_days,
                cashback_enabled, cashback_days_before,
                created_at, updated_at
            ) VALUES (?1, ?2, 1, ?3, 1, ?4, 1, ?5, 1, ?6, ?7, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(branch_id)
        .bind(DEFAULT_PRESCRIPTION_DAYS_BEFORE)
        .bind(DEFAULT_BIRTHDAY_DAYS_BEFORE)
        .bind(DEFAULT_INACTIVE_AFTER_DAYS)
        .bind(DEFAULT_CASHBACK_DAYS_BEFORE)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_config(branch_id)
            .await?
            .ok_or_else(|| DbError::not_found("ReminderConfig", branch_id))
    }

    async fn get_config(&self, branch_id: &str) -> DbResult<Option<ReminderConfig>> {
        let config = sqlx::query_as::<_, ReminderConfig>(
            "SELECT * FROM reminder_configs WHERE branch_id = ?1",
        )
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Replaces a branch's reminder policy (full replace).
    pub async fn update_config(
        &self,
        branch_id: &str,
        update: ReminderConfigUpdate,
    ) -> DbResult<ReminderConfig> {
        validate_day_window(update.prescription_days_before)?;
        validate_day_window(update.birthday_days_before)?;
        validate_day_window(update.inactive_after_days)?;
        validate_day_window(update.cashback_days_before)?;

        let existing = self.get_or_create_config(branch_id).await?;

        sqlx::query(
            r#"
            UPDATE reminder_configs SET
                prescription_enabled = ?2, prescription_days_before = ?3,
                birthday_enabled = ?4, birthday_days_before = ?5,
                inactive_enabled = ?6, inactive_after_days = ?7,
                cashback_enabled = ?8, cashback_days_before = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&existing.id)
        .bind(update.prescription_enabled)
        .bind(update.prescription_days_before)
        .bind(update.birthday_enabled)
        .bind(update.birthday_days_before)
        .bind(update.inactive_enabled)
        .bind(update.inactive_after_days)
        .bind(update.cashback_enabled)
        .bind(update.cashback_days_before)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_config(branch_id)
            .await?
            .ok_or_else(|| DbError::not_found("ReminderConfig", branch_id))
    }

    // =========================================================================
    // Generators
    // =========================================================================

    /// Runs all four generators for a branch and returns per-kind
    /// creation counts.
    pub async fn generate_all(&self, branch_id: &str) -> DbResult<ReminderRunSummary> {
        let (prescription, birthday, inactive, cashback) = tokio::join!(
            self.generate_prescription_reminders(branch_id),
            self.generate_birthday_reminders(branch_id),
            self.generate_inactive_reminders(branch_id),
            self.generate_cashback_reminders(branch_id),
        );

        let summary = ReminderRunSummary {
            prescription: prescription?,
            birthday: birthday?,
            inactive: inactive?,
            cashback_expiring: cashback?,
        };

        info!(
            branch_id = %branch_id,
            total = summary.total(),
            prescription = summary.prescription,
            birthday = summary.birthday,
            inactive = summary.inactive,
            cashback_expiring = summary.cashback_expiring,
            "Reminder generation run finished"
        );

        Ok(summary)
    }

    /// Creates renewal reminders for prescriptions expiring within the
    /// configured window. One reminder per customer, scheduled for the
    /// earliest expiry.
    pub async fn generate_prescription_reminders(&self, branch_id: &str) -> DbResult<u64> {
        let config = self.get_or_create_config(branch_id).await?;
        if !config.prescription_enabled {
            return Ok(0);
        }

        let today = Utc::now().date_naive();
        let horizon = today
            .checked_add_days(Days::new(config.prescription_days_before as u64))
            .ok_or_else(|| DbError::Internal("prescription horizon out of range".to_string()))?;

        let candidates = sqlx::query_as::<_, PrescriptionCandidate>(
            r#"
            SELECT p.customer_id AS customer_id,
                   c.name AS customer_name,
                   MIN(p.expires_at) AS expires_at
            FROM prescriptions p
            JOIN customers c ON c.id = p.customer_id
            WHERE p.branch_id = ?1
              AND p.expires_at >= ?2
              AND p.expires_at <= ?3
              AND NOT EXISTS (
                  SELECT 1 FROM reminders r
                  WHERE r.branch_id = ?1
                    AND r.customer_id = p.customer_id
                    AND r.kind = 'prescription_renewal'
                    AND r.status IN ('pending', 'in_progress')
              )
            GROUP BY p.customer_id
            "#,
        )
        .bind(branch_id)
        .bind(today)
        .bind(horizon)
        .fetch_all(&self.pool)
        .await?;

        let mut created = 0;
        for candidate in candidates {
            self.insert_reminder(
                branch_id,
                &candidate.customer_id,
                ReminderKind::PrescriptionRenewal,
                candidate.expires_at,
                json!({
                    "customer_name": candidate.customer_name,
                    "prescription_expires_at": candidate.expires_at,
                }),
            )
            .await?;
            created += 1;
        }

        Ok(created)
    }

    /// Creates greeting reminders for customers whose birthday falls
    /// exactly `birthday_days_before` days from today (month-day match,
    /// birth year ignored).
    ///
    /// Besides the open-reminder dedup, customers already greeted this
    /// calendar year are skipped - completing last year's greeting must
    /// not suppress this year's.
    pub async fn generate_birthday_reminders(&self, branch_id: &str) -> DbResult<u64> {
        let config = self.get_or_create_config(branch_id).await?;
        if !config.birthday_enabled {
            return Ok(0);
        }

        let today = Utc::now().date_naive();
        let target = today
            .checked_add_days(Days::new(config.birthday_days_before as u64))
            .ok_or_else(|| DbError::Internal("birthday horizon out of range".to_string()))?;
        let month_day = target.format("%m-%d").to_string();

        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
            .ok_or_else(|| DbError::Internal("invalid year start".to_string()))?;

        let candidates = sqlx::query_as::<_, BirthdayCandidate>(
            r#"
            SELECT c.id AS customer_id,
                   c.name AS customer_name,
                   c.birth_date AS birth_date
            FROM customers c
            WHERE c.branch_id = ?1
              AND c.birth_date IS NOT NULL
              AND strftime('%m-%d', c.birth_date) = ?2
              AND NOT EXISTS (
                  SELECT 1 FROM reminders r
                  WHERE r.branch_id = ?1
                    AND r.customer_id = c.id
                    AND r.kind = 'birthday_greeting'
                    AND r.status IN ('pending', 'in_progress')
              )
              AND NOT EXISTS (
                  SELECT 1 FROM reminders r
                  WHERE r.branch_id = ?1
                    AND r.customer_id = c.id
                    AND r.kind = 'birthday_greeting'
                    AND r.status = 'completed'
                    AND r.created_at >= ?3
              )
            "#,
        )
        .bind(branch_id)
        .bind(&month_day)
        .bind(start_of_day(year_start))
        .fetch_all(&self.pool)
        .await?;

        let mut created = 0;
        for candidate in candidates {
            self.insert_reminder(
                branch_id,
                &candidate.customer_id,
                ReminderKind::BirthdayGreeting,
                target,
                json!({
                    "customer_name": candidate.customer_name,
                    "birth_date": candidate.birth_date,
                }),
            )
            .await?;
            created += 1;
        }

        Ok(created)
    }

    /// Creates reactivation reminders for customers whose most recent
    /// completed sale is older than the configured window. Customers who
    /// never purchased are not candidates.
    pub async fn generate_inactive_reminders(&self, branch_id: &str) -> DbResult<u64> {
        let config = self.get_or_create_config(branch_id).await?;
        if !config.inactive_enabled {
            return Ok(0);
        }

        let cutoff = Utc::now() - Duration::days(config.inactive_after_days);
        let today = Utc::now().date_naive();

        let candidates = sqlx::query_as::<_, InactiveCandidate>(
            r#"
            SELECT c.id AS customer_id,
                   c.name AS customer_name,
                   MAX(s.completed_at) AS last_purchase_at
            FROM customers c
            JOIN sales s ON s.customer_id = c.id AND s.status = 'completed'
            WHERE c.branch_id = ?1
              AND NOT EXISTS (
                  SELECT 1 FROM reminders r
                  WHERE r.branch_id = ?1
                    AND r.customer_id = c.id
                    AND r.kind = 'inactive_reactivation'
                    AND r.status IN ('pending', 'in_progress')
              )
            GROUP BY c.id
            HAVING MAX(s.completed_at) < ?2
            "#,
        )
        .bind(branch_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        let mut created = 0;
        for candidate in candidates {
            self.insert_reminder(
                branch_id,
                &candidate.customer_id,
                ReminderKind::InactiveReactivation,
                today,
                json!({
                    "customer_name": candidate.customer_name,
                    "last_purchase_at": candidate.last_purchase_at,
                }),
            )
            .await?;
            created += 1;
        }

        Ok(created)
    }

    /// Creates reminders for customers with unexpired credits due within
    /// the configured window. One reminder per customer carrying the
    /// total expiring amount, scheduled for the earliest expiry.
    pub async fn generate_cashback_reminders(&self, branch_id: &str) -> DbResult<u64> {
        let config = self.get_or_create_config(branch_id).await?;
        if !config.cashback_enabled {
            return Ok(0);
        }

        let today = Utc::now().date_naive();
        let horizon = today
            .checked_add_days(Days::new(config.cashback_days_before as u64))
            .ok_or_else(|| DbError::Internal("cashback horizon out of range".to_string()))?;

        let candidates = sqlx::query_as::<_, CashbackCandidate>(
            r#"
            SELECT cc.customer_id AS customer_id,
                   c.name AS customer_name,
                   SUM(m.amount_cents) AS expiring_cents,
                   MIN(m.expires_at) AS first_expiry
            FROM cashback_movements m
            JOIN customer_cashbacks cc ON cc.id = m.ledger_id
            JOIN customers c ON c.id = cc.customer_id
            WHERE cc.branch_id = ?1
              AND m.kind = 'credit'
              AND m.expired = 0
              AND m.expires_at IS NOT NULL
              AND m.expires_at >= ?2
              AND m.expires_at <= ?3
              AND NOT EXISTS (
                  SELECT 1 FROM reminders r
                  WHERE r.branch_id = ?1
                    AND r.customer_id = cc.customer_id
                    AND r.kind = 'cashback_expiring'
                    AND r.status IN ('pending', 'in_progress')
              )
            GROUP BY cc.customer_id
            "#,
        )
        .bind(branch_id)
        .bind(start_of_day(today))
        .bind(start_of_day(horizon))
        .fetch_all(&self.pool)
        .await?;

        let mut created = 0;
        for candidate in candidates {
            self.insert_reminder(
                branch_id,
                &candidate.customer_id,
                ReminderKind::CashbackExpiring,
                candidate.first_expiry.date_naive(),
                json!({
                    "customer_name": candidate.customer_name,
                    "expiring_cents": candidate.expiring_cents,
                    "first_expiry": candidate.first_expiry,
                }),
            )
            .await?;
            created += 1;
        }

        Ok(created)
    }

    // =========================================================================
    // Workflow
    // =========================================================================

    /// Dismisses an open reminder with a reason. Completed or already
    /// dismissed reminders cannot be dismissed (again).
    pub async fn dismiss(&self, reminder_id: &str, reason: &str) -> DbResult<Reminder> {
        validate_scope_id("reason", reason)?;

        let now = Utc::now();
        let updated = sqlx::query(
            r#"
            UPDATE reminders SET
                status = 'dismissed', dismissed_at = ?2, dismiss_reason = ?3, updated_at = ?2
            WHERE id = ?1 AND status IN ('pending', 'in_progress')
            "#,
        )
        .bind(reminder_id)
        .bind(now)
        .bind(reason)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(DbError::not_found("Open reminder", reminder_id));
        }

        self.get(reminder_id).await
    }

    /// Moves a reminder through its workflow (pending → in_progress →
    /// completed). Use [`dismiss`](Self::dismiss) for dismissals so the
    /// reason and timestamp are recorded.
    pub async fn set_status(&self, reminder_id: &str, status: ReminderStatus) -> DbResult<Reminder> {
        let updated = sqlx::query("UPDATE reminders SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(reminder_id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(DbError::not_found("Reminder", reminder_id));
        }

        self.get(reminder_id).await
    }

    /// Gets a reminder by ID.
    pub async fn get(&self, reminder_id: &str) -> DbResult<Reminder> {
        sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ?1")
            .bind(reminder_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Reminder", reminder_id))
    }

    /// Lists a branch's open reminders (pending or in progress), soonest
    /// first.
    pub async fn list_open(&self, branch_id: &str) -> DbResult<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(
            r#"
            SELECT * FROM reminders
            WHERE branch_id = ?1 AND status IN ('pending', 'in_progress')
            ORDER BY scheduled_for ASC, created_at ASC
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn insert_reminder(
        &self,
        branch_id: &str,
        customer_id: &str,
        kind: ReminderKind,
        scheduled_for: NaiveDate,
        metadata: serde_json::Value,
    ) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO reminders (
                id, branch_id, customer_id, kind, scheduled_for,
                status, metadata, dismissed_at, dismiss_reason,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, NULL, NULL, ?7, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(branch_id)
        .bind(customer_id)
        .bind(kind)
        .bind(scheduled_for)
        .bind(metadata.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(
            branch_id = %branch_id,
            customer_id = %customer_id,
            kind = ?kind,
            scheduled_for = %scheduled_for,
            "Reminder created"
        );

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use optika_core::{CashbackConfigUpdate, Money};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, id: &str, birth: Option<NaiveDate>) {
        sqlx::query(
            "INSERT INTO customers (id, branch_id, name, phone, birth_date)
             VALUES (?1, 'branch-1', 'Test Customer', NULL, ?2)",
        )
        .bind(id)
        .bind(birth)
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_prescription(db: &Database, customer_id: &str, expires: NaiveDate) {
        sqlx::query(
            "INSERT INTO prescriptions (id, branch_id, customer_id, expires_at)
             VALUES (?1, 'branch-1', ?2, ?3)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(customer_id)
        .bind(expires)
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_sale(db: &Database, customer_id: &str, completed_at: DateTime<Utc>) {
        sqlx::query(
            "INSERT INTO sales (id, branch_id, seller_id, customer_id, status, total_cents, completed_at)
             VALUES (?1, 'branch-1', 'seller-1', ?2, 'completed', 50000, ?3)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(customer_id)
        .bind(completed_at)
        .execute(db.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_config_defaults() {
        let db = test_db().await;
        let config = db
            .reminders()
            .get_or_create_config("branch-1")
            .await
            .unwrap();

        assert!(config.prescription_enabled);
        assert_eq!(config.prescription_days_before, 30);
        assert_eq!(config.birthday_days_before, 3);
        assert_eq!(config.inactive_after_days, 90);
        assert_eq!(config.cashback_days_before, 7);
    }

    #[tokio::test]
    async fn test_prescription_reminders_dedup_across_runs() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", None).await;

        let expires = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(10))
            .unwrap();
        seed_prescription(&db, "cust-1", expires).await;
        // Second expiring prescription: still one reminder per customer
        seed_prescription(&db, "cust-1", expires).await;

        let repo = db.reminders();
        assert_eq!(
            repo.generate_prescription_reminders("branch-1").await.unwrap(),
            1
        );

        let open = repo.list_open("branch-1").await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].kind, ReminderKind::PrescriptionRenewal);
        assert_eq!(open[0].scheduled_for, expires);

        // Rerun: the open reminder suppresses a duplicate
        assert_eq!(
            repo.generate_prescription_reminders("branch-1").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_prescription_outside_window_skipped() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", None).await;

        let far = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(60))
            .unwrap();
        seed_prescription(&db, "cust-1", far).await;

        assert_eq!(
            db.reminders()
                .generate_prescription_reminders("branch-1")
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_birthday_reminders_match_month_day() {
        let db = test_db().await;

        // Birthday exactly 3 days out (the default lead time)
        let target = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(3))
            .unwrap();
        let birth = NaiveDate::from_ymd_opt(1985, target.month(), target.day()).unwrap();
        seed_customer(&db, "cust-birthday", Some(birth)).await;
        // Birthday today: outside the 3-day match
        seed_customer(&db, "cust-today", Some(Utc::now().date_naive())).await;
        seed_customer(&db, "cust-no-birth", None).await;

        let repo = db.reminders();
        assert_eq!(repo.generate_birthday_reminders("branch-1").await.unwrap(), 1);

        let open = repo.list_open("branch-1").await.unwrap();
        assert_eq!(open[0].customer_id, "cust-birthday");
        assert_eq!(open[0].scheduled_for, target);
    }

    #[tokio::test]
    async fn test_birthday_completed_this_year_not_regenerated() {
        let db = test_db().await;

        let target = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(3))
            .unwrap();
        let birth = NaiveDate::from_ymd_opt(1985, target.month(), target.day()).unwrap();
        seed_customer(&db, "cust-1", Some(birth)).await;

        let repo = db.reminders();
        assert_eq!(repo.generate_birthday_reminders("branch-1").await.unwrap(), 1);

        let open = repo.list_open("branch-1").await.unwrap();
        repo.set_status(&open[0].id, ReminderStatus::Completed)
            .await
            .unwrap();

        // Already greeted this year
        assert_eq!(repo.generate_birthday_reminders("branch-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_inactive_reminders() {
        let db = test_db().await;
        seed_customer(&db, "cust-stale", None).await;
        seed_customer(&db, "cust-fresh", None).await;
        seed_customer(&db, "cust-never", None).await;

        seed_sale(&db, "cust-stale", Utc::now() - Duration::days(120)).await;
        seed_sale(&db, "cust-fresh", Utc::now() - Duration::days(10)).await;

        let repo = db.reminders();
        assert_eq!(repo.generate_inactive_reminders("branch-1").await.unwrap(), 1);

        let open = repo.list_open("branch-1").await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].customer_id, "cust-stale");
        assert_eq!(open[0].kind, ReminderKind::InactiveReactivation);
    }

    #[tokio::test]
    async fn test_cashback_expiring_reminders() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", None).await;

        // Credits expire in 5 days - inside the default 7-day window
        db.cashback_configs()
            .update(
                "branch-1",
                CashbackConfigUpdate {
                    enabled: true,
                    earn_rate_bps: 500,
                    min_purchase_cents: 0,
                    max_per_sale_cents: None,
                    expiry_days: Some(5),
                    min_purchase_multiplier: 200,
                    max_usage_bps: 5_000,
                    birthday_multiplier: 200,
                },
            )
            .await
            .unwrap();

        db.ledger()
            .earn("cust-1", "sale-1", Money::from_cents(100_000), "branch-1")
            .await
            .unwrap();
        db.ledger()
            .earn("cust-1", "sale-2", Money::from_cents(40_000), "branch-1")
            .await
            .unwrap();

        let repo = db.reminders();
        assert_eq!(repo.generate_cashback_reminders("branch-1").await.unwrap(), 1);

        let open = repo.list_open("branch-1").await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].kind, ReminderKind::CashbackExpiring);

        // Metadata snapshot carries the total expiring amount
        let metadata: serde_json::Value = serde_json::from_str(&open[0].metadata).unwrap();
        assert_eq!(metadata["expiring_cents"], 7_000);
    }

    #[tokio::test]
    async fn test_disabled_generator_is_noop() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", None).await;
        seed_prescription(
            &db,
            "cust-1",
            Utc::now().date_naive().checked_add_days(Days::new(5)).unwrap(),
        )
        .await;

        let repo = db.reminders();
        let config = repo.get_or_create_config("branch-1").await.unwrap();
        repo.update_config(
            "branch-1",
            ReminderConfigUpdate {
                prescription_enabled: false,
                prescription_days_before: config.prescription_days_before,
                birthday_enabled: false,
                birthday_days_before: config.birthday_days_before,
                inactive_enabled: false,
                inactive_after_days: config.inactive_after_days,
                cashback_enabled: false,
                cashback_days_before: config.cashback_days_before,
            },
        )
        .await
        .unwrap();

        let summary = repo.generate_all("branch-1").await.unwrap();
        assert_eq!(summary.total(), 0);
    }

    #[tokio::test]
    async fn test_generate_all_counts_per_kind() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", None).await;
        seed_customer(&db, "cust-2", None).await;

        seed_prescription(
            &db,
            "cust-1",
            Utc::now().date_naive().checked_add_days(Days::new(5)).unwrap(),
        )
        .await;
        seed_sale(&db, "cust-2", Utc::now() - Duration::days(200)).await;

        let summary = db.reminders().generate_all("branch-1").await.unwrap();
        assert_eq!(summary.prescription, 1);
        assert_eq!(summary.inactive, 1);
        assert_eq!(summary.birthday, 0);
        assert_eq!(summary.cashback_expiring, 0);
        assert_eq!(summary.total(), 2);
    }

    #[tokio::test]
    async fn test_dismiss_records_reason() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", None).await;
        seed_prescription(
            &db,
            "cust-1",
            Utc::now().date_naive().checked_add_days(Days::new(5)).unwrap(),
        )
        .await;

        let repo = db.reminders();
        repo.generate_prescription_reminders("branch-1").await.unwrap();
        let open = repo.list_open("branch-1").await.unwrap();

        let dismissed = repo
            .dismiss(&open[0].id, "Customer asked not to be contacted")
            .await
            .unwrap();
        assert_eq!(dismissed.status, ReminderStatus::Dismissed);
        assert!(dismissed.dismissed_at.is_some());
        assert_eq!(
            dismissed.dismiss_reason.as_deref(),
            Some("Customer asked not to be contacted")
        );

        // No longer open, cannot be dismissed twice
        assert!(repo.list_open("branch-1").await.unwrap().is_empty());
        assert!(repo.dismiss(&open[0].id, "again").await.is_err());
    }
}
