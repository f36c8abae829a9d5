//! # Cashback Ledger
//!
//! Earn, redeem, adjust and expire cashback credits.
//!
//! ## The Projection Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  customer_cashbacks.balance_cents  ==  Σ cashback_movements.amount  │
//! │                                                                     │
//! │  Every mutation runs ONE transaction that:                          │
//! │    1. appends exactly one movement row (signed amount)              │
//! │    2. applies that amount as a delta to the cached balance          │
//! │                                                                     │
//! │  earn        → +credit          debit_for_redemption → -debit       │
//! │  adjustment  → ±bonus/adj       sweep_expired        → -expired     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Ways to Take Money Out
//!
//! `debit_for_redemption` is the customer-facing path: it re-checks the
//! balance inside the transaction and refuses to overdraw. The
//! administrative adjustment path has no such guard - a negative
//! adjustment is an operator override and may drive the balance below
//! zero (logged at WARN). Keep the two paths separate; never route a
//! redemption through an adjustment.

use chrono::{Days, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::config::CashbackConfigRepository;
use crate::repository::start_of_day;
use optika_core::policy::{self, UsageCheck};
use optika_core::validation::{
    validate_adjustment_amount, validate_day_window, validate_redemption_amount, validate_scope_id,
};
use optika_core::{
    AdjustmentRequest, CashbackMovement, CoreError, CustomerCashback, ExpiringCredit, Money,
    MovementKind, MovementReceipt, RedemptionRequest, SweepOutcome,
};

/// A credit due for expiry, joined with its owning ledger row.
#[derive(Debug, sqlx::FromRow)]
struct SweepCandidate {
    movement_id: String,
    ledger_id: String,
    customer_id: String,
    amount_cents: i64,
}

// =============================================================================
// Cashback Ledger
// =============================================================================

/// Repository for the cashback ledger: the movement log plus its cached
/// balance projection.
#[derive(Debug, Clone)]
pub struct CashbackLedger {
    pool: SqlitePool,
    configs: CashbackConfigRepository,
}

impl CashbackLedger {
    /// Creates a new CashbackLedger.
    pub fn new(pool: SqlitePool) -> Self {
        let configs = CashbackConfigRepository::new(pool.clone());
        CashbackLedger { pool, configs }
    }

    // =========================================================================
    // Earn
    // =========================================================================

    /// Credits cashback for a completed sale.
    ///
    /// Returns `Ok(None)` when the sale earns nothing (cashback disabled
    /// for the branch, or total below the earn minimum) - an expected
    /// state, not an error. The customer's birth month doubles the earn
    /// per the branch policy; day-of-month is ignored.
    ///
    /// Fails with NotFound when the customer does not exist.
    pub async fn earn(
        &self,
        customer_id: &str,
        sale_id: &str,
        sale_total: Money,
        branch_id: &str,
    ) -> DbResult<Option<MovementReceipt>> {
        validate_scope_id("customer_id", customer_id)?;
        validate_scope_id("sale_id", sale_id)?;

        let config = self.configs.get_or_create(branch_id).await?;
        let today = Utc::now().date_naive();

        let birth_date: Option<chrono::NaiveDate> =
            sqlx::query_scalar("SELECT birth_date FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::not_found("Customer", customer_id))?;

        let birthday = policy::is_birthday_month(birth_date, today);

        let Some(accrued) = policy::accrual(&config, sale_total, birthday) else {
            debug!(
                customer_id = %customer_id,
                sale_id = %sale_id,
                sale_total_cents = sale_total.cents(),
                "Sale earns no cashback"
            );
            return Ok(None);
        };

        let expires_at = policy::expiry_date(&config, today).map(start_of_day);
        let description = if accrued.birthday_applied {
            "Cashback earned (birthday bonus)"
        } else {
            "Cashback earned"
        };

        let mut tx = self.pool.begin().await?;

        let ledger = Self::ensure_ledger(&mut tx, customer_id, branch_id).await?;

        let movement_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let amount = accrued.amount.cents();

        sqlx::query(
            r#"
            INSERT INTO cashback_movements (
                id, ledger_id, kind, amount_cents, sale_id,
                description, expires_at, expired, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
            "#,
        )
        .bind(&movement_id)
        .bind(&ledger.id)
        .bind(MovementKind::Credit)
        .bind(amount)
        .bind(sale_id)
        .bind(description)
        .bind(expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE customer_cashbacks SET
                balance_cents = balance_cents + ?2,
                total_earned_cents = total_earned_cents + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&ledger.id)
        .bind(amount)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            customer_id = %customer_id,
            sale_id = %sale_id,
            amount_cents = amount,
            birthday = accrued.birthday_applied,
            "Cashback credited"
        );

        Ok(Some(MovementReceipt {
            movement_id,
            ledger_id: ledger.id,
            amount_cents: amount,
            new_balance_cents: ledger.balance_cents + amount,
            expires_at,
        }))
    }

    // =========================================================================
    // Redeem
    // =========================================================================

    /// Validates a redemption without touching the ledger.
    ///
    /// Read-only pre-check for the POS screen: all violated rules are
    /// returned at once. A customer with no ledger row simply has a zero
    /// balance. The debit path re-checks the balance inside its own
    /// transaction, so a stale answer here can never overdraw.
    pub async fn validate_usage(
        &self,
        customer_id: &str,
        amount: Money,
        sale_total: Money,
        branch_id: &str,
    ) -> DbResult<UsageCheck> {
        validate_redemption_amount(amount.cents())?;

        let config = self.configs.get_or_create(branch_id).await?;

        let balance: i64 = sqlx::query_scalar(
            "SELECT balance_cents FROM customer_cashbacks WHERE customer_id = ?1 AND branch_id = ?2",
        )
        .bind(customer_id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?
        .unwrap_or(0);

        Ok(policy::check_usage(
            &config,
            Money::from_cents(balance),
            amount,
            sale_total,
        ))
    }

    /// Debits balance for a redemption. The movement is stored with a
    /// negative amount.
    ///
    /// The balance guard runs inside the transaction: even if two
    /// redemptions race on the same customer, neither can drive the
    /// balance negative. A customer with no ledger row cannot redeem.
    pub async fn debit_for_redemption(
        &self,
        request: RedemptionRequest,
        branch_id: &str,
    ) -> DbResult<MovementReceipt> {
        validate_redemption_amount(request.amount_cents)?;
        validate_scope_id("customer_id", &request.customer_id)?;

        let mut tx = self.pool.begin().await?;

        let ledger = sqlx::query_as::<_, CustomerCashback>(
            "SELECT * FROM customer_cashbacks WHERE customer_id = ?1 AND branch_id = ?2",
        )
        .bind(&request.customer_id)
        .bind(branch_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            DbError::Domain(CoreError::LedgerNotFound {
                customer_id: request.customer_id.clone(),
            })
        })?;

        if ledger.balance_cents < request.amount_cents {
            return Err(CoreError::InsufficientBalance {
                available_cents: ledger.balance_cents,
                requested_cents: request.amount_cents,
            }
            .into());
        }

        let movement_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let stored_amount = -request.amount_cents;

        sqlx::query(
            r#"
            INSERT INTO cashback_movements (
                id, ledger_id, kind, amount_cents, sale_id,
                description, expires_at, expired, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, 0, ?7)
            "#,
        )
        .bind(&movement_id)
        .bind(&ledger.id)
        .bind(MovementKind::Debit)
        .bind(stored_amount)
        .bind(&request.sale_id)
        .bind(request.description.as_deref().unwrap_or("Cashback redeemed"))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE customer_cashbacks SET
                balance_cents = balance_cents - ?2,
                total_used_cents = total_used_cents + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&ledger.id)
        .bind(request.amount_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            customer_id = %request.customer_id,
            amount_cents = request.amount_cents,
            "Cashback redeemed"
        );

        Ok(MovementReceipt {
            movement_id,
            ledger_id: ledger.id,
            amount_cents: stored_amount,
            new_balance_cents: ledger.balance_cents - request.amount_cents,
            expires_at: None,
        })
    }

    // =========================================================================
    // Adjust
    // =========================================================================

    /// Applies a manual bonus or correction.
    ///
    /// Operator override path: the amount is signed and there is no
    /// balance guard, so a negative correction may take the balance
    /// below zero. That is intentional (e.g. clawing back a credit that
    /// was partially spent) and logged at WARN.
    pub async fn administrative_adjustment(
        &self,
        request: AdjustmentRequest,
        branch_id: &str,
    ) -> DbResult<MovementReceipt> {
        validate_adjustment_amount(request.amount_cents)?;
        validate_scope_id("customer_id", &request.customer_id)?;

        let mut tx = self.pool.begin().await?;

        let ledger = Self::ensure_ledger(&mut tx, &request.customer_id, branch_id).await?;

        let movement_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let new_balance = ledger.balance_cents + request.amount_cents;
        let earned_delta = request.amount_cents.max(0);

        sqlx::query(
            r#"
            INSERT INTO cashback_movements (
                id, ledger_id, kind, amount_cents, sale_id,
                description, expires_at, expired, created_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, NULL, 0, ?6)
            "#,
        )
        .bind(&movement_id)
        .bind(&ledger.id)
        .bind(request.kind.movement_kind())
        .bind(request.amount_cents)
        .bind(&request.description)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE customer_cashbacks SET
                balance_cents = ?2,
                total_earned_cents = total_earned_cents + ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&ledger.id)
        .bind(new_balance)
        .bind(earned_delta)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if new_balance < 0 {
            warn!(
                customer_id = %request.customer_id,
                new_balance_cents = new_balance,
                "Adjustment drove cashback balance negative"
            );
        }

        info!(
            customer_id = %request.customer_id,
            amount_cents = request.amount_cents,
            kind = ?request.kind,
            "Cashback adjusted"
        );

        Ok(MovementReceipt {
            movement_id,
            ledger_id: ledger.id,
            amount_cents: request.amount_cents,
            new_balance_cents: new_balance,
            expires_at: None,
        })
    }

    // =========================================================================
    // Expire
    // =========================================================================

    /// Expires all overdue credits for a branch.
    ///
    /// Each candidate is processed in its own transaction; one failure
    /// never aborts the batch, it is collected in that item's outcome.
    /// The `expired` flag flips exactly once, so concurrent sweeps (or a
    /// rerun after a crash) never double-expire a credit.
    pub async fn sweep_expired(&self, branch_id: &str) -> DbResult<Vec<SweepOutcome>> {
        validate_scope_id("branch_id", branch_id)?;

        let cutoff = start_of_day(Utc::now().date_naive());

        let candidates = sqlx::query_as::<_, SweepCandidate>(
            r#"
            SELECT m.id AS movement_id, m.ledger_id AS ledger_id,
                   c.customer_id AS customer_id, m.amount_cents AS amount_cents
            FROM cashback_movements m
            JOIN customer_cashbacks c ON c.id = m.ledger_id
            WHERE c.branch_id = ?1
              AND m.kind = 'credit'
              AND m.expired = 0
              AND m.expires_at IS NOT NULL
              AND m.expires_at <= ?2
            ORDER BY m.expires_at ASC
            "#,
        )
        .bind(branch_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        if candidates.is_empty() {
            debug!(branch_id = %branch_id, "No expired credits to sweep");
            return Ok(Vec::new());
        }

        let mut outcomes = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            match self.expire_one(&candidate).await {
                // Another sweep got there first; nothing to report
                Ok(false) => continue,
                Ok(true) => outcomes.push(SweepOutcome {
                    movement_id: candidate.movement_id,
                    customer_id: candidate.customer_id,
                    amount_cents: candidate.amount_cents,
                    success: true,
                    error: None,
                }),
                Err(err) => {
                    warn!(
                        movement_id = %candidate.movement_id,
                        error = %err,
                        "Failed to expire credit"
                    );
                    outcomes.push(SweepOutcome {
                        movement_id: candidate.movement_id,
                        customer_id: candidate.customer_id,
                        amount_cents: candidate.amount_cents,
                        success: false,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        info!(
            branch_id = %branch_id,
            swept = outcomes.iter().filter(|o| o.success).count(),
            failed = outcomes.iter().filter(|o| !o.success).count(),
            "Expiration sweep finished"
        );

        Ok(outcomes)
    }

    /// Expires one credit. Returns `Ok(false)` when the flag had already
    /// flipped (lost the race to another sweep).
    async fn expire_one(&self, candidate: &SweepCandidate) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            "UPDATE cashback_movements SET expired = 1 WHERE id = ?1 AND expired = 0",
        )
        .bind(&candidate.movement_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if flipped == 0 {
            return Ok(false);
        }

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO cashback_movements (
                id, ledger_id, kind, amount_cents, sale_id,
                description, expires_at, expired, created_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, NULL, 0, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&candidate.ledger_id)
        .bind(MovementKind::Expired)
        .bind(-candidate.amount_cents)
        .bind("Cashback expired")
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE customer_cashbacks SET
                balance_cents = balance_cents - ?2,
                total_expired_cents = total_expired_cents + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&candidate.ledger_id)
        .bind(candidate.amount_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Lists unexpired credits whose expiry date falls within the next
    /// `days_ahead` days. Feeds the cashback-expiring reminder and the
    /// branch dashboard.
    pub async fn expiring_within(
        &self,
        branch_id: &str,
        days_ahead: i64,
    ) -> DbResult<Vec<ExpiringCredit>> {
        validate_scope_id("branch_id", branch_id)?;
        validate_day_window(days_ahead)?;

        let today = Utc::now().date_naive();
        let horizon = today
            .checked_add_days(Days::new(days_ahead as u64))
            .ok_or_else(|| DbError::Internal("expiry horizon out of range".to_string()))?;

        let credits = sqlx::query_as::<_, ExpiringCredit>(
            r#"
            SELECT m.id AS movement_id, c.customer_id AS customer_id,
                   m.amount_cents AS amount_cents, m.expires_at AS expires_at
            FROM cashback_movements m
            JOIN customer_cashbacks c ON c.id = m.ledger_id
            WHERE c.branch_id = ?1
              AND m.kind = 'credit'
              AND m.expired = 0
              AND m.expires_at IS NOT NULL
              AND m.expires_at >= ?2
              AND m.expires_at <= ?3
            ORDER BY m.expires_at ASC
            "#,
        )
        .bind(branch_id)
        .bind(start_of_day(today))
        .bind(start_of_day(horizon))
        .fetch_all(&self.pool)
        .await?;

        Ok(credits)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns a customer's ledger row, if one exists.
    pub async fn get_ledger(
        &self,
        customer_id: &str,
        branch_id: &str,
    ) -> DbResult<Option<CustomerCashback>> {
        let ledger = sqlx::query_as::<_, CustomerCashback>(
            "SELECT * FROM customer_cashbacks WHERE customer_id = ?1 AND branch_id = ?2",
        )
        .bind(customer_id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ledger)
    }

    /// Returns a customer's movements, newest first.
    pub async fn movements(
        &self,
        customer_id: &str,
        branch_id: &str,
        limit: i64,
    ) -> DbResult<Vec<CashbackMovement>> {
        let movements = sqlx::query_as::<_, CashbackMovement>(
            r#"
            SELECT m.*
            FROM cashback_movements m
            JOIN customer_cashbacks c ON c.id = m.ledger_id
            WHERE c.customer_id = ?1 AND c.branch_id = ?2
            ORDER BY m.created_at DESC
            LIMIT ?3
            "#,
        )
        .bind(customer_id)
        .bind(branch_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Gets or creates the ledger row for a customer × branch pair,
    /// inside the caller's transaction.
    ///
    /// `INSERT OR IGNORE` + re-read: the UNIQUE(customer_id, branch_id)
    /// constraint makes concurrent first-earns converge on one row.
    async fn ensure_ledger(
        tx: &mut Transaction<'_, Sqlite>,
        customer_id: &str,
        branch_id: &str,
    ) -> DbResult<CustomerCashback> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO customer_cashbacks (
                id, customer_id, branch_id, balance_cents,
                total_earned_cents, total_used_cents, total_expired_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, 0, 0, 0, 0, ?4, ?4)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(customer_id)
        .bind(branch_id)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        let ledger = sqlx::query_as::<_, CustomerCashback>(
            "SELECT * FROM customer_cashbacks WHERE customer_id = ?1 AND branch_id = ?2",
        )
        .bind(customer_id)
        .bind(branch_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(ledger)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Datelike, NaiveDate};
    use optika_core::{AdjustmentKind, CashbackConfigUpdate};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, id: &str, branch: &str, birth: Option<NaiveDate>) {
        sqlx::query(
            "INSERT INTO customers (id, branch_id, name, phone, birth_date)
             VALUES (?1, ?2, 'Test Customer', NULL, ?3)",
        )
        .bind(id)
        .bind(branch)
        .bind(birth)
        .execute(db.pool())
        .await
        .unwrap();
    }

    /// Signed sum of a customer's movements - must always equal the
    /// cached balance.
    async fn movement_sum(db: &Database, customer_id: &str, branch: &str) -> i64 {
        sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(m.amount_cents), 0)
            FROM cashback_movements m
            JOIN customer_cashbacks c ON c.id = m.ledger_id
            WHERE c.customer_id = ?1 AND c.branch_id = ?2
            "#,
        )
        .bind(customer_id)
        .bind(branch)
        .fetch_one(db.pool())
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_earn_credits_and_projects_balance() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        let receipt = db
            .ledger()
            .earn("cust-1", "sale-1", Money::from_cents(100_000), "branch-1")
            .await
            .unwrap()
            .unwrap();

        // 5% default earn rate
        assert_eq!(receipt.amount_cents, 5_000);
        assert_eq!(receipt.new_balance_cents, 5_000);
        assert!(receipt.expires_at.is_some()); // 90-day default

        let ledger = db
            .ledger()
            .get_ledger("cust-1", "branch-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ledger.balance_cents, 5_000);
        assert_eq!(ledger.total_earned_cents, 5_000);
        assert_eq!(movement_sum(&db, "cust-1", "branch-1").await, 5_000);
    }

    #[tokio::test]
    async fn test_earn_birthday_month_doubles() {
        let db = test_db().await;
        let today = Utc::now().date_naive();
        let birth = NaiveDate::from_ymd_opt(1990, today.month(), 15).unwrap();
        seed_customer(&db, "cust-1", "branch-1", Some(birth)).await;

        let receipt = db
            .ledger()
            .earn("cust-1", "sale-1", Money::from_cents(100_000), "branch-1")
            .await
            .unwrap()
            .unwrap();

        // 5% x 2.00 birthday multiplier
        assert_eq!(receipt.amount_cents, 10_000);
    }

    #[tokio::test]
    async fn test_earn_below_minimum_is_silent_noop() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        db.cashback_configs()
            .update(
                "branch-1",
                CashbackConfigUpdate {
                    enabled: true,
                    earn_rate_bps: 500,
                    min_purchase_cents: 10_000,
                    max_per_sale_cents: None,
                    expiry_days: Some(90),
                    min_purchase_multiplier: 200,
                    max_usage_bps: 5_000,
                    birthday_multiplier: 200,
                },
            )
            .await
            .unwrap();

        let receipt = db
            .ledger()
            .earn("cust-1", "sale-1", Money::from_cents(5_000), "branch-1")
            .await
            .unwrap();

        assert!(receipt.is_none());
        // No ledger row was created for a no-op
        assert!(db
            .ledger()
            .get_ledger("cust-1", "branch-1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_earn_unknown_customer_fails() {
        let db = test_db().await;
        let result = db
            .ledger()
            .earn("ghost", "sale-1", Money::from_cents(10_000), "branch-1")
            .await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_debit_maintains_projection() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        db.ledger()
            .earn("cust-1", "sale-1", Money::from_cents(100_000), "branch-1")
            .await
            .unwrap();

        let receipt = db
            .ledger()
            .debit_for_redemption(
                RedemptionRequest {
                    customer_id: "cust-1".to_string(),
                    amount_cents: 2_000,
                    sale_id: Some("sale-2".to_string()),
                    description: None,
                },
                "branch-1",
            )
            .await
            .unwrap();

        // Debit is stored negative; balance projects correctly
        assert_eq!(receipt.amount_cents, -2_000);
        assert_eq!(receipt.new_balance_cents, 3_000);

        let ledger = db
            .ledger()
            .get_ledger("cust-1", "branch-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ledger.balance_cents, 3_000);
        assert_eq!(ledger.total_used_cents, 2_000);
        assert_eq!(movement_sum(&db, "cust-1", "branch-1").await, 3_000);
    }

    #[tokio::test]
    async fn test_debit_refuses_overdraw() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        db.ledger()
            .earn("cust-1", "sale-1", Money::from_cents(100_000), "branch-1")
            .await
            .unwrap();

        let result = db
            .ledger()
            .debit_for_redemption(
                RedemptionRequest {
                    customer_id: "cust-1".to_string(),
                    amount_cents: 6_000, // balance is 5_000
                    sale_id: None,
                    description: None,
                },
                "branch-1",
            )
            .await;

        assert!(matches!(
            result,
            Err(DbError::Domain(CoreError::InsufficientBalance {
                available_cents: 5_000,
                requested_cents: 6_000,
            }))
        ));

        // Nothing was written
        assert_eq!(movement_sum(&db, "cust-1", "branch-1").await, 5_000);
    }

    #[tokio::test]
    async fn test_debit_without_ledger_fails() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        let result = db
            .ledger()
            .debit_for_redemption(
                RedemptionRequest {
                    customer_id: "cust-1".to_string(),
                    amount_cents: 100,
                    sale_id: None,
                    description: None,
                },
                "branch-1",
            )
            .await;

        assert!(matches!(
            result,
            Err(DbError::Domain(CoreError::LedgerNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_negative_adjustment_may_overdraw() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        let receipt = db
            .ledger()
            .administrative_adjustment(
                AdjustmentRequest {
                    customer_id: "cust-1".to_string(),
                    amount_cents: -500,
                    kind: AdjustmentKind::Correction,
                    description: "Clawback of mistaken credit".to_string(),
                },
                "branch-1",
            )
            .await
            .unwrap();

        // Unlike the debit path, the override may go negative
        assert_eq!(receipt.new_balance_cents, -500);
        assert_eq!(movement_sum(&db, "cust-1", "branch-1").await, -500);
    }

    #[tokio::test]
    async fn test_bonus_adjustment_counts_as_earned() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        db.ledger()
            .administrative_adjustment(
                AdjustmentRequest {
                    customer_id: "cust-1".to_string(),
                    amount_cents: 1_000,
                    kind: AdjustmentKind::Bonus,
                    description: "Campaign bonus".to_string(),
                },
                "branch-1",
            )
            .await
            .unwrap();

        let ledger = db
            .ledger()
            .get_ledger("cust-1", "branch-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ledger.balance_cents, 1_000);
        assert_eq!(ledger.total_earned_cents, 1_000);
    }

    #[tokio::test]
    async fn test_validate_usage_without_ledger_sees_zero_balance() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        let check = db
            .ledger()
            .validate_usage(
                "cust-1",
                Money::from_cents(1_000),
                Money::from_cents(100_000),
                "branch-1",
            )
            .await
            .unwrap();

        assert!(!check.is_valid);
        assert_eq!(check.available_balance_cents, 0);
    }

    #[tokio::test]
    async fn test_validate_usage_collects_all_violations() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        // Balance of 5_000 via a 100_000 sale at 5%
        db.ledger()
            .earn("cust-1", "sale-1", Money::from_cents(100_000), "branch-1")
            .await
            .unwrap();

        // Redeem 3_000 on a 5_000 sale: breaks the 2x basket rule
        // (needs >= 6_000) and the 50% usage cap (2_500)
        let check = db
            .ledger()
            .validate_usage(
                "cust-1",
                Money::from_cents(3_000),
                Money::from_cents(5_000),
                "branch-1",
            )
            .await
            .unwrap();

        assert!(!check.is_valid);
        assert_eq!(check.errors.len(), 2);
        assert_eq!(check.max_usage_allowed_cents, 2_500);
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        // expiry_days = 0 makes the credit due immediately
        db.cashback_configs()
            .update(
                "branch-1",
                CashbackConfigUpdate {
                    enabled: true,
                    earn_rate_bps: 500,
                    min_purchase_cents: 0,
                    max_per_sale_cents: None,
                    expiry_days: Some(0),
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

        let outcomes = db.ledger().sweep_expired("branch-1").await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        assert_eq!(outcomes[0].amount_cents, 5_000);

        let ledger = db
            .ledger()
            .get_ledger("cust-1", "branch-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ledger.balance_cents, 0);
        assert_eq!(ledger.total_expired_cents, 5_000);
        assert_eq!(movement_sum(&db, "cust-1", "branch-1").await, 0);

        // Rerunning finds nothing: the expired flag flipped exactly once
        let again = db.ledger().sweep_expired("branch-1").await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_expiring_within_window() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        // Default 90-day expiry
        db.ledger()
            .earn("cust-1", "sale-1", Money::from_cents(100_000), "branch-1")
            .await
            .unwrap();

        let inside = db.ledger().expiring_within("branch-1", 90).await.unwrap();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].amount_cents, 5_000);

        let outside = db.ledger().expiring_within("branch-1", 7).await.unwrap();
        assert!(outside.is_empty());
    }

    #[tokio::test]
    async fn test_ledgers_are_scoped_per_branch() {
        let db = test_db().await;
        seed_customer(&db, "cust-1", "branch-1", None).await;

        db.ledger()
            .earn("cust-1", "sale-1", Money::from_cents(100_000), "branch-1")
            .await
            .unwrap();

        // Same customer, different branch: separate ledger, zero balance
        assert!(db
            .ledger()
            .get_ledger("cust-1", "branch-2")
            .await
            .unwrap()
            .is_none());
    }
}
