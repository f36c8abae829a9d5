//! # Policy Config Repositories
//!
//! Lazy get-or-create access to the per-branch cashback and commission
//! policies.
//!
//! ## Lazy Defaults
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  First access to a branch's policy                                  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SELECT ... WHERE branch_id = ?                                     │
//! │       │                                                             │
//! │       ├── Found? Return it                                          │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  INSERT OR IGNORE defaults (unique(branch_id) absorbs races)        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Re-read and return                                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating ledger/goals path resolves its policy through these
//! repositories, so the default values live in exactly one place.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use optika_core::validation::{
    validate_config_amount, validate_day_window, validate_multiplier, validate_rate_bps,
    validate_scope_id,
};
use optika_core::{
    CashbackConfig, CashbackConfigUpdate, CommissionConfig, CommissionConfigUpdate,
    DEFAULT_BASE_COMMISSION_BPS, DEFAULT_BIRTHDAY_MULTIPLIER, DEFAULT_EARN_RATE_BPS,
    DEFAULT_EXPIRY_DAYS, DEFAULT_GOAL_BONUS_BPS, DEFAULT_MAX_USAGE_BPS,
    DEFAULT_MIN_PURCHASE_CENTS, DEFAULT_MIN_PURCHASE_MULTIPLIER,
};

// =============================================================================
// Cashback Config
// =============================================================================

/// Repository for per-branch cashback policy.
#[derive(Debug, Clone)]
pub struct CashbackConfigRepository {
    pool: SqlitePool,
}

impl CashbackConfigRepository {
    /// Creates a new CashbackConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashbackConfigRepository { pool }
    }

    /// Gets a branch's cashback policy, if one exists.
    pub async fn get(&self, branch_id: &str) -> DbResult<Option<CashbackConfig>> {
        let config = sqlx::query_as::<_, CashbackConfig>(
            "SELECT * FROM cashback_configs WHERE branch_id = ?1",
        )
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Gets a branch's cashback policy, creating one with defaults on
    /// first access.
    ///
    /// Pure read-or-create: never fails for a missing row. The
    /// `INSERT OR IGNORE` + re-read sequence absorbs the race where two
    /// requests initialize the same branch concurrently - the
    /// `UNIQUE(branch_id)` constraint guarantees at most one row wins.
    pub async fn get_or_create(&self, branch_id: &str) -> DbResult<CashbackConfig> {
        validate_scope_id("branch_id", branch_id)?;

        if let Some(config) = self.get(branch_id).await? {
            return Ok(config);
        }

        debug!(branch_id = %branch_id, "Creating default cashback config");

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO cashback_configs (
                id, branch_id, enabled,
                earn_rate_bps, min_purchase_cents, max_per_sale_cents,
                expiry_days, min_purchase_multiplier, max_usage_bps,
                birthday_multiplier, created_at, updated_at
            ) VALUES (?1, ?2, 1, ?3, ?4, NULL, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
        )
        .bind(&id)
        .bind(branch_id)
        .bind(DEFAULT_EARN_RATE_BPS as i64)
        .bind(DEFAULT_MIN_PURCHASE_CENTS)
        .bind(DEFAULT_EXPIRY_DAYS)
        .bind(DEFAULT_MIN_PURCHASE_MULTIPLIER as i64)
        .bind(DEFAULT_MAX_USAGE_BPS as i64)
        .bind(DEFAULT_BIRTHDAY_MULTIPLIER as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(branch_id)
            .await?
            .ok_or_else(|| DbError::not_found("CashbackConfig", branch_id))
    }

    /// Replaces a branch's cashback policy.
    ///
    /// Full replace: every tunable field is required, there are no
    /// partial-update merge semantics. Resolves (and lazily creates) the
    /// config first, matching the read path.
    pub async fn update(
        &self,
        branch_id: &str,
        update: CashbackConfigUpdate,
    ) -> DbResult<CashbackConfig> {
        validate_rate_bps(update.earn_rate_bps)?;
        validate_rate_bps(update.max_usage_bps)?;
        validate_multiplier(update.min_purchase_multiplier)?;
        validate_multiplier(update.birthday_multiplier)?;
        validate_config_amount("min_purchase_cents", update.min_purchase_cents)?;
        if let Some(cap) = update.max_per_sale_cents {
            validate_config_amount("max_per_sale_cents", cap)?;
        }
        if let Some(days) = update.expiry_days {
            validate_day_window(days)?;
        }

        let existing = self.get_or_create(branch_id).await?;
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE cashback_configs SET
                enabled = ?2,
                earn_rate_bps = ?3,
                min_purchase_cents = ?4,
                max_per_sale_cents = ?5,
                expiry_days = ?6,
                min_purchase_multiplier = ?7,
                max_usage_bps = ?8,
                birthday_multiplier = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&existing.id)
        .bind(update.enabled)
        .bind(update.earn_rate_bps)
        .bind(update.min_purchase_cents)
        .bind(update.max_per_sale_cents)
        .bind(update.expiry_days)
        .bind(update.min_purchase_multiplier)
        .bind(update.max_usage_bps)
        .bind(update.birthday_multiplier)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(branch_id)
            .await?
            .ok_or_else(|| DbError::not_found("CashbackConfig", branch_id))
    }
}

// =============================================================================
// Commission Config
// =============================================================================

/// Repository for per-branch commission policy.
#[derive(Debug, Clone)]
pub struct CommissionConfigRepository {
    pool: SqlitePool,
}

impl CommissionConfigRepository {
    /// Creates a new CommissionConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CommissionConfigRepository { pool }
    }

    /// Gets a branch's commission policy, if one exists.
    pub async fn get(&self, branch_id: &str) -> DbResult<Option<CommissionConfig>> {
        let config = sqlx::query_as::<_, CommissionConfig>(
            "SELECT * FROM commission_configs WHERE branch_id = ?1",
        )
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Gets a branch's commission policy, creating one with defaults
    /// (5% base, 2% goal bonus) on first access.
    pub async fn get_or_create(&self, branch_id: &str) -> DbResult<CommissionConfig> {
        validate_scope_id("branch_id", branch_id)?;

        if let Some(config) = self.get(branch_id).await? {
            return Ok(config);
        }

        debug!(branch_id = %branch_id, "Creating default commission config");

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO commission_configs (
                id, branch_id, base_rate_bps, goal_bonus_bps,
                category_rates, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(branch_id)
        .bind(DEFAULT_BASE_COMMISSION_BPS as i64)
        .bind(DEFAULT_GOAL_BONUS_BPS as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(branch_id)
            .await?
            .ok_or_else(|| DbError::not_found("CommissionConfig", branch_id))
    }

    /// Replaces a branch's commission policy (full replace).
    pub async fn update(
        &self,
        branch_id: &str,
        update: CommissionConfigUpdate,
    ) -> DbResult<CommissionConfig> {
        validate_rate_bps(update.base_rate_bps)?;
        validate_rate_bps(update.goal_bonus_bps)?;

        let existing = self.get_or_create(branch_id).await?;
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE commission_configs SET
                base_rate_bps = ?2,
                goal_bonus_bps = ?3,
                category_rates = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&existing.id)
        .bind(update.base_rate_bps)
        .bind(update.goal_bonus_bps)
        .bind(&update.category_rates)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(branch_id)
            .await?
            .ok_or_else(|| DbError::not_found("CommissionConfig", branch_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use optika_core::{CashbackConfigUpdate, DEFAULT_EARN_RATE_BPS, DEFAULT_EXPIRY_DAYS};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_initializes_defaults() {
        let db = test_db().await;
        let repo = db.cashback_configs();

        assert!(repo.get("branch-1").await.unwrap().is_none());

        let config = repo.get_or_create("branch-1").await.unwrap();
        assert!(config.enabled);
        assert_eq!(config.earn_rate_bps, DEFAULT_EARN_RATE_BPS as i64);
        assert_eq!(config.expiry_days, Some(DEFAULT_EXPIRY_DAYS));
        assert_eq!(config.max_per_sale_cents, None);

        // Second call returns the same row, never a duplicate
        let again = repo.get_or_create("branch-1").await.unwrap();
        assert_eq!(again.id, config.id);
    }

    #[tokio::test]
    async fn test_configs_are_per_branch() {
        let db = test_db().await;
        let repo = db.cashback_configs();

        let a = repo.get_or_create("branch-a").await.unwrap();
        let b = repo.get_or_create("branch-b").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let db = test_db().await;
        let repo = db.cashback_configs();

        let updated = repo
            .update(
                "branch-1",
                CashbackConfigUpdate {
                    enabled: false,
                    earn_rate_bps: 300,
                    min_purchase_cents: 10_000,
                    max_per_sale_cents: Some(5_000),
                    expiry_days: None,
                    min_purchase_multiplier: 150,
                    max_usage_bps: 3_000,
                    birthday_multiplier: 300,
                },
            )
            .await
            .unwrap();

        assert!(!updated.enabled);
        assert_eq!(updated.earn_rate_bps, 300);
        assert_eq!(updated.min_purchase_cents, 10_000);
        assert_eq!(updated.max_per_sale_cents, Some(5_000));
        assert_eq!(updated.expiry_days, None);
    }

    #[tokio::test]
    async fn test_update_rejects_out_of_range_rate() {
        let db = test_db().await;
        let repo = db.cashback_configs();

        let result = repo
            .update(
                "branch-1",
                CashbackConfigUpdate {
                    enabled: true,
                    earn_rate_bps: 20_000, // 200% - nonsense
                    min_purchase_cents: 0,
                    max_per_sale_cents: None,
                    expiry_days: Some(90),
                    min_purchase_multiplier: 200,
                    max_usage_bps: 5_000,
                    birthday_multiplier: 200,
                },
            )
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_rejects_negative_amounts_and_expiry() {
        let db = test_db().await;
        let repo = db.cashback_configs();

        let base = CashbackConfigUpdate {
            enabled: true,
            earn_rate_bps: 500,
            min_purchase_cents: 0,
            max_per_sale_cents: None,
            expiry_days: Some(90),
            min_purchase_multiplier: 200,
            max_usage_bps: 5_000,
            birthday_multiplier: 200,
        };

        // Negative expiry would silently become "never expires"
        let result = repo
            .update(
                "branch-1",
                CashbackConfigUpdate {
                    expiry_days: Some(-5),
                    ..base.clone()
                },
            )
            .await;
        assert!(result.is_err());

        let result = repo
            .update(
                "branch-1",
                CashbackConfigUpdate {
                    min_purchase_cents: -100,
                    ..base.clone()
                },
            )
            .await;
        assert!(result.is_err());

        let result = repo
            .update(
                "branch-1",
                CashbackConfigUpdate {
                    max_per_sale_cents: Some(-1),
                    ..base
                },
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_commission_defaults() {
        let db = test_db().await;
        let repo = db.commission_configs();

        let config = repo.get_or_create("branch-1").await.unwrap();
        assert_eq!(config.base_rate_bps, 500);
        assert_eq!(config.goal_bonus_bps, 200);
        assert!(config.category_rates.is_none());
    }
}
