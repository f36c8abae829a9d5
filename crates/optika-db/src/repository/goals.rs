//! # Goals & Commission Engine
//!
//! Monthly branch sales goals, the seller ranking dashboard and the
//! commission snapshot lifecycle.
//!
//! ## Commission Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  upsert_goal            goal + per-seller targets (ACTIVE only)     │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  dashboard              live ranking, recomputed from sales on read │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  calculate_commissions  upserts PENDING snapshot rows; recompute    │
//! │       │                 is idempotent, but refuses to overwrite     │
//! │       │                 PAID rows unless forced                     │
//! │       ▼                                                             │
//! │  close_month            freezes the goal (ACTIVE → CLOSED)          │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  mark_paid              PENDING → PAID, stamps paid_at              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only completed sales count; the aggregation window is the calendar
//! month in UTC.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::config::CommissionConfigRepository;
use crate::repository::month_bounds;
use optika_core::policy;
use optika_core::validation::{validate_goal_amount, validate_period, validate_scope_id};
use optika_core::{
    CoreError, GoalDashboard, GoalStatus, Money, RankedSeller, SalesGoal, SellerCommission,
    SellerGoal, SellerGoalInput,
};

/// Per-seller completed-sales aggregate for one month.
#[derive(Debug, sqlx::FromRow)]
struct SellerSales {
    seller_id: String,
    total_cents: i64,
    sale_count: i64,
}

// =============================================================================
// Goals Repository
// =============================================================================

/// Repository for monthly sales goals and seller commissions.
#[derive(Debug, Clone)]
pub struct GoalsRepository {
    pool: SqlitePool,
    commission_configs: CommissionConfigRepository,
}

impl GoalsRepository {
    /// Creates a new GoalsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        let commission_configs = CommissionConfigRepository::new(pool.clone());
        GoalsRepository {
            pool,
            commission_configs,
        }
    }

    // =========================================================================
    // Goals
    // =========================================================================

    /// Creates or replaces the goal for a branch × month, including the
    /// full set of per-seller targets.
    ///
    /// Seller targets are replaced wholesale (delete + insert): the
    /// payload is the complete target list, not a patch. Fails with
    /// GoalClosed once the month has been closed.
    pub async fn upsert_goal(
        &self,
        branch_id: &str,
        year: i64,
        month: i64,
        branch_goal_cents: i64,
        seller_goals: Vec<SellerGoalInput>,
    ) -> DbResult<SalesGoal> {
        validate_scope_id("branch_id", branch_id)?;
        validate_period(year, month)?;
        validate_goal_amount(branch_goal_cents)?;
        for target in &seller_goals {
            validate_scope_id("seller_id", &target.seller_id)?;
            validate_goal_amount(target.goal_cents)?;
        }

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, SalesGoal>(
            "SELECT * FROM sales_goals WHERE branch_id = ?1 AND year = ?2 AND month = ?3",
        )
        .bind(branch_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&mut *tx)
        .await?;

        let now = Utc::now();

        let goal_id = match existing {
            Some(goal) if goal.status == GoalStatus::Closed => {
                return Err(CoreError::GoalClosed { year, month }.into());
            }
            Some(goal) => {
                sqlx::query(
                    "UPDATE sales_goals SET branch_goal_cents = ?2, updated_at = ?3 WHERE id = ?1",
                )
                .bind(&goal.id)
                .bind(branch_goal_cents)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                sqlx::query("DELETE FROM seller_goals WHERE sales_goal_id = ?1")
                    .bind(&goal.id)
                    .execute(&mut *tx)
                    .await?;

                goal.id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO sales_goals (
                        id, branch_id, year, month, branch_goal_cents,
                        status, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6, ?6)
                    "#,
                )
                .bind(&id)
                .bind(branch_id)
                .bind(year)
                .bind(month)
                .bind(branch_goal_cents)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                id
            }
        };

        for target in &seller_goals {
            sqlx::query(
                r#"
                INSERT INTO seller_goals (id, sales_goal_id, seller_id, goal_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&goal_id)
            .bind(&target.seller_id)
            .bind(target.goal_cents)
            .execute(&mut *tx)
            .await?;
        }

        let goal = sqlx::query_as::<_, SalesGoal>("SELECT * FROM sales_goals WHERE id = ?1")
            .bind(&goal_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            branch_id = %branch_id,
            year, month,
            branch_goal_cents,
            seller_targets = seller_goals.len(),
            "Sales goal upserted"
        );

        Ok(goal)
    }

    /// Gets the goal for a branch × month, if one exists.
    pub async fn get_goal(
        &self,
        branch_id: &str,
        year: i64,
        month: i64,
    ) -> DbResult<Option<SalesGoal>> {
        validate_period(year, month)?;

        let goal = sqlx::query_as::<_, SalesGoal>(
            "SELECT * FROM sales_goals WHERE branch_id = ?1 AND year = ?2 AND month = ?3",
        )
        .bind(branch_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(goal)
    }

    /// Lists the per-seller targets under a goal.
    pub async fn seller_goals(&self, sales_goal_id: &str) -> DbResult<Vec<SellerGoal>> {
        let targets = sqlx::query_as::<_, SellerGoal>(
            "SELECT * FROM seller_goals WHERE sales_goal_id = ?1",
        )
        .bind(sales_goal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(targets)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Builds the live month view: branch progress plus the seller
    /// ranking, recomputed from completed sales on every read.
    ///
    /// Works without a goal (everyone reports 0% progress) so the
    /// dashboard renders before management sets targets. Sellers who
    /// have a target but no sales yet appear at the bottom with zeros.
    pub async fn dashboard(
        &self,
        branch_id: &str,
        year: i64,
        month: i64,
    ) -> DbResult<GoalDashboard> {
        validate_scope_id("branch_id", branch_id)?;

        let sales = self.aggregate_sales(branch_id, year, month).await?;
        let goal = self.get_goal(branch_id, year, month).await?;

        let targets: HashMap<String, i64> = match &goal {
            Some(goal) => self
                .seller_goals(&goal.id)
                .await?
                .into_iter()
                .map(|t| (t.seller_id, t.goal_cents))
                .collect(),
            None => HashMap::new(),
        };

        let mut ranking: Vec<RankedSeller> = Vec::with_capacity(sales.len());
        let mut seen: Vec<&str> = Vec::new();
        let mut total_sold: i64 = 0;

        for row in &sales {
            let goal_cents = targets.get(&row.seller_id).copied().unwrap_or(0);
            total_sold += row.total_cents;
            ranking.push(RankedSeller {
                seller_id: row.seller_id.clone(),
                total_sales_cents: row.total_cents,
                sale_count: row.sale_count,
                goal_cents,
                progress_pct: policy::goal_progress(
                    Money::from_cents(row.total_cents),
                    Money::from_cents(goal_cents),
                ),
                goal_achieved: goal_cents > 0 && row.total_cents >= goal_cents,
            });
        }
        seen.extend(sales.iter().map(|r| r.seller_id.as_str()));

        // Sellers with a target but no sales yet still belong in the
        // ranking, at the bottom with zeros.
        let mut idle: Vec<(&String, &i64)> = targets
            .iter()
            .filter(|(seller_id, _)| !seen.contains(&seller_id.as_str()))
            .collect();
        idle.sort_by(|a, b| a.0.cmp(b.0));
        for (seller_id, goal_cents) in idle {
            ranking.push(RankedSeller {
                seller_id: seller_id.clone(),
                total_sales_cents: 0,
                sale_count: 0,
                goal_cents: *goal_cents,
                progress_pct: 0,
                goal_achieved: false,
            });
        }

        let branch_goal = goal.as_ref().map(|g| g.branch_goal_cents).unwrap_or(0);

        Ok(GoalDashboard {
            branch_id: branch_id.to_string(),
            year,
            month,
            goal,
            total_sold_cents: total_sold,
            branch_progress_pct: policy::goal_progress(
                Money::from_cents(total_sold),
                Money::from_cents(branch_goal),
            ),
            ranking,
        })
    }

    // =========================================================================
    // Commissions
    // =========================================================================

    /// Computes and stores commission snapshots for every seller in the
    /// period (sellers with sales, plus sellers with a target and no
    /// sales).
    ///
    /// Idempotent: rerunning after late sales simply overwrites the
    /// PENDING rows with fresh numbers. Once any row for the period is
    /// PAID, recomputation fails with CommissionAlreadyPaid unless
    /// `force` is set - forcing resets the overwritten rows back to
    /// PENDING and clears `paid_at`.
    pub async fn calculate_commissions(
        &self,
        branch_id: &str,
        year: i64,
        month: i64,
        force: bool,
    ) -> DbResult<Vec<SellerCommission>> {
        validate_scope_id("branch_id", branch_id)?;
        validate_period(year, month)?;

        let goal = self
            .get_goal(branch_id, year, month)
            .await?
            .ok_or_else(|| CoreError::GoalNotFound {
                branch_id: branch_id.to_string(),
                year,
                month,
            })?;

        if !force {
            let paid: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM seller_commissions
                WHERE branch_id = ?1 AND year = ?2 AND month = ?3 AND status = 'paid'
                "#,
            )
            .bind(branch_id)
            .bind(year)
            .bind(month)
            .fetch_one(&self.pool)
            .await?;

            if paid > 0 {
                return Err(CoreError::CommissionAlreadyPaid { year, month }.into());
            }
        }

        let config = self.commission_configs.get_or_create(branch_id).await?;
        let sales = self.aggregate_sales(branch_id, year, month).await?;

        let mut totals: HashMap<String, (i64, i64)> = sales
            .into_iter()
            .map(|r| (r.seller_id, (r.total_cents, r.sale_count)))
            .collect();

        let targets: HashMap<String, i64> = self
            .seller_goals(&goal.id)
            .await?
            .into_iter()
            .map(|t| (t.seller_id, t.goal_cents))
            .collect();

        // A seller with a target but no sales still gets a (zero) row.
        for seller_id in targets.keys() {
            totals.entry(seller_id.clone()).or_insert((0, 0));
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for (seller_id, (total_cents, _)) in &totals {
            let goal_cents = targets.get(seller_id).copied().unwrap_or(0);
            let breakdown = policy::commission(
                Money::from_cents(*total_cents),
                Money::from_cents(goal_cents),
                &config,
            );

            debug!(
                seller_id = %seller_id,
                total_sales_cents = total_cents,
                total_commission_cents = breakdown.total.cents(),
                goal_achieved = breakdown.goal_achieved,
                "Commission computed"
            );

            sqlx::query(
                r#"
                INSERT INTO seller_commissions (
                    id, branch_id, seller_id, year, month,
                    total_sales_cents, goal_cents, goal_achieved,
                    base_commission_cents, bonus_commission_cents,
                    total_commission_cents, status, paid_at,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 'pending', NULL, ?12, ?12)
                ON CONFLICT(branch_id, seller_id, year, month) DO UPDATE SET
                    total_sales_cents = excluded.total_sales_cents,
                    goal_cents = excluded.goal_cents,
                    goal_achieved = excluded.goal_achieved,
                    base_commission_cents = excluded.base_commission_cents,
                    bonus_commission_cents = excluded.bonus_commission_cents,
                    total_commission_cents = excluded.total_commission_cents,
                    status = 'pending',
                    paid_at = NULL,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(branch_id)
            .bind(seller_id)
            .bind(year)
            .bind(month)
            .bind(total_cents)
            .bind(goal_cents)
            .bind(breakdown.goal_achieved)
            .bind(breakdown.base.cents())
            .bind(breakdown.bonus.cents())
            .bind(breakdown.total.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            branch_id = %branch_id,
            year, month,
            sellers = totals.len(),
            force,
            "Commissions calculated"
        );

        self.list_commissions(branch_id, year, month).await
    }

    /// Closes a month: recomputes commissions one last time, then
    /// freezes the goal so targets can no longer change.
    ///
    /// Idempotent on the status flip; reclosing an already-closed month
    /// just refreshes the pending snapshots.
    pub async fn close_month(
        &self,
        branch_id: &str,
        year: i64,
        month: i64,
    ) -> DbResult<Vec<SellerCommission>> {
        let commissions = self
            .calculate_commissions(branch_id, year, month, false)
            .await?;

        sqlx::query(
            r#"
            UPDATE sales_goals SET status = 'closed', updated_at = ?4
            WHERE branch_id = ?1 AND year = ?2 AND month = ?3 AND status = 'active'
            "#,
        )
        .bind(branch_id)
        .bind(year)
        .bind(month)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(branch_id = %branch_id, year, month, "Month closed");

        Ok(commissions)
    }

    /// Marks a pending commission as paid.
    ///
    /// Fails for unknown IDs and for rows that are already paid; payout
    /// is a one-way transition.
    pub async fn mark_paid(&self, commission_id: &str) -> DbResult<SellerCommission> {
        let now = Utc::now();

        let updated = sqlx::query(
            r#"
            UPDATE seller_commissions SET status = 'paid', paid_at = ?2, updated_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(commission_id)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(DbError::not_found("Pending commission", commission_id));
        }

        let commission =
            sqlx::query_as::<_, SellerCommission>("SELECT * FROM seller_commissions WHERE id = ?1")
                .bind(commission_id)
                .fetch_one(&self.pool)
                .await?;

        info!(
            commission_id = %commission_id,
            seller_id = %commission.seller_id,
            total_commission_cents = commission.total_commission_cents,
            "Commission marked paid"
        );

        Ok(commission)
    }

    /// Lists the period's commission snapshots, highest payout first.
    pub async fn list_commissions(
        &self,
        branch_id: &str,
        year: i64,
        month: i64,
    ) -> DbResult<Vec<SellerCommission>> {
        let commissions = sqlx::query_as::<_, SellerCommission>(
            r#"
            SELECT * FROM seller_commissions
            WHERE branch_id = ?1 AND year = ?2 AND month = ?3
            ORDER BY total_commission_cents DESC, seller_id ASC
            "#,
        )
        .bind(branch_id)
        .bind(year)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(commissions)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Aggregates completed sales per seller for the month, sorted by
    /// total descending.
    async fn aggregate_sales(
        &self,
        branch_id: &str,
        year: i64,
        month: i64,
    ) -> DbResult<Vec<SellerSales>> {
        let (start, end) = month_bounds(year, month)?;

        let sales = sqlx::query_as::<_, SellerSales>(
            r#"
            SELECT seller_id,
                   SUM(total_cents) AS total_cents,
                   COUNT(*) AS sale_count
            FROM sales
            WHERE branch_id = ?1
              AND status = 'completed'
              AND completed_at >= ?2
              AND completed_at < ?3
            GROUP BY seller_id
            ORDER BY SUM(total_cents) DESC
            "#,
        )
        .bind(branch_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
