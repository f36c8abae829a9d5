//! # Report Queries
//!
//! Read-only projections for the back-office screens: branch cashback
//! totals, per-customer movement history, the customers-with-balance
//! list and the monthly seller report.
//!
//! Nothing here mutates state; heavy lists are paginated so a branch
//! with years of movement history stays cheap to render.

use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::month_bounds;
use optika_core::validation::{validate_period, validate_scope_id};
use optika_core::{
    BranchCashbackSummary, CashbackMovement, CustomerBalanceRow, PageInfo, PageRequest, Paginated,
    SellerCommission, SellerReport,
};

// =============================================================================
// Reports Repository
// =============================================================================

/// Repository for read-only report queries.
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: SqlitePool,
}

impl ReportsRepository {
    /// Creates a new ReportsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportsRepository { pool }
    }

    /// Aggregates a branch's cashback position: outstanding liability
    /// plus lifetime earned/used/expired totals.
    pub async fn branch_summary(&self, branch_id: &str) -> DbResult<BranchCashbackSummary> {
        validate_scope_id("branch_id", branch_id)?;

        let (customers_with_balance, balance, earned, used, expired) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT COUNT(CASE WHEN balance_cents > 0 THEN 1 END),
                       COALESCE(SUM(balance_cents), 0),
                       COALESCE(SUM(total_earned_cents), 0),
                       COALESCE(SUM(total_used_cents), 0),
                       COALESCE(SUM(total_expired_cents), 0)
                FROM customer_cashbacks
                WHERE branch_id = ?1
                "#,
            )
            .bind(branch_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(BranchCashbackSummary {
            branch_id: branch_id.to_string(),
            customers_with_balance,
            total_balance_cents: balance,
            total_earned_cents: earned,
            total_used_cents: used,
            total_expired_cents: expired,
        })
    }

    /// Pages through a customer's movement history, newest first.
    pub async fn customer_history(
        &self,
        customer_id: &str,
        branch_id: &str,
        page: PageRequest,
    ) -> DbResult<Paginated<CashbackMovement>> {
        validate_scope_id("customer_id", customer_id)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM cashback_movements m
            JOIN customer_cashbacks c ON c.id = m.ledger_id
            WHERE c.customer_id = ?1 AND c.branch_id = ?2
            "#,
        )
        .bind(customer_id)
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await?;

        let data = sqlx::query_as::<_, CashbackMovement>(
            r#"
            SELECT m.*
            FROM cashback_movements m
            JOIN customer_cashbacks c ON c.id = m.ledger_id
            WHERE c.customer_id = ?1 AND c.branch_id = ?2
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(customer_id)
        .bind(branch_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated {
            data,
            pagination: PageInfo::new(page, total as u64),
        })
    }

    /// Pages through customers holding a positive balance, largest
    /// balance first. The branch's outreach target list.
    pub async fn customers_with_balance(
        &self,
        branch_id: &str,
        page: PageRequest,
    ) -> DbResult<Paginated<CustomerBalanceRow>> {
        validate_scope_id("branch_id", branch_id)?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customer_cashbacks WHERE branch_id = ?1 AND balance_cents > 0",
        )
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await?;

        let data = sqlx::query_as::<_, CustomerBalanceRow>(
            r#"
            SELECT cc.customer_id AS customer_id,
                   c.name AS name,
                   c.phone AS phone,
                   cc.balance_cents AS balance_cents,
                   cc.total_earned_cents AS total_earned_cents
            FROM customer_cashbacks cc
            JOIN customers c ON c.id = cc.customer_id
            WHERE cc.branch_id = ?1 AND cc.balance_cents > 0
            ORDER BY cc.balance_cents DESC, c.name ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(branch_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated {
            data,
            pagination: PageInfo::new(page, total as u64),
        })
    }

    /// Builds a seller's monthly report: completed-sales aggregate plus
    /// the commission snapshot, when one has been calculated.
    pub async fn seller_report(
        &self,
        branch_id: &str,
        seller_id: &str,
        year: i64,
        month: i64,
    ) -> DbResult<SellerReport> {
        validate_scope_id("seller_id", seller_id)?;
        validate_period(year, month)?;

        let (start, end) = month_bounds(year, month)?;

        let (total_sales_cents, sale_count) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COALESCE(SUM(total_cents), 0), COUNT(*)
            FROM sales
            WHERE branch_id = ?1
              AND seller_id = ?2
              AND status = 'completed'
              AND completed_at >= ?3
              AND completed_at < ?4
            "#,
        )
        .bind(branch_id)
        .bind(seller_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let commission = sqlx::query_as::<_, SellerCommission>(
            r#"
            SELECT * FROM seller_commissions
            WHERE branch_id = ?1 AND seller_id = ?2 AND year = ?3 AND month = ?4
            "#,
        )
        .bind(branch_id)
        .bind(seller_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(SellerReport {
            seller_id: seller_id.to_string(),
            year,
            month,
            total_sales_cents,
            sale_count,
            commission,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
