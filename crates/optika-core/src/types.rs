//! # Domain Types
//!
//! Core domain types for the cashback ledger, goals/commission engine and
//! reminder generator.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌────────────────┐  │
//! │  │ CashbackConfig   │   │ CustomerCashback │   │CashbackMovement│  │
//! │  │ ───────────────  │   │ ───────────────  │   │ ────────────── │  │
//! │  │ per branch       │   │ per customer ×   │   │ append-only    │  │
//! │  │ earn %, caps,    │◄──│ branch           │◄──│ signed amount  │  │
//! │  │ expiry, 2x bday  │   │ balance = cached │   │ CREDIT/DEBIT/  │  │
//! │  └──────────────────┘   │ projection       │   │ BONUS/ADJ/EXP  │  │
//! │                         └──────────────────┘   └────────────────┘  │
//! │                                                                     │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌────────────────┐  │
//! │  │ SalesGoal        │   │ SellerCommission │   │ Reminder       │  │
//! │  │ per branch ×     │   │ per branch ×     │   │ derived task   │  │
//! │  │ year × month     │   │ seller × period  │   │ with metadata  │  │
//! │  │ ACTIVE → CLOSED  │   │ PENDING → PAID   │   │ snapshot       │  │
//! │  └──────────────────┘   └──────────────────┘   └────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Representation Rules
//! - Monetary row fields are raw `i64` cents with typed [`Money`] accessors
//! - Percentage rates are basis points ([`Rate`], 500 = 5%)
//! - Multipliers are hundredths ([`Multiplier`], 200 = 2.00x)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::MAX_PAGE_SIZE;

// =============================================================================
// Rate
// =============================================================================

/// A percentage rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% (default earn rate), 5000 bps = 50% (default usage cap)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Multiplier
// =============================================================================

/// A scale factor in hundredths (200 = 2.00x).
///
/// Used for the birth-month earn boost and the minimum-basket rule on
/// redemptions (sale total must be at least `amount × multiplier`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplier(u32);

impl Multiplier {
    /// Creates a multiplier from hundredths.
    #[inline]
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Multiplier(hundredths)
    }

    /// Returns the multiplier in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> u32 {
        self.0
    }

    /// The identity multiplier (1.00x).
    #[inline]
    pub const fn identity() -> Self {
        Multiplier(100)
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Multiplier::identity()
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// The kind of a ledger movement.
///
/// ## Sign Convention
/// - `Credit` / `Bonus`: positive amounts
/// - `Debit` / `Expired`: negative amounts
/// - `Adjustment`: either sign (administrative override)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Cashback earned from a completed sale.
    Credit,
    /// Balance redeemed against a new sale.
    Debit,
    /// Manual positive grant (operator campaign, goodwill).
    Bonus,
    /// Manual correction, positive or negative.
    Adjustment,
    /// Offset row written when a credit passes its expiry date.
    Expired,
}

// =============================================================================
// Goal / Commission / Reminder Status
// =============================================================================

/// The lifecycle state of a monthly sales goal. One-way: closing a month
/// freezes its commissions for payout tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Closed,
}

impl Default for GoalStatus {
    fn default() -> Self {
        GoalStatus::Active
    }
}

/// Payout state of a computed seller commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

/// The kind of a customer-outreach reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Prescription is about to expire; offer a new exam.
    PrescriptionRenewal,
    /// Customer's birthday is coming up.
    BirthdayGreeting,
    /// Customer hasn't purchased in a while.
    InactiveReactivation,
    /// Cashback credits expire soon.
    CashbackExpiring,
    /// Customer has balance available (manual campaigns only; no
    /// automatic generator creates this kind).
    CashbackAvailable,
}

/// Workflow state of a reminder task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    InProgress,
    Completed,
    Dismissed,
}

// =============================================================================
// Cashback Config
// =============================================================================

/// Per-branch cashback policy. At most one row per branch; created lazily
/// with defaults on first access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashbackConfig {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Branch this policy belongs to.
    pub branch_id: String,

    /// Master switch: when off, earn and redeem are silent no-ops.
    pub enabled: bool,

    /// Earn rate over the sale total, in basis points.
    pub earn_rate_bps: i64,

    /// Minimum sale total required to earn, in cents.
    pub min_purchase_cents: i64,

    /// Cap on cashback earned per sale, in cents. NULL = uncapped.
    pub max_per_sale_cents: Option<i64>,

    /// Credit lifetime in days. NULL = never expires.
    pub expiry_days: Option<i64>,

    /// Redemption basket rule: sale total must be at least
    /// `amount × multiplier` (hundredths).
    pub min_purchase_multiplier: i64,

    /// Cap on how much of a sale cashback may fund, in basis points.
    pub max_usage_bps: i64,

    /// Earn multiplier applied during the customer's birth month
    /// (hundredths).
    pub birthday_multiplier: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CashbackConfig {
    /// Returns the earn rate.
    #[inline]
    pub fn earn_rate(&self) -> Rate {
        Rate::from_bps(self.earn_rate_bps as u32)
    }

    /// Returns the minimum purchase threshold.
    #[inline]
    pub fn min_purchase(&self) -> Money {
        Money::from_cents(self.min_purchase_cents)
    }

    /// Returns the per-sale accrual cap, if configured.
    #[inline]
    pub fn max_per_sale(&self) -> Option<Money> {
        self.max_per_sale_cents.map(Money::from_cents)
    }

    /// Returns the usage cap rate.
    #[inline]
    pub fn max_usage(&self) -> Rate {
        Rate::from_bps(self.max_usage_bps as u32)
    }

    /// Returns the redemption basket multiplier.
    #[inline]
    pub fn basket_multiplier(&self) -> Multiplier {
        Multiplier::from_hundredths(self.min_purchase_multiplier as u32)
    }

    /// Returns the birth-month earn multiplier.
    #[inline]
    pub fn birthday_boost(&self) -> Multiplier {
        Multiplier::from_hundredths(self.birthday_multiplier as u32)
    }
}

/// Full-replace payload for updating a branch's cashback policy.
///
/// Every field is required: there are no partial-update merge semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashbackConfigUpdate {
    pub enabled: bool,
    pub earn_rate_bps: i64,
    pub min_purchase_cents: i64,
    pub max_per_sale_cents: Option<i64>,
    pub expiry_days: Option<i64>,
    pub min_purchase_multiplier: i64,
    pub max_usage_bps: i64,
    pub birthday_multiplier: i64,
}

// =============================================================================
// Customer Cashback Ledger
// =============================================================================

/// One ledger row per customer × branch pair.
///
/// ## Projection Invariant
/// `balance_cents` is a cached aggregate, NOT independently authoritative:
/// it must always equal the signed sum of this row's movements. Every
/// mutation appends exactly one movement and applies its delta in the
/// same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerCashback {
    pub id: String,
    pub customer_id: String,
    pub branch_id: String,

    /// Current spendable balance. Soft-guarded ≥ 0: the redemption path
    /// never drives it negative, the administrative adjustment path may.
    pub balance_cents: i64,

    /// Lifetime cashback earned (credits + bonuses + positive adjustments).
    pub total_earned_cents: i64,

    /// Lifetime cashback redeemed.
    pub total_used_cents: i64,

    /// Lifetime cashback lost to expiry.
    pub total_expired_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerCashback {
    /// Returns the balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

/// A ledger movement. Append-only: immutable once written except for the
/// `expired` flag, which flips exactly once when the sweeper processes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashbackMovement {
    pub id: String,

    /// Owning `CustomerCashback` row.
    pub ledger_id: String,

    pub kind: MovementKind,

    /// Signed amount: positive for credit/bonus, negative for
    /// debit/expired, either sign for adjustments.
    pub amount_cents: i64,

    /// Sale that originated this movement, when applicable.
    pub sale_id: Option<String>,

    pub description: Option<String>,

    /// When this credit stops being spendable. NULL = never.
    pub expires_at: Option<DateTime<Utc>>,

    /// Set by the expiration sweeper; guards against double-expiry.
    pub expired: bool,

    pub created_at: DateTime<Utc>,
}

impl CashbackMovement {
    /// Returns the signed amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Receipt returned by every balance-changing ledger operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementReceipt {
    pub movement_id: String,
    pub ledger_id: String,
    /// Signed amount recorded on the movement.
    pub amount_cents: i64,
    /// Balance after the delta was applied.
    pub new_balance_cents: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Redemption request: spend balance against a new sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionRequest {
    pub customer_id: String,
    /// Positive amount to redeem, in cents.
    pub amount_cents: i64,
    pub sale_id: Option<String>,
    pub description: Option<String>,
}

/// Kind of a manual adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Recorded as a BONUS movement.
    Bonus,
    /// Recorded as an ADJUSTMENT movement.
    Correction,
}

impl AdjustmentKind {
    /// Maps to the movement kind written to the ledger.
    pub fn movement_kind(&self) -> MovementKind {
        match self {
            AdjustmentKind::Bonus => MovementKind::Bonus,
            AdjustmentKind::Correction => MovementKind::Adjustment,
        }
    }
}

/// Administrative adjustment request. Amount is signed; a negative
/// adjustment may drive the balance below zero (intentional operator
/// override, see the ledger documentation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub customer_id: String,
    pub amount_cents: i64,
    pub kind: AdjustmentKind,
    pub description: String,
}

/// A credit movement inside the expiry lookahead window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ExpiringCredit {
    pub movement_id: String,
    pub customer_id: String,
    pub amount_cents: i64,
    pub expires_at: DateTime<Utc>,
}

/// Per-item result of an expiration sweep. Failures are collected, never
/// abort the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub movement_id: String,
    pub customer_id: String,
    pub amount_cents: i64,
    pub success: bool,
    pub error: Option<String>,
}

// =============================================================================
// Goals & Commissions
// =============================================================================

/// Monthly branch sales goal. Unique per (branch, year, month).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesGoal {
    pub id: String,
    pub branch_id: String,
    pub year: i64,
    pub month: i64,
    pub branch_goal_cents: i64,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Individual seller target under a monthly goal.
/// Unique per (sales_goal_id, seller_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SellerGoal {
    pub id: String,
    pub sales_goal_id: String,
    pub seller_id: String,
    pub goal_cents: i64,
}

/// Input for upserting a seller target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerGoalInput {
    pub seller_id: String,
    pub goal_cents: i64,
}

/// Per-branch commission policy. Created lazily with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CommissionConfig {
    pub id: String,
    pub branch_id: String,

    /// Base commission over a seller's monthly sales, in basis points.
    pub base_rate_bps: i64,

    /// Extra commission when the seller's goal is achieved, in basis
    /// points.
    pub goal_bonus_bps: i64,

    /// Optional per-category overrides as a JSON document
    /// (`{"frames": 700, "lenses": 400}`, values in basis points).
    pub category_rates: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommissionConfig {
    /// Returns the base commission rate.
    #[inline]
    pub fn base_rate(&self) -> Rate {
        Rate::from_bps(self.base_rate_bps as u32)
    }

    /// Returns the goal bonus rate.
    #[inline]
    pub fn goal_bonus(&self) -> Rate {
        Rate::from_bps(self.goal_bonus_bps as u32)
    }
}

/// Full-replace payload for a branch's commission policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionConfigUpdate {
    pub base_rate_bps: i64,
    pub goal_bonus_bps: i64,
    pub category_rates: Option<String>,
}

/// Cached commission snapshot, recomputable idempotently from sale
/// aggregates + goal + config. Unique per (branch, seller, year, month).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SellerCommission {
    pub id: String,
    pub branch_id: String,
    pub seller_id: String,
    pub year: i64,
    pub month: i64,
    pub total_sales_cents: i64,
    pub goal_cents: i64,
    pub goal_achieved: bool,
    pub base_commission_cents: i64,
    pub bonus_commission_cents: i64,
    pub total_commission_cents: i64,
    pub status: CommissionStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the monthly sales ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSeller {
    pub seller_id: String,
    pub total_sales_cents: i64,
    pub sale_count: i64,
    pub goal_cents: i64,
    /// 0-100, capped; 0 when no goal is set (no division by zero).
    pub progress_pct: i64,
    pub goal_achieved: bool,
}

/// Aggregated month view: ranking plus branch-level progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDashboard {
    pub branch_id: String,
    pub year: i64,
    pub month: i64,
    /// The goal for the period, when one was created.
    pub goal: Option<SalesGoal>,
    pub total_sold_cents: i64,
    pub branch_progress_pct: i64,
    /// Sorted descending by total sales.
    pub ranking: Vec<RankedSeller>,
}

// =============================================================================
// Reminders
// =============================================================================

/// Per-branch reminder generation policy. Created lazily with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReminderConfig {
    pub id: String,
    pub branch_id: String,
    pub prescription_enabled: bool,
    pub prescription_days_before: i64,
    pub birthday_enabled: bool,
    pub birthday_days_before: i64,
    pub inactive_enabled: bool,
    pub inactive_after_days: i64,
    pub cashback_enabled: bool,
    pub cashback_days_before: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full-replace payload for a branch's reminder policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfigUpdate {
    pub prescription_enabled: bool,
    pub prescription_days_before: i64,
    pub birthday_enabled: bool,
    pub birthday_days_before: i64,
    pub inactive_enabled: bool,
    pub inactive_after_days: i64,
    pub cashback_enabled: bool,
    pub cashback_days_before: i64,
}

/// A derived customer-outreach task.
///
/// `metadata` is a denormalized JSON snapshot taken at generation time so
/// the task history survives later changes to the source records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Reminder {
    pub id: String,
    pub branch_id: String,
    pub customer_id: String,
    pub kind: ReminderKind,
    pub scheduled_for: NaiveDate,
    pub status: ReminderStatus,
    pub metadata: String,
    pub dismissed_at: Option<DateTime<Utc>>,
    pub dismiss_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counts returned by a full reminder generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderRunSummary {
    pub prescription: u64,
    pub birthday: u64,
    pub inactive: u64,
    pub cashback_expiring: u64,
}

impl ReminderRunSummary {
    /// Total reminders created across all generators.
    pub fn total(&self) -> u64 {
        self.prescription + self.birthday + self.inactive + self.cashback_expiring
    }
}

// =============================================================================
// External Collaborators (read-only)
// =============================================================================

/// Customer record. The core only ever reads these fields; customer data
/// is owned by the CRM layer above this workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

// =============================================================================
// Pagination
// =============================================================================

/// Page request for report queries. 1-based page numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Creates a page request, clamping to sane bounds
    /// (page ≥ 1, 1 ≤ page_size ≤ [`MAX_PAGE_SIZE`]).
    pub fn new(page: u32, page_size: u32) -> Self {
        PageRequest {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SQL OFFSET for this page.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    /// SQL LIMIT for this page.
    #[inline]
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(1, 20)
    }
}

/// Pagination envelope returned alongside report data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PageInfo {
    /// Builds page info from a request and total row count.
    pub fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = ((total + request.page_size as u64 - 1) / request.page_size as u64) as u32;
        PageInfo {
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages,
        }
    }
}

/// A page of report data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

// =============================================================================
// Report DTOs
// =============================================================================

/// Branch-level cashback totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCashbackSummary {
    pub branch_id: String,
    pub customers_with_balance: i64,
    pub total_balance_cents: i64,
    pub total_earned_cents: i64,
    pub total_used_cents: i64,
    pub total_expired_cents: i64,
}

/// One row of the customers-with-balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerBalanceRow {
    pub customer_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub balance_cents: i64,
    pub total_earned_cents: i64,
}

/// Monthly performance report for one seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerReport {
    pub seller_id: String,
    pub year: i64,
    pub month: i64,
    pub total_sales_cents: i64,
    pub sale_count: i64,
    /// Present once `calculate_commissions` has run for the period.
    pub commission: Option<SellerCommission>,
}

// =============================================================================
// Unit Tests
// =============================================================================
