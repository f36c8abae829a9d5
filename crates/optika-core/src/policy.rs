//! # Policy Module
//!
//! Pure decision rules for the cashback ledger and the goals/commission
//! engine. No I/O, no clock reads: "today" is always a parameter.
//!
//! ## Rule Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Policy Functions                              │
//! │                                                                     │
//! │  Sale completed                                                     │
//! │       │                                                             │
//! │       ├──► accrual()        How much cashback does this sale earn?  │
//! │       │    ├── disabled / below minimum → None (silent no-op)       │
//! │       │    ├── birth month → earn × birthday multiplier             │
//! │       │    └── clamp to per-sale cap                                │
//! │       │                                                             │
//! │       └──► check_usage()    May this redemption proceed?            │
//! │            └── ALL violated rules are collected, not just the first │
//! │                                                                     │
//! │  Month closing                                                      │
//! │       └──► commission()     base % + bonus % if goal achieved       │
//! │                                                                     │
//! │  Dashboard                                                          │
//! │       └──► goal_progress()  capped 0-100, zero-goal guarded         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;
use crate::types::{CashbackConfig, CommissionConfig};

// =============================================================================
// Accrual
// =============================================================================

/// Outcome of the accrual rule for one completed sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accrual {
    /// Cashback to credit. May be zero (tiny sales are still recorded).
    pub amount: Money,
    /// Whether the birth-month multiplier was applied.
    pub birthday_applied: bool,
}

/// Computes the cashback a completed sale earns, or `None` when the sale
/// earns nothing at all (feature disabled, or total below the minimum).
///
/// Returning `None` is an expected business state, not an error: the
/// caller records nothing and moves on.
///
/// ## Rules
/// 1. Config disabled → `None`
/// 2. `sale_total < min_purchase` → `None`
/// 3. Birth month → earn rate result × birthday multiplier.
///    **Day-of-month is ignored: the whole birth month is the birthday
///    period.**
/// 4. Clamp to `max_per_sale` when configured. There is no lower clamp;
///    a zero-cent accrual is still an accrual.
pub fn accrual(config: &CashbackConfig, sale_total: Money, birthday_month: bool) -> Option<Accrual> {
    if !config.enabled {
        return None;
    }

    if sale_total < config.min_purchase() {
        return None;
    }

    let base = sale_total.apply_rate(config.earn_rate());
    let amount = if birthday_month {
        base.apply_multiplier(config.birthday_boost())
    } else {
        base
    };

    Some(Accrual {
        amount: amount.clamp_to(config.max_per_sale()),
        birthday_applied: birthday_month,
    })
}

/// Checks whether `today` falls inside the customer's birth month.
///
/// Month compare only; a sale one day outside the birth month gets no
/// boost regardless of how close it is.
pub fn is_birthday_month(birth_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    match birth_date {
        Some(birth) => birth.month() == today.month(),
        None => false,
    }
}

/// Computes the expiry date for a credit earned today.
///
/// `None` when the policy has no expiry window (credits never expire).
pub fn expiry_date(config: &CashbackConfig, today: NaiveDate) -> Option<NaiveDate> {
    config
        .expiry_days
        .and_then(|days| today.checked_add_days(Days::new(days as u64)))
}

// =============================================================================
// Usage Validation
// =============================================================================

/// A single violated redemption rule.
///
/// The Display strings are what the HTTP layer surfaces to the cashier,
/// so they name the numbers the user needs to fix the request.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum UsageViolation {
    #[error("cashback is not enabled for this branch")]
    Disabled,

    #[error("insufficient balance: available {available_cents}, requested {requested_cents}")]
    InsufficientBalance {
        available_cents: i64,
        requested_cents: i64,
    },

    #[error("sale total too small: redeeming {requested_cents} requires a sale of at least {required_cents}")]
    BasketTooSmall {
        requested_cents: i64,
        required_cents: i64,
    },

    #[error("amount exceeds the usage cap for this sale: cap {cap_cents}, requested {requested_cents}")]
    ExceedsUsageCap {
        cap_cents: i64,
        requested_cents: i64,
    },
}

/// Result of validating a redemption. Violations accumulate: a request
/// that breaks three rules reports all three.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageCheck {
    pub is_valid: bool,
    pub errors: Vec<UsageViolation>,
    pub available_balance_cents: i64,
    /// `min(percent cap, balance)` - the most this customer could redeem
    /// on this sale.
    pub max_usage_allowed_cents: i64,
}

/// Validates a redemption of `amount` against a sale of `sale_total`.
///
/// Pure read-only check. All rules are evaluated independently; errors
/// accumulate rather than short-circuit, so the cashier sees every
/// problem at once.
pub fn check_usage(
    config: &CashbackConfig,
    balance: Money,
    amount: Money,
    sale_total: Money,
) -> UsageCheck {
    let mut errors = Vec::new();

    if !config.enabled {
        errors.push(UsageViolation::Disabled);
    }

    if amount > balance {
        errors.push(UsageViolation::InsufficientBalance {
            available_cents: balance.cents(),
            requested_cents: amount.cents(),
        });
    }

    // Redemption requires a minimum-sized basket proportional to the
    // amount redeemed.
    let required_basket = amount.apply_multiplier(config.basket_multiplier());
    if sale_total < required_basket {
        errors.push(UsageViolation::BasketTooSmall {
            requested_cents: amount.cents(),
            required_cents: required_basket.cents(),
        });
    }

    // Cashback cannot fund more than a configured fraction of the sale.
    let cap = sale_total.apply_rate(config.max_usage());
    if amount > cap {
        errors.push(UsageViolation::ExceedsUsageCap {
            cap_cents: cap.cents(),
            requested_cents: amount.cents(),
        });
    }

    UsageCheck {
        is_valid: errors.is_empty(),
        errors,
        available_balance_cents: balance.cents(),
        max_usage_allowed_cents: cap.min(balance).cents(),
    }
}

// =============================================================================
// Commission
// =============================================================================

/// Commission computed for one seller over one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub goal_achieved: bool,
    pub base: Money,
    pub bonus: Money,
    pub total: Money,
}

/// Computes a seller's monthly commission.
///
/// `base = total_sales × base_rate`; the bonus applies only when the goal
/// was achieved. A zero goal is never "achieved" - a seller with no
/// target gets no bonus.
pub fn commission(
    total_sales: Money,
    goal: Money,
    config: &CommissionConfig,
) -> CommissionBreakdown {
    let goal_achieved = goal.is_positive() && total_sales >= goal;

    let base = total_sales.apply_rate(config.base_rate());
    let bonus = if goal_achieved {
        total_sales.apply_rate(config.goal_bonus())
    } else {
        Money::zero()
    };

    CommissionBreakdown {
        goal_achieved,
        base,
        bonus,
        total: base + bonus,
    }
}

/// Progress towards a goal as a whole percentage, capped at 100.
///
/// A zero goal reports 0 progress (no division by zero).
pub fn goal_progress(total_sold: Money, goal: Money) -> i64 {
    if !goal.is_positive() {
        return 0;
    }
    ((total_sold.cents() as i128 * 100 / goal.cents() as i128) as i64).min(100)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_config() -> CashbackConfig {
        let now = Utc::now();
        CashbackConfig {
            id: "cfg-1".to_string(),
            branch_id: "branch-1".to_string(),
            enabled: true,
            earn_rate_bps: 500,
            min_purchase_cents: 0,
            max_per_sale_cents: None,
            expiry_days: Some(90),
            min_purchase_multiplier: 200,
            max_usage_bps: 5_000,
            birthday_multiplier: 200,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_accrual_basic() {
        let config = test_config();
        let accrued = accrual(&config, Money::from_cents(100_000), false).unwrap();
        assert_eq!(accrued.amount.cents(), 5_000); // 5% of R$1000.00
        assert!(!accrued.birthday_applied);
    }

    #[test]
    fn test_accrual_birthday_doubles() {
        // 5% earn, 2x birthday, sale of 1000 → credits 100
        let config = test_config();
        let accrued = accrual(&config, Money::from_cents(100_000), true).unwrap();
        assert_eq!(accrued.amount.cents(), 10_000);
        assert!(accrued.birthday_applied);
    }

    #[test]
    fn test_accrual_disabled_is_none() {
        let mut config = test_config();
        config.enabled = false;
        assert!(accrual(&config, Money::from_cents(100_000), false).is_none());
    }

    #[test]
    fn test_accrual_below_minimum_is_none() {
        let mut config = test_config();
        config.min_purchase_cents = 10_000;
        assert!(accrual(&config, Money::from_cents(9_999), false).is_none());
        // Exactly at the minimum earns
        assert!(accrual(&config, Money::from_cents(10_000), false).is_some());
    }

    #[test]
    fn test_accrual_cap_enforced() {
        let mut config = test_config();
        config.max_per_sale_cents = Some(2_000);
        // 5% of R$1000.00 = R$50.00, capped at R$20.00
        let accrued = accrual(&config, Money::from_cents(100_000), false).unwrap();
        assert_eq!(accrued.amount.cents(), 2_000);

        // Cap applies after the birthday multiplier too
        let accrued = accrual(&config, Money::from_cents(100_000), true).unwrap();
        assert_eq!(accrued.amount.cents(), 2_000);
    }

    #[test]
    fn test_accrual_zero_amount_still_recorded() {
        let mut config = test_config();
        config.earn_rate_bps = 1;
        // 0.01% of 100 cents rounds to 0 - still Some, not None
        let accrued = accrual(&config, Money::from_cents(100), false).unwrap();
        assert_eq!(accrued.amount.cents(), 0);
    }

    #[test]
    fn test_birthday_month_compare() {
        let birth = Some(date(1990, 6, 15));
        // Any day inside June counts
        assert!(is_birthday_month(birth, date(2026, 6, 1)));
        assert!(is_birthday_month(birth, date(2026, 6, 30)));
        // One day outside the month boundary does not
        assert!(!is_birthday_month(birth, date(2026, 5, 31)));
        assert!(!is_birthday_month(birth, date(2026, 7, 1)));
        // Unknown birth date never boosts
        assert!(!is_birthday_month(None, date(2026, 6, 15)));
    }

    #[test]
    fn test_expiry_date() {
        let config = test_config();
        assert_eq!(
            expiry_date(&config, date(2026, 1, 1)),
            Some(date(2026, 4, 1)) // +90 days
        );

        let mut no_expiry = test_config();
        no_expiry.expiry_days = None;
        assert_eq!(expiry_date(&no_expiry, date(2026, 1, 1)), None);
    }

    #[test]
    fn test_check_usage_valid() {
        let config = test_config();
        let check = check_usage(
            &config,
            Money::from_cents(10_000), // balance R$100.00
            Money::from_cents(2_000),  // redeem R$20.00
            Money::from_cents(10_000), // sale R$100.00
        );
        assert!(check.is_valid);
        assert!(check.errors.is_empty());
        // cap = 50% of 10000 = 5000; min(cap, balance) = 5000
        assert_eq!(check.max_usage_allowed_cents, 5_000);
    }

    #[test]
    fn test_check_usage_accumulates_violations() {
        // balance=50, multiplier=2, cap=50%, use 30 on a
        // sale of 50 → fails basket rule (needs ≥60) AND cap rule (25)
        let config = test_config();
        let check = check_usage(
            &config,
            Money::from_cents(5_000),
            Money::from_cents(3_000),
            Money::from_cents(5_000),
        );
        assert!(!check.is_valid);
        assert_eq!(check.errors.len(), 2);
        assert!(check.errors.contains(&UsageViolation::BasketTooSmall {
            requested_cents: 3_000,
            required_cents: 6_000,
        }));
        assert!(check.errors.contains(&UsageViolation::ExceedsUsageCap {
            cap_cents: 2_500,
            requested_cents: 3_000,
        }));
        assert_eq!(check.max_usage_allowed_cents, 2_500);
    }

    #[test]
    fn test_check_usage_disabled_and_balance() {
        let mut config = test_config();
        config.enabled = false;
        let check = check_usage(
            &config,
            Money::from_cents(1_000),
            Money::from_cents(2_000),
            Money::from_cents(100_000),
        );
        assert!(!check.is_valid);
        assert!(check.errors.contains(&UsageViolation::Disabled));
        assert!(check.errors.contains(&UsageViolation::InsufficientBalance {
            available_cents: 1_000,
            requested_cents: 2_000,
        }));
    }

    #[test]
    fn test_commission_with_goal_achieved() {
        // sales=20000, goal=15000, base 5%, bonus 2%
        // → base 1000, bonus 400, total 1400
        let now = Utc::now();
        let config = CommissionConfig {
            id: "cc-1".to_string(),
            branch_id: "branch-1".to_string(),
            base_rate_bps: 500,
            goal_bonus_bps: 200,
            category_rates: None,
            created_at: now,
            updated_at: now,
        };

        let result = commission(
            Money::from_cents(2_000_000),
            Money::from_cents(1_500_000),
            &config,
        );
        assert!(result.goal_achieved);
        assert_eq!(result.base.cents(), 100_000);
        assert_eq!(result.bonus.cents(), 40_000);
        assert_eq!(result.total.cents(), 140_000);
    }

    #[test]
    fn test_commission_goal_missed_no_bonus() {
        let now = Utc::now();
        let config = CommissionConfig {
            id: "cc-1".to_string(),
            branch_id: "branch-1".to_string(),
            base_rate_bps: 500,
            goal_bonus_bps: 200,
            category_rates: None,
            created_at: now,
            updated_at: now,
        };

        let result = commission(
            Money::from_cents(1_000_000),
            Money::from_cents(1_500_000),
            &config,
        );
        assert!(!result.goal_achieved);
        assert_eq!(result.base.cents(), 50_000);
        assert!(result.bonus.is_zero());
        assert_eq!(result.total.cents(), 50_000);
    }

    #[test]
    fn test_commission_zero_goal_never_achieved() {
        let now = Utc::now();
        let config = CommissionConfig {
            id: "cc-1".to_string(),
            branch_id: "branch-1".to_string(),
            base_rate_bps: 500,
            goal_bonus_bps: 200,
            category_rates: None,
            created_at: now,
            updated_at: now,
        };

        let result = commission(Money::from_cents(1_000_000), Money::zero(), &config);
        assert!(!result.goal_achieved);
        assert!(result.bonus.is_zero());
    }

    #[test]
    fn test_goal_progress() {
        assert_eq!(goal_progress(Money::from_cents(500), Money::from_cents(1_000)), 50);
        // Capped at 100
        assert_eq!(goal_progress(Money::from_cents(2_000), Money::from_cents(1_000)), 100);
        // Zero goal guarded
        assert_eq!(goal_progress(Money::from_cents(2_000), Money::zero()), 0);
        assert_eq!(goal_progress(Money::zero(), Money::from_cents(1_000)), 0);
    }
}
