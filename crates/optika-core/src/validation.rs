//! # Validation Module
//!
//! Input validation for ledger and goal operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Route handler (out of scope)                              │
//! │  └── deserialization, auth, tenancy scoping                         │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - field-level checks                          │
//! │  └── positive amounts, rate ranges, valid periods, identifiers      │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: policy / ledger transactions                              │
//! │  └── business rules (balance, caps, basket minimum)                 │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 4: Database constraints                                      │
//! │  └── UNIQUE(branch), UNIQUE(customer, branch), foreign keys         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a redemption amount in cents.
///
/// ## Rules
/// - Must be positive (> 0); you cannot redeem zero or negative cashback
pub fn validate_redemption_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a manual adjustment amount in cents.
///
/// ## Rules
/// - May be positive or negative (operator corrections go both ways)
/// - Must not be zero - a zero adjustment records nothing
pub fn validate_adjustment_amount(cents: i64) -> ValidationResult<()> {
    if cents == 0 {
        return Err(ValidationError::Required {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_rate_bps(bps: i64) -> ValidationResult<()> {
    if !(0..=10_000).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates a multiplier in hundredths.
///
/// ## Rules
/// - Must be at least 100 (1.00x) - multipliers scale up, never down
/// - Capped at 10000 (100x) as a sanity bound
pub fn validate_multiplier(hundredths: i64) -> ValidationResult<()> {
    if !(100..=10_000).contains(&hundredths) {
        return Err(ValidationError::OutOfRange {
            field: "multiplier".to_string(),
            min: 100,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates a goal amount in cents.
///
/// ## Rules
/// - Must be non-negative; a zero goal is allowed (it just never counts
///   as achieved)
pub fn validate_goal_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "goal".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a (year, month) accounting period.
pub fn validate_period(year: i64, month: i64) -> ValidationResult<()> {
    if !(2000..=2100).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: 2000,
            max: 2100,
        });
    }

    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

/// Validates a lookahead/lookback day window.
pub fn validate_day_window(days: i64) -> ValidationResult<()> {
    if !(0..=3_650).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "days".to_string(),
            min: 0,
            max: 3_650,
        });
    }

    Ok(())
}

/// Validates a non-negative policy amount in cents (minimums, caps).
pub fn validate_config_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a non-empty identifier (branch, customer, seller).
///
/// Identifiers come from the tenancy layer and are opaque here; we only
/// reject blanks.
pub fn validate_scope_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_redemption_amount() {
        assert!(validate_redemption_amount(1).is_ok());
        assert!(validate_redemption_amount(5_000).is_ok());
        assert!(validate_redemption_amount(0).is_err());
        assert!(validate_redemption_amount(-100).is_err());
    }

    #[test]
    fn test_validate_adjustment_amount() {
        assert!(validate_adjustment_amount(100).is_ok());
        assert!(validate_adjustment_amount(-100).is_ok());
        assert!(validate_adjustment_amount(0).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps(0).is_ok());
        assert!(validate_rate_bps(500).is_ok());
        assert!(validate_rate_bps(10_000).is_ok());
        assert!(validate_rate_bps(10_001).is_err());
        assert!(validate_rate_bps(-1).is_err());
    }

    #[test]
    fn test_validate_multiplier() {
        assert!(validate_multiplier(100).is_ok());
        assert!(validate_multiplier(200).is_ok());
        assert!(validate_multiplier(99).is_err());
        assert!(validate_multiplier(10_001).is_err());
    }

    #[test]
    fn test_validate_period() {
        assert!(validate_period(2026, 1).is_ok());
        assert!(validate_period(2026, 12).is_ok());
        assert!(validate_period(2026, 0).is_err());
        assert!(validate_period(2026, 13).is_err());
        assert!(validate_period(1999, 6).is_err());
    }

    #[test]
    fn test_validate_config_amount() {
        assert!(validate_config_amount("min_purchase", 0).is_ok());
        assert!(validate_config_amount("min_purchase", 10_000).is_ok());
        assert!(validate_config_amount("min_purchase", -1).is_err());
    }

    #[test]
    fn test_validate_day_window() {
        assert!(validate_day_window(0).is_ok());
        assert!(validate_day_window(90).is_ok());
        assert!(validate_day_window(-5).is_err());
        assert!(validate_day_window(4_000).is_err());
    }

    #[test]
    fn test_validate_scope_id() {
        assert!(validate_scope_id("branch_id", "branch-1").is_ok());
        assert!(validate_scope_id("branch_id", "  ").is_err());
    }
}
