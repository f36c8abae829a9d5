//! # Error Types
//!
//! Domain-specific error types for optika-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       How Failures Surface                          │
//! │                                                                     │
//! │  Silent no-op (Option::None)                                        │
//! │  └── disabled feature, sale below earn minimum                      │
//! │      Expected business states, not failures.                        │
//! │                                                                     │
//! │  Structured validation result (UsageCheck, never thrown)            │
//! │  └── redemption eligibility - ALL violated rules collected          │
//! │                                                                     │
//! │  CoreError (this file, typed, propagated with ?)                    │
//! │  └── insufficient balance on debit, missing ledger row,             │
//! │      missing goal, paid-commission conflict                         │
//! │                                                                     │
//! │  DbError (optika-db) wraps CoreError + storage failures             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (IDs, amounts, periods)
//! 3. Errors are enum variants, never bare Strings

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations. The HTTP layer above this workspace maps these
/// to 4xx responses.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Debit attempted against a customer with no ledger row.
    ///
    /// Only the redemption path raises this: earn and adjustment paths
    /// get-or-create the row instead.
    #[error("customer has no cashback ledger: {customer_id}")]
    LedgerNotFound { customer_id: String },

    /// Debit would drive the balance negative.
    ///
    /// Re-checked inside the debit transaction: callers are expected to
    /// have run the usage validation first for friendly messages, but
    /// this guard is what actually protects the balance under races.
    #[error("insufficient cashback balance: available {available_cents}, requested {requested_cents}")]
    InsufficientBalance {
        available_cents: i64,
        requested_cents: i64,
    },

    /// Commission calculation requires a goal for the period.
    #[error("no sales goal found for branch {branch_id} in {year}-{month:02}")]
    GoalNotFound {
        branch_id: String,
        year: i64,
        month: i64,
    },

    /// The period's goal is closed; its targets can no longer change.
    #[error("sales goal for {year}-{month:02} is closed")]
    GoalClosed { year: i64, month: i64 },

    /// Recomputing commissions would overwrite rows already marked PAID.
    ///
    /// Pass `force` to deliberately reopen a paid-out period.
    #[error("commissions for {year}-{month:02} contain paid rows; recompute requires force")]
    CommissionAlreadyPaid { year: i64, month: i64 },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for
/// early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
