//! # optika-core: Pure Business Logic for the Optika Back Office
//!
//! This crate is the **heart** of the cashback loyalty and goals/commission
//! engine. It contains all accounting and policy rules as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Optika Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │              Route Handlers / Schedulers (out of scope)       │ │
//! │  │   sale completion ──► earn/redeem   cron ──► sweep/reminders  │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                    optika-db (storage layer)                  │ │
//! │  │     Transactional ledger, goals engine, reminder generator    │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │               ★ optika-core (THIS CRATE) ★                    │ │
//! │  │                                                               │ │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐   │ │
//! │  │   │  types   │  │  money   │  │  policy  │  │ validation │   │ │
//! │  │   │ Ledger   │  │  Money   │  │ accrual  │  │   rules    │   │ │
//! │  │   │ Movement │  │  Rate    │  │ usage    │  │   checks   │   │ │
//! │  │   │ Goal     │  │ Multiplier│ │commission│  │            │   │ │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └────────────┘   │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS            │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (configs, ledger rows, goals, reminders)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`policy`] - Accrual, usage, commission and progress rules
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: "today" is always a parameter, never a clock read
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are cents (i64); rates are
//!    basis points; multipliers are hundredths - no floats in accounting
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use optika_core::money::Money;
//! use optika_core::types::Rate;
//!
//! // A R$1000.00 sale earning 5% cashback
//! let sale_total = Money::from_cents(100_000);
//! let earn_rate = Rate::from_bps(500); // 5%
//!
//! assert_eq!(sale_total.apply_rate(earn_rate).cents(), 5_000); // R$50.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use optika_core::Money` instead of
// `use optika_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants: Lazy Config Defaults
// =============================================================================
// A branch gets a config row created on first access with these values.
// All of them are tunable afterwards via the config repositories.

/// Default cashback earn rate: 5% of the sale total, in basis points.
pub const DEFAULT_EARN_RATE_BPS: u32 = 500;

/// Default minimum purchase to earn cashback: none (every sale earns).
pub const DEFAULT_MIN_PURCHASE_CENTS: i64 = 0;

/// Default credit lifetime before expiry, in days.
pub const DEFAULT_EXPIRY_DAYS: i64 = 90;

/// Default cap on how much of a sale cashback may fund: 50%, in basis points.
pub const DEFAULT_MAX_USAGE_BPS: u32 = 5_000;

/// Default redemption basket multiplier: the sale must be at least
/// 2.00x the amount redeemed (stored in hundredths).
pub const DEFAULT_MIN_PURCHASE_MULTIPLIER: u32 = 200;

/// Default birth-month earn multiplier: 2.00x (stored in hundredths).
pub const DEFAULT_BIRTHDAY_MULTIPLIER: u32 = 200;

/// Default base commission over a seller's monthly sales: 5%.
pub const DEFAULT_BASE_COMMISSION_BPS: u32 = 500;

/// Default extra commission when the monthly goal is achieved: 2%.
pub const DEFAULT_GOAL_BONUS_BPS: u32 = 200;

/// Default lookahead for prescription-expiry reminders, in days.
pub const DEFAULT_PRESCRIPTION_DAYS_BEFORE: i64 = 30;

/// Default shift for birthday reminders: generate 3 days early.
pub const DEFAULT_BIRTHDAY_DAYS_BEFORE: i64 = 3;

/// Default inactivity window before a reactivation reminder, in days.
pub const DEFAULT_INACTIVE_AFTER_DAYS: i64 = 90;

/// Default lookahead for cashback-expiring reminders, in days.
pub const DEFAULT_CASHBACK_DAYS_BEFORE: i64 = 7;

/// Maximum page size accepted by the report queries.
///
/// ## Business Reason
/// Prevents a single report call from materializing an unbounded result
/// set; callers wanting more must paginate.
pub const MAX_PAGE_SIZE: u32 = 200;
