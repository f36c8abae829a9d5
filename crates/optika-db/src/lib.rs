//! # optika-db: Storage Layer for the Optika Back Office
//!
//! SQLite storage for the cashback loyalty ledger, the goals/commission
//! engine and the reminder generator, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Optika Data Flow                             │
//! │                                                                     │
//! │  Route handler / cron caller (out of scope)                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                    optika-db (THIS CRATE)                     │ │
//! │  │                                                               │ │
//! │  │  ┌───────────┐  ┌──────────────────────┐  ┌───────────────┐  │ │
//! │  │  │ Database  │  │     Repositories     │  │  Migrations   │  │ │
//! │  │  │ (pool.rs) │  │ config / ledger /    │  │  (embedded)   │  │ │
//! │  │  │           │  │ goals / reminders /  │  │               │  │ │
//! │  │  │SqlitePool │◄─│ reports              │  │ 001_init.sql  │  │ │
//! │  │  └───────────┘  └──────────────────────┘  └───────────────┘  │ │
//! │  │                                                               │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode, foreign keys on)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Ledger Contract
//!
//! The balance column on `customer_cashbacks` is a cached projection of
//! the append-only `cashback_movements` log. Every balance-affecting
//! operation (earn, redeem, adjust, expire) runs inside one transaction
//! that inserts exactly one movement AND applies its delta, so the
//! projection equals the signed sum of movements at all times, even
//! under concurrent requests for the same customer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use optika_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/optika.db")).await?;
//!
//! // On sale completion:
//! let receipt = db.ledger().earn(&customer_id, &sale_id, total, &branch_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::config::{CashbackConfigRepository, CommissionConfigRepository};
pub use repository::goals::GoalsRepository;
pub use repository::ledger::CashbackLedger;
pub use repository::reminders::ReminderRepository;
pub use repository::reports::ReportsRepository;
