//! # Repository Module
//!
//! Database repository implementations for the Optika back office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                     │
//! │                                                                     │
//! │  Route handler                                                      │
//! │       │                                                             │
//! │       │  db.ledger().earn(customer, sale, total, branch)            │
//! │       │  ↓                                                          │
//! │       ▼                                                             │
//! │  CashbackLedger                                                     │
//! │  ├── reads policy via CashbackConfigRepository                      │
//! │  ├── delegates the decision to optika-core::policy                  │
//! │  └── runs movement insert + balance delta in ONE transaction        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite Database                                                    │
//! │                                                                     │
//! │  SQL is isolated here; policy math never touches the database.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`config::CashbackConfigRepository`] - Per-branch cashback policy
//! - [`config::CommissionConfigRepository`] - Per-branch commission policy
//! - [`ledger::CashbackLedger`] - Earn / redeem / adjust / expiry sweep
//! - [`goals::GoalsRepository`] - Monthly goals, ranking, commissions
//! - [`reminders::ReminderRepository`] - Outreach task generation
//! - [`reports::ReportsRepository`] - Paginated read projections

pub mod config;
pub mod goals;
pub mod ledger;
pub mod reminders;
pub mod reports;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{DbError, DbResult};

/// Returns the UTC `[start, end)` bounds of a calendar month.
///
/// Used by every query that aggregates completed sales for a period.
pub(crate) fn month_bounds(year: i64, month: i64) -> DbResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
        .ok_or_else(|| DbError::Internal(format!("invalid period {year}-{month}")))?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year as i32, next_month as u32, 1)
        .ok_or_else(|| DbError::Internal(format!("invalid period {year}-{month}")))?;

    Ok((start_of_day(start), start_of_day(end)))
}

/// Midnight UTC for a calendar date.
pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
