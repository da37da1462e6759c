//! # Repository Module
//!
//! Database repository implementations for BillMaster Pro.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.invoices().create(&cart, Some(user_id))                    │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                     │
//! │  ├── create / create_at   (one transaction)                            │
//! │  ├── list / get                                                        │
//! │  └── update_status / today_summary                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Each repository is a cheap `{ pool }` handle created per call.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts and credentials
//! - [`CategoryRepository`](category::CategoryRepository) - Categories
//! - [`ProductRepository`](product::ProductRepository) - Catalogue and stock
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoice transaction
//! - [`SettingsRepository`](settings::SettingsRepository) - Key/value settings
//! - [`AnalyticsRepository`](analytics::AnalyticsRepository) - Read-only reports
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Shop expenses

use chrono::{Local, NaiveDate, NaiveDateTime};

pub mod analytics;
pub mod category;
pub mod customer;
pub mod expense;
pub mod invoice;
pub mod product;
pub mod settings;
pub mod user;

/// Storage format of every `created_at` / `updated_at` column.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a wall-clock time the way it is stored.
pub(crate) fn timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local wall-clock time, truncated to seconds.
pub(crate) fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Start of `day` as a stored timestamp (`YYYY-MM-DD 00:00:00`).
pub(crate) fn day_start(day: NaiveDate) -> String {
    format!("{} 00:00:00", day.format("%Y-%m-%d"))
}

/// Wraps a search term for `LIKE '%term%'`.
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}
