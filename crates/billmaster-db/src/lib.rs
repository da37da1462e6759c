//! # billmaster-db: Database Layer for BillMaster Pro
//!
//! SQLite storage for the billing server, accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BillMaster Pro Data Flow                           │
//! │                                                                         │
//! │  HTTP handler (POST /api/invoices)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  billmaster-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ InvoiceRepo    │    │ 001_initial_ │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │    │  schema.sql  │  │   │
//! │  │   │ WAL, FKs on   │    │ AnalyticsRepo  │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  SQLite Database (billmaster.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table group
//! - [`password`] - Argon2 password hashing
//! - [`seed`] - Demo data generator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billmaster_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("billmaster.db")).await?;
//! db.users().ensure_default_admin().await?;
//!
//! let created = db.invoices().create(&cart, Some(session.user_id)).await?;
//! println!("Issued {}", created.invoice_number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::analytics::{AnalyticsRepository, SummaryPeriod};
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::invoice::{DaySummary, InvoiceFilter, InvoiceRepository};
pub use repository::product::{ProductFilter, ProductRepository};
pub use repository::settings::SettingsRepository;
pub use repository::user::{UserCredentials, UserRepository};
