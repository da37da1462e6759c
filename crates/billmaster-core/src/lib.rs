//! # billmaster-core: Pure Business Logic for BillMaster Pro
//!
//! Domain types, money arithmetic, invoice math and input validation.
//! Nothing in this crate touches the database, the network or the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BillMaster Pro Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser client (billing screen)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    /api/invoices, /api/products, /api/analytics, ...            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ billmaster-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  invoice  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Totals   │  │   rules   │  │   │
//! │  │   │  Invoice  │  │  TaxRate  │  │  Number   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                billmaster-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Invoice, Customer, etc.)
//! - [`money`] - Money type with integer arithmetic
//! - [`invoice`] - Cart validation, invoice totals and numbering
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation
//!
//! ## Example Usage
//!
//! ```rust
//! use billmaster_core::money::Money;
//! use billmaster_core::types::TaxRate;
//!
//! let subtotal = Money::from_cents(10_000); // 100.00
//! let tax = subtotal.calculate_tax(TaxRate::from_percentage(18.0));
//! assert_eq!(tax.cents(), 1_800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{format_invoice_number, CartLine, CartRequest, InvoiceTotals};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines allowed on a single invoice.
pub const MAX_INVOICE_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Guards against typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted price for one unit, in minor units (₹10 crore).
///
/// At [`MAX_ITEM_QUANTITY`] per line and [`MAX_INVOICE_LINES`] lines, plus
/// 100% tax, an invoice total stays far below `i64::MAX`.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Invoice number prefix used when the `invoice_prefix` setting is missing or blank.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Username of the account that is created on first start and can never be deleted.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
