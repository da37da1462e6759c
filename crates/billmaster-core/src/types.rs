//! # Domain Types
//!
//! Core domain types used throughout BillMaster Pro.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│     Product     │◄──│  InvoiceItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  category_id?   │   │  product_id?    │       │
//! │  │  name           │   │  price_cents    │   │  product_name   │       │
//! │  └─────────────────┘   │  stock_quantity │   │  (snapshot)     │       │
//! │                        │  is_active      │   └────────┬────────┘       │
//! │                        └─────────────────┘            │                │
//! │  ┌─────────────────┐   ┌─────────────────┐            │                │
//! │  │    Customer     │◄──│     Invoice     │◄───────────┘                │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  total_orders   │   │  invoice_number │                             │
//! │  │  total_spent    │   │  totals, status │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  User / Role, Expense, StockOperation, PaymentMethod, PaymentStatus     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Partial Updates
//! `*Update` structs carry `Option<T>` for every field. `None` means
//! "leave unchanged", so a client can send `{"price_cents": 5000}` alone.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 18% GST is 1800 bps and the
/// tax math stays in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage, rounded to the nearest basis point.
    ///
    /// Negative input clamps to zero; range checks belong to
    /// [`validate_tax_percentage`](crate::validation::validate_tax_percentage).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct.max(0.0) * 100.0).round() as u32)
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

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Users
// =============================================================================

/// Access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including settings, users and expenses.
    Admin,
    /// Billing and catalogue access.
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Staff
    }
}

/// A user account as shown to admins. The password hash is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// Registration input (admin only).
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// A category with the number of active products that reference it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
    pub product_count: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial category update.
///
/// Nullable columns use `Option<Option<T>>`: an absent field is left alone,
/// JSON `null` clears the column.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

/// Deserializes a present field (including `null`) as `Some(..)`, so that
/// `#[serde(default)]` can tell "absent" apart from "clear".
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name shown on the billing screen and copied onto invoices.
    pub name: String,

    pub description: Option<String>,

    /// Owning category; NULL once the category is deleted.
    pub category_id: Option<i64>,

    /// Joined from `categories` for list views.
    pub category_name: Option<String>,

    /// Price in minor units.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock_quantity: i64,

    /// Selling unit ("pcs", "kg", ...).
    pub unit: String,

    pub barcode: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: NaiveDateTime,

    #[ts(as = "String")]
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the product is at or below the low-stock threshold.
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock_quantity <= threshold
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub price_cents: i64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<i64>>,
    pub price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub barcode: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// How a manual stock correction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockOperation {
    /// Overwrite the stock level.
    Set,
    /// Receive goods.
    Add,
    /// Remove goods; the result is clamped at zero.
    Subtract,
}

impl StockOperation {
    /// Applies the operation to a current stock level.
    ///
    /// ## Example
    /// ```rust
    /// use billmaster_core::StockOperation;
    ///
    /// assert_eq!(StockOperation::Subtract.apply(3, 5), 0);
    /// assert_eq!(StockOperation::Add.apply(3, 5), 8);
    /// assert_eq!(StockOperation::Set.apply(3, 5), 5);
    /// ```
    pub fn apply(&self, current: i64, quantity: i64) -> i64 {
        match self {
            StockOperation::Set => quantity,
            StockOperation::Add => current + quantity,
            StockOperation::Subtract => (current - quantity).max(0),
        }
    }
}

impl Default for StockOperation {
    fn default() -> Self {
        StockOperation::Set
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with denormalized purchase aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Invoices billed to this customer.
    pub total_orders: i64,
    /// Sum of those invoices' totals, in minor units.
    pub total_spent_cents: i64,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// A customer together with their most recent invoices.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub recent_invoices: Vec<Invoice>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
}

// =============================================================================
// Payment Method / Status
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    /// Billed on account.
    Credit,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Upi,
        PaymentMethod::BankTransfer,
        PaymentMethod::Credit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Partial,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A billed transaction.
///
/// `total_cents = subtotal_cents + tax_amount_cents - discount_cents`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: i64,
    /// `{prefix}-{YYYYMMDD}-{NNNN}`
    pub invoice_number: String,
    pub customer_id: Option<i64>,
    /// Customer name at billing time.
    pub customer_name: Option<String>,
    /// Cashier who created the invoice.
    pub user_id: Option<i64>,
    pub subtotal_cents: i64,
    pub tax_rate_bps: i64,
    pub tax_amount_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item. Product name and price are frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    /// NULL once the product row is deleted.
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// `quantity × unit_price_cents`
    pub total_price_cents: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct InvoiceWithItems {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// Result of a successful invoice creation.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CreatedInvoice {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub subtotal_cents: i64,
    pub tax_amount_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

// =============================================================================
// Expense
// =============================================================================

/// A shop expense (rent, supplies, wages...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub amount_cents: i64,
    pub category: String,
    #[ts(as = "String")]
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub title: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expense_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1800);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
        assert_eq!(TaxRate::from_percentage(12.5).bps(), 1250);
        assert_eq!(TaxRate::from_percentage(-3.0).bps(), 0);
    }

    #[test]
    fn test_stock_operation_apply() {
        assert_eq!(StockOperation::Set.apply(10, 4), 4);
        assert_eq!(StockOperation::Add.apply(10, 4), 14);
        assert_eq!(StockOperation::Subtract.apply(10, 4), 6);
        assert_eq!(StockOperation::Subtract.apply(1, 4), 0);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        assert_eq!(serde_json::to_string(&PaymentStatus::Paid).unwrap(), "\"paid\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");

        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Paid);
        assert_eq!(Role::default(), Role::Staff);
    }

    #[test]
    fn test_partial_update_defaults_to_unchanged() {
        let update: ProductUpdate = serde_json::from_str(r#"{"price_cents": 5000}"#).unwrap();
        assert_eq!(update.price_cents, Some(5000));
        assert!(update.name.is_none());
        assert!(update.stock_quantity.is_none());
        assert!(update.category_id.is_none());
    }

    #[test]
    fn test_partial_update_null_clears() {
        let update: ProductUpdate =
            serde_json::from_str(r#"{"category_id": null, "barcode": "8901"}"#).unwrap();
        assert_eq!(update.category_id, Some(None));
        assert_eq!(update.barcode, Some(Some("8901".to_string())));
        assert!(update.description.is_none());

        let update: CustomerUpdate = serde_json::from_str(r#"{"email": null}"#).unwrap();
        assert_eq!(update.email, Some(None));
        assert!(update.phone.is_none());
    }
}
