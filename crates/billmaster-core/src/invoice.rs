//! # Invoice Math
//!
//! The computation half of invoice creation: cart validation, totals and
//! invoice numbering. The database half (transaction, stock, customer
//! aggregates) lives in `billmaster-db`.
//!
//! ## Totals
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartLine { qty: 2, unit: 50.00 } ──► line total 100.00                │
//! │                                             │                           │
//! │                                 Σ lines ────┘                           │
//! │                                    │                                    │
//! │                              subtotal 100.00                            │
//! │                                    │                                    │
//! │                      tax @ 10% ──► 10.00                                │
//! │                                    │                                    │
//! │            total = 100.00 + 10.00 − discount 5.00 = 105.00              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use billmaster_core::{CartLine, CartRequest, TaxRate};
//!
//! let cart = CartRequest {
//!     items: vec![CartLine { product_id: 1, quantity: 2, unit_price_cents: 5_000 }],
//!     tax_rate: Some(10.0),
//!     discount_cents: Some(500),
//!     ..CartRequest::default()
//! };
//!
//! let totals = cart.totals(TaxRate::from_percentage(18.0)).unwrap();
//! assert_eq!(totals.subtotal.cents(), 10_000);
//! assert_eq!(totals.tax.cents(), 1_000);
//! assert_eq!(totals.total.cents(), 10_500);
//! ```

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, PaymentStatus, TaxRate};
use crate::validation::{
    validate_non_negative_cents, validate_quantity, validate_tax_percentage, validate_unit_price_cents,
};
use crate::{DEFAULT_INVOICE_PREFIX, MAX_INVOICE_LINES};

// =============================================================================
// Cart Request
// =============================================================================

/// One line of a cart as sent by the billing screen.
///
/// The price arrives either as `unit_price_cents` or as `unit_price` in whole
/// currency units, which is rounded to the nearest minor unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Price charged for this line, in minor units.
    pub unit_price_cents: i64,
}

impl CartLine {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

#[derive(Deserialize)]
struct CartLineWire {
    product_id: i64,
    quantity: i64,
    #[serde(default)]
    unit_price_cents: Option<i64>,
    #[serde(default)]
    unit_price: Option<f64>,
}

impl<'de> Deserialize<'de> for CartLine {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = CartLineWire::deserialize(deserializer)?;
        let unit_price_cents = minor_units(wire.unit_price_cents, wire.unit_price)
            .ok_or_else(|| de::Error::missing_field("unit_price_cents"))?;

        Ok(CartLine {
            product_id: wire.product_id,
            quantity: wire.quantity,
            unit_price_cents,
        })
    }
}

/// Everything needed to create one invoice.
///
/// The discount may be sent as `discount_cents` or as `discount_amount` in
/// whole currency units; `discount_cents` wins when both are present.
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export)]
pub struct CartRequest {
    pub customer_id: Option<i64>,

    pub items: Vec<CartLine>,

    /// Tax percentage. `None` uses the store's `tax_rate` setting.
    pub tax_rate: Option<f64>,

    pub discount_cents: Option<i64>,

    pub payment_method: PaymentMethod,

    pub payment_status: PaymentStatus,

    pub notes: Option<String>,
}

#[derive(Deserialize)]
struct CartRequestWire {
    #[serde(default)]
    customer_id: Option<i64>,
    items: Vec<CartLine>,
    #[serde(default)]
    tax_rate: Option<f64>,
    #[serde(default)]
    discount_cents: Option<i64>,
    #[serde(default)]
    discount_amount: Option<f64>,
    #[serde(default)]
    payment_method: PaymentMethod,
    #[serde(default)]
    payment_status: PaymentStatus,
    #[serde(default)]
    notes: Option<String>,
}

impl<'de> Deserialize<'de> for CartRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = CartRequestWire::deserialize(deserializer)?;

        Ok(CartRequest {
            customer_id: wire.customer_id,
            items: wire.items,
            tax_rate: wire.tax_rate,
            discount_cents: minor_units(wire.discount_cents, wire.discount_amount),
            payment_method: wire.payment_method,
            payment_status: wire.payment_status,
            notes: wire.notes,
        })
    }
}

fn minor_units(cents: Option<i64>, major: Option<f64>) -> Option<i64> {
    cents.or_else(|| major.map(|amount| Money::from_major(amount).cents()))
}

impl CartRequest {
    /// Checks the cart shape before anything is written.
    ///
    /// ## Rules
    /// - At least one line, at most [`MAX_INVOICE_LINES`]
    /// - Every quantity in `1..=999`
    /// - Unit prices in `0..=MAX_PRICE_CENTS`, no negative discount
    /// - Tax percentage (when given) in `0..=100`
    pub fn validate(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        if self.items.len() > MAX_INVOICE_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_INVOICE_LINES,
            });
        }

        for line in &self.items {
            validate_quantity(line.quantity)?;
            validate_unit_price_cents(line.unit_price_cents)?;
        }

        validate_non_negative_cents("discount", self.discount())?;

        if let Some(pct) = self.tax_rate {
            validate_tax_percentage(pct)?;
        }

        Ok(())
    }

    /// Discount in minor units, zero when absent.
    #[inline]
    pub fn discount(&self) -> i64 {
        self.discount_cents.unwrap_or(0)
    }

    /// Validates the cart and computes its totals.
    ///
    /// ## Arguments
    /// * `default_rate` - used when the cart carries no `tax_rate`
    pub fn totals(&self, default_rate: TaxRate) -> CoreResult<InvoiceTotals> {
        self.validate()?;

        let rate = self
            .tax_rate
            .map(TaxRate::from_percentage)
            .unwrap_or(default_rate);

        InvoiceTotals::compute(&self.items, rate, Money::from_cents(self.discount()))
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Computed money fields of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Computes `subtotal`, `tax` and `total` for a set of lines.
    ///
    /// Fails with [`CoreError::DiscountExceedsTotal`] when the discount is
    /// larger than subtotal plus tax.
    pub fn compute(lines: &[CartLine], tax_rate: TaxRate, discount: Money) -> CoreResult<Self> {
        let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
        let tax = subtotal.calculate_tax(tax_rate);
        let gross = subtotal + tax;

        if discount > gross {
            return Err(CoreError::DiscountExceedsTotal {
                discount_cents: discount.cents(),
                gross_cents: gross.cents(),
            });
        }

        Ok(InvoiceTotals {
            subtotal,
            tax_rate,
            tax,
            discount,
            total: gross - discount,
        })
    }
}

// =============================================================================
// Invoice Number
// =============================================================================

/// Builds `{prefix}-{YYYYMMDD}-{seq:04}`.
///
/// A blank prefix falls back to `INV`. Sequences above 9999 simply grow
/// wider.
///
/// ## Example
/// ```rust
/// use billmaster_core::format_invoice_number;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(format_invoice_number("INV", day, 7), "INV-20240309-0007");
/// assert_eq!(format_invoice_number("  ", day, 12), "INV-20240309-0012");
/// ```
pub fn format_invoice_number(prefix: &str, date: NaiveDate, seq: i64) -> String {
    let prefix = match prefix.trim() {
        "" => DEFAULT_INVOICE_PREFIX,
        p => p,
    };
    format!("{}-{}-{:04}", prefix, date.format("%Y%m%d"), seq)
}

// =============================================================================
// Unit Tests
// =============================================================================
