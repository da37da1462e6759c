//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  An invoice total that drifts by a paisa no longer equals               │
//! │  subtotal + tax - discount, and daily revenue sums stop matching.       │
//! │                                                                         │
//! │  Every amount is stored and computed in minor units (i64):              │
//! │    ₹450.00 → 45000                                                      │
//! │  Only the browser formats it back into rupees.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billmaster_core::money::Money;
//!
//! let price = Money::from_cents(4_500);        // 45.00
//! let line = price.multiply_quantity(3);       // 135.00
//! assert_eq!(line.cents(), 13_500);
//! assert_eq!(line.to_string(), "135.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor currency units.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  CartLine.unit_price ──► × quantity ──► line total ──┐                 │
/// │                                                      │                 │
/// │                                       Σ line totals ◄┘                 │
/// │                                             │                           │
/// │                                             ▼                           │
/// │          subtotal ──► calculate_tax ──► tax ──► total − discount        │
/// │                                                                         │
/// │  Analytics sums the same integer columns, so reports always add up.     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use billmaster_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an amount in whole currency units (e.g. `49.99` rupees),
    /// rounding to the nearest minor unit.
    ///
    /// Out-of-range values saturate at `i64::MIN`/`i64::MAX` and NaN becomes
    /// zero; callers validate the result.
    ///
    /// ## Example
    /// ```rust
    /// use billmaster_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(49.99).cents(), 4_999);
    /// assert_eq!(Money::from_major(50.0).cents(), 5_000);
    /// ```
    #[inline]
    pub fn from_major(major: f64) -> Self {
        Money((major * 100.0).round() as i64)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Calculates tax at the given rate, rounding half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`
    /// The +5000 provides rounding (5000/10000 = 0.5)
    ///
    /// ## Example
    /// ```rust
    /// use billmaster_core::money::Money;
    /// use billmaster_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(10_000);  // 100.00
    /// let rate = TaxRate::from_percentage(10.0);
    /// assert_eq!(subtotal.calculate_tax(rate).cents(), 1_000);
    ///
    /// // 10.00 at 8.25% = 0.825 → 0.83
    /// let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large invoices from overflowing during the multiply
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use billmaster_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Share of `total` this amount represents, in percent with one decimal.
    ///
    /// Returns `0.0` when `total` is zero so empty reports never divide by zero.
    ///
    /// ## Example
    /// ```rust
    /// use billmaster_core::money::Money;
    ///
    /// let cash = Money::from_cents(1_000);
    /// let all = Money::from_cents(3_000);
    /// assert_eq!(cash.percentage_of(all), 33.3);
    /// assert_eq!(cash.percentage_of(Money::zero()), 0.0);
    /// ```
    pub fn percentage_of(&self, total: Money) -> f64 {
        if total.is_zero() {
            return 0.0;
        }
        round_one_decimal(self.0 as f64 * 100.0 / total.0 as f64)
    }
}

/// Rounds to one decimal place, half away from zero.
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `1234.50`. The currency symbol is a store setting and is added by
/// the client.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Money(cents)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
