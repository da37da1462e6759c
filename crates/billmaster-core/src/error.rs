//! # Error Types
//!
//! Domain-specific error types for billmaster-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billmaster-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  billmaster-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  server errors                                                         │
//! │  └── ApiError         - What the browser sees: {success:false, ...}    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Browser      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business logic errors raised while building an invoice.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invoice needs at least one line.
    #[error("Invoice must contain at least one item")]
    EmptyCart,

    /// Too many lines on one invoice.
    #[error("Invoice cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// The discount would make the invoice total negative.
    ///
    /// ## User Workflow
    /// ```text
    /// Subtotal 100.00 + tax 18.00, discount 150.00
    ///      │
    ///      ▼
    /// DiscountExceedsTotal { discount_cents: 15000, gross_cents: 11800 }
    ///      │
    ///      ▼
    /// Billing screen: "Discount 150.00 exceeds invoice amount 118.00"
    /// ```
    #[error("Discount {discount_cents} exceeds invoice amount {gross_cents}")]
    DiscountExceedsTotal { discount_cents: i64, gross_cents: i64 },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any database write so a bad request never leaves a
/// partial row behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required { field: field.into() }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::DiscountExceedsTotal {
            discount_cents: 15_000,
            gross_cents: 11_800,
        };
        assert_eq!(err.to_string(), "Discount 15000 exceeds invoice amount 11800");
        assert_eq!(
            CoreError::EmptyCart.to_string(),
            "Invoice must contain at least one item"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("username").to_string(), "username is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("items").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        // The wrapper is transparent for the user-facing message
        assert_eq!(core_err.to_string(), "items is required");
    }
}
