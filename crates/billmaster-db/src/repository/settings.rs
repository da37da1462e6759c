//! # Settings Repository
//!
//! Flat key/value store for store-wide configuration, plus the factory
//! reset.
//!
//! ## Known Keys
//! | Key                | Example                         |
//! |--------------------|---------------------------------|
//! | `business_name`    | BillMaster Pro Store            |
//! | `business_address` | 123, Main Street, City Center   |
//! | `business_phone`   | +91 98765 43210                 |
//! | `business_email`   | store@billmaster.com            |
//! | `tax_rate`         | 18 (percent)                    |
//! | `currency_symbol`  | ₹                               |
//! | `invoice_prefix`   | INV                             |
//!
//! Unknown keys are stored as-is so the client can keep its own
//! preferences here.

use std::collections::BTreeMap;

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use billmaster_core::validation::validate_tax_percentage;
use billmaster_core::{TaxRate, ValidationError, DEFAULT_INVOICE_PREFIX};

use crate::error::{DbError, DbResult};

pub const KEY_TAX_RATE: &str = "tax_rate";
pub const KEY_INVOICE_PREFIX: &str = "invoice_prefix";

/// Tables emptied by a factory reset, children first.
const RESET_TABLES: [&str; 7] = [
    "invoice_items",
    "invoices",
    "products",
    "customers",
    "categories",
    "expenses",
    "invoice_sequences",
];

/// Repository for settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Returns every setting.
    pub async fn get_all(&self) -> DbResult<BTreeMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// Returns one setting, if present.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Upserts every pair in one transaction.
    ///
    /// `tax_rate` must parse as a percentage in `0..=100`; nothing is written
    /// when it doesn't.
    pub async fn update(&self, values: &BTreeMap<String, String>) -> DbResult<()> {
        if let Some(rate) = values.get(KEY_TAX_RATE) {
            parse_tax_percentage(rate)?;
        }

        let mut tx = self.pool.begin().await?;

        for (key, value) in values {
            sqlx::query(
                r#"
                INSERT INTO settings (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(count = values.len(), "Settings updated");
        Ok(())
    }

    /// Prefix for new invoice numbers.
    pub async fn invoice_prefix(&self) -> DbResult<String> {
        let prefix = self.get(KEY_INVOICE_PREFIX).await?;
        Ok(prefix
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_INVOICE_PREFIX.to_string()))
    }

    /// Default tax rate for carts that don't carry one.
    pub async fn tax_rate(&self) -> DbResult<TaxRate> {
        match self.get(KEY_TAX_RATE).await? {
            Some(value) => Ok(parse_tax_percentage(&value).unwrap_or_else(|_| {
                warn!(value = %value, "Stored tax_rate is not a valid percentage, using 0");
                TaxRate::zero()
            })),
            None => Ok(TaxRate::zero()),
        }
    }

    /// Wipes all transactional and catalogue data.
    ///
    /// `users` and `settings` are preserved. AUTOINCREMENT counters of the
    /// wiped tables restart at 1.
    pub async fn factory_reset(&self) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        for table in RESET_TABLES {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }

        // sqlite_sequence only exists once an AUTOINCREMENT table got a row
        let has_sequence: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
        )
        .fetch_one(&mut *tx)
        .await?;

        if has_sequence > 0 {
            sqlx::query(
                r#"
                DELETE FROM sqlite_sequence
                WHERE name IN ('invoice_items', 'invoices', 'products', 'customers', 'categories', 'expenses')
                "#,
            )
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Factory reset complete");
        Ok(())
    }
}

/// Parses a stored or submitted tax percentage.
fn parse_tax_percentage(value: &str) -> DbResult<TaxRate> {
    let pct: f64 = value.trim().parse().map_err(|_| {
        DbError::from(ValidationError::InvalidFormat {
            field: KEY_TAX_RATE.to_string(),
            reason: "must be a number".to_string(),
        })
    })?;

    validate_tax_percentage(pct)?;
    Ok(TaxRate::from_percentage(pct))
}
