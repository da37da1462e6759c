//! # Invoice Repository
//!
//! The invoice transaction and invoice reads.
//!
//! ## Invoice Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_at(cart, user_id, at)                         │
//! │                                                                         │
//! │  cart.totals(default tax) ── invalid? ──► Validation (nothing written) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │   1. bump invoice_sequences[day]   ← first statement is a write, so    │
//! │                                      SQLite's write lock is held from  │
//! │                                      here to COMMIT                    │
//! │   2. read invoice_prefix → INV-20240309-0007                           │
//! │   3. customer exists? snapshot name                                    │
//! │   4. INSERT invoices                                                   │
//! │   5. per line: product active? snapshot name                           │
//! │               INSERT invoice_items                                     │
//! │               stock = MAX(0, stock - qty)                              │
//! │   6. customer: total_orders + 1, total_spent + total                   │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction: no invoice, no items,  │
//! │  no stock change, no sequence bump.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Two cashiers creating invoices at once serialize on the write lock taken
//! by step 1 (the second waits up to the pool's busy timeout). The per-day
//! counter therefore never hands out the same number twice, and each stock
//! decrement sees the previous invoice's result.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use billmaster_core::{
    format_invoice_number, CartRequest, CreatedInvoice, Invoice, InvoiceItem, InvoiceWithItems,
    PaymentStatus, DEFAULT_INVOICE_PREFIX,
};

use super::settings::{SettingsRepository, KEY_INVOICE_PREFIX};
use super::{day_start, now_local, timestamp};
use crate::error::{DbError, DbResult};

pub(crate) const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, customer_id, customer_name, user_id,
    subtotal_cents, tax_rate_bps, tax_amount_cents, discount_cents, total_cents,
    payment_method, payment_status, notes, created_at
"#;

/// Default and maximum page size for [`InvoiceRepository::list`].
pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Filters for [`InvoiceRepository::list`]. Dates are inclusive local days.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub status: Option<PaymentStatus>,
    pub customer_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

/// Totals for one business day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DaySummary {
    pub total_invoices: i64,
    pub total_amount_cents: i64,
    pub paid_amount_cents: i64,
    pub pending_amount_cents: i64,
    pub items_sold: i64,
}

/// Repository for invoices.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Creates an invoice stamped with the current local time.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let created = db.invoices().create(&cart, Some(session.user_id)).await?;
    /// println!("{}", created.invoice_number); // INV-20240309-0007
    /// ```
    pub async fn create(&self, cart: &CartRequest, user_id: Option<i64>) -> DbResult<CreatedInvoice> {
        self.create_at(cart, user_id, now_local()).await
    }

    /// Creates an invoice as of `at`. All writes happen in one transaction.
    ///
    /// ## Errors
    /// * `Validation` - empty cart, bad quantity, discount above total
    /// * `NotFound` - unknown customer, unknown or inactive product
    pub async fn create_at(
        &self,
        cart: &CartRequest,
        user_id: Option<i64>,
        at: NaiveDateTime,
    ) -> DbResult<CreatedInvoice> {
        let default_rate = SettingsRepository::new(self.pool.clone()).tax_rate().await?;
        let totals = cart.totals(default_rate)?;

        let mut tx = self.pool.begin().await?;

        let seq = next_sequence(&mut tx, at.date()).await?;

        let prefix: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(KEY_INVOICE_PREFIX)
                .fetch_optional(&mut *tx)
                .await?;
        let invoice_number = format_invoice_number(
            prefix.as_deref().unwrap_or(DEFAULT_INVOICE_PREFIX),
            at.date(),
            seq,
        );

        let customer_name = match cart.customer_id {
            Some(customer_id) => {
                let name: Option<String> =
                    sqlx::query_scalar("SELECT name FROM customers WHERE id = ?1")
                        .bind(customer_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                Some(name.ok_or_else(|| DbError::not_found("Customer", customer_id))?)
            }
            None => None,
        };

        debug!(
            invoice_number = %invoice_number,
            lines = cart.items.len(),
            total = %totals.total,
            "Creating invoice"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO invoices (
                invoice_number, customer_id, customer_name, user_id,
                subtotal_cents, tax_rate_bps, tax_amount_cents, discount_cents, total_cents,
                payment_method, payment_status, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&invoice_number)
        .bind(cart.customer_id)
        .bind(customer_name.as_deref())
        .bind(user_id)
        .bind(totals.subtotal.cents())
        .bind(totals.tax_rate.bps() as i64)
        .bind(totals.tax.cents())
        .bind(totals.discount.cents())
        .bind(totals.total.cents())
        .bind(cart.payment_method)
        .bind(cart.payment_status)
        .bind(cart.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()))
        .bind(timestamp(at))
        .execute(&mut *tx)
        .await?;

        let invoice_id = result.last_insert_rowid();

        for line in &cart.items {
            let product_name: Option<String> =
                sqlx::query_scalar("SELECT name FROM products WHERE id = ?1 AND is_active = 1")
                    .bind(line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let product_name =
                product_name.ok_or_else(|| DbError::not_found("Product", line.product_id))?;

            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    invoice_id, product_id, product_name,
                    quantity, unit_price_cents, total_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(invoice_id)
            .bind(line.product_id)
            .bind(&product_name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.line_total().cents())
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = MAX(0, stock_quantity - ?2), updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(timestamp(at))
            .execute(&mut *tx)
            .await?;
        }

        if let Some(customer_id) = cart.customer_id {
            sqlx::query(
                r#"
                UPDATE customers
                SET total_orders = total_orders + 1,
                    total_spent_cents = total_spent_cents + ?2
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(totals.total.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %invoice_id, invoice_number = %invoice_number, "Invoice created");

        Ok(CreatedInvoice {
            invoice_id,
            invoice_number,
            subtotal_cents: totals.subtotal.cents(),
            tax_amount_cents: totals.tax.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
        })
    }

    /// Lists invoices, newest first, each with its items.
    pub async fn list(&self, filter: &InvoiceFilter) -> DbResult<Vec<InvoiceWithItems>> {
        let limit = filter
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);

        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE (?1 IS NULL OR payment_status = ?1)
              AND (?2 IS NULL OR customer_id = ?2)
              AND (?3 IS NULL OR created_at >= ?3)
              AND (?4 IS NULL OR created_at < ?4)
            ORDER BY created_at DESC, id DESC
            LIMIT ?5
            "#
        );

        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(filter.status)
            .bind(filter.customer_id)
            .bind(filter.date_from.map(day_start))
            .bind(filter.date_to.and_then(|d| d.checked_add_days(Days::new(1))).map(day_start))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut conn = self.pool.acquire().await?;
        let mut result = Vec::with_capacity(invoices.len());

        for invoice in invoices {
            let items = fetch_items(&mut conn, invoice.id).await?;
            result.push(InvoiceWithItems { invoice, items });
        }

        Ok(result)
    }

    /// Gets one invoice with its items.
    pub async fn get(&self, id: i64) -> DbResult<InvoiceWithItems> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");

        let mut conn = self.pool.acquire().await?;

        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))?;

        let items = fetch_items(&mut conn, id).await?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Changes an invoice's payment status.
    ///
    /// Stock and customer aggregates are not touched, cancelled included.
    pub async fn update_status(&self, id: i64, status: PaymentStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE invoices SET payment_status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        debug!(id = %id, status = status.as_str(), "Invoice status updated");
        Ok(())
    }

    /// Totals for the local day `today`.
    pub async fn today_summary(&self, today: NaiveDate) -> DbResult<DaySummary> {
        let from = day_start(today);
        let to = today
            .checked_add_days(Days::new(1))
            .map(day_start)
            .ok_or_else(|| DbError::Validation("Date out of range".to_string()))?;

        let summary = sqlx::query_as::<_, DaySummary>(
            r#"
            SELECT
                COUNT(*) AS total_invoices,
                COALESCE(SUM(total_cents), 0) AS total_amount_cents,
                COALESCE(SUM(CASE WHEN payment_status = 'paid' THEN total_cents ELSE 0 END), 0)
                    AS paid_amount_cents,
                COALESCE(SUM(CASE WHEN payment_status = 'pending' THEN total_cents ELSE 0 END), 0)
                    AS pending_amount_cents,
                COALESCE((
                    SELECT SUM(ii.quantity)
                    FROM invoice_items ii
                    JOIN invoices i2 ON i2.id = ii.invoice_id
                    WHERE i2.created_at >= ?1 AND i2.created_at < ?2
                ), 0) AS items_sold
            FROM invoices
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Hands out the next number of `day`'s sequence.
///
/// Must be the first statement of the invoice transaction.
async fn next_sequence(tx: &mut Transaction<'_, Sqlite>, day: NaiveDate) -> DbResult<i64> {
    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoice_sequences (day, last_seq) VALUES (?1, 1)
        ON CONFLICT(day) DO UPDATE SET last_seq = last_seq + 1
        RETURNING last_seq
        "#,
    )
    .bind(day.format("%Y%m%d").to_string())
    .fetch_one(&mut **tx)
    .await?;

    Ok(seq)
}

async fn fetch_items(
    conn: &mut sqlx::pool::PoolConnection<Sqlite>,
    invoice_id: i64,
) -> DbResult<Vec<InvoiceItem>> {
    let items = sqlx::query_as::<_, InvoiceItem>(
        r#"
        SELECT id, invoice_id, product_id, product_name,
               quantity, unit_price_cents, total_price_cents
        FROM invoice_items
        WHERE invoice_id = ?1
        ORDER BY id
        "#,
    )
    .bind(invoice_id)
    .fetch_all(&mut **conn)
    .await?;

    Ok(items)
}

// =============================================================================
// Unit Tests
// =============================================================================
