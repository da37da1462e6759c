//! # Analytics Queries
//!
//! Read-only aggregates over invoices and invoice items for the dashboard
//! and reports.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  • Every query takes `today` explicitly; windows are local days        │
//! │    computed here and bound as 'YYYY-MM-DD 00:00:00' bounds.            │
//! │  • Sums are COALESCEd, so an empty store yields zeros, never errors.   │
//! │  • Series (sales chart, hourly, monthly) are gap-filled: every day,    │
//! │    hour or month in the window has a point.                            │
//! │  • Money stays in minor units; only percentages are floats.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use billmaster_core::{Money, PaymentMethod, PaymentStatus};

use super::day_start;
use crate::error::{DbError, DbResult};

// =============================================================================
// Result Types
// =============================================================================

/// Invoice totals over a time window.
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct WindowTotals {
    pub invoices: i64,
    pub revenue_cents: i64,
    pub paid_revenue_cents: i64,
    pub pending_revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayStats {
    pub invoices: i64,
    pub revenue_cents: i64,
    pub paid_revenue_cents: i64,
    pub pending_revenue_cents: i64,
    pub items_sold: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodStats {
    pub invoices: i64,
    pub revenue_cents: i64,
}

impl From<&WindowTotals> for PeriodStats {
    fn from(totals: &WindowTotals) -> Self {
        PeriodStats {
            invoices: totals.invoices,
            revenue_cents: totals.revenue_cents,
        }
    }
}

/// Dashboard header cards.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub today: TodayStats,
    pub yesterday: PeriodStats,
    pub month: PeriodStats,
    /// Today's revenue vs yesterday's, in percent (one decimal).
    /// 0 when yesterday had no revenue.
    pub revenue_growth: f64,
    /// Active products.
    pub products: i64,
    pub customers: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesPoint {
    pub date: NaiveDate,
    pub total_cents: i64,
    pub count: i64,
    pub paid_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodShare {
    pub payment_method: PaymentMethod,
    pub total_cents: i64,
    pub count: i64,
    /// Share of the window's revenue (one decimal).
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    /// Current catalogue price.
    pub unit_price_cents: i64,
    pub sold: i64,
    pub revenue_cents: i64,
    /// Average price actually charged.
    pub avg_price_cents: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LowStockProduct {
    pub id: i64,
    pub name: String,
    pub stock_quantity: i64,
    pub unit: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlyBucket {
    pub hour: u32,
    pub invoices: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecentInvoice {
    pub id: i64,
    pub invoice_number: String,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: NaiveDateTime,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStats {
    /// `YYYY-MM`
    pub month: String,
    /// `Mar 2024`
    pub month_name: String,
    pub invoices: i64,
    pub revenue_cents: i64,
    pub paid_cents: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerStat {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub total_orders: i64,
    pub total_spent_cents: i64,
    pub last_order: Option<NaiveDateTime>,
}

/// Reporting period for [`AnalyticsRepository::summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryPeriod {
    #[default]
    Today,
    /// The last seven days plus today.
    Week,
    /// The calendar month containing today.
    Month,
    /// The calendar year containing today.
    Year,
    All,
}

impl FromStr for SummaryPeriod {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" | "" => Ok(SummaryPeriod::Today),
            "week" => Ok(SummaryPeriod::Week),
            "month" => Ok(SummaryPeriod::Month),
            "year" => Ok(SummaryPeriod::Year),
            "all" => Ok(SummaryPeriod::All),
            other => Err(DbError::Validation(format!(
                "period must be one of today, week, month, year, all (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub period: SummaryPeriod,
    pub total_invoices: i64,
    pub total_revenue_cents: i64,
    pub paid_amount_cents: i64,
    pub pending_amount_cents: i64,
    pub avg_order_value_cents: i64,
    pub unique_customers: i64,
    pub items_sold: i64,
}

// =============================================================================
// Windows
// =============================================================================

/// Half-open `[from, to)` range over `created_at`. `None` is unbounded.
#[derive(Debug, Clone, Default)]
struct Window {
    from: Option<String>,
    to: Option<String>,
}

impl Window {
    fn days(from: NaiveDate, to_exclusive: NaiveDate) -> Self {
        Window {
            from: Some(day_start(from)),
            to: Some(day_start(to_exclusive)),
        }
    }

    fn since(from: NaiveDate) -> Self {
        Window {
            from: Some(day_start(from)),
            to: None,
        }
    }

    fn all() -> Self {
        Window::default()
    }
}

fn add_days(day: NaiveDate, n: u64) -> DbResult<NaiveDate> {
    day.checked_add_days(Days::new(n))
        .ok_or_else(|| DbError::Validation("Date out of range".to_string()))
}

fn sub_days(day: NaiveDate, n: u64) -> DbResult<NaiveDate> {
    day.checked_sub_days(Days::new(n))
        .ok_or_else(|| DbError::Validation("Date out of range".to_string()))
}

fn first_of_month(day: NaiveDate) -> DbResult<NaiveDate> {
    day.with_day(1)
        .ok_or_else(|| DbError::Validation("Date out of range".to_string()))
}

fn shift_months(day: NaiveDate, back: u32, forward: u32) -> DbResult<NaiveDate> {
    day.checked_sub_months(Months::new(back))
        .and_then(|d| d.checked_add_months(Months::new(forward)))
        .ok_or_else(|| DbError::Validation("Date out of range".to_string()))
}

// =============================================================================
// Repository
// =============================================================================

/// Read-only analytics queries.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    /// Creates a new AnalyticsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// Dashboard cards: today, yesterday, this month, growth and counts.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<Dashboard> {
        let tomorrow = add_days(today, 1)?;
        let yesterday = sub_days(today, 1)?;
        let month_start = first_of_month(today)?;
        let next_month = shift_months(month_start, 0, 1)?;

        let today_window = Window::days(today, tomorrow);
        let today_totals = self.window_totals(&today_window).await?;
        let items_sold = self.items_sold(&today_window).await?;
        let yesterday_totals = self.window_totals(&Window::days(yesterday, today)).await?;
        let month_totals = self.window_totals(&Window::days(month_start, next_month)).await?;

        let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        let customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        let revenue_growth = {
            let current = Money::from_cents(today_totals.revenue_cents);
            let previous = Money::from_cents(yesterday_totals.revenue_cents);
            (current - previous).percentage_of(previous)
        };

        Ok(Dashboard {
            today: TodayStats {
                invoices: today_totals.invoices,
                revenue_cents: today_totals.revenue_cents,
                paid_revenue_cents: today_totals.paid_revenue_cents,
                pending_revenue_cents: today_totals.pending_revenue_cents,
                items_sold,
            },
            yesterday: PeriodStats::from(&yesterday_totals),
            month: PeriodStats::from(&month_totals),
            revenue_growth,
            products,
            customers,
        })
    }

    /// One point per day for the last `days` days (today included), oldest
    /// first. `days` is clamped to `1..=365`.
    pub async fn sales_chart(&self, today: NaiveDate, days: u32) -> DbResult<Vec<SalesPoint>> {
        let days = days.clamp(1, 365) as u64;
        let first = sub_days(today, days - 1)?;

        let rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                substr(created_at, 1, 10) AS day,
                COALESCE(SUM(total_cents), 0) AS total,
                COUNT(*) AS count,
                COALESCE(SUM(CASE WHEN payment_status = 'paid' THEN total_cents ELSE 0 END), 0) AS paid
            FROM invoices
            WHERE created_at >= ?1 AND created_at < ?2
            GROUP BY day
            "#,
        )
        .bind(day_start(first))
        .bind(day_start(add_days(today, 1)?))
        .fetch_all(&self.pool)
        .await?;

        let by_day: HashMap<String, (i64, i64, i64)> = rows
            .into_iter()
            .map(|(day, total, count, paid)| (day, (total, count, paid)))
            .collect();

        let mut points = Vec::with_capacity(days as usize);
        for offset in 0..days {
            let date = add_days(first, offset)?;
            let (total_cents, count, paid_cents) = by_day
                .get(&date.format("%Y-%m-%d").to_string())
                .copied()
                .unwrap_or_default();
            points.push(SalesPoint {
                date,
                total_cents,
                count,
                paid_cents,
            });
        }

        Ok(points)
    }

    /// Revenue by payment method over the last 30 days, largest first.
    ///
    /// An empty window yields a single zeroed `cash` row.
    pub async fn payment_methods(&self, today: NaiveDate) -> DbResult<Vec<PaymentMethodShare>> {
        let rows: Vec<(PaymentMethod, i64, i64)> = sqlx::query_as(
            r#"
            SELECT payment_method, COALESCE(SUM(total_cents), 0) AS total, COUNT(*) AS count
            FROM invoices
            WHERE created_at >= ?1
            GROUP BY payment_method
            ORDER BY total DESC
            "#,
        )
        .bind(day_start(sub_days(today, 30)?))
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(vec![PaymentMethodShare {
                payment_method: PaymentMethod::Cash,
                total_cents: 0,
                count: 0,
                percentage: 0.0,
            }]);
        }

        let grand_total: Money = rows.iter().map(|(_, total, _)| Money::from_cents(*total)).sum();

        Ok(rows
            .into_iter()
            .map(|(payment_method, total_cents, count)| PaymentMethodShare {
                payment_method,
                total_cents,
                count,
                percentage: Money::from_cents(total_cents).percentage_of(grand_total),
            })
            .collect())
    }

    /// Best sellers by revenue over the last `days` days.
    pub async fn top_products(&self, today: NaiveDate, limit: u32, days: u32) -> DbResult<Vec<TopProduct>> {
        let since = sub_days(today, days.clamp(1, 3650) as u64)?;

        let products = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT
                p.id AS product_id,
                p.name,
                p.price_cents AS unit_price_cents,
                SUM(ii.quantity) AS sold,
                SUM(ii.total_price_cents) AS revenue_cents,
                CAST(ROUND(AVG(ii.unit_price_cents)) AS INTEGER) AS avg_price_cents
            FROM invoice_items ii
            JOIN products p ON p.id = ii.product_id
            JOIN invoices i ON i.id = ii.invoice_id
            WHERE i.created_at >= ?1
            GROUP BY p.id, p.name, p.price_cents
            ORDER BY revenue_cents DESC
            LIMIT ?2
            "#,
        )
        .bind(day_start(since))
        .bind(limit.clamp(1, 100) as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Active products at or below `threshold`, lowest stock first (max 10).
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<LowStockProduct>> {
        let products = sqlx::query_as::<_, LowStockProduct>(
            r#"
            SELECT id, name, stock_quantity, unit, price_cents
            FROM products
            WHERE is_active = 1 AND stock_quantity <= ?1
            ORDER BY stock_quantity ASC, name
            LIMIT 10
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Today's invoices bucketed by hour. Always 24 buckets.
    pub async fn hourly_sales(&self, today: NaiveDate) -> DbResult<Vec<HourlyBucket>> {
        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                CAST(strftime('%H', created_at) AS INTEGER) AS hour,
                COUNT(*) AS invoices,
                COALESCE(SUM(total_cents), 0) AS revenue
            FROM invoices
            WHERE created_at >= ?1 AND created_at < ?2
            GROUP BY hour
            "#,
        )
        .bind(day_start(today))
        .bind(day_start(add_days(today, 1)?))
        .fetch_all(&self.pool)
        .await?;

        let mut buckets: Vec<HourlyBucket> = (0..24)
            .map(|hour| HourlyBucket {
                hour,
                invoices: 0,
                revenue_cents: 0,
            })
            .collect();

        for (hour, invoices, revenue_cents) in rows {
            if let Some(bucket) = usize::try_from(hour).ok().and_then(|h| buckets.get_mut(h)) {
                bucket.invoices = invoices;
                bucket.revenue_cents = revenue_cents;
            }
        }

        Ok(buckets)
    }

    /// Latest invoices with the customer's current (or snapshot) name.
    pub async fn recent_invoices(&self, limit: u32) -> DbResult<Vec<RecentInvoice>> {
        let invoices = sqlx::query_as::<_, RecentInvoice>(
            r#"
            SELECT
                i.id,
                i.invoice_number,
                i.total_cents,
                i.payment_method,
                i.payment_status,
                i.created_at,
                COALESCE(c.name, i.customer_name) AS customer_name
            FROM invoices i
            LEFT JOIN customers c ON c.id = i.customer_id
            ORDER BY i.created_at DESC, i.id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit.clamp(1, 100) as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// The last `months` calendar months (current included), oldest first.
    pub async fn monthly(&self, today: NaiveDate, months: u32) -> DbResult<Vec<MonthlyStats>> {
        let months = months.clamp(1, 36);
        let current = first_of_month(today)?;
        let first = shift_months(current, months - 1, 0)?;
        let end = shift_months(current, 0, 1)?;

        let rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                substr(created_at, 1, 7) AS month,
                COUNT(*) AS invoices,
                COALESCE(SUM(total_cents), 0) AS revenue,
                COALESCE(SUM(CASE WHEN payment_status = 'paid' THEN total_cents ELSE 0 END), 0) AS paid
            FROM invoices
            WHERE created_at >= ?1 AND created_at < ?2
            GROUP BY month
            "#,
        )
        .bind(day_start(first))
        .bind(day_start(end))
        .fetch_all(&self.pool)
        .await?;

        let by_month: HashMap<String, (i64, i64, i64)> = rows
            .into_iter()
            .map(|(month, invoices, revenue, paid)| (month, (invoices, revenue, paid)))
            .collect();

        let mut stats = Vec::with_capacity(months as usize);
        for offset in 0..months {
            let start = shift_months(first, 0, offset)?;
            let month = start.format("%Y-%m").to_string();
            let (invoices, revenue_cents, paid_cents) =
                by_month.get(&month).copied().unwrap_or_default();
            stats.push(MonthlyStats {
                month_name: start.format("%b %Y").to_string(),
                month,
                invoices,
                revenue_cents,
                paid_cents,
            });
        }

        Ok(stats)
    }

    /// Top spenders with at least one invoice.
    pub async fn customer_stats(&self, limit: u32) -> DbResult<Vec<CustomerStat>> {
        let stats = sqlx::query_as::<_, CustomerStat>(
            r#"
            SELECT
                c.id,
                c.name,
                c.phone,
                COUNT(i.id) AS total_orders,
                COALESCE(SUM(i.total_cents), 0) AS total_spent_cents,
                MAX(i.created_at) AS last_order
            FROM customers c
            JOIN invoices i ON i.customer_id = c.id
            GROUP BY c.id, c.name, c.phone
            HAVING COUNT(i.id) > 0
            ORDER BY total_spent_cents DESC
            LIMIT ?1
            "#,
        )
        .bind(limit.clamp(1, 100) as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Report totals for a period ending today.
    pub async fn summary(&self, today: NaiveDate, period: SummaryPeriod) -> DbResult<Summary> {
        let tomorrow = add_days(today, 1)?;
        let window = match period {
            SummaryPeriod::Today => Window::days(today, tomorrow),
            SummaryPeriod::Week => Window::since(sub_days(today, 7)?),
            SummaryPeriod::Month => {
                let start = first_of_month(today)?;
                Window::days(start, shift_months(start, 0, 1)?)
            }
            SummaryPeriod::Year => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
                    .ok_or_else(|| DbError::Validation("Date out of range".to_string()))?;
                Window::days(start, shift_months(start, 0, 12)?)
            }
            SummaryPeriod::All => Window::all(),
        };

        debug!(period = ?period, from = ?window.from, to = ?window.to, "Building summary");

        let (total_invoices, total_revenue_cents, paid_amount_cents, pending_amount_cents, avg, unique_customers): (
            i64,
            i64,
            i64,
            i64,
            f64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(total_cents), 0),
                COALESCE(SUM(CASE WHEN payment_status = 'paid' THEN total_cents ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN payment_status = 'pending' THEN total_cents ELSE 0 END), 0),
                COALESCE(AVG(total_cents), 0.0),
                COUNT(DISTINCT customer_id)
            FROM invoices
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at < ?2)
            "#,
        )
        .bind(window.from.as_deref())
        .bind(window.to.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let items_sold = self.items_sold(&window).await?;

        Ok(Summary {
            period,
            total_invoices,
            total_revenue_cents,
            paid_amount_cents,
            pending_amount_cents,
            avg_order_value_cents: avg.round() as i64,
            unique_customers,
            items_sold,
        })
    }

    // -------------------------------------------------------------------------
    // Shared aggregates
    // -------------------------------------------------------------------------

    async fn window_totals(&self, window: &Window) -> DbResult<WindowTotals> {
        let totals = sqlx::query_as::<_, WindowTotals>(
            r#"
            SELECT
                COUNT(*) AS invoices,
                COALESCE(SUM(total_cents), 0) AS revenue_cents,
                COALESCE(SUM(CASE WHEN payment_status = 'paid' THEN total_cents ELSE 0 END), 0)
                    AS paid_revenue_cents,
                COALESCE(SUM(CASE WHEN payment_status = 'pending' THEN total_cents ELSE 0 END), 0)
                    AS pending_revenue_cents
            FROM invoices
            WHERE (?1 IS NULL OR created_at >= ?1)
              AND (?2 IS NULL OR created_at < ?2)
            "#,
        )
        .bind(window.from.as_deref())
        .bind(window.to.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn items_sold(&self, window: &Window) -> DbResult<i64> {
        let sold: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(ii.quantity), 0)
            FROM invoice_items ii
            JOIN invoices i ON i.id = ii.invoice_id
            WHERE (?1 IS NULL OR i.created_at >= ?1)
              AND (?2 IS NULL OR i.created_at < ?2)
            "#,
        )
        .bind(window.from.as_deref())
        .bind(window.to.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(sold)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use billmaster_core::{CartLine, CartRequest, NewCustomer, NewProduct};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn product(db: &Database, name: &str, price_cents: i64, stock: i64) -> i64 {
        db.products()
            .create(&NewProduct {
                name: name.to_string(),
                description: None,
                category_id: None,
                price_cents,
                stock_quantity: stock,
                unit: None,
                barcode: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn sell(
        db: &Database,
        product_id: i64,
        quantity: i64,
        unit_price_cents: i64,
        method: PaymentMethod,
        status: PaymentStatus,
        at: NaiveDateTime,
    ) {
        let cart = CartRequest {
            items: vec![CartLine {
                product_id,
                quantity,
                unit_price_cents,
            }],
            tax_rate: Some(0.0),
            payment_method: method,
            payment_status: status,
            ..CartRequest::default()
        };
        db.invoices().create_at(&cart, None, at).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_store_yields_zeros() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let analytics = db.analytics();
        let today = day(2024, 3, 9);

        let dash = analytics.dashboard(today).await.unwrap();
        assert_eq!(dash.today.invoices, 0);
        assert_eq!(dash.revenue_growth, 0.0);

        assert!(analytics.top_products(today, 5, 30).await.unwrap().is_empty());
        assert_eq!(analytics.hourly_sales(today).await.unwrap().len(), 24);
        assert_eq!(analytics.sales_chart(today, 7).await.unwrap().len(), 7);

        let methods = analytics.payment_methods(today).await.unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].payment_method, PaymentMethod::Cash);
        assert_eq!(methods[0].total_cents, 0);

        let summary = analytics.summary(today, SummaryPeriod::All).await.unwrap();
        assert_eq!(summary.total_invoices, 0);
        assert_eq!(summary.avg_order_value_cents, 0);

        assert!(analytics.customer_stats(5).await.unwrap().is_empty());
        assert!(analytics.recent_invoices(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_and_growth() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "Wireless Earbuds", 149_900, 25).await;
        let today = day(2024, 3, 9);
        let at = |d: NaiveDate, h: u32| d.and_hms_opt(h, 0, 0).unwrap();

        // Yesterday 100.00, today 150.00 (50.00 of it pending)
        sell(&db, p, 1, 10_000, PaymentMethod::Cash, PaymentStatus::Paid, at(day(2024, 3, 8), 10)).await;
        sell(&db, p, 1, 10_000, PaymentMethod::Upi, PaymentStatus::Paid, at(today, 9)).await;
        sell(&db, p, 2, 2_500, PaymentMethod::Card, PaymentStatus::Pending, at(today, 14)).await;

        let dash = db.analytics().dashboard(today).await.unwrap();
        assert_eq!(dash.today.invoices, 2);
        assert_eq!(dash.today.revenue_cents, 15_000);
        assert_eq!(dash.today.paid_revenue_cents, 10_000);
        assert_eq!(dash.today.pending_revenue_cents, 5_000);
        assert_eq!(dash.today.items_sold, 3);
        assert_eq!(dash.yesterday.revenue_cents, 10_000);
        assert_eq!(dash.month.invoices, 3);
        assert_eq!(dash.revenue_growth, 50.0);
        assert_eq!(dash.products, 1);

        let hourly = db.analytics().hourly_sales(today).await.unwrap();
        assert_eq!(hourly[9].invoices, 1);
        assert_eq!(hourly[14].revenue_cents, 5_000);
        assert_eq!(hourly[10].invoices, 0);
    }

    #[tokio::test]
    async fn test_sales_chart_fills_gaps() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "Coca Cola (500ml)", 4_000, 120).await;
        let today = day(2024, 3, 9);

        sell(&db, p, 1, 4_000, PaymentMethod::Cash, PaymentStatus::Paid, day(2024, 3, 7).and_hms_opt(12, 0, 0).unwrap()).await;

        let chart = db.analytics().sales_chart(today, 3).await.unwrap();
        let dates: Vec<String> = chart.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-07", "2024-03-08", "2024-03-09"]);
        assert_eq!(chart[0].total_cents, 4_000);
        assert_eq!(chart[0].count, 1);
        assert_eq!(chart[1].count, 0);

        // days = 0 still yields today
        assert_eq!(db.analytics().sales_chart(today, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_method_percentages() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "Notebook (200 pages)", 1_000, 100).await;
        let today = day(2024, 3, 9);
        let noon = today.and_hms_opt(12, 0, 0).unwrap();

        sell(&db, p, 2, 1_000, PaymentMethod::Cash, PaymentStatus::Paid, noon).await;
        sell(&db, p, 1, 1_000, PaymentMethod::Upi, PaymentStatus::Paid, noon).await;

        let methods = db.analytics().payment_methods(today).await.unwrap();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].payment_method, PaymentMethod::Cash);
        assert_eq!(methods[0].percentage, 66.7);
        assert_eq!(methods[1].percentage, 33.3);
    }

    #[tokio::test]
    async fn test_top_products_and_low_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rice = product(&db, "Basmati Rice (5kg)", 45_000, 12).await;
        let salt = product(&db, "Tata Salt (1kg)", 2_800, 5).await;
        let today = day(2024, 3, 9);
        let noon = today.and_hms_opt(12, 0, 0).unwrap();

        sell(&db, rice, 1, 45_000, PaymentMethod::Cash, PaymentStatus::Paid, noon).await;
        sell(&db, rice, 1, 44_000, PaymentMethod::Cash, PaymentStatus::Paid, noon).await;
        sell(&db, salt, 3, 2_800, PaymentMethod::Cash, PaymentStatus::Paid, noon).await;

        let top = db.analytics().top_products(today, 5, 30).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, rice);
        assert_eq!(top[0].sold, 2);
        assert_eq!(top[0].revenue_cents, 89_000);
        assert_eq!(top[0].avg_price_cents, 44_500);
        assert_eq!(top[1].sold, 3);

        // rice 12 - 2 = 10, salt 5 - 3 = 2
        let low = db.analytics().low_stock(10).await.unwrap();
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].name, "Tata Salt (1kg)");
        assert_eq!(low[0].stock_quantity, 2);
        assert_eq!(db.analytics().low_stock(5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_monthly_uses_calendar_months() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "Dettol Soap (125g)", 5_500, 100).await;

        sell(&db, p, 1, 5_500, PaymentMethod::Card, PaymentStatus::Paid, day(2024, 1, 31).and_hms_opt(20, 0, 0).unwrap()).await;
        sell(&db, p, 1, 5_500, PaymentMethod::Card, PaymentStatus::Pending, day(2024, 3, 1).and_hms_opt(8, 0, 0).unwrap()).await;

        let months = db.analytics().monthly(day(2024, 3, 31), 3).await.unwrap();
        let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(months[0].month_name, "Jan 2024");
        assert_eq!(months[0].paid_cents, 5_500);
        assert_eq!(months[1].invoices, 0);
        assert_eq!(months[2].revenue_cents, 5_500);
        assert_eq!(months[2].paid_cents, 0);
    }

    #[tokio::test]
    async fn test_customer_stats_and_summary() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = product(&db, "Pampers Diapers (M)", 79_900, 100).await;
        let buyer = db
            .customers()
            .create(&NewCustomer {
                name: "Sneha Reddy".to_string(),
                phone: Some("9876543215".to_string()),
                email: None,
                address: None,
            })
            .await
            .unwrap();
        db.customers()
            .create(&NewCustomer {
                name: "Window Shopper".to_string(),
                phone: None,
                email: None,
                address: None,
            })
            .await
            .unwrap();

        let today = day(2024, 3, 9);
        let cart = CartRequest {
            customer_id: Some(buyer.id),
            items: vec![CartLine {
                product_id: p,
                quantity: 1,
                unit_price_cents: 79_900,
            }],
            tax_rate: Some(0.0),
            ..CartRequest::default()
        };
        db.invoices().create_at(&cart, None, today.and_hms_opt(11, 0, 0).unwrap()).await.unwrap();
        sell(&db, p, 1, 20_100, PaymentMethod::Cash, PaymentStatus::Pending, day(2024, 2, 1).and_hms_opt(11, 0, 0).unwrap()).await;

        let stats = db.analytics().customer_stats(5).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "Sneha Reddy");
        assert_eq!(stats[0].total_spent_cents, 79_900);
        assert!(stats[0].last_order.is_some());

        let today_summary = db.analytics().summary(today, SummaryPeriod::Today).await.unwrap();
        assert_eq!(today_summary.total_invoices, 1);
        assert_eq!(today_summary.unique_customers, 1);

        let year = db.analytics().summary(today, SummaryPeriod::Year).await.unwrap();
        assert_eq!(year.total_invoices, 2);
        assert_eq!(year.total_revenue_cents, 100_000);
        assert_eq!(year.pending_amount_cents, 20_100);
        assert_eq!(year.avg_order_value_cents, 50_000);
        assert_eq!(year.items_sold, 2);

        let recent = db.analytics().recent_invoices(1).await.unwrap();
        assert_eq!(recent[0].customer_name.as_deref(), Some("Sneha Reddy"));
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("week".parse::<SummaryPeriod>().unwrap(), SummaryPeriod::Week);
        assert_eq!("".parse::<SummaryPeriod>().unwrap(), SummaryPeriod::Today);
        assert!("decade".parse::<SummaryPeriod>().is_err());
    }
}
