//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Filtered listing (category, name/barcode search)
//! - CRUD with soft delete
//! - Manual stock corrections
//!
//! ## Stock Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    adjust_stock(id, qty, op)                            │
//! │                                                                         │
//! │  op = set       stock = qty                                            │
//! │  op = add       stock = stock + qty                                    │
//! │  op = subtract  stock = MAX(0, stock - qty)                            │
//! │                                                                         │
//! │  One UPDATE ... RETURNING statement. The new value is computed by      │
//! │  SQLite, so two concurrent corrections never overwrite each other      │
//! │  with a stale read.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use billmaster_core::validation::{
    validate_name, validate_price_cents, validate_search_query, validate_stock,
};
use billmaster_core::{NewProduct, Product, ProductUpdate, StockOperation};

use super::{like_pattern, now_local, timestamp};
use crate::error::{DbError, DbResult};

/// Columns selected for every `Product`, with the joined category name.
const PRODUCT_COLUMNS: &str = r#"
    p.id,
    p.name,
    p.description,
    p.category_id,
    c.name AS category_name,
    p.price_cents,
    p.stock_quantity,
    p.unit,
    p.barcode,
    p.is_active,
    p.created_at,
    p.updated_at
"#;

/// Default selling unit.
pub const DEFAULT_UNIT: &str = "pcs";

/// Filters for [`ProductRepository::list`].
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
    /// Matches name or barcode anywhere.
    pub search: Option<String>,
    /// Hide soft-deleted products. Default: true
    pub active_only: bool,
}

impl Default for ProductFilter {
    fn default() -> Self {
        ProductFilter {
            category_id: None,
            search: None,
            active_only: true,
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let dairy = repo.list(&ProductFilter { category_id: Some(4), ..Default::default() }).await?;
/// let product = repo.get(12).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by name.
    ///
    /// ## Arguments
    /// * `filter` - optional category and search term; inactive products
    ///   are hidden unless `active_only` is false
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let search = match filter.search.as_deref() {
            Some(q) => Some(validate_search_query(q)?).filter(|q| !q.is_empty()),
            None => None,
        };

        debug!(category_id = ?filter.category_id, search = ?search, "Listing products");

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE (?1 = 0 OR p.is_active = 1)
              AND (?2 IS NULL OR p.category_id = ?2)
              AND (?3 IS NULL OR p.name LIKE ?3 OR p.barcode LIKE ?3)
            ORDER BY p.name
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter.active_only)
            .bind(filter.category_id)
            .bind(search.as_deref().map(like_pattern))
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by ID, active or not.
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = ?1
            "#
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Creates a product.
    ///
    /// ## Errors
    /// * `Validation` - blank name, price ≤ 0, negative stock
    /// * `ForeignKeyViolation` - `category_id` doesn't exist
    pub async fn create(&self, new_product: &NewProduct) -> DbResult<Product> {
        validate_name("name", &new_product.name)?;
        validate_price_cents(new_product.price_cents)?;
        validate_stock(new_product.stock_quantity)?;

        let now = timestamp(now_local());
        let unit = new_product
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_UNIT);

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, description, category_id, price_cents,
                stock_quantity, unit, barcode, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
            "#,
        )
        .bind(new_product.name.trim())
        .bind(new_product.description.as_deref())
        .bind(new_product.category_id)
        .bind(new_product.price_cents)
        .bind(new_product.stock_quantity)
        .bind(unit)
        .bind(new_product.barcode.as_deref())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id = %id, name = %new_product.name, "Product created");

        self.get(id).await
    }

    /// Applies a partial update. `None` fields are left unchanged; `Some(None)`
    /// clears a nullable column.
    pub async fn update(&self, id: i64, update: &ProductUpdate) -> DbResult<Product> {
        if let Some(name) = &update.name {
            validate_name("name", name)?;
        }
        if let Some(price) = update.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(stock) = update.stock_quantity {
            validate_stock(stock)?;
        }

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                description = CASE WHEN ?3 THEN ?4 ELSE description END,
                category_id = CASE WHEN ?5 THEN ?6 ELSE category_id END,
                price_cents = COALESCE(?7, price_cents),
                stock_quantity = COALESCE(?8, stock_quantity),
                unit = COALESCE(?9, unit),
                barcode = CASE WHEN ?10 THEN ?11 ELSE barcode END,
                is_active = COALESCE(?12, is_active),
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.description.is_some())
        .bind(update.description.as_ref().and_then(Option::as_deref))
        .bind(update.category_id.is_some())
        .bind(update.category_id.flatten())
        .bind(update.price_cents)
        .bind(update.stock_quantity)
        .bind(update.unit.as_deref())
        .bind(update.barcode.is_some())
        .bind(update.barcode.as_ref().and_then(Option::as_deref))
        .bind(update.is_active)
        .bind(timestamp(now_local()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(id = %id, "Product updated");
        self.get(id).await
    }

    /// Applies a manual stock correction and returns the new stock level.
    ///
    /// ## Arguments
    /// * `quantity` - non-negative amount; meaning depends on `op`
    pub async fn adjust_stock(&self, id: i64, quantity: i64, op: StockOperation) -> DbResult<i64> {
        validate_stock(quantity)?;

        debug!(id = %id, quantity = %quantity, op = ?op, "Adjusting stock");

        let sql = match op {
            StockOperation::Set => {
                "UPDATE products SET stock_quantity = ?2, updated_at = ?3 WHERE id = ?1 RETURNING stock_quantity"
            }
            StockOperation::Add => {
                "UPDATE products SET stock_quantity = stock_quantity + ?2, updated_at = ?3 WHERE id = ?1 RETURNING stock_quantity"
            }
            StockOperation::Subtract => {
                "UPDATE products SET stock_quantity = MAX(0, stock_quantity - ?2), updated_at = ?3 WHERE id = ?1 RETURNING stock_quantity"
            }
        };

        let stock: Option<i64> = sqlx::query_scalar(sql)
            .bind(id)
            .bind(quantity)
            .bind(timestamp(now_local()))
            .fetch_optional(&self.pool)
            .await?;

        stock.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// - Historical invoice items still reference this product
    /// - Can be restored by updating `is_active`
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(timestamp(now_local()))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use billmaster_core::NewCategory;

    fn rice(stock: i64) -> NewProduct {
        NewProduct {
            name: "Basmati Rice (5kg)".to_string(),
            description: Some("Premium long grain".to_string()),
            category_id: None,
            price_cents: 45_000,
            stock_quantity: stock,
            unit: Some("pack".to_string()),
            barcode: Some("8901234567890".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let grocery = db
            .categories()
            .create(&NewCategory {
                name: "Groceries".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let mut input = rice(50);
        input.category_id = Some(grocery.id);
        let created = db.products().create(&input).await.unwrap();

        assert_eq!(created.price_cents, 45_000);
        assert_eq!(created.category_name.as_deref(), Some("Groceries"));
        assert!(created.is_active);
        assert_eq!(db.products().count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut free = rice(1);
        free.price_cents = 0;
        assert!(matches!(db.products().create(&free).await, Err(DbError::Validation(_))));

        let mut negative = rice(1);
        negative.stock_quantity = -1;
        assert!(matches!(db.products().create(&negative).await, Err(DbError::Validation(_))));

        let mut orphan = rice(1);
        orphan.category_id = Some(999);
        assert!(matches!(
            db.products().create(&orphan).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().create(&rice(10)).await.unwrap();
        let repo = db.products();

        assert_eq!(repo.adjust_stock(p.id, 5, StockOperation::Add).await.unwrap(), 15);
        assert_eq!(repo.adjust_stock(p.id, 4, StockOperation::Subtract).await.unwrap(), 11);
        assert_eq!(repo.adjust_stock(p.id, 50, StockOperation::Subtract).await.unwrap(), 0);
        assert_eq!(repo.adjust_stock(p.id, 7, StockOperation::Set).await.unwrap(), 7);

        assert!(matches!(
            repo.adjust_stock(p.id, -1, StockOperation::Add).await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            repo.adjust_stock(999, 1, StockOperation::Add).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().create(&rice(10)).await.unwrap();
        db.products().soft_delete(p.id).await.unwrap();

        assert!(db.products().list(&ProductFilter::default()).await.unwrap().is_empty());

        let all = db
            .products()
            .list(&ProductFilter {
                active_only: false,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);

        // Still readable by id for invoice history
        assert!(!db.products().get(p.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_search_by_name_and_barcode() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().create(&rice(10)).await.unwrap();

        let by_name = ProductFilter {
            search: Some("basmati".to_string()),
            ..Default::default()
        };
        assert_eq!(db.products().list(&by_name).await.unwrap().len(), 1);

        let by_barcode = ProductFilter {
            search: Some("4567".to_string()),
            ..Default::default()
        };
        assert_eq!(db.products().list(&by_barcode).await.unwrap().len(), 1);

        let miss = ProductFilter {
            search: Some("cola".to_string()),
            ..Default::default()
        };
        assert!(db.products().list(&miss).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_clears_nullable_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db
            .categories()
            .create(&NewCategory {
                name: "Grains".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let mut new_product = rice(10);
        new_product.category_id = Some(category.id);
        let p = db.products().create(&new_product).await.unwrap();
        assert_eq!(p.category_id, Some(category.id));

        let updated = db
            .products()
            .update(
                p.id,
                &ProductUpdate {
                    category_id: Some(None),
                    barcode: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.category_id.is_none());
        assert!(updated.category_name.is_none());
        assert!(updated.barcode.is_none());
        assert_eq!(updated.description.as_deref(), Some("Premium long grain"));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().create(&rice(10)).await.unwrap();

        let updated = db
            .products()
            .update(
                p.id,
                &ProductUpdate {
                    price_cents: Some(47_500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price_cents, 47_500);
        assert_eq!(updated.name, "Basmati Rice (5kg)");
        assert_eq!(updated.stock_quantity, 10);
        assert_eq!(updated.unit, "pack");

        assert!(matches!(
            db.products()
                .update(p.id, &ProductUpdate { price_cents: Some(0), ..Default::default() })
                .await,
            Err(DbError::Validation(_))
        ));
    }
}
