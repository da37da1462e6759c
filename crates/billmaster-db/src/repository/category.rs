//! # Category Repository
//!
//! Category CRUD. Deletion is guarded: a category that still has active
//! products cannot be removed. Soft-deleted products don't count; their
//! `category_id` is cleared by `ON DELETE SET NULL`.

use sqlx::SqlitePool;
use tracing::debug;

use billmaster_core::validation::validate_name;
use billmaster_core::{Category, CategoryUpdate, CategoryWithCount, NewCategory};

use super::{now_local, timestamp};
use crate::error::{DbError, DbResult};

/// Repository for product categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists categories with their active product counts, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<CategoryWithCount>> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT
                c.id,
                c.name,
                c.description,
                c.created_at,
                COUNT(p.id) AS product_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id AND p.is_active = 1
            GROUP BY c.id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by ID.
    pub async fn get(&self, id: i64) -> DbResult<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Creates a category.
    pub async fn create(&self, new_category: &NewCategory) -> DbResult<Category> {
        validate_name("name", &new_category.name)?;

        let result = sqlx::query(
            "INSERT INTO categories (name, description, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(new_category.name.trim())
        .bind(new_category.description.as_deref())
        .bind(timestamp(now_local()))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id = %id, name = %new_category.name, "Category created");

        self.get(id).await
    }

    /// Applies a partial update. `Some(None)` clears the description.
    pub async fn update(&self, id: i64, update: &CategoryUpdate) -> DbResult<Category> {
        if let Some(name) = &update.name {
            validate_name("name", name)?;
        }

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = COALESCE(?2, name),
                description = CASE WHEN ?3 THEN ?4 ELSE description END
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.description.is_some())
        .bind(update.description.as_ref().and_then(Option::as_deref))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        debug!(id = %id, "Category updated");
        self.get(id).await
    }

    /// Deletes a category that has no active products.
    ///
    /// ## Errors
    /// * `Conflict` - "Cannot delete category with N products"
    /// * `NotFound` - no such category
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let in_use: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE category_id = ?1 AND is_active = 1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if in_use > 0 {
            return Err(DbError::Conflict(format!(
                "Cannot delete category with {} products",
                in_use
            )));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        tx.commit().await?;

        debug!(id = %id, "Category deleted");
        Ok(())
    }
}
