//! # Expense Repository
//!
//! Shop expenses. Not linked to invoices or analytics.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use billmaster_core::validation::validate_name;
use billmaster_core::{Expense, NewExpense, ValidationError};

use super::{now_local, timestamp};
use crate::error::{DbError, DbResult};

/// Category used when none is given.
pub const DEFAULT_EXPENSE_CATEGORY: &str = "general";

const EXPENSE_COLUMNS: &str = "id, title, amount_cents, category, expense_date, description, created_at";

/// Repository for expenses.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Lists expenses, most recent `expense_date` first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY expense_date DESC, id DESC");

        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(expenses)
    }

    /// Gets an expense.
    pub async fn get(&self, id: i64) -> DbResult<Expense> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1");

        sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Expense", id))
    }

    /// Records an expense. A missing date means today.
    pub async fn create(&self, new_expense: &NewExpense) -> DbResult<Expense> {
        self.create_on(new_expense, now_local().date()).await
    }

    /// Records an expense, defaulting its date to `today`.
    pub async fn create_on(&self, new_expense: &NewExpense, today: NaiveDate) -> DbResult<Expense> {
        validate_name("title", &new_expense.title)?;
        if new_expense.amount_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "amount".to_string(),
            }
            .into());
        }

        let category = new_expense
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_EXPENSE_CATEGORY);
        let expense_date = new_expense.expense_date.unwrap_or(today);

        let result = sqlx::query(
            r#"
            INSERT INTO expenses (title, amount_cents, category, expense_date, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(new_expense.title.trim())
        .bind(new_expense.amount_cents)
        .bind(category)
        .bind(expense_date)
        .bind(new_expense.description.as_deref())
        .bind(timestamp(now_local()))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id = %id, amount_cents = new_expense.amount_cents, category = %category, "Expense recorded");

        self.get(id).await
    }

    /// Deletes an expense.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        debug!(id = %id, "Expense deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn rent(date: Option<NaiveDate>) -> NewExpense {
        NewExpense {
            title: "Shop rent".to_string(),
            amount_cents: 2_500_000,
            category: None,
            expense_date: date,
            description: Some("March".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let expense = db.expenses().create_on(&rent(None), today).await.unwrap();
        assert_eq!(expense.category, DEFAULT_EXPENSE_CATEGORY);
        assert_eq!(expense.expense_date, today);
        assert_eq!(expense.amount_cents, 2_500_000);
    }

    #[tokio::test]
    async fn test_rejects_missing_title_and_amount() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut blank = rent(None);
        blank.title = "  ".to_string();
        assert!(matches!(db.expenses().create(&blank).await, Err(DbError::Validation(_))));

        let mut free = rent(None);
        free.amount_cents = 0;
        assert!(matches!(db.expenses().create(&free).await, Err(DbError::Validation(_))));

        assert!(db.expenses().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let older = db
            .expenses()
            .create(&rent(NaiveDate::from_ymd_opt(2024, 2, 1)))
            .await
            .unwrap();
        let newer = db
            .expenses()
            .create(&rent(NaiveDate::from_ymd_opt(2024, 3, 1)))
            .await
            .unwrap();

        let ids: Vec<i64> = db.expenses().list().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        db.expenses().delete(older.id).await.unwrap();
        assert!(matches!(db.expenses().delete(older.id).await, Err(DbError::NotFound { .. })));
        assert_eq!(db.expenses().list().await.unwrap().len(), 1);
    }
}
