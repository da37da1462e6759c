//! # Customer Repository
//!
//! Customer CRUD. `total_orders` and `total_spent_cents` are never written
//! here; only the invoice transaction (and the demo seed) maintain them.

use sqlx::SqlitePool;
use tracing::debug;

use billmaster_core::validation::{validate_email, validate_name, validate_search_query};
use billmaster_core::{Customer, CustomerDetail, CustomerUpdate, Invoice, NewCustomer};

use super::invoice::INVOICE_COLUMNS;
use super::{like_pattern, now_local, timestamp};
use crate::error::{DbError, DbResult};

/// Number of invoices returned with a customer's detail view.
pub const RECENT_INVOICE_COUNT: i64 = 10;

const CUSTOMER_COLUMNS: &str =
    "id, name, phone, email, address, total_orders, total_spent_cents, created_at";

/// Repository for customers.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists customers ordered by name, optionally filtered by name, phone
    /// or email.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Customer>> {
        let search = match search {
            Some(q) => Some(validate_search_query(q)?).filter(|q| !q.is_empty()),
            None => None,
        };

        let sql = format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE ?1 IS NULL OR name LIKE ?1 OR phone LIKE ?1 OR email LIKE ?1
            ORDER BY name
            "#
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(search.as_deref().map(like_pattern))
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Gets a customer row.
    pub async fn get(&self, id: i64) -> DbResult<Customer> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");

        sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Gets a customer with their most recent invoices.
    pub async fn get_detail(&self, id: i64) -> DbResult<CustomerDetail> {
        let customer = self.get(id).await?;

        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE customer_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#
        );

        let recent_invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .bind(RECENT_INVOICE_COUNT)
            .fetch_all(&self.pool)
            .await?;

        Ok(CustomerDetail {
            customer,
            recent_invoices,
        })
    }

    /// Creates a customer with zeroed aggregates.
    pub async fn create(&self, new_customer: &NewCustomer) -> DbResult<Customer> {
        validate_name("name", &new_customer.name)?;
        validate_email(new_customer.email.as_deref())?;

        let result = sqlx::query(
            r#"
            INSERT INTO customers (name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(new_customer.name.trim())
        .bind(new_customer.phone.as_deref())
        .bind(new_customer.email.as_deref())
        .bind(new_customer.address.as_deref())
        .bind(timestamp(now_local()))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id = %id, name = %new_customer.name, "Customer created");

        self.get(id).await
    }

    /// Applies a partial update. `None` fields are left unchanged; `Some(None)`
    /// clears phone, email or address.
    pub async fn update(&self, id: i64, update: &CustomerUpdate) -> DbResult<Customer> {
        if let Some(name) = &update.name {
            validate_name("name", name)?;
        }
        if let Some(email) = &update.email {
            validate_email(email.as_deref())?;
        }

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = COALESCE(?2, name),
                phone = CASE WHEN ?3 THEN ?4 ELSE phone END,
                email = CASE WHEN ?5 THEN ?6 ELSE email END,
                address = CASE WHEN ?7 THEN ?8 ELSE address END
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.phone.is_some())
        .bind(update.phone.as_ref().and_then(Option::as_deref))
        .bind(update.email.is_some())
        .bind(update.email.as_ref().and_then(Option::as_deref))
        .bind(update.address.is_some())
        .bind(update.address.as_ref().and_then(Option::as_deref))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        debug!(id = %id, "Customer updated");
        self.get(id).await
    }

    /// Deletes a customer. Their invoices stay, with `customer_id` cleared
    /// and the `customer_name` snapshot intact.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        debug!(id = %id, "Customer deleted");
        Ok(())
    }

    /// Counts customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn rahul() -> NewCustomer {
        NewCustomer {
            name: "Rahul Sharma".to_string(),
            phone: Some("9876543210".to_string()),
            email: Some("rahul@example.com".to_string()),
            address: Some("12, MG Road, Mumbai".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_starts_with_zero_aggregates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let c = db.customers().create(&rahul()).await.unwrap();

        assert_eq!(c.total_orders, 0);
        assert_eq!(c.total_spent_cents, 0);

        let detail = db.customers().get_detail(c.id).await.unwrap();
        assert!(detail.recent_invoices.is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_phone() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.customers().create(&rahul()).await.unwrap();
        db.customers()
            .create(&NewCustomer {
                name: "Priya Patel".to_string(),
                phone: Some("9876543211".to_string()),
                email: None,
                address: None,
            })
            .await
            .unwrap();

        assert_eq!(db.customers().list(None).await.unwrap().len(), 2);
        assert_eq!(db.customers().list(Some("3210")).await.unwrap().len(), 1);
        assert_eq!(db.customers().list(Some("priya")).await.unwrap()[0].name, "Priya Patel");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let c = db.customers().create(&rahul()).await.unwrap();

        let updated = db
            .customers()
            .update(
                c.id,
                &CustomerUpdate {
                    address: Some(Some("45, Park Street, Kolkata".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address.as_deref(), Some("45, Park Street, Kolkata"));
        assert_eq!(updated.phone.as_deref(), Some("9876543210"));

        assert!(db
            .customers()
            .update(c.id, &CustomerUpdate { email: Some(Some("broken".into())), ..Default::default() })
            .await
            .is_err());

        let cleared = db
            .customers()
            .update(c.id, &CustomerUpdate { email: Some(None), ..Default::default() })
            .await
            .unwrap();
        assert!(cleared.email.is_none());
        assert_eq!(cleared.address.as_deref(), Some("45, Park Street, Kolkata"));

        db.customers().delete(c.id).await.unwrap();
        assert!(matches!(db.customers().get(c.id).await, Err(DbError::NotFound { .. })));
        assert_eq!(db.customers().count().await.unwrap(), 0);
    }
}
