//! # User Repository
//!
//! Accounts, credentials and the protected primary admin.
//!
//! ## Primary Admin
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  First start                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  users table empty? ──yes──► insert admin / admin123 (id = 1)          │
//! │       │                                                                 │
//! │       no                                                                │
//! │       ▼                                                                 │
//! │  nothing to do                                                         │
//! │                                                                         │
//! │  id 1 can never be deleted, so the store always has an admin.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use billmaster_core::validation::{validate_email, validate_name, validate_password, validate_username};
use billmaster_core::{NewUser, Role, User, DEFAULT_ADMIN_USERNAME};

use super::{now_local, timestamp};
use crate::error::{DbError, DbResult};
use crate::password::hash_password;

/// Password of the account created on first start.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Row used to check a login. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks up the credential row for a login attempt.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, username, password_hash, full_name, role
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: i64) -> DbResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, email, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Lists all users ordered by ID.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, email, role, created_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Creates a user account.
    ///
    /// ## Errors
    /// * `Validation` - bad username, short password, blank full name
    /// * `Conflict` - "Username already exists"
    pub async fn create(&self, new_user: &NewUser) -> DbResult<User> {
        validate_username(&new_user.username)?;
        validate_password(&new_user.password)?;
        validate_name("full_name", &new_user.full_name)?;
        validate_email(new_user.email.as_deref())?;

        let username = new_user.username.trim();

        if self.find_by_username(username).await?.is_some() {
            return Err(DbError::Conflict("Username already exists".to_string()));
        }

        let password_hash = hash_password(&new_user.password)?;

        debug!(username = %username, role = new_user.role.as_str(), "Creating user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, full_name, email, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(new_user.full_name.trim())
        .bind(new_user.email.as_deref().map(str::trim).filter(|e| !e.is_empty()))
        .bind(new_user.role)
        .bind(timestamp(now_local()))
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            // Lost a race with a concurrent registration
            DbError::UniqueViolation { .. } => {
                DbError::Conflict("Username already exists".to_string())
            }
            other => other,
        })?;

        self.get(result.last_insert_rowid()).await
    }

    /// Replaces a user's password.
    pub async fn update_password(&self, id: i64, new_password: &str) -> DbResult<()> {
        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        let result = sqlx::query("UPDATE users SET password_hash = ?2 WHERE id = ?1")
            .bind(id)
            .bind(&password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        debug!(id = %id, "Password updated");
        Ok(())
    }

    /// Deletes a user.
    ///
    /// The primary admin (id 1) is protected. Invoices created by the user
    /// keep their rows; `user_id` becomes NULL.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        if id <= 1 {
            return Err(DbError::Validation("Cannot delete primary admin".to_string()));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        debug!(id = %id, "User deleted");
        Ok(())
    }

    /// Counts user accounts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Creates the default `admin` account when no user exists.
    ///
    /// ## Returns
    /// `true` if the account was created.
    pub async fn ensure_default_admin(&self) -> DbResult<bool> {
        if self.count().await? > 0 {
            return Ok(false);
        }

        self.create(&NewUser {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            full_name: "Administrator".to_string(),
            email: Some("admin@billmaster.com".to_string()),
            role: Role::Admin,
        })
        .await?;

        info!(username = DEFAULT_ADMIN_USERNAME, "Created default admin account");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use crate::{Database, DbConfig};

    fn staff(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "staff123".to_string(),
            full_name: "Staff Member".to_string(),
            email: None,
            role: Role::Staff,
        }
    }

    #[tokio::test]
    async fn test_default_admin_created_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.users().ensure_default_admin().await.unwrap());
        assert!(!db.users().ensure_default_admin().await.unwrap());

        let admin = db.users().find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.id, 1);
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password(DEFAULT_ADMIN_PASSWORD, &admin.password_hash));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().create(&staff("cashier1")).await.unwrap();

        let err = db.users().create(&staff("cashier1")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(ref m) if m == "Username already exists"));
    }

    #[tokio::test]
    async fn test_primary_admin_cannot_be_deleted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().ensure_default_admin().await.unwrap();
        let user = db.users().create(&staff("cashier2")).await.unwrap();

        assert!(matches!(db.users().delete(1).await, Err(DbError::Validation(_))));
        db.users().delete(user.id).await.unwrap();
        assert!(matches!(db.users().delete(user.id).await, Err(DbError::NotFound { .. })));
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create(&staff("manager")).await.unwrap();

        db.users().update_password(user.id, "manager123").await.unwrap();
        let creds = db.users().find_by_username("manager").await.unwrap().unwrap();
        assert!(verify_password("manager123", &creds.password_hash));
        assert!(!verify_password("staff123", &creds.password_hash));

        assert!(db.users().update_password(user.id, "123").await.is_err());
    }
}
