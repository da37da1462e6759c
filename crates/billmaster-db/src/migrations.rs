//! Schema migrations.
//!
//! The SQL under `migrations/sqlite/` is compiled into the binary, so a fresh
//! database file gets the billing schema (users, catalog, customers,
//! invoices, settings, expenses) on first open with no files on disk.
//! sqlx records applied versions and checksums in `_sqlx_migrations`.
//!
//! Schema changes go in a new `NNN_<what>.sql` file. An applied file must not
//! be edited; its checksum would no longer match.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far a database is behind the embedded schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn pending(&self) -> usize {
        self.embedded.saturating_sub(self.applied)
    }

    pub fn is_current(&self) -> bool {
        self.pending() == 0
    }
}

/// Applies every embedded migration the database has not seen yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await?;
    if before.is_current() {
        info!(applied = before.applied, "Schema up to date");
        return Ok(());
    }

    MIGRATOR.run(pool).await?;
    info!(count = before.pending(), "Applied schema migrations");
    Ok(())
}

pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    // `_sqlx_migrations` is missing until the first run
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_fresh_database_is_fully_behind() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let status = migration_status(&pool).await.unwrap();
        assert_eq!(status.applied, 0);
        assert!(status.pending() > 0);

        run_migrations(&pool).await.unwrap();
        assert!(migration_status(&pool).await.unwrap().is_current());

        // A second run is a no-op
        run_migrations(&pool).await.unwrap();
        assert!(migration_status(&pool).await.unwrap().is_current());
    }
}
