//! Test utilities for database operations.
//!
//! Provides a migrated, throwaway database for tests that need real SQL
//! semantics (cascades, LIKE, pagination) instead of `MockDatabase`.

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// In-memory SQLite URL. Each pool connection would get its own database,
/// so the pool is pinned to one connection.
pub const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

/// A migrated test database.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database with every migration applied.
    pub async fn new() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(SQLITE_MEMORY_URL);
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &Arc<DatabaseConnection> {
        &self.conn
    }

    /// Shared handle for building repositories and services.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }
}
