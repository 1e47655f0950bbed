//! Database connection abstraction
//!
//! This module provides the database backend enum and connection pooling
//! logic for the supported backends (SQLite, PostgreSQL, MySQL).

use crate::error::{Result, SqlPilotError};
use sqlx::{mysql::MySqlPool, postgres::PgPool, sqlite::SqlitePool};
use std::str::FromStr;

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// SQLite
    SQLite,
    /// PostgreSQL
    PostgreSQL,
    /// MySQL/MariaDB
    MySQL,
}

impl DatabaseBackend {
    /// Parse database URL to determine backend
    pub fn from_url(url: &str) -> Result<Self> {
        let url_lower = url.to_lowercase();

        if url_lower.starts_with("postgres://") || url_lower.starts_with("postgresql://") {
            Ok(DatabaseBackend::PostgreSQL)
        } else if url_lower.starts_with("mysql://") || url_lower.starts_with("mariadb://") {
            Ok(DatabaseBackend::MySQL)
        } else if url_lower.starts_with("sqlite://")
            || url_lower.starts_with("sqlite:")
            || url_lower.ends_with(".db")
            || url_lower.ends_with(".sqlite")
            || url_lower.ends_with(".sqlite3")
        {
            Ok(DatabaseBackend::SQLite)
        } else {
            Err(SqlPilotError::Config(format!(
                "unable to determine database type from URL: {}",
                url
            )))
        }
    }

    /// Get the name of this database backend
    pub fn name(&self) -> &str {
        match self {
            DatabaseBackend::SQLite => "SQLite",
            DatabaseBackend::PostgreSQL => "PostgreSQL",
            DatabaseBackend::MySQL => "MySQL",
        }
    }
}

impl FromStr for DatabaseBackend {
    type Err = SqlPilotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(DatabaseBackend::SQLite),
            "postgresql" | "postgres" | "pg" => Ok(DatabaseBackend::PostgreSQL),
            "mysql" | "mariadb" => Ok(DatabaseBackend::MySQL),
            _ => Err(SqlPilotError::Config(format!(
                "unsupported database type: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Database connection pool wrapper
///
/// Holds the actual sqlx pool for the connected backend. Cloning shares the
/// underlying pool, so one `DatabasePool` serves concurrent questions.
#[derive(Clone)]
pub enum DatabasePool {
    /// SQLite pool
    Sqlite(SqlitePool),
    /// PostgreSQL pool
    Postgres(PgPool),
    /// MySQL pool
    MySql(MySqlPool),
}

impl DatabasePool {
    /// Get the database backend for this pool
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            DatabasePool::Sqlite(_) => DatabaseBackend::SQLite,
            DatabasePool::Postgres(_) => DatabaseBackend::PostgreSQL,
            DatabasePool::MySql(_) => DatabaseBackend::MySQL,
        }
    }

    /// Create a new database pool from a connection URL
    pub async fn from_url(url: &str) -> Result<Self> {
        let backend = DatabaseBackend::from_url(url)?;

        match backend {
            DatabaseBackend::SQLite => {
                // Strip the sqlite: or sqlite:// prefix
                let db_path = if let Some(stripped) = url.strip_prefix("sqlite://") {
                    stripped
                } else if let Some(stripped) = url.strip_prefix("sqlite:") {
                    stripped
                } else {
                    url
                };

                let pool = SqlitePool::connect(db_path)
                    .await
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                Ok(DatabasePool::Sqlite(pool))
            }
            DatabaseBackend::PostgreSQL => {
                let pool = PgPool::connect(url)
                    .await
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                Ok(DatabasePool::Postgres(pool))
            }
            DatabaseBackend::MySQL => {
                let pool = MySqlPool::connect(url)
                    .await
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                Ok(DatabasePool::MySql(pool))
            }
        }
    }

    /// Test the connection
    pub async fn test_connection(&self) -> Result<()> {
        let probe = "SELECT 1";
        match self {
            DatabasePool::Sqlite(pool) => {
                sqlx::query(probe)
                    .fetch_one(pool)
                    .await
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query(probe)
                    .fetch_one(pool)
                    .await
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
            }
            DatabasePool::MySql(pool) => {
                sqlx::query(probe)
                    .fetch_one(pool)
                    .await
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
            }
        }
        Ok(())
    }
}
