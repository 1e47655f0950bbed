//! Database Gateway
//!
//! Executes validated read queries and schema-introspection requests against
//! the connected backend. All three operations are read-only; `execute`
//! enforces a lexical single-SELECT guard and a bounded timeout, and converts
//! row values into transport-safe JSON (binary data hex-encoded, control
//! characters stripped).

use crate::database::connection::DatabasePool;
use crate::database::schema::{ColumnInfo, TableSchema};
use crate::error::{Result, SqlPilotError};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, Statement};
use std::time::Duration;
use tracing::{debug, warn};

/// Result of a successful query: column order plus one JSON object per row.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// Column names in select order
    pub columns: Vec<String>,
    /// Rows as name → value mappings
    pub rows: Vec<Map<String, Value>>,
}

/// Database Gateway
///
/// Safe for concurrent use by independent callers: the wrapped sqlx pool is
/// clonable and every operation is a self-contained round-trip.
#[derive(Clone)]
pub struct DatabaseGateway {
    pool: DatabasePool,
    query_timeout_secs: u64,
}

impl DatabaseGateway {
    /// Create a gateway over an existing pool
    pub fn new(pool: DatabasePool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            query_timeout_secs,
        }
    }

    /// Backend the gateway is connected to
    pub fn backend(&self) -> crate::database::connection::DatabaseBackend {
        self.pool.backend()
    }

    /// List the user tables of the active backend, in backend order.
    ///
    /// An empty schema yields an empty vector, not an error. System catalogs
    /// are excluded.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let tables: Vec<String> = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                     ORDER BY name",
                )
                .fetch_all(pool)
                .await
                .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                rows.iter()
                    .map(|row| row.get::<String, _>("name"))
                    .collect()
            }
            DatabasePool::Postgres(pool) => {
                let rows = sqlx::query(
                    "SELECT tablename FROM pg_tables \
                     WHERE schemaname = 'public' \
                     ORDER BY tablename",
                )
                .fetch_all(pool)
                .await
                .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                rows.iter()
                    .map(|row| row.get::<String, _>("tablename"))
                    .collect()
            }
            DatabasePool::MySql(pool) => {
                let rows = sqlx::query(
                    "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
                     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
                     ORDER BY TABLE_NAME",
                )
                .fetch_all(pool)
                .await
                .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                rows.iter()
                    .map(|row| row.get::<String, _>("TABLE_NAME"))
                    .collect()
            }
        };

        debug!(count = tables.len(), "listed tables");
        Ok(tables)
    }

    /// Fetch the schema of one table: columns, types, nullability and any
    /// stored comments. Name matching follows the backend's native collation.
    pub async fn table_schema(&self, table_name: &str) -> Result<TableSchema> {
        let known = self.list_tables().await?;
        if !known.iter().any(|t| t == table_name) {
            return Err(SqlPilotError::TableNotFound(table_name.to_string()));
        }

        match &self.pool {
            DatabasePool::Sqlite(pool) => self.sqlite_schema(pool, table_name).await,
            DatabasePool::Postgres(pool) => self.postgres_schema(pool, table_name).await,
            DatabasePool::MySql(pool) => self.mysql_schema(pool, table_name).await,
        }
    }

    /// Execute a single SELECT statement with a bounded timeout.
    pub async fn execute(&self, sql: &str) -> Result<QueryResult> {
        ensure_single_select(sql)?;

        let budget = Duration::from_secs(self.query_timeout_secs);
        let result = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                let rows = tokio::time::timeout(budget, sqlx::query(sql).fetch_all(pool))
                    .await
                    .map_err(|_| SqlPilotError::QueryTimeout(self.query_timeout_secs))?
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                // column order must survive an empty result set
                let columns = match rows.first() {
                    Some(row) => column_names(row.columns()),
                    None => column_names(
                        pool.prepare(sql)
                            .await
                            .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?
                            .columns(),
                    ),
                };
                sqlite_rows_to_result(columns, &rows)
            }
            DatabasePool::Postgres(pool) => {
                let rows = tokio::time::timeout(budget, sqlx::query(sql).fetch_all(pool))
                    .await
                    .map_err(|_| SqlPilotError::QueryTimeout(self.query_timeout_secs))?
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                let columns = match rows.first() {
                    Some(row) => column_names(row.columns()),
                    None => column_names(
                        pool.prepare(sql)
                            .await
                            .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?
                            .columns(),
                    ),
                };
                postgres_rows_to_result(columns, &rows)
            }
            DatabasePool::MySql(pool) => {
                let rows = tokio::time::timeout(budget, sqlx::query(sql).fetch_all(pool))
                    .await
                    .map_err(|_| SqlPilotError::QueryTimeout(self.query_timeout_secs))?
                    .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;
                let columns = match rows.first() {
                    Some(row) => column_names(row.columns()),
                    None => column_names(
                        pool.prepare(sql)
                            .await
                            .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?
                            .columns(),
                    ),
                };
                mysql_rows_to_result(columns, &rows)
            }
        };

        debug!(rows = result.rows.len(), "query executed");
        Ok(result)
    }

    async fn sqlite_schema(
        &self,
        pool: &sqlx::SqlitePool,
        table_name: &str,
    ) -> Result<TableSchema> {
        let rows = sqlx::query(
            "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1)",
        )
        .bind(table_name)
        .fetch_all(pool)
        .await
        .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;

        if rows.is_empty() {
            return Err(SqlPilotError::TableNotFound(table_name.to_string()));
        }

        let mut schema = TableSchema::new(table_name);
        for row in &rows {
            schema.columns.push(ColumnInfo {
                name: row.get::<String, _>("name"),
                data_type: row.get::<String, _>("type"),
                nullable: row.get::<i64, _>("notnull") == 0,
                default_value: row.try_get::<Option<String>, _>("dflt_value").ok().flatten(),
                is_primary_key: row.get::<i64, _>("pk") > 0,
                // SQLite does not store column comments
                comment: None,
            });
        }
        Ok(schema)
    }

    async fn postgres_schema(
        &self,
        pool: &sqlx::PgPool,
        table_name: &str,
    ) -> Result<TableSchema> {
        let comment: Option<String> = sqlx::query(
            "SELECT obj_description(c.oid) AS table_comment \
             FROM pg_class c \
             JOIN pg_namespace n ON n.oid = c.relnamespace \
             WHERE c.relname = $1 AND n.nspname = 'public'",
        )
        .bind(table_name)
        .fetch_optional(pool)
        .await
        .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?
        .and_then(|row| row.try_get::<Option<String>, _>("table_comment").ok().flatten());

        let rows = sqlx::query(
            "SELECT cols.column_name, \
                    cols.data_type, \
                    cols.is_nullable, \
                    cols.column_default, \
                    (pk.column_name IS NOT NULL) AS is_primary_key, \
                    col_description(cl.oid, cols.ordinal_position::int) AS column_comment \
             FROM information_schema.columns cols \
             JOIN pg_class cl ON cl.relname = cols.table_name \
             JOIN pg_namespace n ON n.oid = cl.relnamespace AND n.nspname = cols.table_schema \
             LEFT JOIN ( \
                 SELECT kcu.column_name \
                 FROM information_schema.table_constraints tc \
                 JOIN information_schema.key_column_usage kcu \
                   ON tc.constraint_name = kcu.constraint_name \
                 WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_name = $1 \
             ) pk ON cols.column_name = pk.column_name \
             WHERE cols.table_name = $1 AND cols.table_schema = 'public' \
             ORDER BY cols.ordinal_position",
        )
        .bind(table_name)
        .fetch_all(pool)
        .await
        .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;

        if rows.is_empty() {
            return Err(SqlPilotError::TableNotFound(table_name.to_string()));
        }

        let mut schema = TableSchema::new(table_name);
        schema.comment = comment;
        for row in &rows {
            schema.columns.push(ColumnInfo {
                name: row.get::<String, _>("column_name"),
                data_type: row.get::<String, _>("data_type"),
                nullable: row.get::<String, _>("is_nullable") == "YES",
                default_value: row
                    .try_get::<Option<String>, _>("column_default")
                    .ok()
                    .flatten(),
                is_primary_key: row.get::<bool, _>("is_primary_key"),
                comment: row
                    .try_get::<Option<String>, _>("column_comment")
                    .ok()
                    .flatten(),
            });
        }
        Ok(schema)
    }

    async fn mysql_schema(
        &self,
        pool: &sqlx::MySqlPool,
        table_name: &str,
    ) -> Result<TableSchema> {
        let comment: Option<String> = sqlx::query(
            "SELECT TABLE_COMMENT FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
        )
        .bind(table_name)
        .fetch_optional(pool)
        .await
        .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?
        .and_then(|row| row.try_get::<Option<String>, _>("TABLE_COMMENT").ok().flatten())
        .filter(|c| !c.is_empty());

        let rows = sqlx::query(
            "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT, \
                    COLUMN_KEY, COLUMN_COMMENT \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
        )
        .bind(table_name)
        .fetch_all(pool)
        .await
        .map_err(|e| SqlPilotError::QueryExecution(e.to_string()))?;

        if rows.is_empty() {
            return Err(SqlPilotError::TableNotFound(table_name.to_string()));
        }

        let mut schema = TableSchema::new(table_name);
        schema.comment = comment;
        for row in &rows {
            let column_comment: Option<String> = row
                .try_get::<Option<String>, _>("COLUMN_COMMENT")
                .ok()
                .flatten()
                .filter(|c| !c.is_empty());
            schema.columns.push(ColumnInfo {
                name: row.get::<String, _>("COLUMN_NAME"),
                data_type: row.get::<String, _>("DATA_TYPE"),
                nullable: row.get::<String, _>("IS_NULLABLE") == "YES",
                default_value: row
                    .try_get::<Option<String>, _>("COLUMN_DEFAULT")
                    .ok()
                    .flatten(),
                is_primary_key: row.get::<String, _>("COLUMN_KEY") == "PRI",
                comment: column_comment,
            });
        }
        Ok(schema)
    }
}

/// Reject anything that is not lexically a single SELECT statement.
///
/// Leading whitespace and `--` / `/* */` comments are stripped before the
/// keyword check; a `;` followed by non-whitespace rejects the statement.
/// Quoted string literals are skipped when scanning for the separator.
pub fn ensure_single_select(sql: &str) -> Result<()> {
    let body = strip_leading_trivia(sql);

    // checked slice: the body may open with multibyte text
    if !body
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"))
    {
        return Err(SqlPilotError::UnsafeQuery(
            "only a single SELECT statement is allowed".to_string(),
        ));
    }
    // Keyword must end at a word boundary ("selector" is not SELECT)
    if let Some(next) = body[6..].chars().next() {
        if next.is_alphanumeric() || next == '_' {
            return Err(SqlPilotError::UnsafeQuery(
                "only a single SELECT statement is allowed".to_string(),
            ));
        }
    }

    let mut chars = body.char_indices().peekable();
    let mut quote: Option<char> = None;
    while let Some((idx, c)) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                ';' => {
                    let rest = &body[idx + 1..];
                    if !rest.trim().is_empty() {
                        return Err(SqlPilotError::UnsafeQuery(
                            "multiple statements are not allowed".to_string(),
                        ));
                    }
                    return Ok(());
                }
                _ => {}
            },
        }
    }
    Ok(())
}

/// Strip leading whitespace and SQL comments from a statement.
fn strip_leading_trivia(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("--") {
            match after.find('\n') {
                Some(pos) => rest = &after[pos + 1..],
                None => return "",
            }
        } else if let Some(after) = trimmed.strip_prefix("/*") {
            match after.find("*/") {
                Some(pos) => rest = &after[pos + 2..],
                None => return "",
            }
        } else {
            return trimmed;
        }
    }
}

/// Hex-encode binary data for transport
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Strip control characters that break transport, keeping tabs and newlines
fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Column names in ordinal order, from row or prepared-statement metadata
fn column_names(columns: &[impl Column]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

fn sqlite_rows_to_result(columns: Vec<String>, rows: &[SqliteRow]) -> QueryResult {
    let rows = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (idx, column) in row.columns().iter().enumerate() {
                object.insert(column.name().to_string(), sqlite_cell(row, idx));
            }
            object
        })
        .collect();

    QueryResult { columns, rows }
}

fn sqlite_cell(row: &SqliteRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v
            .map(|s| Value::String(sanitize_text(&s)))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v
            .map(|b| Value::String(hex_encode(&b)))
            .unwrap_or(Value::Null);
    }
    warn!(column = idx, "undecodable sqlite value, returning null");
    Value::Null
}

fn postgres_rows_to_result(columns: Vec<String>, rows: &[PgRow]) -> QueryResult {
    let rows = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (idx, column) in row.columns().iter().enumerate() {
                object.insert(column.name().to_string(), postgres_cell(row, idx));
            }
            object
        })
        .collect();

    QueryResult { columns, rows }
}

fn postgres_cell(row: &PgRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v
            .map(|s| Value::String(sanitize_text(&s)))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        return v
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx) {
        return v
            .map(|t| Value::String(t.to_rfc3339()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        return v
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(idx) {
        return v
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v
            .map(|b| Value::String(hex_encode(&b)))
            .unwrap_or(Value::Null);
    }
    warn!(column = idx, "undecodable postgres value, returning null");
    Value::Null
}

fn mysql_rows_to_result(columns: Vec<String>, rows: &[MySqlRow]) -> QueryResult {
    let rows = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (idx, column) in row.columns().iter().enumerate() {
                object.insert(column.name().to_string(), mysql_cell(row, idx));
            }
            object
        })
        .collect();

    QueryResult { columns, rows }
}

fn mysql_cell(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v
            .map(|s| Value::String(sanitize_text(&s)))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(idx) {
        return v
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(idx) {
        return v
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(idx) {
        return v
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v
            .map(|b| Value::String(hex_encode(&b)))
            .unwrap_or(Value::Null);
    }
    warn!(column = idx, "undecodable mysql value, returning null");
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_select_allowed() {
        assert!(ensure_single_select("SELECT * FROM users").is_ok());
        assert!(ensure_single_select("select id from orders;").is_ok());
        assert!(ensure_single_select("  \n SELECT 1").is_ok());
    }

    #[test]
    fn test_leading_comments_stripped() {
        assert!(ensure_single_select("-- fetch everything\nSELECT * FROM users").is_ok());
        assert!(ensure_single_select("/* note */ SELECT 1").is_ok());
        assert!(ensure_single_select("/* a */ -- b\nselect 1").is_ok());
    }

    #[test]
    fn test_non_select_rejected() {
        assert!(matches!(
            ensure_single_select("DROP TABLE users"),
            Err(SqlPilotError::UnsafeQuery(_))
        ));
        assert!(matches!(
            ensure_single_select("UPDATE users SET x = 1"),
            Err(SqlPilotError::UnsafeQuery(_))
        ));
        assert!(matches!(
            ensure_single_select(""),
            Err(SqlPilotError::UnsafeQuery(_))
        ));
        // keyword boundary
        assert!(matches!(
            ensure_single_select("selections FROM x"),
            Err(SqlPilotError::UnsafeQuery(_))
        ));
    }

    #[test]
    fn test_multiple_statements_rejected() {
        assert!(matches!(
            ensure_single_select("SELECT 1; DROP TABLE users;"),
            Err(SqlPilotError::UnsafeQuery(_))
        ));
    }

    #[test]
    fn test_semicolon_inside_literal_allowed() {
        assert!(ensure_single_select("SELECT * FROM users WHERE note = 'a;b'").is_ok());
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
        assert_eq!(hex_encode(&[]), "");
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("ok\u{0000}fine\u{0007}"), "okfine");
        assert_eq!(sanitize_text("line\nbreak\ttab"), "line\nbreak\ttab");
    }

    #[tokio::test]
    async fn test_sqlite_roundtrip() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT, blob_col BLOB)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO items (id, label, blob_col) VALUES (1, 'first', x'cafe')")
            .execute(&pool)
            .await
            .unwrap();

        let gateway = DatabaseGateway::new(
            crate::database::connection::DatabasePool::Sqlite(pool),
            5,
        );

        let tables = gateway.list_tables().await.unwrap();
        assert_eq!(tables, vec!["items".to_string()]);

        let schema = gateway.table_schema("items").await.unwrap();
        assert_eq!(schema.columns.len(), 3);
        assert!(schema.column("id").unwrap().is_primary_key);

        let result = gateway.execute("SELECT * FROM items").await.unwrap();
        assert_eq!(result.columns, vec!["id", "label", "blob_col"]);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0]["blob_col"], Value::String("cafe".into()));
    }

    #[tokio::test]
    async fn test_empty_result_keeps_column_order() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::query("CREATE TABLE users (id INTEGER PRIMARY KEY, user_name TEXT)")
            .execute(&pool)
            .await
            .unwrap();

        let gateway = DatabaseGateway::new(
            crate::database::connection::DatabasePool::Sqlite(pool),
            5,
        );

        let result = gateway
            .execute("SELECT id, user_name FROM users WHERE 1 = 0")
            .await
            .unwrap();
        assert_eq!(result.columns, vec!["id", "user_name"]);
        assert!(result.rows.is_empty());
    }

    #[tokio::test]
    async fn test_table_not_found() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        let gateway = DatabaseGateway::new(
            crate::database::connection::DatabasePool::Sqlite(pool),
            5,
        );
        assert!(matches!(
            gateway.table_schema("nonexistent").await,
            Err(SqlPilotError::TableNotFound(_))
        ));
    }
}
