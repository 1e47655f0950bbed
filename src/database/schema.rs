//! Schema data structures
//!
//! Value types returned by schema introspection. These are serialized into
//! tool-result messages, so they stay plain serde structs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a column in a database table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Column data type, as reported by the backend
    pub data_type: String,
    /// Whether the column is nullable
    pub nullable: bool,
    /// Default value (if any)
    pub default_value: Option<String>,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
    /// Column comment (if the backend stores one)
    pub comment: Option<String>,
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)?;
        if self.is_primary_key {
            write!(f, " PRIMARY KEY")?;
        }
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        if let Some(ref default) = self.default_value {
            write!(f, " DEFAULT {}", default)?;
        }
        if let Some(ref comment) = self.comment {
            write!(f, " -- {}", comment)?;
        }
        Ok(())
    }
}

/// Schema of a single table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub table: String,
    /// Table comment (if the backend stores one)
    pub comment: Option<String>,
    /// Columns in ordinal order
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    /// Create an empty schema for a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            comment: None,
            columns: Vec::new(),
        }
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TABLE {}", self.table)?;
        if let Some(ref comment) = self.comment {
            write!(f, " -- {}", comment)?;
        }
        for column in &self.columns {
            write!(f, "\n  {}", column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lookup() {
        let mut schema = TableSchema::new("users");
        schema.columns.push(ColumnInfo {
            name: "id".to_string(),
            data_type: "INTEGER".to_string(),
            nullable: false,
            default_value: None,
            is_primary_key: true,
            comment: None,
        });

        assert!(schema.column("id").is_some());
        assert!(schema.column("missing").is_none());
    }

    #[test]
    fn test_display_includes_constraints() {
        let column = ColumnInfo {
            name: "email".to_string(),
            data_type: "TEXT".to_string(),
            nullable: false,
            default_value: None,
            is_primary_key: false,
            comment: Some("login address".to_string()),
        };
        let rendered = column.to_string();
        assert!(rendered.contains("NOT NULL"));
        assert!(rendered.contains("login address"));
    }
}
