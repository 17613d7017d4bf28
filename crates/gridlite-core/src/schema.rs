//! Schema introspection and per-column type classification
//!
//! Column metadata is read once per table load and each column's declared
//! type string is classified into a coercion rule at that point, so the
//! matching never has to be repeated on the read/write path.

use crate::error::{Error, Result};
use crate::value::Value;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Coercion rule inferred from a column's declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Integer-typed column
    Integer,
    /// Real-typed column
    Real,
    /// Text-typed column (the default)
    Text,
}

/// Ordered rule table for declared-type classification
///
/// Matching is case-insensitive substring containment, so "BIGINT" and
/// "INTEGER" both hit the "int" rule.
const KIND_RULES: &[(&str, ColumnKind)] = &[
    ("int", ColumnKind::Integer),
    ("integer", ColumnKind::Integer),
    ("real", ColumnKind::Real),
    ("float", ColumnKind::Real),
    ("double", ColumnKind::Real),
];

impl ColumnKind {
    /// Classify a declared type string into a coercion rule
    pub fn from_declared(declared: &str) -> Self {
        let lowered = declared.to_lowercase();
        KIND_RULES
            .iter()
            .find(|(key, _)| lowered.contains(key))
            .map(|(_, kind)| *kind)
            .unwrap_or(ColumnKind::Text)
    }

    /// Coerce raw text input into a typed value
    ///
    /// Empty input is NULL regardless of the rule. A numeric rule that fails
    /// to parse keeps the original text instead of raising, so the user can
    /// correct the cell before committing.
    pub fn coerce(&self, raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnKind::Integer => raw
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            ColumnKind::Real => raw
                .parse::<f64>()
                .map(Value::Real)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            ColumnKind::Text => Value::Text(raw.to_string()),
        }
    }
}

/// Metadata for a single table column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,
    /// Declared type text as reported by the store (e.g. "INTEGER", "VARCHAR(40)")
    pub declared_type: String,
    /// Whether this column is the honored primary key
    pub is_primary_key: bool,
    /// Coercion rule classified from the declared type
    pub kind: ColumnKind,
    /// Whether values should be displayed as "1"/"0"
    pub display_as_boolean: bool,
}

impl ColumnSchema {
    fn new(name: String, declared_type: String, is_primary_key: bool) -> Self {
        let kind = ColumnKind::from_declared(&declared_type);
        let display_as_boolean = boolean_heuristic(&name, &declared_type);
        Self {
            name,
            declared_type,
            is_primary_key,
            kind,
            display_as_boolean,
        }
    }
}

/// Display heuristic: a column whose declared type contains "BOOL", or whose
/// declared type contains "INT" while the name starts with `is_` or `has_`,
/// is shown as "1"/"0". Display only; coercion and storage are unaffected.
fn boolean_heuristic(name: &str, declared_type: &str) -> bool {
    let upper_type = declared_type.to_uppercase();
    if upper_type.contains("BOOL") {
        return true;
    }
    let lower_name = name.to_lowercase();
    upper_type.contains("INT") && (lower_name.starts_with("is_") || lower_name.starts_with("has_"))
}

/// Load column metadata for a table
///
/// Only the first primary-key-flagged column (in metadata order) is honored;
/// remaining members of a composite key are treated as ordinary columns.
/// This is a documented limitation, not a defect to silently fix.
pub fn load_schema(conn: &Connection, table: &str) -> Result<Vec<ColumnSchema>> {
    let map_err = |source| Error::Schema {
        table: table.to_string(),
        source,
    };

    let mut stmt = conn
        .prepare("SELECT name, type, pk FROM pragma_table_info(?1)")
        .map_err(map_err)?;

    let raw: Vec<(String, String, i64)> = stmt
        .query_map([table], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .map_err(map_err)?
        .collect::<rusqlite::Result<_>>()
        .map_err(map_err)?;

    if raw.is_empty() {
        return Err(Error::TableNotFound(table.to_string()));
    }

    let mut pk_seen = false;
    let columns = raw
        .into_iter()
        .map(|(name, declared_type, pk)| {
            let honored = pk > 0 && !pk_seen;
            if honored {
                pk_seen = true;
            }
            ColumnSchema::new(name, declared_type, honored)
        })
        .collect();

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ColumnKind::from_declared("INTEGER"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_declared("BIGINT"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_declared("int"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_declared("REAL"), ColumnKind::Real);
        assert_eq!(ColumnKind::from_declared("FLOAT"), ColumnKind::Real);
        assert_eq!(ColumnKind::from_declared("DOUBLE PRECISION"), ColumnKind::Real);
        assert_eq!(ColumnKind::from_declared("TEXT"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_declared("VARCHAR(40)"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_declared(""), ColumnKind::Text);
    }

    #[test]
    fn test_coerce_empty_is_null() {
        assert_eq!(ColumnKind::Integer.coerce(""), Value::Null);
        assert_eq!(ColumnKind::Real.coerce(""), Value::Null);
        assert_eq!(ColumnKind::Text.coerce(""), Value::Null);
    }

    #[test]
    fn test_coerce_numeric() {
        assert_eq!(ColumnKind::Integer.coerce("42"), Value::Integer(42));
        assert_eq!(ColumnKind::Integer.coerce("-7"), Value::Integer(-7));
        assert_eq!(ColumnKind::Real.coerce("3.5"), Value::Real(3.5));
    }

    #[test]
    fn test_coerce_failure_keeps_text() {
        // Tolerate-and-continue: unparseable input stays as the literal text
        assert_eq!(
            ColumnKind::Integer.coerce("abc"),
            Value::Text("abc".to_string())
        );
        assert_eq!(
            ColumnKind::Real.coerce("1.2.3"),
            Value::Text("1.2.3".to_string())
        );
    }

    #[test]
    fn test_coerce_idempotent() {
        let first = ColumnKind::Integer.coerce("42");
        let second = ColumnKind::Integer.coerce(&first.to_display_string());
        assert_eq!(first, second);
    }

    #[test]
    fn test_boolean_heuristic() {
        assert!(boolean_heuristic("active", "BOOLEAN"));
        assert!(boolean_heuristic("is_admin", "INTEGER"));
        assert!(boolean_heuristic("has_avatar", "BIGINT"));
        assert!(!boolean_heuristic("count", "INTEGER"));
        assert!(!boolean_heuristic("is_admin", "TEXT"));
    }

    #[test]
    fn test_load_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, score REAL)")
            .unwrap();

        let columns = load_schema(&conn, "users").unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "id");
        assert!(columns[0].is_primary_key);
        assert_eq!(columns[0].kind, ColumnKind::Integer);
        assert!(!columns[1].is_primary_key);
        assert_eq!(columns[1].kind, ColumnKind::Text);
        assert_eq!(columns[2].kind, ColumnKind::Real);
    }

    #[test]
    fn test_load_schema_composite_pk_honors_first() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE pairs (a INTEGER, b INTEGER, v TEXT, PRIMARY KEY (a, b))",
        )
        .unwrap();

        let columns = load_schema(&conn, "pairs").unwrap();
        assert!(columns[0].is_primary_key);
        assert!(!columns[1].is_primary_key);
        assert!(!columns[2].is_primary_key);
    }

    #[test]
    fn test_load_schema_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let err = load_schema(&conn, "nope").unwrap_err();
        assert!(matches!(err, Error::TableNotFound(_)));
    }
}
