//! Backing store access over a SQLite connection
//!
//! The connection is exclusively owned: either by the `Store` itself or, once
//! a table is loaded, by the `TableModel` holding the `Store`. Dropping it on
//! any exit path closes the connection deterministically.

use crate::error::{Error, Result};
use crate::value::Value;
use rusqlite::Connection;
use std::path::Path;

/// Owned connection to a SQLite database file
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| Error::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// List the names of all tables in the database
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Get the CREATE statement for a table, if the store has one
    pub fn table_sql(&self, table: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT sql FROM sqlite_master WHERE type='table' AND name=?1")?;
        let mut rows = stmt.query_map([table], |row| row.get::<_, Option<String>>(0))?;
        match rows.next() {
            Some(sql) => Ok(sql?),
            None => Err(Error::TableNotFound(table.to_string())),
        }
    }

    /// Load the full row set of a table
    pub fn select_all(&self, table: &str) -> Result<Vec<Vec<Value>>> {
        let sql = format!("SELECT * FROM {}", quote_ident(table));
        let mut stmt = self.conn.prepare(&sql)?;
        let column_count = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get_ref(i).map(Value::from))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect::<rusqlite::Result<Vec<Vec<Value>>>>()?;
        Ok(rows)
    }

    /// Borrow the raw connection
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Mutably borrow the raw connection (required for transactions)
    pub(crate) fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

/// Quote an identifier for use in a statement
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute_batch(
                "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
                 CREATE TABLE logs (ts TEXT, msg TEXT);
                 INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob');",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_table_names() {
        let store = fixture();
        assert_eq!(store.table_names().unwrap(), vec!["logs", "users"]);
    }

    #[test]
    fn test_table_sql() {
        let store = fixture();
        let sql = store.table_sql("users").unwrap().unwrap();
        assert!(sql.contains("CREATE TABLE users"));
        assert!(matches!(
            store.table_sql("nope").unwrap_err(),
            Error::TableNotFound(_)
        ));
    }

    #[test]
    fn test_select_all() {
        let store = fixture();
        let rows = store.select_all("users").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Value::Integer(1));
        assert_eq!(rows[0][1], Value::Text("Alice".to_string()));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
