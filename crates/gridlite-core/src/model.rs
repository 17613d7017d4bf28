//! Editable table model and change reconciliation
//!
//! A `TableModel` holds an in-memory, mutable copy of one table's rows
//! alongside the snapshot captured at load time. Edits accumulate in memory
//! and `commit` translates the difference into a minimal delete/update/insert
//! batch executed inside a single transaction. Rollback restores the store
//! and the in-memory edits survive so the caller can retry.
//!
//! The model is synchronous and single-threaded by design: it exclusively
//! owns the store connection for the duration of the table session and its
//! operations must not be called concurrently from multiple threads.

use crate::error::Result;
use crate::schema::{load_schema, ColumnSchema};
use crate::store::{quote_ident, Store};
use crate::value::Value;
use rusqlite::params_from_iter;

/// One editable row: the live values plus the snapshot they were loaded
/// with. `baseline` is `None` for rows inserted since the last commit.
#[derive(Debug, Clone)]
struct EditRow {
    values: Vec<Value>,
    baseline: Option<Vec<Value>>,
}

impl EditRow {
    fn is_new(&self) -> bool {
        self.baseline.is_none()
    }

    fn is_changed(&self) -> bool {
        match &self.baseline {
            Some(base) => self.values != *base,
            None => true,
        }
    }
}

/// Outcome of a commit attempt
///
/// Store-level failures are reported here rather than escaping as errors, so
/// the presentation layer always gets a displayable message (the in-memory
/// edits are preserved on failure).
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The model was not dirty; no store access occurred
    NoChanges,
    /// The batch was committed and the snapshot reloaded
    Applied {
        deleted: usize,
        updated: usize,
        inserted: usize,
    },
    /// Updates or deletions were pending on a table with no primary key
    MissingPrimaryKey,
    /// The store rejected the batch; the transaction was rolled back
    StoreFailure(String),
}

impl CommitOutcome {
    /// Whether the commit left the store in the requested state
    pub fn is_success(&self) -> bool {
        matches!(self, CommitOutcome::NoChanges | CommitOutcome::Applied { .. })
    }

    /// Human-readable description of the outcome
    pub fn message(&self) -> String {
        match self {
            CommitOutcome::NoChanges => "No changes to save.".to_string(),
            CommitOutcome::Applied {
                deleted,
                updated,
                inserted,
            } => format!(
                "Changes saved: {} deleted, {} updated, {} inserted.",
                deleted, updated, inserted
            ),
            CommitOutcome::MissingPrimaryKey => {
                "Cannot update or delete rows without a primary key.".to_string()
            }
            CommitOutcome::StoreFailure(detail) => format!("Database error: {}", detail),
        }
    }
}

/// An editable, in-memory view of one table
pub struct TableModel {
    store: Store,
    table: String,
    columns: Vec<ColumnSchema>,
    pk_index: Option<usize>,
    rows: Vec<EditRow>,
    /// Primary-key values of baseline rows marked for deletion
    pending_deletes: Vec<Value>,
}

impl TableModel {
    /// Load a table, taking exclusive ownership of the store connection
    pub fn load(store: Store, table: &str) -> Result<Self> {
        let columns = load_schema(store.conn(), table)?;
        let pk_index = columns.iter().position(|c| c.is_primary_key);
        let mut model = Self {
            store,
            table: table.to_string(),
            columns,
            pk_index,
            rows: Vec::new(),
            pending_deletes: Vec::new(),
        };
        model.reload()?;
        Ok(model)
    }

    /// Discard all pending edits and re-snapshot the table from the store
    pub fn reload(&mut self) -> Result<()> {
        let fresh = self.store.select_all(&self.table)?;
        self.rows = fresh
            .into_iter()
            .map(|values| EditRow {
                baseline: Some(values.clone()),
                values,
            })
            .collect();
        self.pending_deletes.clear();
        Ok(())
    }

    /// Release the store connection (e.g. to switch tables)
    pub fn into_store(self) -> Store {
        self.store
    }

    /// Name of the loaded table
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Column metadata in table order
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Name of a column, if the index is in range
    pub fn column_name(&self, col: usize) -> Option<&str> {
        self.columns.get(col).map(|c| c.name.as_str())
    }

    /// Declared type of a column, if the index is in range
    pub fn column_type(&self, col: usize) -> Option<&str> {
        self.columns.get(col).map(|c| c.declared_type.as_str())
    }

    /// Whether the table has a usable primary key
    pub fn has_primary_key(&self) -> bool {
        self.pk_index.is_some()
    }

    /// Number of rows currently in the model
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Read-only iteration over the current rows, for export
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(|r| r.values.as_slice())
    }

    /// Display-formatted cell value
    ///
    /// Boolean-looking columns render as "1"/"0"; NULL and out-of-range
    /// indices render as the empty string.
    pub fn cell(&self, row: usize, col: usize) -> String {
        let value = match self.rows.get(row).and_then(|r| r.values.get(col)) {
            Some(v) => v,
            None => return String::new(),
        };
        if self.columns[col].display_as_boolean {
            let flag = if value.is_truthy() { "1" } else { "0" };
            flag.to_string()
        } else {
            value.to_display_string()
        }
    }

    /// Coerce raw text and store it into a cell; out-of-range is a no-op
    pub fn set_cell(&mut self, row: usize, col: usize, raw: &str) {
        let kind = match self.columns.get(col) {
            Some(c) => c.kind,
            None => return,
        };
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.values.get_mut(col)) {
            *cell = kind.coerce(raw);
        }
    }

    /// Insert a new all-NULL row at the given index (clamped to append)
    pub fn insert_row(&mut self, at: usize) {
        let at = at.min(self.rows.len());
        self.rows.insert(
            at,
            EditRow {
                values: vec![Value::Null; self.columns.len()],
                baseline: None,
            },
        );
    }

    /// Delete a row
    ///
    /// Uncommitted inserts are removed directly. Baseline rows require a
    /// primary key; their key value is recorded for deletion at commit time.
    /// Returns false (and changes nothing) when the row cannot be deleted.
    pub fn delete_row(&mut self, at: usize) -> bool {
        let row = match self.rows.get(at) {
            Some(r) => r,
            None => return false,
        };
        if let Some(baseline) = &row.baseline {
            let pk_index = match self.pk_index {
                Some(i) => i,
                None => return false,
            };
            self.pending_deletes.push(baseline[pk_index].clone());
        }
        self.rows.remove(at);
        true
    }

    /// Whether the model differs from the last-loaded snapshot
    pub fn is_dirty(&self) -> bool {
        !self.pending_deletes.is_empty() || self.rows.iter().any(EditRow::is_changed)
    }

    fn has_baseline_edits(&self) -> bool {
        self.rows
            .iter()
            .any(|r| !r.is_new() && r.is_changed())
    }

    /// Reconcile the accumulated edits against the store
    ///
    /// Deletions, then updates (keyed on the baseline primary-key value,
    /// even if the key cell itself was edited), then inserts, all inside one
    /// transaction. On success the model re-snapshots from the store; on
    /// failure the transaction is rolled back and the edits stay in memory.
    pub fn commit(&mut self) -> CommitOutcome {
        if !self.is_dirty() {
            return CommitOutcome::NoChanges;
        }
        if self.pk_index.is_none()
            && (!self.pending_deletes.is_empty() || self.has_baseline_edits())
        {
            return CommitOutcome::MissingPrimaryKey;
        }
        match self.apply_and_reload() {
            Ok((deleted, updated, inserted)) => CommitOutcome::Applied {
                deleted,
                updated,
                inserted,
            },
            Err(e) => CommitOutcome::StoreFailure(e.to_string()),
        }
    }

    fn apply_and_reload(&mut self) -> Result<(usize, usize, usize)> {
        let table = quote_ident(&self.table);
        let col_list: Vec<String> = self
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect();

        let mut deleted = 0usize;
        let mut updated = 0usize;
        let mut inserted = 0usize;

        // Dropping the transaction on any error path rolls everything back.
        let tx = self.store.conn_mut().transaction()?;

        if let Some(pk_index) = self.pk_index {
            let pk_col = quote_ident(&self.columns[pk_index].name);

            if !self.pending_deletes.is_empty() {
                let sql = format!("DELETE FROM {} WHERE {}=?1", table, pk_col);
                let mut stmt = tx.prepare(&sql)?;
                for pk in &self.pending_deletes {
                    stmt.execute([pk])?;
                    deleted += 1;
                }
            }

            let assignments: Vec<String> = col_list
                .iter()
                .enumerate()
                .map(|(i, col)| format!("{}=?{}", col, i + 1))
                .collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE {}=?{}",
                table,
                assignments.join(", "),
                pk_col,
                col_list.len() + 1
            );
            let mut stmt = tx.prepare(&sql)?;
            for row in &self.rows {
                if let Some(baseline) = &row.baseline {
                    if row.values != *baseline {
                        let params = row.values.iter().chain(std::iter::once(&baseline[pk_index]));
                        stmt.execute(params_from_iter(params))?;
                        updated += 1;
                    }
                }
            }
        }

        let new_rows = self.rows.iter().filter(|r| r.is_new());
        let placeholders: Vec<String> = (1..=col_list.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            col_list.join(", "),
            placeholders.join(", ")
        );
        let mut stmt = tx.prepare(&sql)?;
        for row in new_rows {
            stmt.execute(params_from_iter(row.values.iter()))?;
            inserted += 1;
        }
        drop(stmt);

        tx.commit()?;
        self.reload()?;
        Ok((deleted, updated, inserted))
    }
}
