//! Edit scripts: batched model edits described as JSON
//!
//! A script names a table and an ordered list of operations to apply to the
//! in-memory model. Operations address columns by name so scripts stay
//! readable; failures (unknown column, bad index) are collected per-op
//! without aborting the batch. Committing the result is the caller's
//! decision.

use crate::error::{Error, Result};
use crate::model::TableModel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A single scripted operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Coerce and store a value into a cell, addressed by column name
    Set {
        row: usize,
        column: String,
        value: String,
    },
    /// Insert a new all-NULL row; appends when `at` is omitted
    InsertRow { at: Option<usize> },
    /// Delete the row at the given index
    DeleteRow { at: usize },
}

/// An ordered batch of edits for one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditScript {
    /// Table the script applies to
    pub table: String,
    /// Operations in application order
    pub ops: Vec<EditOp>,
}

impl EditScript {
    /// Create a new empty script
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ops: Vec::new(),
        }
    }

    /// Append an operation
    pub fn add_op(&mut self, op: EditOp) {
        self.ops.push(op);
    }

    /// Load a script from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the script to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Result of applying a script to a model
#[derive(Debug, Clone)]
pub struct ScriptReport {
    /// Number of operations applied
    pub applied: usize,
    /// Operations that failed, with the reason
    pub failed: Vec<(EditOp, String)>,
}

/// Apply a script's operations to the model, in order
///
/// Each failing operation is recorded and skipped; the rest of the batch
/// still runs.
pub fn apply_script(model: &mut TableModel, script: &EditScript) -> ScriptReport {
    let mut report = ScriptReport {
        applied: 0,
        failed: Vec::new(),
    };

    for op in &script.ops {
        match op {
            EditOp::Set { row, column, value } => {
                let col = match model.column_names().iter().position(|n| *n == column.as_str()) {
                    Some(c) => c,
                    None => {
                        report
                            .failed
                            .push((op.clone(), format!("column '{}' not found", column)));
                        continue;
                    }
                };
                if *row >= model.row_count() {
                    report
                        .failed
                        .push((op.clone(), format!("row {} out of range", row)));
                    continue;
                }
                model.set_cell(*row, col, value);
                report.applied += 1;
            }
            EditOp::InsertRow { at } => {
                model.insert_row(at.unwrap_or(model.row_count()));
                report.applied += 1;
            }
            EditOp::DeleteRow { at } => {
                if model.delete_row(*at) {
                    report.applied += 1;
                } else {
                    report
                        .failed
                        .push((op.clone(), format!("cannot delete row {}", at)));
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn fixture() -> TableModel {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute_batch(
                "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
                 INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob');",
            )
            .unwrap();
        TableModel::load(store, "users").unwrap()
    }

    #[test]
    fn test_script_serialization() {
        let mut script = EditScript::new("users");
        script.add_op(EditOp::Set {
            row: 0,
            column: "name".to_string(),
            value: "Alicia".to_string(),
        });
        script.add_op(EditOp::InsertRow { at: None });
        script.add_op(EditOp::DeleteRow { at: 1 });

        let json = serde_json::to_string_pretty(&script).unwrap();
        let loaded: EditScript = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.table, "users");
        assert_eq!(loaded.ops.len(), 3);
        assert!(matches!(loaded.ops[1], EditOp::InsertRow { at: None }));
    }

    #[test]
    fn test_apply_script() {
        let mut model = fixture();
        let mut script = EditScript::new("users");
        script.add_op(EditOp::Set {
            row: 0,
            column: "name".to_string(),
            value: "Alicia".to_string(),
        });
        script.add_op(EditOp::InsertRow { at: None });
        script.add_op(EditOp::Set {
            row: 2,
            column: "name".to_string(),
            value: "Carol".to_string(),
        });

        let report = apply_script(&mut model, &script);
        assert_eq!(report.applied, 3);
        assert!(report.failed.is_empty());
        assert_eq!(model.cell(0, 1), "Alicia");
        assert_eq!(model.cell(2, 1), "Carol");
        assert!(model.is_dirty());
    }

    #[test]
    fn test_apply_script_collects_failures() {
        let mut model = fixture();
        let mut script = EditScript::new("users");
        script.add_op(EditOp::Set {
            row: 0,
            column: "nope".to_string(),
            value: "x".to_string(),
        });
        script.add_op(EditOp::Set {
            row: 99,
            column: "name".to_string(),
            value: "x".to_string(),
        });
        script.add_op(EditOp::Set {
            row: 1,
            column: "name".to_string(),
            value: "Bobby".to_string(),
        });

        let report = apply_script(&mut model, &script);
        assert_eq!(report.applied, 1);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[0].1.contains("not found"));
        assert_eq!(model.cell(1, 1), "Bobby");
    }
}
