//! gridlite-core: Core library for browsing and editing SQLite tables
//!
//! This library provides functionality to:
//! - Introspect a table's column metadata and classify value types
//! - Load a table into an in-memory editable snapshot
//! - Track cell edits, row inserts and row deletions against the snapshot
//! - Reconcile the accumulated edits into one transactional store batch
//! - Export the current rows to CSV or JSON
//! - Apply batched edits described as JSON scripts
//!
//! The model is synchronous and single-threaded; see the `model` module docs.

pub mod error;
pub mod export;
pub mod model;
pub mod schema;
pub mod script;
pub mod store;
pub mod value;

pub use error::{Error, Result};
pub use export::{export_csv, export_json};
pub use model::{CommitOutcome, TableModel};
pub use schema::{load_schema, ColumnKind, ColumnSchema};
pub use script::{apply_script, EditOp, EditScript, ScriptReport};
pub use store::Store;
pub use value::Value;
