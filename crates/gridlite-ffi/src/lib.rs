//! C FFI bindings for gridlite-core
//!
//! This crate provides a C-compatible API for use with Qt or other C/C++
//! grid front-ends. The model handle is not thread-safe; all calls for one
//! handle must come from a single thread.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use gridlite_core::{Store, TableModel};

/// Opaque handle to a loaded table model
pub struct FfiModel {
    inner: TableModel,
}

unsafe fn cstr_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        None
    } else {
        CStr::from_ptr(ptr).to_str().ok()
    }
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).map(|s| s.into_raw()).unwrap_or(ptr::null_mut())
}

/// List the tables of a database as a JSON array string
///
/// # Safety
/// - `db_path` must be a valid C string
/// - Returns null on error
/// - Caller must free the returned string with `gl_free_string`
#[no_mangle]
pub unsafe extern "C" fn gl_table_names(db_path: *const c_char) -> *mut c_char {
    let path = match cstr_arg(db_path) {
        Some(p) => p,
        None => return ptr::null_mut(),
    };

    let names = match Store::open(path).and_then(|s| s.table_names()) {
        Ok(n) => n,
        Err(_) => return ptr::null_mut(),
    };

    match serde_json::to_string(&names) {
        Ok(json) => into_c_string(json),
        Err(_) => ptr::null_mut(),
    }
}

/// Open a database and load a table into an editable model
///
/// # Safety
/// - `db_path` and `table` must be valid C strings
/// - Returns null on error
#[no_mangle]
pub unsafe extern "C" fn gl_model_open(
    db_path: *const c_char,
    table: *const c_char,
) -> *mut FfiModel {
    let (path, table) = match (cstr_arg(db_path), cstr_arg(table)) {
        (Some(p), Some(t)) => (p, t),
        _ => return ptr::null_mut(),
    };

    let store = match Store::open(path) {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };

    match TableModel::load(store, table) {
        Ok(model) => Box::into_raw(Box::new(FfiModel { inner: model })),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a model handle (closing the store connection)
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open` or null
#[no_mangle]
pub unsafe extern "C" fn gl_model_free(model: *mut FfiModel) {
    if !model.is_null() {
        drop(Box::from_raw(model));
    }
}

/// Get the row count of a model
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
#[no_mangle]
pub unsafe extern "C" fn gl_model_row_count(model: *const FfiModel) -> usize {
    if model.is_null() {
        return 0;
    }
    (*model).inner.row_count()
}

/// Get the column count of a model
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
#[no_mangle]
pub unsafe extern "C" fn gl_model_col_count(model: *const FfiModel) -> usize {
    if model.is_null() {
        return 0;
    }
    (*model).inner.column_count()
}

/// Get a column name by index
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `gl_free_string`
#[no_mangle]
pub unsafe extern "C" fn gl_model_col_name(model: *const FfiModel, index: usize) -> *mut c_char {
    if model.is_null() {
        return ptr::null_mut();
    }

    (*model)
        .inner
        .column_name(index)
        .map(|name| into_c_string(name.to_string()))
        .unwrap_or(ptr::null_mut())
}

/// Get a column's declared type by index
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `gl_free_string`
#[no_mangle]
pub unsafe extern "C" fn gl_model_col_type(model: *const FfiModel, index: usize) -> *mut c_char {
    if model.is_null() {
        return ptr::null_mut();
    }

    (*model)
        .inner
        .column_type(index)
        .map(|decl| into_c_string(decl.to_string()))
        .unwrap_or(ptr::null_mut())
}

/// Get a display-formatted cell value
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
/// - Out-of-range indices yield an empty string, not null
/// - Caller must free the returned string with `gl_free_string`
#[no_mangle]
pub unsafe extern "C" fn gl_model_cell(
    model: *const FfiModel,
    row: usize,
    col: usize,
) -> *mut c_char {
    if model.is_null() {
        return ptr::null_mut();
    }
    into_c_string((*model).inner.cell(row, col))
}

/// Coerce and store a value into a cell (out-of-range is a no-op)
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
/// - `value` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn gl_model_set_cell(
    model: *mut FfiModel,
    row: usize,
    col: usize,
    value: *const c_char,
) {
    if model.is_null() {
        return;
    }
    if let Some(value) = cstr_arg(value) {
        (*model).inner.set_cell(row, col, value);
    }
}

/// Insert a new all-NULL row at the given index
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
#[no_mangle]
pub unsafe extern "C" fn gl_model_insert_row(model: *mut FfiModel, at: usize) {
    if !model.is_null() {
        (*model).inner.insert_row(at);
    }
}

/// Delete a row; returns false when the row cannot be deleted
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
#[no_mangle]
pub unsafe extern "C" fn gl_model_delete_row(model: *mut FfiModel, at: usize) -> bool {
    if model.is_null() {
        return false;
    }
    (*model).inner.delete_row(at)
}

/// Whether the model has uncommitted changes
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
#[no_mangle]
pub unsafe extern "C" fn gl_model_is_dirty(model: *const FfiModel) -> bool {
    if model.is_null() {
        return false;
    }
    (*model).inner.is_dirty()
}

/// Commit the accumulated edits to the store
///
/// # Safety
/// - `model` must be a valid pointer returned by `gl_model_open`
/// - When `message_out` is non-null it receives a human-readable outcome
///   message that the caller must free with `gl_free_string`
#[no_mangle]
pub unsafe extern "C" fn gl_model_commit(
    model: *mut FfiModel,
    message_out: *mut *mut c_char,
) -> bool {
    if model.is_null() {
        return false;
    }

    let outcome = (*model).inner.commit();
    if !message_out.is_null() {
        *message_out = into_c_string(outcome.message());
    }
    outcome.is_success()
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a gl_* function or null
#[no_mangle]
pub unsafe extern "C" fn gl_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
