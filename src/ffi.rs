//! FFI bindings for humanbench
//!
//! This module provides C-compatible functions for calling humanbench from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `hbench_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::AnalysisConfig;
use crate::grid::{island_sizes, Grid};
use crate::pipeline::{analyze_capture_json, BenchmarkAnalyzer};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a capture bundle JSON and return the report envelope JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `hbench_free_string`.
/// - Returns NULL on error; call `hbench_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hbench_analyze_json(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match analyze_capture_json(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Count the islands of a grid given as a JSON array of rows.
///
/// Returns the island sizes as a JSON array, largest first.
///
/// # Safety
/// - `grid_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `hbench_free_string`.
/// - Returns NULL on error; call `hbench_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hbench_islands_json(grid_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let grid_str = match cstr_to_string(grid_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid grid string pointer");
            return ptr::null_mut();
        }
    };

    let grid: Grid = match serde_json::from_str(&grid_str) {
        Ok(grid) => grid,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(&island_sizes(&grid)) {
        Ok(sizes) => string_to_cstr(&sizes),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Analyzer API
// ============================================================================

/// Opaque handle to a BenchmarkAnalyzer
pub struct BenchmarkAnalyzerHandle {
    analyzer: BenchmarkAnalyzer,
}

/// Create a new BenchmarkAnalyzer.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration; otherwise it must
///   be a valid null-terminated C string holding an analysis configuration.
/// - Returns a pointer to a newly allocated analyzer.
/// - Must be freed with `hbench_analyzer_free`.
/// - Returns NULL on error; call `hbench_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hbench_analyzer_new(
    config_json: *const c_char,
) -> *mut BenchmarkAnalyzerHandle {
    clear_last_error();

    let analyzer = if config_json.is_null() {
        BenchmarkAnalyzer::new()
    } else {
        let config_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        let built = AnalysisConfig::from_json(&config_str).and_then(BenchmarkAnalyzer::with_config);
        match built {
            Ok(analyzer) => analyzer,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(BenchmarkAnalyzerHandle { analyzer });
    Box::into_raw(handle)
}

/// Free a BenchmarkAnalyzer.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `hbench_analyzer_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn hbench_analyzer_free(analyzer: *mut BenchmarkAnalyzerHandle) {
    if !analyzer.is_null() {
        drop(Box::from_raw(analyzer));
    }
}

/// Analyze a capture bundle JSON with a configured analyzer.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `hbench_analyzer_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `hbench_free_string`.
/// - Returns NULL on error; call `hbench_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hbench_analyzer_process(
    analyzer: *const BenchmarkAnalyzerHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if analyzer.is_null() {
        set_last_error("Null analyzer pointer");
        return ptr::null_mut();
    }

    let handle = &*analyzer;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.analyzer.process(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string returned by humanbench functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a humanbench function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn hbench_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next humanbench call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn hbench_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the humanbench library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn hbench_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_capture() -> CString {
        CString::new(
            r#"{
                "session_id": "ffi-run",
                "reaction": { "times": [210, 190] },
                "aim": { "targets": 2, "seconds": 0.9, "coordinates": [[10, 10], [10, 410]] }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_analyze_json() {
        let json = sample_capture();

        unsafe {
            let result = hbench_analyze_json(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("report_version"));
            assert!(result_str.contains("ffi-run"));

            hbench_free_string(result);
        }
    }

    #[test]
    fn test_ffi_islands_json() {
        let grid = CString::new("[[1,1,0],[0,0,0],[0,1,1]]").unwrap();

        unsafe {
            let result = hbench_islands_json(grid.as_ptr());
            assert!(!result.is_null());
            assert_eq!(CStr::from_ptr(result).to_str().unwrap(), "[2,2]");
            hbench_free_string(result);

            let ragged = CString::new("[[1,1],[0]]").unwrap();
            assert!(hbench_islands_json(ragged.as_ptr()).is_null());
            assert!(!hbench_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_analyzer_lifecycle() {
        unsafe {
            let analyzer = hbench_analyzer_new(ptr::null());
            assert!(!analyzer.is_null());

            let json = sample_capture();
            let first = hbench_analyzer_process(analyzer, json.as_ptr());
            let second = hbench_analyzer_process(analyzer, json.as_ptr());
            assert!(!first.is_null());
            assert!(!second.is_null());

            let first_value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(first).to_str().unwrap()).unwrap();
            let second_value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(second).to_str().unwrap()).unwrap();
            assert_eq!(
                first_value["producer"]["instance_id"],
                second_value["producer"]["instance_id"]
            );

            hbench_free_string(first);
            hbench_free_string(second);
            hbench_analyzer_free(analyzer);
        }
    }

    #[test]
    fn test_ffi_analyzer_with_config() {
        unsafe {
            let config = CString::new(r#"{"target_radius": 0}"#).unwrap();
            let analyzer = hbench_analyzer_new(config.as_ptr());
            assert!(!analyzer.is_null());

            let json = sample_capture();
            let result = hbench_analyzer_process(analyzer, json.as_ptr());
            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(value["results"]["aim"]["distance"]["total"], 400.0);

            hbench_free_string(result);
            hbench_analyzer_free(analyzer);

            let bad = CString::new(r#"{"most_common_count": 0}"#).unwrap();
            assert!(hbench_analyzer_new(bad.as_ptr()).is_null());
            assert!(!hbench_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();

            let result = hbench_analyze_json(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = hbench_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            assert!(hbench_analyzer_process(ptr::null(), invalid_json.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = hbench_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
