//! FFI bindings for PEARL fatigue scoring
//!
//! This module provides C-compatible functions for calling the engine from other
//! languages. All functions exchange JSON documents as C strings (null-terminated)
//! and return allocated memory that must be freed by the caller using
//! `pearl_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::ScoringConfig;
use crate::error::FatigueError;
use crate::pipeline::{calibrate_baseline, compare_to_report, score_to_report, FatigueProcessor};

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

/// Run a JSON-in/JSON-out call, recording any failure as the last error
unsafe fn json_call<F>(input: *const c_char, call: F) -> *mut c_char
where
    F: FnOnce(&str) -> Result<String, FatigueError>,
{
    clear_last_error();

    let input_str = match cstr_to_string(input) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match call(&input_str) {
        Ok(output) => string_to_cstr(&output),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a request document (baseline, metrics, profile, optional shift delta)
/// and return report JSON.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pearl_free_string`.
/// - Returns NULL on error; call `pearl_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pearl_score_json(request_json: *const c_char) -> *mut c_char {
    json_call(request_json, score_to_report)
}

/// Compare pre/post shift snapshots and return report JSON.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pearl_free_string`.
/// - Returns NULL on error; call `pearl_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pearl_compare_json(request_json: *const c_char) -> *mut c_char {
    json_call(request_json, compare_to_report)
}

/// Turn calibration samples JSON into baseline JSON.
///
/// # Safety
/// - `samples_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pearl_free_string`.
/// - Returns NULL on error; call `pearl_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pearl_calibrate_json(samples_json: *const c_char) -> *mut c_char {
    json_call(samples_json, calibrate_baseline)
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a FatigueProcessor
pub struct PearlProcessorHandle {
    processor: FatigueProcessor,
}

/// Create a new processor. A non-positive or non-finite `z_threshold` selects
/// the default of 2.5.
///
/// # Safety
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `pearl_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn pearl_processor_new(z_threshold: f64) -> *mut PearlProcessorHandle {
    clear_last_error();

    let config = ScoringConfig::with_z_threshold(z_threshold);
    let config = if config.validate().is_ok() {
        config
    } else {
        ScoringConfig::default()
    };

    let handle = Box::new(PearlProcessorHandle {
        processor: FatigueProcessor::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `pearl_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pearl_processor_free(processor: *mut PearlProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Score an observation window (`{metrics, profile, shift_delta?}`) against the
/// processor's baseline.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `pearl_processor_new`.
/// - `window_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pearl_free_string`.
/// - Returns NULL on error; call `pearl_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pearl_processor_process(
    processor: *mut PearlProcessorHandle,
    window_json: *const c_char,
) -> *mut c_char {
    if processor.is_null() {
        clear_last_error();
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    json_call(window_json, |json| handle.processor.process_json(json))
}

/// Fold calibration samples JSON into the processor's baseline.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `pearl_processor_new`.
/// - `samples_json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn pearl_processor_calibrate(
    processor: *mut PearlProcessorHandle,
    samples_json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(samples_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return -1;
        }
    };

    match handle.processor.calibrate_json(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Save the processor baseline to JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `pearl_processor_new`.
/// - Returns a newly allocated string that must be freed with `pearl_free_string`.
/// - Returns NULL on error; call `pearl_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pearl_processor_save_baseline(
    processor: *mut PearlProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.save_baseline() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load the processor baseline from JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `pearl_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `pearl_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pearl_processor_load_baseline(
    processor: *mut PearlProcessorHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return -1;
        }
    };

    match handle.processor.load_baseline(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by PEARL functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a PEARL function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pearl_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next PEARL function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn pearl_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn pearl_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request_json() -> CString {
        CString::new(
            r#"{
            "baseline": {
                "response_delay": { "mean": 1.0, "std_dev": 0.1 },
                "blink_rate": { "mean": 18.0, "std_dev": 3.0 }
            },
            "metrics": { "response_delay": 1.3, "blink_rate": 24.0 },
            "profile": { "experience_years": 3, "age": 56 },
            "shift_delta": 0.7
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_score_json() {
        let json = sample_request_json();

        unsafe {
            let result = pearl_score_json(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let payload: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(payload["assessment"]["top_factors"][0]["key"], "response_delay");

            pearl_free_string(result);
        }
    }

    #[test]
    fn test_ffi_compare_and_calibrate() {
        let compare = CString::new(
            r#"{
            "pre_shift": { "name": "Pre", "metrics": { "blink_rate": 25.0 } },
            "post_shift": { "name": "Post", "metrics": { "blink_rate": 28.0 } },
            "fatigue_delta": 0.08
        }"#,
        )
        .unwrap();
        let samples = CString::new(r#"{"blink_rate": [16.0, 20.0]}"#).unwrap();

        unsafe {
            let review = pearl_compare_json(compare.as_ptr());
            assert!(!review.is_null());
            assert!(CStr::from_ptr(review).to_str().unwrap().contains("worsened"));
            pearl_free_string(review);

            let baseline = pearl_calibrate_json(samples.as_ptr());
            assert!(!baseline.is_null());
            assert!(CStr::from_ptr(baseline).to_str().unwrap().contains("blink_rate"));
            pearl_free_string(baseline);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let samples = CString::new(r#"{"blink_rate": [15.0, 18.0, 21.0]}"#).unwrap();
        let window = CString::new(
            r#"{"metrics": {"blink_rate": 27.0}, "profile": {"experience_years": 8}}"#,
        )
        .unwrap();

        unsafe {
            let processor = pearl_processor_new(2.5);
            assert!(!processor.is_null());

            assert_eq!(pearl_processor_calibrate(processor, samples.as_ptr()), 0);

            let result = pearl_processor_process(processor, window.as_ptr());
            assert!(!result.is_null());
            pearl_free_string(result);

            // Save baseline and load it into a new processor
            let baseline = pearl_processor_save_baseline(processor);
            assert!(!baseline.is_null());

            let processor2 = pearl_processor_new(0.0);
            assert_eq!(pearl_processor_load_baseline(processor2, baseline), 0);

            pearl_free_string(baseline);
            pearl_processor_free(processor);
            pearl_processor_free(processor2);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid_json = CString::new("not json").unwrap();

        unsafe {
            let result = pearl_score_json(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = pearl_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            assert!(pearl_score_json(ptr::null()).is_null());
            assert!(pearl_processor_process(ptr::null_mut(), invalid_json.as_ptr()).is_null());
            assert_eq!(
                pearl_processor_load_baseline(ptr::null_mut(), invalid_json.as_ptr()),
                -1
            );
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = pearl_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
