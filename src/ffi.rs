//! FFI bindings for WorkPulse
//!
//! This module provides C-compatible functions for calling WorkPulse from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `pulse_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::activity::{ActivityClassifier, ClassifierConfig, LandmarkFrame};
use crate::performance::score_time_metrics_json;

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
// Performance Scoring
// ============================================================================

/// Score a time metrics request JSON and return the report envelope JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_score_time_metrics(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match score_time_metrics_json(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Activity Classifier Session API
// ============================================================================

/// Opaque handle to an ActivityClassifier session
pub struct ClassifierHandle {
    classifier: ActivityClassifier,
}

/// Create a classifier session.
///
/// # Safety
/// - `config_json` may be NULL for default tuning, otherwise a valid
///   null-terminated C string holding a classifier configuration.
/// - Returns a pointer that must be freed with `pulse_classifier_free`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_classifier_new(
    config_json: *const c_char,
) -> *mut ClassifierHandle {
    clear_last_error();

    let classifier = if config_json.is_null() {
        ActivityClassifier::new()
    } else {
        let config = match cstr_to_string(config_json)
            .ok_or_else(|| "Invalid config string pointer".to_string())
            .and_then(|json| ClassifierConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(msg) => {
                set_last_error(&msg);
                return ptr::null_mut();
            }
        };
        match ActivityClassifier::with_config(config) {
            Ok(classifier) => classifier,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(ClassifierHandle { classifier }))
}

/// Free a classifier session.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_classifier_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_classifier_free(handle: *mut ClassifierHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Classify one landmark frame JSON and return the classification output JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_classifier_new`.
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_classifier_classify(
    handle: *mut ClassifierHandle,
    frame_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null classifier pointer");
        return ptr::null_mut();
    }

    let handle = &mut *handle;

    let json_str = match cstr_to_string(frame_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frame string pointer");
            return ptr::null_mut();
        }
    };

    let frame = match LandmarkFrame::from_json(&json_str) {
        Ok(frame) => frame,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let output = handle.classifier.classify_frame(&frame);
    match serde_json::to_string(&output) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reset a classifier session before monitoring a new subject.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_classifier_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_classifier_reset(handle: *mut ClassifierHandle) -> i32 {
    clear_last_error();

    if handle.is_null() {
        set_last_error("Null classifier pointer");
        return -1;
    }

    (*handle).classifier.reset();
    0
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by WorkPulse functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a WorkPulse function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next WorkPulse call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn pulse_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the WorkPulse library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn pulse_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
