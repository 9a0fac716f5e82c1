//! C ABI exports for building Wasm plugin manifests from non-Rust hosts.
//!
//! A host creates an opaque handle with `wasm_manifest_new`, populates it
//! through the `wasm_manifest_add_*`/`allow_*`/`set_*` calls, asks for the
//! JSON document with `wasm_manifest_json`, and finally releases both the
//! string and the handle. Handles are not synchronized; callers that share
//! one across threads must lock around every call.
//!
//! Every fallible call returns a [`WasmManifestStatus`].

mod manifest;

pub use manifest::*;

use std::ffi::{CStr, CString, c_char};
use tracing_subscriber::EnvFilter;
use wasm_manifest::ManifestError;

/// Status code returned by every fallible export.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WasmManifestStatus {
    Ok = 0,
    /// A required pointer argument was null.
    NullPointer = 1,
    /// A string argument was not valid UTF-8.
    InvalidUtf8 = 2,
    /// An argument was rejected (e.g. null buffer with nonzero length, malformed headers).
    InvalidArgument = 3,
    /// A module buffer could not be copied.
    AllocationFailed = 4,
    /// The JSON document could not be produced.
    SerializationFailed = 5,
}

impl From<&ManifestError> for WasmManifestStatus {
    fn from(err: &ManifestError) -> Self {
        match err {
            ManifestError::InvalidArgument(_) => Self::InvalidArgument,
            ManifestError::Allocation { .. } => Self::AllocationFailed,
            ManifestError::Serialization(_) => Self::SerializationFailed,
        }
    }
}

fn into_status(result: Result<(), WasmManifestStatus>) -> WasmManifestStatus {
    result.err().unwrap_or(WasmManifestStatus::Ok)
}

/// Reads a required NUL-terminated UTF-8 string.
unsafe fn required_str<'a>(ptr: *const c_char) -> Result<&'a str, WasmManifestStatus> {
    if ptr.is_null() {
        return Err(WasmManifestStatus::NullPointer);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| WasmManifestStatus::InvalidUtf8)
}

/// Reads an optional NUL-terminated UTF-8 string; null reads as empty.
unsafe fn optional_str<'a>(ptr: *const c_char) -> Result<&'a str, WasmManifestStatus> {
    if ptr.is_null() {
        return Ok("");
    }
    unsafe { required_str(ptr) }
}

/// Installs a `tracing` subscriber writing to stderr.
///
/// Honors `RUST_LOG`; otherwise logs at `info`, or `debug` when `verbose`.
/// Calling again after a subscriber is installed does nothing.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_manifest_init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Returns the library version as a static NUL-terminated string.
/// The pointer must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_manifest_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr().cast()
}

/// Frees a string returned by this library.
///
/// # Safety
/// `s` must be null or a pointer returned by `wasm_manifest_json` that has
/// not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
