//! Handle-based manifest builder exports.

use crate::{WasmManifestStatus, into_status, optional_str, required_str};
use std::collections::BTreeMap;
use std::ffi::{CString, c_char};
use tracing::warn;
use wasm_manifest::{DEFAULT_HTTP_METHOD, Manifest, ManifestError, SerializeOptions, Wasm};

unsafe fn manifest_mut<'a>(ptr: *mut Manifest) -> Result<&'a mut Manifest, WasmManifestStatus> {
    unsafe { ptr.as_mut() }.ok_or(WasmManifestStatus::NullPointer)
}

fn reject(err: ManifestError) -> WasmManifestStatus {
    warn!("manifest call rejected: {err}");
    WasmManifestStatus::from(&err)
}

/// Creates an empty manifest. Release it with `wasm_manifest_free`.
#[unsafe(no_mangle)]
pub extern "C" fn wasm_manifest_new() -> *mut Manifest {
    Box::into_raw(Box::new(Manifest::new()))
}

/// Releases a manifest and every module buffer it owns.
///
/// # Safety
/// `manifest` must be null or a handle from `wasm_manifest_new` that has not
/// been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_free(manifest: *mut Manifest) {
    if !manifest.is_null() {
        drop(unsafe { Box::from_raw(manifest) });
    }
}

/// Appends a module loaded from a local path.
///
/// # Safety
/// `manifest` must be a live handle. `path` must be a valid NUL-terminated
/// string; `hash` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_add_path(
    manifest: *mut Manifest,
    path: *const c_char,
    hash: *const c_char,
) -> WasmManifestStatus {
    into_status(unsafe { add_path_inner(manifest, path, hash) })
}

unsafe fn add_path_inner(
    manifest: *mut Manifest,
    path: *const c_char,
    hash: *const c_char,
) -> Result<(), WasmManifestStatus> {
    let manifest = unsafe { manifest_mut(manifest) }?;
    let path = unsafe { required_str(path) }?;
    let hash = unsafe { optional_str(hash) }?;
    manifest.add_wasm(Wasm::path(path).with_hash(hash));
    Ok(())
}

/// Appends a module fetched from a URL.
///
/// `method` defaults to `GET` when null or empty. `headers_json`, when not
/// null, must be a JSON object of string values.
///
/// # Safety
/// `manifest` must be a live handle. `url` must be a valid NUL-terminated
/// string; `method`, `headers_json` and `hash` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_add_url(
    manifest: *mut Manifest,
    url: *const c_char,
    method: *const c_char,
    headers_json: *const c_char,
    hash: *const c_char,
) -> WasmManifestStatus {
    into_status(unsafe { add_url_inner(manifest, url, method, headers_json, hash) })
}

unsafe fn add_url_inner(
    manifest: *mut Manifest,
    url: *const c_char,
    method: *const c_char,
    headers_json: *const c_char,
    hash: *const c_char,
) -> Result<(), WasmManifestStatus> {
    let manifest = unsafe { manifest_mut(manifest) }?;
    let url = unsafe { required_str(url) }?;
    let method = match unsafe { optional_str(method) }? {
        "" => DEFAULT_HTTP_METHOD,
        m => m,
    };
    let headers = match unsafe { optional_str(headers_json) }? {
        "" => BTreeMap::new(),
        json => serde_json::from_str::<BTreeMap<String, String>>(json).map_err(|e| {
            reject(ManifestError::InvalidArgument(format!(
                "headers must be a JSON object of strings: {e}"
            )))
        })?,
    };
    let hash = unsafe { optional_str(hash) }?;

    manifest.add_wasm(Wasm::url_request(url, method, headers).with_hash(hash));
    Ok(())
}

/// Appends a module copied from `len` bytes at `data`.
///
/// The bytes are copied before returning; the caller may release `data`
/// immediately afterwards. Null `data` with nonzero `len` is rejected with
/// `InvalidArgument`.
///
/// # Safety
/// `manifest` must be a live handle. When `len` is nonzero, `data` must be
/// valid for reads of `len` bytes. `hash` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_add_bytes(
    manifest: *mut Manifest,
    data: *const u8,
    len: usize,
    hash: *const c_char,
) -> WasmManifestStatus {
    into_status(unsafe { add_bytes_inner(manifest, data, len, hash) })
}

unsafe fn add_bytes_inner(
    manifest: *mut Manifest,
    data: *const u8,
    len: usize,
    hash: *const c_char,
) -> Result<(), WasmManifestStatus> {
    let manifest = unsafe { manifest_mut(manifest) }?;
    let hash = unsafe { optional_str(hash) }?;
    unsafe { manifest.add_wasm_raw_parts(data, len, hash) }.map_err(reject)?;
    Ok(())
}

/// Allows the plugin to reach `host`.
///
/// # Safety
/// `manifest` must be a live handle and `host` a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_allow_host(
    manifest: *mut Manifest,
    host: *const c_char,
) -> WasmManifestStatus {
    into_status(unsafe {
        manifest_mut(manifest).and_then(|m| {
            m.allow_host(required_str(host)?);
            Ok(())
        })
    })
}

/// Maps `src` to `dest` inside the sandbox; null or empty `dest` maps `src`
/// to itself.
///
/// # Safety
/// `manifest` must be a live handle and `src` a valid NUL-terminated string.
/// `dest` may be null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_allow_path(
    manifest: *mut Manifest,
    src: *const c_char,
    dest: *const c_char,
) -> WasmManifestStatus {
    into_status(unsafe {
        manifest_mut(manifest).and_then(|m| {
            m.map_path(required_str(src)?, optional_str(dest)?);
            Ok(())
        })
    })
}

/// Sets the execution time budget in milliseconds.
///
/// # Safety
/// `manifest` must be a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_set_timeout_ms(
    manifest: *mut Manifest,
    ms: u64,
) -> WasmManifestStatus {
    into_status(unsafe {
        manifest_mut(manifest).map(|m| {
            m.set_timeout_ms(ms);
        })
    })
}

/// Sets a config entry; the last value written for a key wins.
///
/// # Safety
/// `manifest` must be a live handle; `key` and `value` must be valid
/// NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_set_config(
    manifest: *mut Manifest,
    key: *const c_char,
    value: *const c_char,
) -> WasmManifestStatus {
    into_status(unsafe {
        manifest_mut(manifest).and_then(|m| {
            m.set_config(required_str(key)?, required_str(value)?);
            Ok(())
        })
    })
}

/// Serializes the manifest to compact JSON.
///
/// With `self_contained` false, module buffers are written as
/// `{"ptr", "len"}` addresses into this handle. Such a document is only
/// valid inside this process while the handle is alive and unmodified.
///
/// Returns null on failure. Free the result with `wasm_manifest_free_string`.
///
/// # Safety
/// `manifest` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasm_manifest_json(
    manifest: *const Manifest,
    self_contained: bool,
) -> *mut c_char {
    let Some(manifest) = (unsafe { manifest.as_ref() }) else {
        return std::ptr::null_mut();
    };

    let options = if self_contained {
        SerializeOptions::compact()
    } else {
        SerializeOptions::in_process()
    };

    match manifest.json_with(&options) {
        Ok(text) => CString::new(text)
            .map(CString::into_raw)
            .unwrap_or(std::ptr::null_mut()),
        Err(e) => {
            reject(e);
            std::ptr::null_mut()
        }
    }
}
