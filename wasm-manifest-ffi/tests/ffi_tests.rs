//! Integration tests for the C ABI — drives the exports exactly as a C host would.

use pretty_assertions::assert_eq;
use std::ffi::{CStr, CString, c_char};
use std::ptr;
use wasm_manifest_ffi::*;

fn cstr(s: &str) -> CString {
    CString::new(s).unwrap()
}

/// Serializes `manifest` and takes ownership of the returned string.
fn json_of(manifest: *const wasm_manifest::Manifest, self_contained: bool) -> String {
    unsafe {
        let raw = wasm_manifest_json(manifest, self_contained);
        assert!(!raw.is_null(), "serialization should succeed");
        let text = CStr::from_ptr(raw).to_str().unwrap().to_owned();
        wasm_manifest_free_string(raw);
        text
    }
}

// ================================================================
// Handle lifecycle
// ================================================================

#[test]
fn new_manifest_serializes_empty() {
    let m = wasm_manifest_new();
    assert_eq!(json_of(m, true), r#"{"wasm":[]}"#);
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn free_null_is_noop() {
    unsafe {
        wasm_manifest_free(ptr::null_mut());
        wasm_manifest_free_string(ptr::null_mut());
    }
}

#[test]
fn null_handle_is_rejected() {
    let path = cstr("a.wasm");
    unsafe {
        assert_eq!(
            wasm_manifest_add_path(ptr::null_mut(), path.as_ptr(), ptr::null()),
            WasmManifestStatus::NullPointer
        );
        assert_eq!(
            wasm_manifest_set_timeout_ms(ptr::null_mut(), 5),
            WasmManifestStatus::NullPointer
        );
        assert!(wasm_manifest_json(ptr::null(), true).is_null());
    }
}

#[test]
fn version_is_nul_terminated() {
    let version = unsafe { CStr::from_ptr(wasm_manifest_version()) };
    assert!(!version.to_str().unwrap().is_empty());
}

#[test]
fn init_logging_twice_is_harmless() {
    wasm_manifest_init_logging(false);
    wasm_manifest_init_logging(true);
}

// ================================================================
// Module sources
// ================================================================

#[test]
fn add_path_with_and_without_hash() {
    let m = wasm_manifest_new();
    let a = cstr("a.wasm");
    let b = cstr("b.wasm");
    let hash = cstr("abc");
    unsafe {
        assert_eq!(
            wasm_manifest_add_path(m, a.as_ptr(), ptr::null()),
            WasmManifestStatus::Ok
        );
        assert_eq!(
            wasm_manifest_add_path(m, b.as_ptr(), hash.as_ptr()),
            WasmManifestStatus::Ok
        );
    }
    assert_eq!(
        json_of(m, true),
        r#"{"wasm":[{"path":"a.wasm"},{"path":"b.wasm","hash":"abc"}]}"#
    );
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn add_path_requires_path() {
    let m = wasm_manifest_new();
    unsafe {
        assert_eq!(
            wasm_manifest_add_path(m, ptr::null(), ptr::null()),
            WasmManifestStatus::NullPointer
        );
    }
    assert_eq!(json_of(m, true), r#"{"wasm":[]}"#);
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn add_path_rejects_invalid_utf8() {
    let m = wasm_manifest_new();
    let bad: [u8; 3] = [0xff, 0xfe, 0];
    unsafe {
        assert_eq!(
            wasm_manifest_add_path(m, bad.as_ptr().cast::<c_char>(), ptr::null()),
            WasmManifestStatus::InvalidUtf8
        );
        wasm_manifest_free(m);
    }
}

#[test]
fn add_url_defaults_method() {
    let m = wasm_manifest_new();
    let url = cstr("https://example.com/p.wasm");
    unsafe {
        assert_eq!(
            wasm_manifest_add_url(m, url.as_ptr(), ptr::null(), ptr::null(), ptr::null()),
            WasmManifestStatus::Ok
        );
    }
    assert_eq!(
        json_of(m, true),
        r#"{"wasm":[{"url":"https://example.com/p.wasm","method":"GET"}]}"#
    );
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn add_url_with_method_and_headers() {
    let m = wasm_manifest_new();
    let url = cstr("http://x");
    let method = cstr("POST");
    let headers = cstr(r#"{"A":"B"}"#);
    unsafe {
        assert_eq!(
            wasm_manifest_add_url(
                m,
                url.as_ptr(),
                method.as_ptr(),
                headers.as_ptr(),
                ptr::null()
            ),
            WasmManifestStatus::Ok
        );
    }
    assert_eq!(
        json_of(m, true),
        r#"{"wasm":[{"url":"http://x","method":"POST","headers":{"A":"B"}}]}"#
    );
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn add_url_rejects_malformed_headers() {
    let m = wasm_manifest_new();
    let url = cstr("http://x");
    let headers = cstr(r#"{"A":1}"#);
    unsafe {
        assert_eq!(
            wasm_manifest_add_url(m, url.as_ptr(), ptr::null(), headers.as_ptr(), ptr::null()),
            WasmManifestStatus::InvalidArgument
        );
    }
    assert_eq!(json_of(m, true), r#"{"wasm":[]}"#);
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn add_bytes_copies_buffer() {
    let m = wasm_manifest_new();
    let hash = cstr("deadbeef");
    let mut data = vec![1u8, 2, 3];
    unsafe {
        assert_eq!(
            wasm_manifest_add_bytes(m, data.as_ptr(), data.len(), hash.as_ptr()),
            WasmManifestStatus::Ok
        );
    }
    data.fill(0);
    drop(data);

    assert_eq!(
        json_of(m, true),
        r#"{"wasm":[{"data":"AQID","hash":"deadbeef"}]}"#
    );
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn add_bytes_null_with_length_is_invalid_argument() {
    let m = wasm_manifest_new();
    unsafe {
        assert_eq!(
            wasm_manifest_add_bytes(m, ptr::null(), 8, ptr::null()),
            WasmManifestStatus::InvalidArgument
        );
        assert_eq!(
            wasm_manifest_add_bytes(m, ptr::null(), 0, ptr::null()),
            WasmManifestStatus::Ok
        );
    }
    assert_eq!(json_of(m, true), r#"{"wasm":[{"data":""}]}"#);
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn add_bytes_unallocatable_length_is_allocation_failed() {
    let m = wasm_manifest_new();
    let dangling = ptr::NonNull::<u8>::dangling().as_ptr();
    unsafe {
        assert_eq!(
            wasm_manifest_add_bytes(m, dangling, usize::MAX, ptr::null()),
            WasmManifestStatus::AllocationFailed
        );
    }
    assert_eq!(json_of(m, true), r#"{"wasm":[]}"#);
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn in_process_mode_emits_pointer_and_length() {
    let m = wasm_manifest_new();
    let data = [0u8, 97, 115, 109];
    unsafe {
        wasm_manifest_add_bytes(m, data.as_ptr(), data.len(), ptr::null());
    }

    let doc: serde_json::Value = serde_json::from_str(&json_of(m, false)).unwrap();
    let entry = &doc["wasm"][0]["data"];
    assert!(entry["ptr"].as_u64().is_some_and(|p| p != 0));
    assert_eq!(entry["len"].as_u64(), Some(4));
    unsafe { wasm_manifest_free(m) };
}

// ================================================================
// Policy fields
// ================================================================

#[test]
fn policy_fields_roundtrip_through_json() {
    let m = wasm_manifest_new();
    let path = cstr("main.wasm");
    let host = cstr("api.example.com");
    let data_dir = cstr("/data");
    let cache_src = cstr("/var/cache");
    let cache_dst = cstr("/cache");
    let key = cstr("k");
    let v1 = cstr("v1");
    let v2 = cstr("v2");

    unsafe {
        wasm_manifest_add_path(m, path.as_ptr(), ptr::null());
        assert_eq!(wasm_manifest_allow_host(m, host.as_ptr()), WasmManifestStatus::Ok);
        assert_eq!(
            wasm_manifest_allow_path(m, data_dir.as_ptr(), ptr::null()),
            WasmManifestStatus::Ok
        );
        assert_eq!(
            wasm_manifest_allow_path(m, cache_src.as_ptr(), cache_dst.as_ptr()),
            WasmManifestStatus::Ok
        );
        assert_eq!(wasm_manifest_set_config(m, key.as_ptr(), v1.as_ptr()), WasmManifestStatus::Ok);
        assert_eq!(wasm_manifest_set_config(m, key.as_ptr(), v2.as_ptr()), WasmManifestStatus::Ok);
        assert_eq!(wasm_manifest_set_timeout_ms(m, 500), WasmManifestStatus::Ok);
    }

    assert_eq!(
        json_of(m, true),
        concat!(
            r#"{"wasm":[{"path":"main.wasm"}],"#,
            r#""config":{"k":"v2"},"#,
            r#""allowed_hosts":["api.example.com"],"#,
            r#""allowed_paths":{"/data":"/data","/var/cache":"/cache"},"#,
            r#""timeout_ms":500}"#,
        )
    );
    unsafe { wasm_manifest_free(m) };
}

#[test]
fn set_config_requires_value() {
    let m = wasm_manifest_new();
    let key = cstr("k");
    unsafe {
        assert_eq!(
            wasm_manifest_set_config(m, key.as_ptr(), ptr::null()),
            WasmManifestStatus::NullPointer
        );
        wasm_manifest_free(m);
    }
}
