//! Declarative manifests for Wasm plugins.
//!
//! A [`Manifest`] lists where a plugin's modules come from (local path,
//! remote URL or in-memory bytes) together with the policy the runtime
//! should apply: config values, reachable hosts, mapped paths and a time
//! budget. [`Manifest::json`] turns that description into the compact JSON
//! document consumed by the plugin runtime.
//!
//! This crate performs no I/O. Paths and URLs are never checked, hashes are
//! carried but never verified, and module bytes are never validated.
//!
//! ```
//! use wasm_manifest::{Manifest, Wasm};
//!
//! let mut manifest = Manifest::from_wasm(Wasm::path("plugin.wasm").with_hash("abc123"));
//! manifest
//!     .allow_host("api.example.com")
//!     .allow_path("/data")
//!     .set_config("mode", "fast")
//!     .set_timeout_ms(500);
//!
//! assert_eq!(
//!     manifest.json().unwrap(),
//!     r#"{"wasm":[{"path":"plugin.wasm","hash":"abc123"}],"config":{"mode":"fast"},"allowed_hosts":["api.example.com"],"allowed_paths":{"/data":"/data"},"timeout_ms":500}"#
//! );
//! ```
//!
//! Manifests are plain owned values with no internal synchronization.
//! Share one across threads only behind the caller's own lock.

pub mod encoding;
mod error;
mod manifest;
mod serializer;
mod wasm;

pub use error::{ManifestError, ManifestResult};
pub use manifest::Manifest;
pub use serializer::{BytesEncoding, SerializeOptions};
pub use wasm::{DEFAULT_HTTP_METHOD, Wasm, WasmSource};
