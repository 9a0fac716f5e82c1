//! JSON wire format for manifests.
//!
//! Document shape:
//!
//! ```json
//! {
//!   "wasm": [{"path": "a.wasm"}, {"url": "https://…", "method": "GET", "hash": "…"}],
//!   "config": {"key": "value"},
//!   "allowed_hosts": ["example.com"],
//!   "allowed_paths": {"/data": "/data"},
//!   "timeout_ms": 500
//! }
//! ```
//!
//! `wasm` is always present; every other top-level key is omitted when empty
//! or unset. Each wasm entry carries exactly one of `path`, `url` (with
//! `method` and optional `headers`) or `data`, plus an optional `hash`.

use crate::encoding;
use crate::error::ManifestResult;
use crate::manifest::Manifest;
use crate::wasm::{Wasm, WasmSource};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How `Bytes` sources are written into the `data` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BytesEncoding {
    #[default]
    /// Self-contained: `data` is the base64 text of the buffer.
    Base64,
    /// In-process reference: `data` is `{"ptr": <address>, "len": <length>}`.
    ///
    /// # Same-process contract
    /// The address points into the manifest's own buffer. The document is only
    /// meaningful to a consumer running in the same address space that reads it
    /// while the manifest is alive and unmodified. Never persist such a document
    /// or send it across a process boundary.
    Pointer,
}

/// Serializer configuration. Every field has a default, so an empty config
/// object yields compact, self-contained output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    pub bytes: BytesEncoding,
    /// Indent the output. The field set and nesting are unchanged.
    pub pretty: bool,
}

impl SerializeOptions {
    /// Compact output with inline base64 data.
    pub fn compact() -> Self {
        Self::default()
    }

    /// Indented output with inline base64 data.
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Compact output referencing buffers by address. See [`BytesEncoding::Pointer`].
    pub fn in_process() -> Self {
        Self {
            bytes: BytesEncoding::Pointer,
            ..Self::default()
        }
    }
}

/// Borrowed view of one wasm entry, bound to an encoding mode.
struct WasmEntry<'a> {
    wasm: &'a Wasm,
    bytes: BytesEncoding,
}

impl Serialize for WasmEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        match self.wasm.source() {
            WasmSource::Path(path) => {
                map.serialize_entry("path", path)?;
            }
            WasmSource::Url {
                url,
                method,
                headers,
            } => {
                map.serialize_entry("url", url)?;
                map.serialize_entry("method", method)?;
                if !headers.is_empty() {
                    map.serialize_entry("headers", headers)?;
                }
            }
            WasmSource::Bytes(buffer) => match self.bytes {
                BytesEncoding::Base64 => {
                    map.serialize_entry("data", &encoding::encode(buffer))?;
                }
                BytesEncoding::Pointer => {
                    map.serialize_entry("data", &BufferRef::new(buffer))?;
                }
            },
        }

        if let Some(hash) = self.wasm.hash() {
            map.serialize_entry("hash", hash)?;
        }

        map.end()
    }
}

#[derive(Serialize)]
struct BufferRef {
    ptr: u64,
    len: u64,
}

impl BufferRef {
    /// An empty buffer has no allocation, so it is written as a null address.
    fn new(buffer: &[u8]) -> Self {
        let ptr = if buffer.is_empty() {
            0
        } else {
            buffer.as_ptr() as u64
        };
        Self {
            ptr,
            len: buffer.len() as u64,
        }
    }
}

/// Borrowed view of a whole manifest in wire layout.
#[derive(Serialize)]
struct ManifestDocument<'a> {
    wasm: Vec<WasmEntry<'a>>,
    #[serde(skip_serializing_if = "is_empty_map")]
    config: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    allowed_hosts: &'a [String],
    #[serde(skip_serializing_if = "is_empty_map")]
    allowed_paths: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

fn is_empty_map(map: &&BTreeMap<String, String>) -> bool {
    map.is_empty()
}

impl<'a> ManifestDocument<'a> {
    fn new(manifest: &'a Manifest, bytes: BytesEncoding) -> Self {
        Self {
            wasm: manifest
                .wasm()
                .iter()
                .map(|wasm| WasmEntry { wasm, bytes })
                .collect(),
            config: manifest.config(),
            allowed_hosts: manifest.allowed_hosts(),
            allowed_paths: manifest.allowed_paths(),
            timeout_ms: manifest.timeout_ms(),
        }
    }
}

impl Wasm {
    /// Returns this entry as a JSON object.
    pub fn to_value(&self, bytes: BytesEncoding) -> ManifestResult<serde_json::Value> {
        Ok(serde_json::to_value(WasmEntry { wasm: self, bytes })?)
    }
}

impl Manifest {
    /// Serializes to compact, self-contained JSON.
    pub fn json(&self) -> ManifestResult<String> {
        self.json_with(&SerializeOptions::default())
    }

    /// Serializes to JSON text using `options`.
    pub fn json_with(&self, options: &SerializeOptions) -> ManifestResult<String> {
        if options.bytes == BytesEncoding::Pointer && self.has_bytes_source() {
            warn!("serializing module buffers by address; document is valid in this process only");
        }

        let document = ManifestDocument::new(self, options.bytes);
        let text = if options.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };

        debug!(
            wasm = self.wasm().len(),
            bytes = ?options.bytes,
            pretty = options.pretty,
            len = text.len(),
            "serialized manifest"
        );
        Ok(text)
    }

    /// Returns the manifest as a JSON value tree.
    pub fn to_value(&self, bytes: BytesEncoding) -> ManifestResult<serde_json::Value> {
        Ok(serde_json::to_value(ManifestDocument::new(self, bytes))?)
    }

    fn has_bytes_source(&self) -> bool {
        self.wasm()
            .iter()
            .any(|w| matches!(w.source(), WasmSource::Bytes(_)))
    }
}
