//! Module source descriptors.

use crate::error::{ManifestError, ManifestResult};
use std::collections::BTreeMap;
use tracing::debug;

/// HTTP method used for URL sources when none is given.
pub const DEFAULT_HTTP_METHOD: &str = "GET";

/// Where a Wasm module comes from. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WasmSource {
    /// Local filesystem path. Never normalized or checked for existence.
    Path(String),
    /// Remote module fetched by the runtime.
    Url {
        url: String,
        method: String,
        headers: BTreeMap<String, String>,
    },
    /// Module bytes owned by this source.
    Bytes(Vec<u8>),
}

/// One module entry of a manifest: a source plus an optional integrity hash.
///
/// The hash is carried opaquely; it is never computed or verified here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wasm {
    source: WasmSource,
    hash: Option<String>,
}

impl Wasm {
    /// Creates a module entry pointing at a local path.
    pub fn path(path: impl Into<String>) -> Self {
        Self::from_source(WasmSource::Path(path.into()))
    }

    /// Creates a module entry fetched from `url` with `GET` and no headers.
    pub fn url(url: impl Into<String>) -> Self {
        Self::url_request(url, DEFAULT_HTTP_METHOD, BTreeMap::<String, String>::new())
    }

    /// Creates a module entry fetched from `url` with an explicit method and headers.
    pub fn url_request<K, V>(
        url: impl Into<String>,
        method: impl Into<String>,
        headers: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_source(WasmSource::Url {
            url: url.into(),
            method: method.into(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    /// Creates a module entry from in-memory bytes.
    ///
    /// Borrowed input is copied; an owned `Vec` is moved in. Either way the
    /// entry owns its buffer exclusively.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        let mut buffer: Vec<u8> = data.into();
        buffer.shrink_to_fit();
        Self::from_source(WasmSource::Bytes(buffer))
    }

    /// Creates a module entry by deep-copying `len` bytes starting at `data`.
    ///
    /// A null `data` is accepted only when `len` is zero.
    ///
    /// # Errors
    /// - [`ManifestError::InvalidArgument`] when `data` is null and `len` is nonzero.
    /// - [`ManifestError::Allocation`] when the copy cannot be allocated.
    ///
    /// # Safety
    /// When `len` is nonzero, `data` must be valid for reads of `len` bytes
    /// for the duration of this call. The memory is not referenced afterwards.
    pub unsafe fn from_raw_parts(data: *const u8, len: usize) -> ManifestResult<Self> {
        if len == 0 {
            return Ok(Self::from_source(WasmSource::Bytes(Vec::new())));
        }
        if data.is_null() {
            return Err(ManifestError::InvalidArgument(format!(
                "null module buffer with length {len}"
            )));
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| ManifestError::Allocation { requested: len })?;
        // SAFETY: `data` is non-null and the caller guarantees `len` readable bytes.
        buffer.extend_from_slice(unsafe { std::slice::from_raw_parts(data, len) });

        debug!(len, "copied module bytes from raw buffer");
        Ok(Self::from_source(WasmSource::Bytes(buffer)))
    }

    /// Wraps an already-built source with no hash.
    pub fn from_source(source: WasmSource) -> Self {
        Self { source, hash: None }
    }

    /// Attaches an integrity hash. An empty string clears it.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        self.hash = (!hash.is_empty()).then_some(hash);
        self
    }

    /// Returns the module source.
    pub fn source(&self) -> &WasmSource {
        &self.source
    }

    /// Returns the asserted hash, if any.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }
}
