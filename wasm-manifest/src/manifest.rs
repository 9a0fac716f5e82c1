//! The plugin manifest aggregate and its builder surface.
//!
//! Nothing here touches the filesystem or network: paths, URLs and hosts
//! are recorded as given and interpreted later by the plugin runtime.

use crate::error::ManifestResult;
use crate::wasm::Wasm;
use std::collections::BTreeMap;

/// Describes a plugin's module sources and execution policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    wasm: Vec<Wasm>,
    config: BTreeMap<String, String>,
    allowed_hosts: Vec<String>,
    allowed_paths: BTreeMap<String, String>,
    timeout_ms: Option<u64>,
}

impl Manifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manifest holding a single module.
    pub fn from_wasm(wasm: Wasm) -> Self {
        Self {
            wasm: vec![wasm],
            ..Self::default()
        }
    }

    /// Creates a manifest with one module loaded from a local path.
    /// An empty `hash` asserts no hash.
    pub fn wasm_path(path: impl Into<String>, hash: &str) -> Self {
        Self::from_wasm(Wasm::path(path).with_hash(hash))
    }

    /// Creates a manifest with one module fetched from a URL with `GET`.
    pub fn wasm_url(url: impl Into<String>, hash: &str) -> Self {
        Self::from_wasm(Wasm::url(url).with_hash(hash))
    }

    /// Creates a manifest with one module held in memory.
    pub fn wasm_bytes(data: impl Into<Vec<u8>>, hash: &str) -> Self {
        Self::from_wasm(Wasm::bytes(data).with_hash(hash))
    }

    // ── Mutators ────────────────────────────────────────────────────

    /// Appends a module. Order is load order; duplicates are kept.
    pub fn add_wasm(&mut self, wasm: Wasm) -> &mut Self {
        self.wasm.push(wasm);
        self
    }

    pub fn add_wasm_path(&mut self, path: impl Into<String>, hash: &str) -> &mut Self {
        self.add_wasm(Wasm::path(path).with_hash(hash))
    }

    pub fn add_wasm_url(&mut self, url: impl Into<String>, hash: &str) -> &mut Self {
        self.add_wasm(Wasm::url(url).with_hash(hash))
    }

    pub fn add_wasm_bytes(&mut self, data: impl Into<Vec<u8>>, hash: &str) -> &mut Self {
        self.add_wasm(Wasm::bytes(data).with_hash(hash))
    }

    /// Appends a module copied from a raw buffer.
    ///
    /// # Errors
    /// See [`Wasm::from_raw_parts`]. The manifest is unchanged on error.
    ///
    /// # Safety
    /// Same contract as [`Wasm::from_raw_parts`].
    pub unsafe fn add_wasm_raw_parts(
        &mut self,
        data: *const u8,
        len: usize,
        hash: &str,
    ) -> ManifestResult<&mut Self> {
        let wasm = unsafe { Wasm::from_raw_parts(data, len) }?.with_hash(hash);
        Ok(self.add_wasm(wasm))
    }

    /// Allows the plugin to reach `host`. Duplicates are kept in order.
    pub fn allow_host(&mut self, host: impl Into<String>) -> &mut Self {
        self.allowed_hosts.push(host.into());
        self
    }

    /// Exposes `src` inside the sandbox at the same path.
    pub fn allow_path(&mut self, src: impl Into<String>) -> &mut Self {
        let src = src.into();
        self.allowed_paths.insert(src.clone(), src);
        self
    }

    /// Exposes `src` inside the sandbox at `dest`, replacing any earlier mapping
    /// for `src`. An empty `dest` maps `src` to itself.
    pub fn map_path(&mut self, src: impl Into<String>, dest: impl Into<String>) -> &mut Self {
        let src = src.into();
        let dest = dest.into();
        let dest = if dest.is_empty() { src.clone() } else { dest };
        self.allowed_paths.insert(src, dest);
        self
    }

    /// Sets the execution time budget in milliseconds.
    pub fn set_timeout_ms(&mut self, ms: u64) -> &mut Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Sets a config entry. The last value written for a key wins.
    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.config.insert(key.into(), value.into());
        self
    }

    // ── Consuming builders ──────────────────────────────────────────

    #[must_use]
    pub fn with_wasm(mut self, wasm: Wasm) -> Self {
        self.add_wasm(wasm);
        self
    }

    #[must_use]
    pub fn with_allowed_host(mut self, host: impl Into<String>) -> Self {
        self.allow_host(host);
        self
    }

    #[must_use]
    pub fn with_allowed_path(mut self, src: impl Into<String>, dest: impl Into<String>) -> Self {
        self.map_path(src, dest);
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.set_timeout_ms(ms);
        self
    }

    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_config(key, value);
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn wasm(&self) -> &[Wasm] {
        &self.wasm
    }

    pub fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    pub fn allowed_paths(&self) -> &BTreeMap<String, String> {
        &self.allowed_paths
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    /// Returns true if no module has been added.
    pub fn is_empty(&self) -> bool {
        self.wasm.is_empty()
    }
}
