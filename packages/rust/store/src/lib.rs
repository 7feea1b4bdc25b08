//! Cache and checkpoint store.
//!
//! Three artifacts per export root, all pretty-printed JSON under the
//! configured cache directory: the discovered job path list, the resolved
//! method catalog, and the schema itself. The schema file doubles as the
//! per-job checkpoint; it is rewritten after every job so an interrupted
//! export leaves a usable partial document. Writes go through a temp file
//! and rename so readers never observe a half-written artifact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use paramexport_shared::{ExportError, Result, Schema};

/// Filesystem store keyed by export root.
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, root: &str, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}-{suffix}.json", slug(root)))
    }

    /// Path of the schema artifact for `root`.
    pub fn schema_path(&self, root: &str) -> PathBuf {
        self.path_for(root, "schema")
    }

    // -----------------------------------------------------------------------
    // Job paths
    // -----------------------------------------------------------------------

    pub fn write_job_paths(&self, root: &str, paths: &[String]) -> Result<()> {
        self.write_json(&self.path_for(root, "job-paths"), &paths)
    }

    pub fn read_job_paths(&self, root: &str) -> Result<Option<Vec<String>>> {
        self.read_json(&self.path_for(root, "job-paths"))
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    pub fn write_catalog(&self, root: &str, catalog: &BTreeMap<String, String>) -> Result<()> {
        self.write_json(&self.path_for(root, "catalog"), catalog)
    }

    pub fn read_catalog(&self, root: &str) -> Result<Option<BTreeMap<String, String>>> {
        self.read_json(&self.path_for(root, "catalog"))
    }

    // -----------------------------------------------------------------------
    // Schema checkpoint
    // -----------------------------------------------------------------------

    pub fn write_schema(&self, root: &str, schema: &Schema) -> Result<()> {
        self.write_json(&self.schema_path(root), schema)
    }

    pub fn read_schema(&self, root: &str) -> Result<Option<Schema>> {
        self.read_json(&self.schema_path(root))
    }

    // -----------------------------------------------------------------------
    // JSON plumbing
    // -----------------------------------------------------------------------

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ExportError::io(&self.dir, e))?;

        let json = serde_json::to_string_pretty(value)
            .map_err(|e| ExportError::Store(format!("serialize {}: {e}", path.display())))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|e| ExportError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| ExportError::io(path, e))?;

        debug!(path = %path.display(), bytes = json.len(), "wrote artifact");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
        let value = serde_json::from_str(&content)
            .map_err(|e| ExportError::Store(format!("corrupt artifact {}: {e}", path.display())))?;
        info!(path = %path.display(), "loaded cached artifact");
        Ok(Some(value))
    }
}

/// Filesystem-safe key for an export root path.
fn slug(root: &str) -> String {
    let mut out = String::with_capacity(root.len());
    for c in root.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
