//! Deployment package archives built from local directories.
//!
//! Archives are only described here: the directory is fingerprinted so that
//! an engine can tell when the code changed, but its contents are not
//! validated. A missing directory is left for the engine to report.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use aws_lc_rs::digest;
use log::{debug, warn};
use serde_json::{json, Map, Value};
use walkdir::WalkDir;

use crate::error::{InfraError, InfraResult};

/// A directory (or single file) packaged as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArchive {
    path: PathBuf,
}

impl FileArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve `path` against the current working directory.
    pub fn locate(path: impl AsRef<Path>) -> InfraResult<Self> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| InfraError::file_system("resolve current directory", ".", e))?
                .join(path)
        };
        Ok(Self::new(normalize(&absolute)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// SHA-256 over relative paths and contents, or `None` if the path does not exist.
    pub async fn fingerprint(&self) -> InfraResult<Option<String>> {
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Deployment artifact '{}' does not exist; build it before deploying",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(e) => return Err(InfraError::file_system("inspect", &self.path, e)),
        }

        let root = self.path.clone();
        let digest = tokio::task::spawn_blocking(move || digest_tree(&root))
            .await
            .map_err(|e| {
                InfraError::file_system("fingerprint", &self.path, std::io::Error::other(e))
            })??;
        debug!("Fingerprinted '{}': {}", self.path.display(), digest);
        Ok(Some(digest))
    }

    async fn describe(&self) -> InfraResult<Value> {
        let fingerprint = self.fingerprint().await?;
        Ok(json!({
            "path": self.path.display().to_string(),
            "sha256": fingerprint,
        }))
    }
}

/// Named archives combined into one deployment package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetArchive {
    assets: BTreeMap<String, FileArchive>,
}

impl AssetArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, name: impl Into<String>, archive: FileArchive) -> Self {
        self.assets.insert(name.into(), archive);
        self
    }

    pub fn assets(&self) -> &BTreeMap<String, FileArchive> {
        &self.assets
    }

    /// JSON description of every asset, including fingerprints.
    pub async fn describe(&self) -> InfraResult<Value> {
        let mut assets = Map::new();
        for (name, archive) in &self.assets {
            assets.insert(name.clone(), archive.describe().await?);
        }
        Ok(json!({ "assets": assets }))
    }
}

/// Symlinks are followed, so a linked file is hashed with its target's contents.
fn digest_tree(root: &Path) -> InfraResult<String> {
    let mut context = digest::Context::new(&digest::SHA256);
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            InfraError::file_system("walk", path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let contents = std::fs::read(entry.path())
            .map_err(|e| InfraError::file_system("read", entry.path(), e))?;
        context.update(relative.to_string_lossy().as_bytes());
        context.update(&[0]);
        context.update(&(contents.len() as u64).to_be_bytes());
        context.update(&contents);
    }

    Ok(context
        .finish()
        .as_ref()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect())
}

/// Collapse `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
