use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tracing::debug;

use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::domain::entities::config_snapshot::ConfigSnapshot;
use crate::domain::value_objects::branch_name::sanitize_for_file_name;

/// Base stream file; its presence marks the container root
pub const STREAM_FILE: &str = "_stream";

/// Freeze staging file, relative to the container's `.git` directory
pub const BASELINE_FILE: &str = "_baseline";

/// Walk up from `start` to the first directory holding a `_stream` file.
pub fn find_container_root(start: &Path) -> CmgResult<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(STREAM_FILE).is_file() {
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }
    Err(CmgError::ContainerNotFound {
        marker: STREAM_FILE.to_string(),
        start: start.to_path_buf(),
    })
}

/// Reads the layered stream files of a container and writes the freeze staging file.
#[derive(Debug, Clone)]
pub struct StreamStore {
    root: PathBuf,
}

impl StreamStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/_stream_<sanitized branch>`
    pub fn override_path(&self, branch: &str) -> PathBuf {
        self.root
            .join(format!("{}_{}", STREAM_FILE, sanitize_for_file_name(branch)))
    }

    /// `<root>/.git/_baseline`
    pub fn baseline_path(&self) -> PathBuf {
        self.root.join(".git").join(BASELINE_FILE)
    }

    /// Load `_stream`, then layer the overrides named after `local` and `remote`.
    ///
    /// A missing base file is fatal, missing overrides are skipped, and any
    /// parse error is fatal.
    pub async fn load_stream(&self, local: &str, remote: &str) -> CmgResult<ConfigSnapshot> {
        let base = self.root.join(STREAM_FILE);
        let text = async_fs::read_to_string(&base).await.map_err(|e| {
            CmgError::filesystem_error_with_source(
                format!("Cannot read stream config {}", base.display()),
                Some(base.clone()),
                e,
            )
        })?;
        let mut snapshot = ConfigSnapshot::parse(&text, &base.display().to_string())?;

        for branch in [local, remote] {
            if branch.is_empty() {
                continue;
            }
            let path = self.override_path(branch);
            if !path.is_file() {
                debug!(path = %path.display(), "no stream override");
                continue;
            }
            let text = async_fs::read_to_string(&path).await.map_err(|e| {
                CmgError::filesystem_error_with_source(
                    format!("Cannot read stream override {}", path.display()),
                    Some(path.clone()),
                    e,
                )
            })?;
            debug!(path = %path.display(), "layering stream override");
            snapshot.merge_str(&text, &path.display().to_string())?;
        }
        Ok(snapshot)
    }

    /// Write `snapshot` to the staging file and return its path.
    pub async fn write_baseline(&self, snapshot: &ConfigSnapshot) -> CmgResult<PathBuf> {
        let path = self.baseline_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        async_fs::write(&path, snapshot.to_string())
            .await
            .map_err(|e| {
                CmgError::filesystem_error_with_source(
                    format!("Cannot write {}", path.display()),
                    Some(path.clone()),
                    e,
                )
            })?;
        Ok(path)
    }
}

/// Parse the baseline stored in the annotation of `tag`.
pub fn load_baseline_config(tag: &str, annotation: &str) -> CmgResult<ConfigSnapshot> {
    Ok(ConfigSnapshot::parse(annotation, tag)?)
}
