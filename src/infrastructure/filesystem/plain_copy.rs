use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use url::Url;
use walkdir::WalkDir;

use crate::common::error::CmgError;
use crate::common::result::CmgResult;

/// Marker file next to a plain-copy component: `<root>/<component>.egg-info`
pub fn egg_marker_path(root: &Path, component: &str) -> PathBuf {
    root.join(format!("{}.egg-info", component))
}

/// Source URL recorded in the marker, i.e. its first non-empty line.
pub async fn read_egg_marker(path: &Path) -> CmgResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = async_fs::read_to_string(path).await.map_err(|e| {
        CmgError::filesystem_error_with_source(
            format!("Cannot read {}", path.display()),
            Some(path.to_path_buf()),
            e,
        )
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string))
}

pub async fn write_egg_marker(path: &Path, url: &str) -> CmgResult<()> {
    async_fs::write(path, format!("{}\n", url)).await.map_err(|e| {
        CmgError::filesystem_error_with_source(
            format!("Cannot write {}", path.display()),
            Some(path.to_path_buf()),
            e,
        )
    })
}

/// Local path a copy source URL refers to.
///
/// `file://` URLs are converted, anything without a scheme (or with a drive
/// letter) is a path, relative ones being resolved against `root`.
pub fn source_path(root: &Path, url: &str) -> CmgResult<PathBuf> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => parsed
            .to_file_path()
            .map_err(|_| CmgError::filesystem_error(format!("Invalid file URL: {}", url), None)),
        Ok(parsed) if parsed.scheme().len() > 1 => Err(CmgError::filesystem_error(
            format!("Unsupported copy source scheme '{}': {}", parsed.scheme(), url),
            None,
        )),
        _ => {
            let path = Path::new(url);
            Ok(if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            })
        }
    }
}

/// Delete a file or a directory tree if it exists.
pub async fn remove_path(path: &Path) -> CmgResult<()> {
    let metadata = match async_fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let result = if metadata.is_dir() {
        async_fs::remove_dir_all(path).await
    } else {
        async_fs::remove_file(path).await
    };
    result.map_err(|e| {
        CmgError::filesystem_error_with_source(
            format!("Cannot remove {}", path.display()),
            Some(path.to_path_buf()),
            e,
        )
    })
}

/// Copy a single file, creating parent directories.
pub async fn copy_file(source: &Path, dest: &Path) -> CmgResult<()> {
    if let Some(parent) = dest.parent() {
        async_fs::create_dir_all(parent).await?;
    }
    async_fs::copy(source, dest).await.map_err(|e| {
        CmgError::filesystem_error_with_source(
            format!("Cannot copy {} to {}", source.display(), dest.display()),
            Some(source.to_path_buf()),
            e,
        )
    })?;
    Ok(())
}

/// Copy the tree below `source` to `dest`.
pub async fn copy_tree(source: &Path, dest: &Path) -> CmgResult<()> {
    if !source.is_dir() {
        return Err(CmgError::filesystem_error(
            format!("Not a directory: {}", source.display()),
            Some(source.to_path_buf()),
        ));
    }
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| CmgError::internal_error("walked outside the copy source"))?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            async_fs::create_dir_all(&target).await?;
        } else {
            copy_file(entry.path(), &target).await?;
        }
    }
    Ok(())
}
