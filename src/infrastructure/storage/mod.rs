//! Run-scoped scratch storage for downloaded exports and rendered workbooks

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::application::errors::StorageError;

/// Fallback when an upload has no usable name
pub const DEFAULT_EXPORT_NAME: &str = "export.json";

/// Temporary directory owned by one processing run.
///
/// Removed by [`ScratchDir::cleanup`] or on drop, whichever comes first.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh directory named `<prefix><random>` under `root`, or under
    /// the system temp dir when `root` is `None`
    pub fn create(root: Option<&Path>, prefix: &str) -> Result<Self, StorageError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        let path = dir.path().to_path_buf();
        tracing::debug!("Created scratch dir {}", path.display());
        Ok(Self { dir: Some(dir), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.dir.is_some()
    }

    /// Write `bytes` to `name` inside the directory, replacing any existing file
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        if !self.is_open() {
            return Err(StorageError::Closed(self.path.clone()));
        }
        let target = self.path.join(name);
        tokio::fs::write(&target, bytes).await?;
        Ok(target)
    }

    /// Recursively remove the directory. Safe to call more than once, and
    /// tolerates the directory having been removed by someone else.
    pub fn cleanup(&mut self) -> Result<(), StorageError> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        match dir.close() {
            Ok(()) => {
                tracing::debug!("Removed scratch dir {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Make an upload name safe to create on Windows and Linux
pub fn safe_filename(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return DEFAULT_EXPORT_NAME.to_string();
    }
    let cleaned: String = trimmed
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    let cleaned = cleaned.replace("..", "_");
    if cleaned.trim().is_empty() {
        DEFAULT_EXPORT_NAME.to_string()
    } else {
        cleaned
    }
}

/// Position-prefixed name so identically named parts never overwrite each other
pub fn indexed_filename(index: usize, name: &str) -> String {
    format!("{:02}_{}", index, safe_filename(name))
}
