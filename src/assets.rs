//! The on-disk directory that holds uploaded images.
//!
//! Files are first written under a hidden temporary name and only renamed to
//! their final key once the caller decides to keep them.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{BlogError, BlogResult};

const MAX_FILE_NAME_LEN: usize = 255;

/// Accepts only a single plain path component: no separators, no traversal,
/// no hidden files.
pub fn validate_file_name(name: &str) -> BlogResult<&str> {
    if name.is_empty() {
        return Err(BlogError::validation("file name is empty"));
    }
    if name.len() > MAX_FILE_NAME_LEN {
        return Err(BlogError::validation("file name is too long"));
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        return Err(BlogError::validation("file name must not contain a path"));
    }
    if name.starts_with('.') {
        return Err(BlogError::validation("file name must not start with a dot"));
    }
    if name.chars().any(char::is_control) {
        return Err(BlogError::validation("file name contains control characters"));
    }
    Ok(name)
}

#[derive(Clone, Debug)]
pub struct AssetDir {
    root: PathBuf,
    url_prefix: String,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn path_for(&self, file_name: &str) -> BlogResult<PathBuf> {
        Ok(self.root.join(validate_file_name(file_name)?))
    }

    /// Maps a public URL produced from this directory back to its file.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(&self.url_prefix)?.strip_prefix('/')?;
        self.path_for(name).ok()
    }

    pub async fn ensure(&self) -> BlogResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Writes `bytes` under a fresh key ending in `extension`. Nothing is
    /// visible under the key until [`StagedFile::commit`].
    pub async fn stage(&self, bytes: &[u8], extension: &str) -> BlogResult<StagedFile> {
        let key = format!("{}.{extension}", Uuid::new_v4().simple());
        let temp = self.root.join(format!(".{key}.part"));
        let dest = self.path_for(&key)?;

        let staged = StagedFile {
            key,
            temp,
            dest,
            committed: false,
            kept: false,
        };

        write_new(&staged.temp, bytes).await?;
        Ok(staged)
    }
}

async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// An upload written under the asset directory but not yet owned by a post.
/// Unless [`StagedFile::keep`] is called, dropping it removes the file from
/// wherever it currently lives, so an error or a cancelled request never
/// leaves it behind.
#[derive(Debug)]
pub struct StagedFile {
    key: String,
    temp: PathBuf,
    dest: PathBuf,
    committed: bool,
    kept: bool,
}

impl StagedFile {
    /// Final file name inside the asset directory.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Moves the file to its final name. It is still removed on drop.
    pub async fn commit(&mut self) -> BlogResult<()> {
        fs::rename(&self.temp, &self.dest).await?;
        self.committed = true;
        Ok(())
    }

    /// Hands the file over for good. Call only once the row referencing it
    /// is committed.
    pub fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        let path = if self.committed { &self.dest } else { &self.temp };
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(key = %self.key, "removed staged upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::error!(error = %e, key = %self.key, "failed to remove staged upload"),
        }
    }
}
