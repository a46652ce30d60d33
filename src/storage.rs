//! Backing store for static files and templates.
//!
//! Paths handed to a [`Storage`] are virtual absolute paths such as
//! `/www/index.html`; how they map onto real storage is up to the implementation.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

/// Read-only file access used by `send_file` and `render`.
pub trait Storage: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    /// Opens a file for reading. Called only after `exists` returned true, but
    /// may still fail.
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Serves virtual paths from a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a virtual path under the root. Paths that try to climb out with
    /// `..` resolve to nothing.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl Storage for FsStorage {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let full = self
            .resolve(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "path escapes storage root"))?;
        let file = File::open(full)?;
        Ok(Box::new(file))
    }
}
