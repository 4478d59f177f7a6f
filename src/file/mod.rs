//! Raw access to metadata image bytes.
//!
//! This module abstracts over the places an image can come from. Images on disk are
//! memory-mapped, images that an embedder already holds are wrapped without copying
//! again. Both are exposed through the [`Backend`] trait so the metadata readers do
//! not care where the bytes live.
//!
//! # Key Components
//!
//! - [`File`] - Owned handle over one backend, with the path it was loaded from
//! - [`Backend`] - Trait for different data sources
//! - [`physical::Physical`] - Memory-mapped file backend for disk access
//! - [`memory::Memory`] - In-memory buffer backend
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotspec::file::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("images/System.Runtime.json"))?;
//! println!("{} bytes", file.len());
//! # Ok::<(), dotspec::Error>(())
//! ```

pub mod memory;
pub mod physical;

use std::path::{Path, PathBuf};

use crate::{Error, Result};

use memory::Memory;
use physical::Physical;

/// Backend for a [`File`].
///
/// Implementations must be thread-safe; a loaded image may be decoded on any worker.
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// An opened metadata image, independent of where its bytes are stored.
pub struct File {
    /// The source of the bytes
    backend: Box<dyn Backend>,
    /// Where the image was loaded from, if it came from disk
    path: Option<PathBuf>,
}

impl File {
    /// Memory-map a file from disk.
    ///
    /// # Arguments
    /// * `path` - Path of the image on disk
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file cannot be opened, [`Error::Empty`] if the
    /// file has no content, or [`Error::Error`] if mapping fails.
    pub fn from_file(path: &Path) -> Result<File> {
        let backend = Physical::new(path)?;
        if backend.len() == 0 {
            return Err(Error::Empty);
        }

        Ok(File {
            backend: Box::new(backend),
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an in-memory buffer.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] if `data` is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        Ok(File {
            backend: Box::new(Memory::new(data)),
            path: None,
        })
    }

    /// The full image content.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.backend.data()
    }

    /// Size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Returns true if the image has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backend.len() == 0
    }

    /// The path this image was mapped from, `None` for in-memory images.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_mem() {
        let file = File::from_mem(vec![b'{', b'}']).unwrap();
        assert_eq!(file.len(), 2);
        assert_eq!(file.data(), b"{}");
        assert!(file.path().is_none());
    }

    #[test]
    fn from_mem_empty() {
        assert!(matches!(File::from_mem(Vec::new()), Err(Error::Empty)));
    }

    #[test]
    fn from_file() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"{\"name\":\"A\"}").unwrap();

        let file = File::from_file(temp.path()).unwrap();
        assert_eq!(file.len(), 12);
        assert_eq!(file.path(), Some(temp.path()));
    }

    #[test]
    fn from_file_missing() {
        let result = File::from_file(Path::new("/nonexistent/dotspec/image.json"));
        assert!(matches!(result, Err(Error::FileError(_))));
    }

    #[test]
    fn from_file_empty() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(File::from_file(temp.path()), Err(Error::Empty)));
    }
}
