//! Sources of [`ModuleImage`]s.
//!
//! The spec graph asks a [`MetadataReader`] for the image behind a path and never
//! touches files itself. [`ImageReader`] memory-maps serialized images from disk;
//! [`MemoryReader`] serves images that an embedder (or a test) already holds.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;

use crate::{
    file::File,
    metadata::{identity::AssemblyVersion, image::ModuleImage},
    Error, Result,
};

/// Produces module images for paths handed out by the locators.
///
/// Implementations must be thread-safe: the spec graph reads referenced modules from
/// whichever worker first needs them.
pub trait MetadataReader: Send + Sync {
    /// Read the module image stored at `path`.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] with [`io::ErrorKind::NotFound`] when nothing is
    /// stored at `path`, or another error when the content cannot be decoded.
    fn read(&self, path: &Path) -> Result<Arc<ModuleImage>>;

    /// Path of an image this reader already knows under the assembly `name`.
    ///
    /// Readers backed by the filesystem leave resolution to the locators.
    fn known_image(&self, _name: &str, _version: Option<&AssemblyVersion>) -> Option<PathBuf> {
        None
    }
}

/// Reads JSON encoded metadata images from disk.
///
/// Files are memory-mapped through [`File`] and decoded with `serde_json`; every
/// decoded image is validated before it is handed out.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageReader;

impl ImageReader {
    /// Create a new disk reader.
    #[must_use]
    pub fn new() -> Self {
        ImageReader
    }

    /// Decode an image from raw bytes.
    ///
    /// # Errors
    /// Returns [`Error::Image`] if `data` is not a valid image document, or
    /// [`Error::Malformed`] if the decoded image is inconsistent.
    pub fn decode(data: &[u8]) -> Result<ModuleImage> {
        let image: ModuleImage = serde_json::from_slice(data)?;
        image.validate()?;
        Ok(image)
    }
}

impl MetadataReader for ImageReader {
    fn read(&self, path: &Path) -> Result<Arc<ModuleImage>> {
        let file = File::from_file(path)?;
        let image = Self::decode(file.data())?;
        tracing::trace!(path = %path.display(), name = %image.name, "decoded module image");
        Ok(Arc::new(image))
    }
}

/// Serves images registered in memory under synthetic paths.
#[derive(Debug, Default)]
pub struct MemoryReader {
    images: DashMap<PathBuf, Arc<ModuleImage>>,
}

impl MemoryReader {
    /// An empty reader.
    #[must_use]
    pub fn new() -> Self {
        MemoryReader {
            images: DashMap::new(),
        }
    }

    /// Register `image` under `path`, replacing any previous image there.
    pub fn insert(&self, path: impl Into<PathBuf>, image: ModuleImage) {
        self.images.insert(path.into(), Arc::new(image));
    }

    /// Builder form of [`MemoryReader::insert`].
    #[must_use]
    pub fn with_image(self, path: impl Into<PathBuf>, image: ModuleImage) -> Self {
        self.insert(path, image);
        self
    }

    /// Number of registered images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if no image is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl MetadataReader for MemoryReader {
    fn read(&self, path: &Path) -> Result<Arc<ModuleImage>> {
        match self.images.get(path) {
            Some(image) => Ok(image.value().clone()),
            None => Err(Error::FileError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no image registered at {}", path.display()),
            ))),
        }
    }

    fn known_image(&self, name: &str, version: Option<&AssemblyVersion>) -> Option<PathBuf> {
        let mut candidates: Vec<(PathBuf, AssemblyVersion)> = self
            .images
            .iter()
            .filter(|entry| entry.value().name.eq_ignore_ascii_case(name))
            .map(|entry| (entry.key().clone(), entry.value().version))
            .collect();
        candidates.sort();

        if let Some(version) = version {
            if let Some((path, _)) = candidates.iter().find(|(_, v)| v == version) {
                return Some(path.clone());
            }
        }

        candidates.into_iter().next().map(|(path, _)| path)
    }
}
