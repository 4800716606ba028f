//! Whole-file binary loading and bounded byte containers.
//!
//! `BinaryImage` is the read-only substrate every analyzer consumes: the
//! complete file contents, loaded once and never mutated afterwards. Derived
//! scalars (entropy, digest) are computed lazily and memoized.

pub mod buffer;

pub use buffer::SafeBuffer;

use crate::config::IOConfig;
use crate::entropy::shannon_entropy;
use crate::error::{Result, RevscopeError};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An immutable in-memory copy of a binary under analysis.
///
/// The contents are held in a reference-counted `Bytes`, so cloning an image
/// is cheap and every clone observes the same bytes.
#[derive(Debug, Clone)]
pub struct BinaryImage {
    source: Option<PathBuf>,
    data: Bytes,
    entropy: OnceCell<f64>,
    sha256: OnceCell<String>,
}

impl BinaryImage {
    /// Reads the entire file at `path` using the default I/O limits.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, &IOConfig::default())
    }

    /// Reads the entire file at `path`.
    ///
    /// Fails with `FileAccess` when the path is missing or unreadable and with
    /// `FileTooLarge` when it exceeds `config.max_file_size`.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: &IOConfig) -> Result<Self> {
        let path = path.as_ref();
        let file_access = |source| RevscopeError::FileAccess {
            path: path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(path).map_err(file_access)?;
        debug!(
            path = %path.display(),
            size = metadata.len(),
            max_file_size = config.max_file_size,
            "Loading binary image"
        );

        if metadata.len() > config.max_file_size {
            warn!(
                path = %path.display(),
                size = metadata.len(),
                limit = config.max_file_size,
                "File is too large"
            );
            return Err(RevscopeError::FileTooLarge {
                limit: config.max_file_size,
                found: metadata.len(),
            });
        }

        let data = fs::read(path).map_err(file_access)?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            data: Bytes::from(data),
            entropy: OnceCell::new(),
            sha256: OnceCell::new(),
        })
    }

    /// Wraps bytes that did not come from disk.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            source: None,
            data: data.into(),
            entropy: OnceCell::new(),
            sha256: OnceCell::new(),
        }
    }

    /// Path the image was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Length of the image in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length image.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only view of the whole image.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Shannon entropy of the whole image, computed once.
    pub fn entropy(&self) -> f64 {
        *self.entropy.get_or_init(|| shannon_entropy(&self.data))
    }

    /// Lowercase hex SHA-256 of the image, computed once.
    pub fn sha256(&self) -> &str {
        self.sha256.get_or_init(|| {
            let mut hasher = Sha256::new();
            hasher.update(&self.data);
            hex::encode(hasher.finalize())
        })
    }
}

impl AsRef<[u8]> for BinaryImage {
    fn as_ref(&self) -> &[u8] {
        self.bytes()
    }
}
