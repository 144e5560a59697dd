//! Program image (ROM) codec.
//!
//! A program image is a flat byte sequence with no header: byte 0 is an
//! opcode, `PUSH` is followed by a 4-byte big-endian operand, every other
//! opcode by the next opcode. Indices are addresses.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::PROGRAM_MEMORY_BYTES;

/// Errors reading, validating or writing a program image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The image does not fit in program memory.
    #[error("program image is {size} bytes, maximum is {max} bytes")]
    TooLarge {
        /// Actual (or, for files, reported) size in bytes.
        size: u64,
        /// Program memory capacity.
        max: usize,
    },
    /// Underlying file operation failed.
    #[error("{action} {}: {source}", .path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// File involved.
        path: PathBuf,
        /// OS error.
        #[source]
        source: std::io::Error,
    },
}

/// A validated program image, never larger than [`PROGRAM_MEMORY_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramImage {
    bytes: Vec<u8>,
}

impl ProgramImage {
    /// Wraps raw bytes after checking the size limit.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::TooLarge`] for images over capacity.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImageError> {
        if bytes.len() > PROGRAM_MEMORY_BYTES {
            return Err(ImageError::TooLarge {
                size: bytes.len() as u64,
                max: PROGRAM_MEMORY_BYTES,
            });
        }
        Ok(Self { bytes })
    }

    /// Reads an image from disk, rejecting oversized files before reading
    /// their contents.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Io`] when the file cannot be opened or read and
    /// [`ImageError::TooLarge`] when it exceeds capacity.
    pub fn load(path: &Path) -> Result<Self, ImageError> {
        let io_error = |action: &'static str| {
            move |source: std::io::Error| ImageError::Io {
                action,
                path: path.to_path_buf(),
                source,
            }
        };

        let file = fs::File::open(path).map_err(io_error("could not open ROM"))?;
        let size = file
            .metadata()
            .map_err(io_error("could not inspect ROM"))?
            .len();
        if size > PROGRAM_MEMORY_BYTES as u64 {
            return Err(ImageError::TooLarge {
                size,
                max: PROGRAM_MEMORY_BYTES,
            });
        }

        let mut bytes = Vec::with_capacity(PROGRAM_MEMORY_BYTES);
        file.take(PROGRAM_MEMORY_BYTES as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(io_error("could not read ROM"))?;
        debug!("loaded {} byte ROM from {}", bytes.len(), path.display());

        Self::from_bytes(bytes)
    }

    /// Writes the image so that `path` either holds the complete image or is
    /// left as it was: bytes go to a temporary file in the same directory
    /// which is then renamed over `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Io`] when the temporary file cannot be created,
    /// written or renamed.
    pub fn write_atomic(&self, path: &Path) -> Result<(), ImageError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let io_error = |action: &'static str| {
            move |source: std::io::Error| ImageError::Io {
                action,
                path: path.to_path_buf(),
                source,
            }
        };

        let mut staged =
            tempfile::NamedTempFile::new_in(dir).map_err(io_error("could not create"))?;
        staged
            .write_all(&self.bytes)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(io_error("could not write"))?;
        staged
            .persist(path)
            .map_err(|persist| io_error("could not write")(persist.error))?;
        debug!("wrote {} byte ROM to {}", self.bytes.len(), path.display());
        Ok(())
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for an empty image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the image, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
