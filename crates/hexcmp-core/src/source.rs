//! Byte stream sources for file views

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A seekable stream of bytes with a known length.
///
/// Short reads (including zero-length ones) signal end-of-file, never an
/// error; a view treats bytes past the end as absent.
pub trait ByteSource {
    /// Total length in bytes, fixed at open time.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read as many bytes as possible starting at `offset`, returning how
    /// many were written into `buf`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> usize;
}

/// A [`ByteSource`] backed by a file on disk.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| OpenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let len = file
            .metadata()
            .map_err(|source| OpenError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        Ok(Self { file, len })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> usize {
        if self.file.seek(SeekFrom::Start(offset)).is_err() {
            return 0;
        }
        // Keep reading until the buffer is full or the file runs out; a single
        // read() may return less than requested without being at EOF.
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        filled
    }
}

/// A [`ByteSource`] over an in-memory buffer.
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> usize {
        if offset >= self.bytes.len() as u64 {
            return 0;
        }
        let start = offset as usize;
        let n = buf.len().min(self.bytes.len() - start);
        buf[..n].copy_from_slice(&self.bytes[start..start + n]);
        n
    }
}
