//! Side-car buffer file access.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use crate::util::{Error, Result};

/// Raw bytes of one side-car file.
/// Supports both memory-mapped and buffered I/O modes.
pub struct RawBuffer {
    inner: RawInner,
}

enum RawInner {
    /// Memory-mapped file (preferred for large scans)
    Mmap(Mmap),
    /// Whole file read into memory (fallback, and empty files)
    Owned(Vec<u8>),
}

impl RawBuffer {
    /// Open a side-car file, memory-mapping it when the `mmap` feature is on.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, cfg!(feature = "mmap"))
    }

    /// Open a side-car file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| Error::from_io_at(e, path))?;
        let size = file.metadata()?.len();

        let inner = if use_mmap && size > 0 {
            // Safety: the mapping is read-only and dropped before the run ends
            RawInner::Mmap(unsafe { Mmap::map(&file) }?)
        } else {
            let mut bytes = Vec::with_capacity(size as usize);
            file.read_to_end(&mut bytes)?;
            RawInner::Owned(bytes)
        };

        Ok(Self { inner })
    }

    /// File contents.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.inner {
            RawInner::Mmap(mmap) => &mmap[..],
            RawInner::Owned(bytes) => bytes.as_slice(),
        }
    }

    /// File size in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// True for an empty file.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
