//! Items backed by files on disk, with lazily computed xxh3 digests.

use super::{Digest, ScanItem};
use crate::error::DigestError;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use xxhash_rust::xxh3::xxh3_128;

/// Number of leading bytes covered by the partial digest (16KB)
const PARTIAL_DIGEST_SIZE: u64 = 16 * 1024;

/// Minimum file size to use memory-mapped I/O for the full digest (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// A file found on disk
#[derive(Debug)]
pub struct FileItem {
    path: PathBuf,
    name: String,
    size: u64,
    reference: bool,
    partial: OnceLock<Digest>,
    full: OnceLock<Digest>,
}

impl FileItem {
    /// Create an item for `path` with an already known size
    pub fn new(path: PathBuf, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            path,
            name,
            size,
            reference: false,
            partial: OnceLock::new(),
            full: OnceLock::new(),
        }
    }

    /// Mark the item as a reference that must be kept
    pub fn with_reference(mut self, reference: bool) -> Self {
        self.reference = reference;
        self
    }

    fn read_error(&self, source: std::io::Error) -> DigestError {
        DigestError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn compute_partial(&self) -> Result<Digest, DigestError> {
        let file = File::open(&self.path).map_err(|e| self.read_error(e))?;
        let mut buffer = Vec::with_capacity(PARTIAL_DIGEST_SIZE as usize);
        file.take(PARTIAL_DIGEST_SIZE)
            .read_to_end(&mut buffer)
            .map_err(|e| self.read_error(e))?;
        Ok(xxh3_128(&buffer).to_le_bytes().to_vec())
    }

    fn compute_full(&self) -> Result<Digest, DigestError> {
        let file = File::open(&self.path).map_err(|e| self.read_error(e))?;
        let len = file.metadata().map_err(|e| self.read_error(e))?.len();

        if len < MMAP_THRESHOLD {
            let bytes = std::fs::read(&self.path).map_err(|e| self.read_error(e))?;
            return Ok(xxh3_128(&bytes).to_le_bytes().to_vec());
        }

        // SAFETY: We're only reading the file, and we hold the file handle
        // for the lifetime of the mmap.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| self.read_error(e))?;
        Ok(xxh3_128(&mmap).to_le_bytes().to_vec())
    }
}

impl ScanItem for FileItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn is_reference(&self) -> bool {
        self.reference
    }

    fn partial_digest(&self) -> Result<Digest, DigestError> {
        if let Some(digest) = self.partial.get() {
            return Ok(digest.clone());
        }
        let digest = self.compute_partial()?;
        Ok(self.partial.get_or_init(|| digest).clone())
    }

    fn full_digest(&self) -> Result<Digest, DigestError> {
        if let Some(digest) = self.full.get() {
            return Ok(digest.clone());
        }
        let digest = self.compute_full()?;
        Ok(self.full.get_or_init(|| digest).clone())
    }
}
