//! In-memory item, for tests and for callers that already hold metadata.

use super::{Digest, ScanItem, TagField, TagValue};
use crate::error::DigestError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// An item whose metadata and digests are supplied up front
///
/// Digest reads are counted so callers can check which items were
/// content-compared.
#[derive(Debug, Default)]
pub struct MemoryItem {
    name: String,
    path: PathBuf,
    size: u64,
    audio_size: Option<u64>,
    bitrate: Option<u32>,
    tags: BTreeMap<TagField, TagValue>,
    reference: bool,
    partial: Option<Digest>,
    full: Option<Digest>,
    partial_reads: AtomicUsize,
    full_reads: AtomicUsize,
}

impl MemoryItem {
    /// Create an item with a name and a size
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_audio_size(mut self, audio_size: u64) -> Self {
        self.audio_size = Some(audio_size);
        self
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_tag(mut self, field: TagField, value: impl Into<TagValue>) -> Self {
        self.tags.insert(field, value.into());
        self
    }

    /// Set both fingerprints
    pub fn with_digests(mut self, partial: impl AsRef<[u8]>, full: impl AsRef<[u8]>) -> Self {
        self.partial = Some(partial.as_ref().to_vec());
        self.full = Some(full.as_ref().to_vec());
        self
    }

    /// Mark the item as a reference the caller wants to keep
    pub fn as_reference(mut self) -> Self {
        self.reference = true;
        self
    }

    /// Number of times the partial digest was read
    pub fn partial_reads(&self) -> usize {
        self.partial_reads.load(Ordering::SeqCst)
    }

    /// Number of times the full digest was read
    pub fn full_reads(&self) -> usize {
        self.full_reads.load(Ordering::SeqCst)
    }
}

impl ScanItem for MemoryItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn audio_size(&self) -> Option<u64> {
        self.audio_size
    }

    fn bitrate(&self) -> Option<u32> {
        self.bitrate
    }

    fn tag(&self, field: TagField) -> Option<TagValue> {
        self.tags.get(&field).cloned()
    }

    fn is_reference(&self) -> bool {
        self.reference
    }

    fn partial_digest(&self) -> Result<Digest, DigestError> {
        self.partial_reads.fetch_add(1, Ordering::SeqCst);
        self.partial.clone().ok_or_else(|| DigestError::Unavailable {
            path: self.path.clone(),
        })
    }

    fn full_digest(&self) -> Result<Digest, DigestError> {
        self.full_reads.fetch_add(1, Ordering::SeqCst);
        self.full.clone().ok_or_else(|| DigestError::Unavailable {
            path: self.path.clone(),
        })
    }
}
