//! # Item Module
//!
//! The contract between the scanner and the items it deduplicates.
//!
//! Items are owned by the caller. The scanner only reads them through
//! [`ScanItem`] and keeps its own per-scan annotations in a side table keyed
//! by [`ItemId`], so the same items can be scanned concurrently by
//! independent scanners.

mod file;
mod memory;

pub use file::FileItem;
pub use memory::MemoryItem;

use crate::error::DigestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Position of an item in the slice handed to the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl ItemId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Raw content fingerprint bytes
pub type Digest = Vec<u8>;

/// Which content fingerprint to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestKind {
    /// Cheap fingerprint of a prefix (or of the audio payload)
    Partial,
    /// Fingerprint of the whole content
    Full,
}

/// Tag attributes that can take part in a tag scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagField {
    Track,
    Artist,
    Album,
    Title,
    Genre,
    Year,
}

impl TagField {
    /// Every scannable tag, in the order their fields are compared
    pub const ALL: [TagField; 6] = [
        TagField::Track,
        TagField::Artist,
        TagField::Album,
        TagField::Title,
        TagField::Genre,
        TagField::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagField::Track => "track",
            TagField::Artist => "artist",
            TagField::Album => "album",
            TagField::Title => "title",
            TagField::Genre => "genre",
            TagField::Year => "year",
        }
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tag '{s}'"))
    }
}

/// Value of a tag attribute
///
/// Every variant has a lossless text form through [`Display`](fmt::Display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(text) => f.write_str(text),
            TagValue::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Number(value)
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        TagValue::Number(i64::from(value))
    }
}

/// An item that can be scanned for duplicates
///
/// Size and digest reads may be expensive. Implementors are expected to
/// compute digests lazily and remember them; the scanner reads each digest
/// at most once per verification stage.
pub trait ScanItem: Send + Sync {
    /// File name, including its extension
    fn name(&self) -> &str;

    /// Location of the item, used for ignore-list lookups and tie-breaking
    fn path(&self) -> &Path;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Size of the audio payload, for audio files
    fn audio_size(&self) -> Option<u64> {
        None
    }

    /// Bitrate in kbps, for audio files
    fn bitrate(&self) -> Option<u32> {
        None
    }

    /// Value of a tag attribute, if the item has it
    fn tag(&self, _field: TagField) -> Option<TagValue> {
        None
    }

    /// Whether the caller marked this item as a reference that must be kept
    fn is_reference(&self) -> bool {
        false
    }

    /// Cheap fingerprint, read before the full one
    fn partial_digest(&self) -> Result<Digest, DigestError>;

    /// Fingerprint of the whole content
    fn full_digest(&self) -> Result<Digest, DigestError>;

    /// Read the fingerprint of the requested kind
    fn digest(&self, kind: DigestKind) -> Result<Digest, DigestError> {
        match kind {
            DigestKind::Partial => self.partial_digest(),
            DigestKind::Full => self.full_digest(),
        }
    }
}
