//! # Tokenizer Module
//!
//! Turns item metadata into comparison tokens.
//!
//! A token is a lowercase run of alphanumeric characters. Tokens are kept in
//! ordered groups: one group per field for field and tag scans, a single
//! group otherwise. Group order only matters when fields are compared in
//! order.

use crate::core::item::{ScanItem, TagField};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Separator between fields in a `Fields` scan
pub const FIELD_SEPARATOR: &str = " - ";

/// Token assigned to items whose duplication was proven by content
pub const CONTENT_VERIFIED_TOKEN: &str = "--";

/// Ordered token groups of one item
pub type Tokens = Vec<Vec<String>>;

/// What a scan compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    /// Words of the file name
    Filename,
    /// " - " separated fields of the file name, compared in order
    Fields,
    /// Same fields, compared regardless of order
    FieldsNoOrder,
    /// Words of selected tag attributes
    Tag,
    /// File size, then content digests
    Content,
    /// Audio payload size, then the audio digest
    ContentAudio,
}

impl ScanType {
    /// Whether matches of this scan type are confirmed by digests
    pub fn is_content(&self) -> bool {
        matches!(self, ScanType::Content | ScanType::ContentAudio)
    }
}

/// Split `text` into lowercase alphanumeric words
pub fn get_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Split `text` on [`FIELD_SEPARATOR`] and tokenize every non-empty field
pub fn get_fields(text: &str) -> Tokens {
    text.split(FIELD_SEPARATOR)
        .map(get_words)
        .filter(|words| !words.is_empty())
        .collect()
}

/// `name` without its extension
pub fn rem_file_ext(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// Lowercase extension of `name`, empty when there is none
pub fn get_file_ext(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name[pos + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// Compute the comparison tokens of `item` for `scan_type`
///
/// `FieldsNoOrder` tokenizes exactly like `Fields`; order is ignored at
/// scoring time. Tag scans produce one group per scanned tag in
/// [`TagField::ALL`] order, with an empty group for absent tags so fields
/// stay aligned between items.
pub fn tokenize(item: &dyn ScanItem, scan_type: ScanType, scanned_tags: &BTreeSet<TagField>) -> Tokens {
    match scan_type {
        ScanType::Filename => vec![get_words(rem_file_ext(item.name()))],
        ScanType::Fields | ScanType::FieldsNoOrder => get_fields(rem_file_ext(item.name())),
        ScanType::Tag => TagField::ALL
            .into_iter()
            .filter(|field| scanned_tags.contains(field))
            .map(|field| {
                item.tag(field)
                    .map(|value| get_words(&value.to_string()))
                    .unwrap_or_default()
            })
            .collect(),
        ScanType::Content => vec![vec![item.size().to_string()]],
        ScanType::ContentAudio => match item.audio_size() {
            Some(audio_size) => vec![vec![audio_size.to_string()]],
            None => Vec::new(),
        },
    }
}

/// Tokens given to both sides of a content-verified match
pub fn content_verified_tokens() -> Tokens {
    vec![vec![CONTENT_VERIFIED_TOKEN.to_string()]]
}

/// Total number of tokens across all groups
pub fn token_count(tokens: &Tokens) -> usize {
    tokens.iter().map(Vec::len).sum()
}
