//! # Pipeline Module
//!
//! Orchestrates the full duplicate detection workflow over a slice of items.
//!
//! ## Pipeline Stages
//! 1. **Annotate** - Tokenize every item and copy its reference flag
//! 2. **Match** - Score item pairs with the match factory
//! 3. **Filter** - Drop pairs of different file kinds and ignored pairs
//! 4. **Verify** - Compare digests (content scans only)
//! 5. **Group** - Build mutual cliques from the remaining matches
//! 6. **Prioritize** - Pick the reference of each group
//!
//! ## Parallelism
//! Only matching runs in parallel (rayon, inside the factory). Every other
//! stage is sequential and checks for cancellation between items.

mod executor;

pub use crate::events::CancellationToken;
pub use executor::{Scanner, ScannerBuilder};

use crate::core::grouping::{Group, PriorityPolicy};
use crate::core::item::{ItemId, TagField};
use crate::core::tokenizer::{ScanType, Tokens};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a scan compares and how strict it is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub scan_type: ScanType,
    /// Lowest word-match percentage that makes two items duplicates
    pub min_match_percentage: u32,
    /// Score by characters instead of by words
    pub word_weighting: bool,
    /// Pair words like "stripe" and "stripes"
    pub match_similar_words: bool,
    /// Allow matches between items with different extensions
    pub mix_file_kind: bool,
    /// Tags compared by [`ScanType::Tag`]
    pub scanned_tags: BTreeSet<TagField>,
    /// Items smaller than this many bytes are left out (0 disables)
    pub size_threshold: u64,
    pub priority: PriorityPolicy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scan_type: ScanType::Filename,
            min_match_percentage: 80,
            word_weighting: false,
            match_similar_words: false,
            mix_file_kind: true,
            scanned_tags: [TagField::Artist, TagField::Title].into_iter().collect(),
            size_threshold: 0,
            priority: PriorityPolicy::Size,
        }
    }
}

/// Outcome of [`Scanner::find_groups`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    /// Duplicate groups, reference first in each
    pub groups: Vec<Group>,
    /// Matched items that ended up in no group
    pub discarded_count: usize,
    /// Tokens computed for each item, indexed by [`ItemId`]
    pub tokens: Vec<Tokens>,
    /// The scan was stopped before completion; `groups` is empty
    pub cancelled: bool,
}

impl ScanResult {
    pub(crate) fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    /// Number of items that are dupes of some reference
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|group| group.dupes().len()).sum()
    }

    /// Tokens of `item`
    pub fn tokens_of(&self, item: ItemId) -> Option<&Tokens> {
        self.tokens.get(item.index())
    }

    /// The group `item` belongs to
    pub fn group_of(&self, item: ItemId) -> Option<&Group> {
        self.groups.iter().find(|group| group.contains(item))
    }
}
