//! # Engine Module
//!
//! Finds pairs of items whose tokens overlap enough to be duplicates.
//!
//! ## How It Works
//! 1. Index every token to the items carrying it
//! 2. Score each pair of items sharing a token (every pair when similar
//!    words are allowed, since similar words are not indexed)
//! 3. Keep the pairs scoring at least the minimum match percentage
//!
//! ## Scoring
//! | Mode       | Percentage                                         |
//! |------------|----------------------------------------------------|
//! | Unweighted | `200 * matched words / (words in a + words in b)`  |
//! | Weighted   | `100 * matched chars (both sides) / all chars`     |

mod scoring;
mod traits;

pub use scoring::{compare, words_are_similar, SIMILAR_WORD_MAX_EXTRA_CHARS, SIMILAR_WORD_MIN_LEN};
pub use traits::{MatchFactory, WordMatchFactory};

use crate::core::item::{ItemId, ScanItem};
use crate::core::tokenizer::Tokens;
use serde::{Deserialize, Serialize};

/// A scored similarity between two items
///
/// The pair is unordered: [`Match::new`] stores the lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub first: ItemId,
    pub second: ItemId,
    /// Similarity strength, 0-100 for the built-in factory
    pub percentage: u32,
}

impl Match {
    pub fn new(a: ItemId, b: ItemId, percentage: u32) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first,
            second,
            percentage,
        }
    }

    /// Whether `id` is one side of this match
    pub fn involves(&self, id: ItemId) -> bool {
        self.first == id || self.second == id
    }

    /// The side that is not `id`
    pub fn other(&self, id: ItemId) -> Option<ItemId> {
        if self.first == id {
            Some(self.second)
        } else if self.second == id {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Options of the word-overlap factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Pair words where one is a short extension of the other
    pub match_similar_words: bool,
    /// Score by characters instead of by words
    pub weight_words: bool,
    /// Lowest percentage that still produces a match
    pub min_match_percentage: u32,
    /// Compare all fields as one bag of words
    pub no_field_order: bool,
}

/// What a match factory sees of an item
#[derive(Clone, Copy)]
pub struct Candidate<'a> {
    pub id: ItemId,
    pub item: &'a dyn ScanItem,
    pub tokens: &'a Tokens,
}
