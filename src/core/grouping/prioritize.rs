//! Reference selection inside a group.

use super::Group;
use crate::core::item::{ItemId, ScanItem};
use crate::core::tokenizer::rem_file_ext;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::Path;
use std::sync::LazyLock;

/// Whitespace-padded run of digits, e.g. the " 2" of "song 2"
static NUMBER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*$").expect("NUMBER_SUFFIX is a valid pattern"));

/// Sort key of a member; the smallest key becomes the reference
pub type PriorityKey = (bool, Reverse<u32>, Reverse<u64>);

/// How references are preferred within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityPolicy {
    /// Existing references first, then the biggest item
    #[default]
    Size,
    /// Existing references first, then the highest bitrate, then the biggest item
    BitrateThenSize,
}

impl PriorityPolicy {
    /// Key of `item`; `is_reference` is the item's reference annotation
    pub fn key(&self, item: &dyn ScanItem, is_reference: bool) -> PriorityKey {
        let bitrate = match self {
            PriorityPolicy::Size => 0,
            PriorityPolicy::BitrateThenSize => item.bitrate().unwrap_or(0),
        };
        (!is_reference, Reverse(bitrate), Reverse(item.size()))
    }
}

/// Whether `name` is `base` followed by a number, e.g. "song 2" for "song"
fn is_numbered_copy(name: &str, base: &str) -> bool {
    name.strip_prefix(base)
        .is_some_and(|suffix| NUMBER_SUFFIX.is_match(suffix))
}

/// Number of path components, then path length
fn depth(path: &Path) -> (usize, usize) {
    (path.components().count(), path.as_os_str().len())
}

/// Whether `candidate` should replace `reference` when their keys tie
///
/// Names are compared lowercase, without extension:
/// 1. a name containing "copy" loses to one that doesn't;
/// 2. "name 2" loses to "name";
/// 3. otherwise the shallower path wins.
pub fn default_tie_break(reference: &dyn ScanItem, candidate: &dyn ScanItem) -> bool {
    let reference_name = rem_file_ext(reference.name()).to_lowercase();
    let candidate_name = rem_file_ext(candidate.name()).to_lowercase();

    let reference_copy = reference_name.contains("copy");
    let candidate_copy = candidate_name.contains("copy");
    if reference_copy != candidate_copy {
        return reference_copy;
    }

    if is_numbered_copy(&reference_name, &candidate_name) {
        return true;
    }
    if is_numbered_copy(&candidate_name, &reference_name) {
        return false;
    }

    depth(candidate.path()) < depth(reference.path())
}

/// Pick the reference of `group`
///
/// Members are ordered by `key` (then by id). Among the members whose key
/// ties with the smallest one, the running reference is replaced by a member
/// whenever `tie_break(reference, member)` is true.
pub fn prioritize<K, F, T>(group: &mut Group, key: F, tie_break: T)
where
    K: Ord,
    F: Fn(ItemId) -> K,
    T: Fn(ItemId, ItemId) -> bool,
{
    let mut keyed: Vec<(K, ItemId)> = group.members().iter().map(|&id| (key(id), id)).collect();
    keyed.sort();

    let Some((best_key, first)) = keyed.first() else {
        return;
    };
    let mut reference = *first;
    for (member_key, member) in keyed.iter().skip(1) {
        if member_key != best_key {
            break;
        }
        if tie_break(reference, *member) {
            reference = *member;
        }
    }

    let rest: Vec<ItemId> = keyed.iter().map(|(_, id)| *id).collect();
    group.reorder(reference, rest);
}
