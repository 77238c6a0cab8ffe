//! # Grouping Module
//!
//! Turns the match relation into duplicate groups and picks each group's
//! reference.
//!
//! ## Clique Rule
//! Every two members of a group have a match of their own. If A matches B
//! and B matches C but A does not match C, {A, B, C} is *not* a group: the
//! grouper keeps {A, B} and leaves C out.

mod grouper;
mod prioritize;

pub use grouper::CliqueGrouper;
pub use prioritize::{default_tie_break, prioritize, PriorityKey, PriorityPolicy};

use crate::core::engine::Match;
use crate::core::item::ItemId;
use serde::{Deserialize, Serialize};

/// A set of items that all match each other
///
/// The first member is the reference (the copy to keep); the others are
/// dupes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    members: Vec<ItemId>,
    matches: Vec<Match>,
}

impl Group {
    /// Build a group from its members and the matches among them
    ///
    /// `members` must not be empty: the first one is the reference.
    pub(crate) fn new(members: Vec<ItemId>, matches: Vec<Match>) -> Self {
        debug_assert!(!members.is_empty(), "a group needs at least one member");
        Self { members, matches }
    }

    /// The item to keep
    pub fn reference(&self) -> ItemId {
        self.members[0]
    }

    /// Every member except the reference
    pub fn dupes(&self) -> &[ItemId] {
        &self.members[1..]
    }

    /// All members, reference first
    pub fn members(&self) -> &[ItemId] {
        &self.members
    }

    /// Matches between members
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.members.contains(&item)
    }

    /// The match between the reference and `item`
    pub fn match_of(&self, item: ItemId) -> Option<&Match> {
        let reference = self.reference();
        if item == reference {
            return None;
        }
        self.matches
            .iter()
            .find(|m| m.involves(reference) && m.involves(item))
    }

    /// Average percentage of the reference's matches
    pub fn percentage(&self) -> u32 {
        let reference = self.reference();
        let scores: Vec<u64> = self
            .matches
            .iter()
            .filter(|m| m.involves(reference))
            .map(|m| u64::from(m.percentage))
            .collect();
        if scores.is_empty() {
            return 0;
        }
        let average = scores.iter().sum::<u64>() / scores.len() as u64;
        u32::try_from(average).unwrap_or(u32::MAX)
    }

    /// Make `item` the reference
    ///
    /// Returns `false` (and changes nothing) when `item` is not a member.
    pub fn switch_reference(&mut self, item: ItemId) -> bool {
        match self.members.iter().position(|&member| member == item) {
            Some(position) => {
                self.members.swap(0, position);
                true
            }
            None => false,
        }
    }

    /// Reorder members: `reference` first, then `rest` in the given order
    pub(crate) fn reorder(&mut self, reference: ItemId, rest: impl IntoIterator<Item = ItemId>) {
        let mut members = vec![reference];
        members.extend(rest.into_iter().filter(|&id| id != reference));
        debug_assert_eq!(members.len(), self.members.len());
        self.members = members;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Group {
        Group::new(
            vec![ItemId(0), ItemId(1), ItemId(2)],
            vec![
                Match::new(ItemId(0), ItemId(1), 90),
                Match::new(ItemId(0), ItemId(2), 80),
                Match::new(ItemId(1), ItemId(2), 100),
            ],
        )
    }

    #[test]
    fn reference_is_first_member() {
        let group = group();
        assert_eq!(group.reference(), ItemId(0));
        assert_eq!(group.dupes(), &[ItemId(1), ItemId(2)]);
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn match_of_uses_reference() {
        let group = group();
        assert_eq!(group.match_of(ItemId(2)).map(|m| m.percentage), Some(80));
        assert_eq!(group.match_of(ItemId(0)), None);
        assert_eq!(group.percentage(), 85);
    }

    #[test]
    fn switch_reference_changes_match_of() {
        let mut group = group();
        assert!(group.switch_reference(ItemId(1)));
        assert_eq!(group.reference(), ItemId(1));
        assert!(group.contains(ItemId(0)));
        assert_eq!(group.match_of(ItemId(2)).map(|m| m.percentage), Some(100));
    }

    #[test]
    fn percentage_of_huge_scores_does_not_overflow() {
        let group = Group::new(
            vec![ItemId(0), ItemId(1), ItemId(2)],
            vec![
                Match::new(ItemId(0), ItemId(1), u32::MAX),
                Match::new(ItemId(0), ItemId(2), u32::MAX - 2),
            ],
        );
        assert_eq!(group.percentage(), u32::MAX - 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "at least one member")]
    fn empty_group_is_refused() {
        Group::new(Vec::new(), Vec::new());
    }

    #[test]
    fn switch_reference_to_outsider_is_refused() {
        let mut group = group();
        assert!(!group.switch_reference(ItemId(9)));
        assert_eq!(group.reference(), ItemId(0));
    }
}
