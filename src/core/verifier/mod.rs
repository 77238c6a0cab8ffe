//! # Verifier Module
//!
//! Confirms content-scan matches by comparing digests.
//!
//! Matches handed to the verifier were already narrowed by size, so only
//! items that share a size with another item ever have a digest read. The
//! pipeline verifies with [`DigestKind::Partial`] first and only reads full
//! digests for pairs whose partial digests agree.

use crate::core::engine::{Candidate, Match};
use crate::core::item::{Digest, DigestKind, ItemId};
use crate::core::progress::Job;
use crate::error::DupeFinderError;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Keep the matches whose two items have equal digests of `kind`
///
/// `candidates` must contain every item referenced by `matches`. Each item's
/// digest is read once per call. A failed read aborts verification.
pub fn verify(
    matches: Vec<Match>,
    candidates: &[Candidate<'_>],
    kind: DigestKind,
    job: &Job<'_>,
) -> Result<Vec<Match>, DupeFinderError> {
    let by_id: HashMap<ItemId, &Candidate<'_>> = candidates.iter().map(|c| (c.id, c)).collect();
    let matched: BTreeSet<ItemId> = matches.iter().flat_map(|m| [m.first, m.second]).collect();
    let total = matched.len();
    let label = match kind {
        DigestKind::Partial => "Analyzed (partial) matching files",
        DigestKind::Full => "Analyzed matching files",
    };

    job.set_progress(0, label)?;
    let mut digests: HashMap<ItemId, Digest> = HashMap::with_capacity(total);
    for (done, id) in matched.into_iter().enumerate() {
        if let Some(candidate) = by_id.get(&id) {
            digests.insert(id, candidate.item.digest(kind)?);
        }
        job.advance(done + 1, total, label)?;
    }

    let before = matches.len();
    let verified: Vec<Match> = matches
        .into_iter()
        .filter(|m| match (digests.get(&m.first), digests.get(&m.second)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        })
        .collect();

    debug!(?kind, before, after = verified.len(), "content verification finished");
    job.set_progress(100, "Removing false matches")?;
    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::MemoryItem;
    use crate::core::tokenizer::Tokens;
    use crate::events::NullSink;

    fn candidates<'a>(items: &'a [MemoryItem], tokens: &'a Tokens) -> Vec<Candidate<'a>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Candidate {
                id: ItemId(i),
                item,
                tokens,
            })
            .collect()
    }

    #[test]
    fn keeps_only_equal_digests() {
        let items = [
            MemoryItem::new("a", 1).with_digests("p", "same"),
            MemoryItem::new("b", 1).with_digests("p", "same"),
            MemoryItem::new("c", 1).with_digests("p", "other"),
        ];
        let tokens = vec![vec!["1".to_string()]];
        let candidates = candidates(&items, &tokens);
        let matches = vec![
            Match::new(ItemId(0), ItemId(1), 100),
            Match::new(ItemId(0), ItemId(2), 100),
            Match::new(ItemId(1), ItemId(2), 100),
        ];
        let sink = NullSink;
        let job = Job::new(&sink);

        let partial = verify(matches, &candidates, DigestKind::Partial, &job).unwrap();
        assert_eq!(partial.len(), 3);

        let full = verify(partial, &candidates, DigestKind::Full, &job).unwrap();
        assert_eq!(full, vec![Match::new(ItemId(0), ItemId(1), 100)]);
    }

    #[test]
    fn each_digest_is_read_once() {
        let items = [
            MemoryItem::new("a", 1).with_digests("p", "f"),
            MemoryItem::new("b", 1).with_digests("p", "f"),
            MemoryItem::new("c", 1).with_digests("p", "f"),
        ];
        let tokens = vec![vec!["1".to_string()]];
        let candidates = candidates(&items, &tokens);
        let matches = vec![
            Match::new(ItemId(0), ItemId(1), 100),
            Match::new(ItemId(0), ItemId(2), 100),
            Match::new(ItemId(1), ItemId(2), 100),
        ];
        let sink = NullSink;

        verify(matches, &candidates, DigestKind::Partial, &Job::new(&sink)).unwrap();

        assert!(items.iter().all(|item| item.partial_reads() == 1));
        assert!(items.iter().all(|item| item.full_reads() == 0));
    }

    #[test]
    fn unmatched_items_are_never_read() {
        let items = [
            MemoryItem::new("a", 1).with_digests("p", "f"),
            MemoryItem::new("b", 1).with_digests("p", "f"),
            MemoryItem::new("c", 2),
        ];
        let tokens = vec![vec!["1".to_string()]];
        let candidates = candidates(&items, &tokens);
        let sink = NullSink;

        let verified = verify(
            vec![Match::new(ItemId(0), ItemId(1), 100)],
            &candidates,
            DigestKind::Full,
            &Job::new(&sink),
        )
        .unwrap();

        assert_eq!(verified.len(), 1);
        assert_eq!(items[2].full_reads(), 0);
    }

    #[test]
    fn read_failure_aborts() {
        let items = [MemoryItem::new("a", 1), MemoryItem::new("b", 1)];
        let tokens = vec![vec!["1".to_string()]];
        let candidates = candidates(&items, &tokens);
        let sink = NullSink;

        let result = verify(
            vec![Match::new(ItemId(0), ItemId(1), 100)],
            &candidates,
            DigestKind::Partial,
            &Job::new(&sink),
        );

        assert!(matches!(result, Err(DupeFinderError::Digest(_))));
    }
}
