//! The match-factory capability and its word-overlap implementation.

use super::{scoring, Candidate, Match, MatchConfig};
use crate::core::progress::Job;
use crate::error::ScanError;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Rows of the pair matrix scored between two progress checks
const ROW_CHUNK: usize = 64;

/// Produces the pairwise match relation of a set of candidates
///
/// Implement this trait to replace the word-overlap engine (e.g. with a
/// test double or an entirely different similarity measure).
pub trait MatchFactory: Send + Sync {
    /// Compute every match between `candidates`
    ///
    /// Must report progress on `job` and stop with
    /// [`ScanError::Cancelled`] when the job is cancelled.
    fn compute_matches(&self, candidates: &[Candidate<'_>], job: &Job<'_>) -> Result<Vec<Match>, ScanError>;
}

/// Word-overlap match factory
#[derive(Debug, Clone, Default)]
pub struct WordMatchFactory {
    config: MatchConfig,
}

impl WordMatchFactory {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Score candidate `row` against every later candidate it may match
    fn match_row(
        &self,
        row: usize,
        candidates: &[Candidate<'_>],
        index: Option<&HashMap<&str, Vec<usize>>>,
    ) -> Vec<Match> {
        let current = &candidates[row];
        let others: Vec<usize> = match index {
            Some(index) => current
                .tokens
                .iter()
                .flatten()
                .filter_map(|token| index.get(token.as_str()))
                .flatten()
                .copied()
                .filter(|&other| other > row)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            None => (row + 1..candidates.len()).collect(),
        };

        others
            .into_iter()
            .filter_map(|other| {
                let candidate = &candidates[other];
                scoring::compare(current.tokens, candidate.tokens, &self.config)
                    .filter(|&percentage| percentage >= self.config.min_match_percentage)
                    .map(|percentage| Match::new(current.id, candidate.id, percentage))
            })
            .collect()
    }
}

/// Map every token to the (ascending, distinct) positions of its candidates
fn build_index<'a>(candidates: &[Candidate<'a>]) -> HashMap<&'a str, Vec<usize>> {
    let mut index: HashMap<&'a str, Vec<usize>> = HashMap::new();
    for (position, candidate) in candidates.iter().enumerate() {
        for token in candidate.tokens.iter().flatten() {
            let positions = index.entry(token.as_str()).or_default();
            if positions.last() != Some(&position) {
                positions.push(position);
            }
        }
    }
    index
}

impl MatchFactory for WordMatchFactory {
    fn compute_matches(&self, candidates: &[Candidate<'_>], job: &Job<'_>) -> Result<Vec<Match>, ScanError> {
        let total = candidates.len();
        job.set_progress(0, "Computing matches")?;

        // Similar words are found by prefix, which an exact index can't see.
        let index = (!self.config.match_similar_words).then(|| build_index(candidates));

        let mut matches = Vec::new();
        let mut start = 0;
        while start < total {
            let end = (start + ROW_CHUNK).min(total);
            let rows: Vec<Vec<Match>> = (start..end)
                .into_par_iter()
                .map(|row| self.match_row(row, candidates, index.as_ref()))
                .collect();
            matches.extend(rows.into_iter().flatten());
            start = end;
            job.advance(end, total, "Matched items")?;
        }

        debug!(
            candidates = total,
            matches = matches.len(),
            "word matching finished"
        );
        job.set_progress(100, "Computing matches")?;
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{ItemId, MemoryItem};
    use crate::core::tokenizer::get_words;
    use crate::events::NullSink;

    fn tokens(names: &[&str]) -> Vec<Vec<Vec<String>>> {
        names.iter().map(|name| vec![get_words(name)]).collect()
    }

    fn run(factory: &WordMatchFactory, names: &[&str]) -> Vec<Match> {
        let items: Vec<MemoryItem> = names.iter().map(|n| MemoryItem::new(*n, 1)).collect();
        let tokens = tokens(names);
        let candidates: Vec<Candidate<'_>> = items
            .iter()
            .zip(&tokens)
            .enumerate()
            .map(|(i, (item, tokens))| Candidate {
                id: ItemId(i),
                item,
                tokens,
            })
            .collect();
        let sink = NullSink;
        factory.compute_matches(&candidates, &Job::new(&sink)).unwrap()
    }

    fn factory(min_match_percentage: u32) -> WordMatchFactory {
        WordMatchFactory::new(MatchConfig {
            min_match_percentage,
            ..MatchConfig::default()
        })
    }

    #[test]
    fn empty_input_has_no_matches() {
        assert!(run(&factory(80), &[]).is_empty());
    }

    #[test]
    fn threshold_filters_matches() {
        let names = ["foo bar", "foo bar", "foo bleh"];
        let strict = run(&factory(80), &names);
        assert_eq!(strict, vec![Match::new(ItemId(0), ItemId(1), 100)]);

        let loose = run(&factory(50), &names);
        assert_eq!(loose.len(), 3);
        assert!(loose.contains(&Match::new(ItemId(0), ItemId(2), 50)));
    }

    #[test]
    fn items_without_shared_words_are_not_compared() {
        assert!(run(&factory(0), &["foo", "bar"]).is_empty());
    }

    #[test]
    fn similar_words_scan_all_pairs() {
        let factory = WordMatchFactory::new(MatchConfig {
            match_similar_words: true,
            min_match_percentage: 80,
            ..MatchConfig::default()
        });
        let matches = run(&factory, &["The White Stripes", "The Whites Stripe", "Limp Bizkit", "Limp Bizkitt"]);
        assert_eq!(
            matches,
            vec![
                Match::new(ItemId(0), ItemId(1), 100),
                Match::new(ItemId(2), ItemId(3), 100),
            ]
        );
    }

    #[test]
    fn output_is_deterministic_across_chunks() {
        let names: Vec<String> = (0..150).map(|i| format!("song {}", i % 7)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let first = run(&factory(100), &names);
        let second = run(&factory(100), &names);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| (w[0].first, w[0].second) < (w[1].first, w[1].second)));
    }

    #[test]
    fn cancellation_stops_matching() {
        let items = [MemoryItem::new("a", 1), MemoryItem::new("a", 1)];
        let tokens = tokens(&["a", "a"]);
        let candidates: Vec<Candidate<'_>> = items
            .iter()
            .zip(&tokens)
            .enumerate()
            .map(|(i, (item, tokens))| Candidate {
                id: ItemId(i),
                item,
                tokens,
            })
            .collect();
        let sink = |_percent: u8, _message: &str| false;
        let result = factory(0).compute_matches(&candidates, &Job::new(&sink));
        assert!(matches!(result, Err(ScanError::Cancelled)));
    }
}
