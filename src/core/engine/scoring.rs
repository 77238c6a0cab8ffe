//! Word-overlap scoring between two token sets.

use super::MatchConfig;
use crate::core::tokenizer::Tokens;

/// Largest length difference for two words to count as similar
pub const SIMILAR_WORD_MAX_EXTRA_CHARS: usize = 2;

/// Shortest word that may match a longer word by prefix
pub const SIMILAR_WORD_MIN_LEN: usize = 3;

/// Running totals of a comparison
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    /// Matched tokens (unweighted) or matched characters on both sides (weighted)
    matched: usize,
    /// All tokens (unweighted) or all characters (weighted), both sides
    total: usize,
}

impl Tally {
    fn add(&mut self, other: Tally) {
        self.matched += other.matched;
        self.total += other.total;
    }
}

fn char_len(word: &str) -> usize {
    word.chars().count()
}

/// Whether two distinct words are close enough to pair up
///
/// One must be a prefix of the other, the shorter one must have at least
/// [`SIMILAR_WORD_MIN_LEN`] characters and the longer may have at most
/// [`SIMILAR_WORD_MAX_EXTRA_CHARS`] more.
pub fn words_are_similar(a: &str, b: &str) -> bool {
    let (short, long) = if char_len(a) <= char_len(b) { (a, b) } else { (b, a) };
    let (short_len, long_len) = (char_len(short), char_len(long));
    short_len >= SIMILAR_WORD_MIN_LEN
        && long_len - short_len <= SIMILAR_WORD_MAX_EXTRA_CHARS
        && long.starts_with(short)
}

/// Pair the words of one field against the words of the other
fn compare_words(first: &[String], second: &[String], config: &MatchConfig) -> Tally {
    let weight = |word: &str| if config.weight_words { char_len(word) } else { 1 };

    let total = first.iter().chain(second).map(|w| weight(w)).sum();
    let mut used = vec![false; second.len()];
    let mut pending = Vec::with_capacity(first.len());
    let mut matched = 0;

    for word in first {
        match (0..second.len()).find(|&j| !used[j] && second[j] == *word) {
            Some(j) => {
                used[j] = true;
                matched += pair_weight(word, &second[j], config);
            }
            None => pending.push(word),
        }
    }

    if config.match_similar_words {
        for word in pending {
            if let Some(j) = (0..second.len()).find(|&j| !used[j] && words_are_similar(word, &second[j])) {
                used[j] = true;
                matched += pair_weight(word, &second[j], config);
            }
        }
    }

    Tally { matched, total }
}

/// Contribution of one matched pair: one per side, or each side's length
fn pair_weight(a: &str, b: &str, config: &MatchConfig) -> usize {
    if config.weight_words {
        char_len(a) + char_len(b)
    } else {
        2
    }
}

fn flatten(tokens: &Tokens) -> Vec<String> {
    tokens.iter().flatten().cloned().collect()
}

/// Similarity percentage between two token sets
///
/// Returns `None` when either side has no tokens: such items never match.
/// The result does not depend on argument order.
pub fn compare(first: &Tokens, second: &Tokens, config: &MatchConfig) -> Option<u32> {
    // Pairing is greedy; a fixed side order keeps the result symmetric.
    let (first, second) = if first <= second { (first, second) } else { (second, first) };

    let tally = if config.no_field_order {
        compare_words(&flatten(first), &flatten(second), config)
    } else {
        let mut tally = Tally::default();
        let longest = first.len().max(second.len());
        for position in 0..longest {
            let a = first.get(position).map(Vec::as_slice).unwrap_or_default();
            let b = second.get(position).map(Vec::as_slice).unwrap_or_default();
            tally.add(compare_words(a, b, config));
        }
        tally
    };

    let has_tokens = |tokens: &Tokens| tokens.iter().any(|group| !group.is_empty());
    if !has_tokens(first) || !has_tokens(second) || tally.total == 0 {
        return None;
    }

    // `matched` counts both sides, so this is 200 * pairs / total when unweighted.
    let percentage = (100 * tally.matched / tally.total).min(100);
    Some(percentage as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::{get_fields, get_words};

    fn words(text: &str) -> Tokens {
        vec![get_words(text)]
    }

    fn config() -> MatchConfig {
        MatchConfig::default()
    }

    #[test]
    fn identical_words_score_100() {
        assert_eq!(compare(&words("foo bar"), &words("bar foo"), &config()), Some(100));
    }

    #[test]
    fn partial_overlap_uses_token_counts() {
        // 2 matched pairs over 5 tokens -> 200 * 2 / 5 = 80
        assert_eq!(compare(&words("foo bar"), &words("foo bar bleh"), &config()), Some(80));
        // 1 pair over 4 tokens -> 50
        assert_eq!(compare(&words("foo bar"), &words("foo bleh"), &config()), Some(50));
        // 1 pair over 3 tokens -> 66
        assert_eq!(compare(&words("a b"), &words("a"), &config()), Some(66));
    }

    #[test]
    fn duplicate_words_are_not_double_counted() {
        // one "foo" pairs, the second one has no partner: 200 * 1 / 3
        assert_eq!(compare(&words("foo foo"), &words("foo"), &config()), Some(66));
    }

    #[test]
    fn weighted_scoring_counts_characters() {
        let config = MatchConfig {
            weight_words: true,
            ..config()
        };
        // 16 letters, 12 matching
        assert_eq!(compare(&words("foo bar"), &words("foo bar bleh"), &config), Some(75));
    }

    #[test]
    fn empty_sides_never_match() {
        assert_eq!(compare(&words(""), &words(""), &config()), None);
        assert_eq!(compare(&words("foo"), &Vec::new(), &config()), None);
    }

    #[test]
    fn similar_words_need_the_option() {
        let strict = config();
        let similar = MatchConfig {
            match_similar_words: true,
            ..config()
        };
        let a = words("The White Stripes");
        let b = words("The Whites Stripe");

        assert_eq!(compare(&a, &b, &strict), Some(33));
        assert_eq!(compare(&a, &b, &similar), Some(100));
    }

    #[test]
    fn similar_word_tolerance() {
        assert!(words_are_similar("bizkit", "bizkitt"));
        assert!(words_are_similar("boxes", "box"));
        assert!(!words_are_similar("box", "boxing"));
        assert!(!words_are_similar("a", "ab"));
        assert!(!words_are_similar("white", "whale"));
    }

    #[test]
    fn ordered_fields_do_not_cross_positions() {
        let a = get_fields("The White Stripes - Little Ghost");
        let b = get_fields("Little Ghost - The White Stripes");

        assert_eq!(compare(&a, &b, &config()), Some(0));

        let unordered = MatchConfig {
            no_field_order: true,
            ..config()
        };
        assert_eq!(compare(&a, &b, &unordered), Some(100));
    }

    #[test]
    fn ordered_fields_accumulate_counts() {
        // field 1: 2 pairs, field 2: 1 pair; 200 * 3 / 8 = 75
        let a = get_fields("aa bb - cc dd");
        let b = get_fields("aa bb - cc ee");
        assert_eq!(compare(&a, &b, &config()), Some(75));
    }

    #[test]
    fn unmatched_extra_fields_count_in_denominator() {
        let a = get_fields("aa - bb");
        let b = get_fields("aa");
        // 1 pair over 3 tokens
        assert_eq!(compare(&a, &b, &config()), Some(66));
    }

    #[test]
    fn scores_are_symmetric() {
        let similar = MatchConfig {
            match_similar_words: true,
            weight_words: true,
            ..config()
        };
        let samples = [
            words("stripe stripes strip"),
            words("stripes stripe"),
            words("the whites stripe"),
            get_fields("aa bb - cc"),
            words("bizkitt bizkit"),
        ];
        for a in &samples {
            for b in &samples {
                assert_eq!(compare(a, b, &similar), compare(b, a, &similar));
                assert_eq!(compare(a, b, &config()), compare(b, a, &config()));
            }
        }
    }
}
