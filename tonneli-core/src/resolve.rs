//! Free-text street resolution against a [`Directory`].
//!
//! An exact match on the normalized name always wins. Otherwise every street is
//! scored with a Ratcliff/Obershelp similarity ratio and the best candidate is
//! accepted only if its score reaches the cutoff. Ties go to the street that
//! comes first in directory order.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::directory::{Directory, StreetEntry, normalize_street};

/// Default acceptance threshold for fuzzy matches.
pub const DEFAULT_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// How a query was matched to a street.
pub enum MatchType {
    /// Normalized query equals a normalized street name.
    Exact,
    /// Closest street by similarity ratio, above the cutoff.
    Fuzzy,
    /// No street reached the cutoff.
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Outcome of resolving one street query.
pub struct Resolution {
    /// Query as given by the caller.
    pub query: String,
    /// Canonical street name in its published casing.
    pub matched: Option<String>,
    /// How the street was found.
    pub match_type: MatchType,
    /// Similarity score of the match, `1.0` for exact matches.
    pub confidence: Option<f64>,
}

impl Resolution {
    fn exact(query: &str, entry: &StreetEntry) -> Self {
        Self {
            query: query.to_owned(),
            matched: Some(entry.name.clone()),
            match_type: MatchType::Exact,
            confidence: Some(1.0),
        }
    }

    fn fuzzy(query: &str, candidate: &Candidate<'_>) -> Self {
        Self {
            query: query.to_owned(),
            matched: Some(candidate.entry.name.clone()),
            match_type: MatchType::Fuzzy,
            confidence: Some(candidate.score),
        }
    }

    fn unmatched(query: &str) -> Self {
        Self {
            query: query.to_owned(),
            matched: None,
            match_type: MatchType::Unmatched,
            confidence: None,
        }
    }

    /// Whether a street was found.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.matched.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
/// A scored street.
pub struct Candidate<'d> {
    /// Street entry in the directory.
    pub entry: &'d StreetEntry,
    /// Similarity between the query and the street name.
    pub score: f64,
}

/// Resolve `query` to a street of `directory`.
#[must_use]
pub fn resolve(query: &str, directory: &Directory, cutoff: f64) -> Resolution {
    if let Some(entry) = directory.get(query) {
        return Resolution::exact(query, entry);
    }

    let normalized = normalize_street(query);
    let mut best: Option<Candidate<'_>> = None;
    for candidate in score_all(&normalized, directory) {
        if best.is_none_or(|current| candidate.score > current.score) {
            best = Some(candidate);
        }
    }

    match best {
        Some(candidate) if candidate.score >= cutoff => Resolution::fuzzy(query, &candidate),
        Some(candidate) => {
            tracing::debug!(
                query,
                closest = %candidate.entry.name,
                score = candidate.score,
                cutoff,
                "closest street below cutoff"
            );
            Resolution::unmatched(query)
        }
        None => Resolution::unmatched(query),
    }
}

/// Up to `limit` streets scoring at least `cutoff`, best first.
///
/// Equal scores keep directory order. An exact match always ranks first
/// because only identical names score `1.0`.
#[must_use]
pub fn closest_matches<'d>(
    query: &str,
    directory: &'d Directory,
    cutoff: f64,
    limit: usize,
) -> Vec<Candidate<'d>> {
    if limit == 0 {
        return Vec::new();
    }
    let normalized = normalize_street(query);
    let mut candidates: Vec<Candidate<'d>> = score_all(&normalized, directory)
        .filter(|candidate| candidate.score >= cutoff)
        .collect();
    candidates.sort_by(|left, right| right.score.total_cmp(&left.score));
    candidates.truncate(limit);
    candidates
}

fn score_all<'q, 'd: 'q>(
    normalized_query: &'q str,
    directory: &'d Directory,
) -> impl Iterator<Item = Candidate<'d>> + 'q {
    directory.iter().map(move |(key, entry)| Candidate {
        entry,
        score: similarity(normalized_query, key),
    })
}

/// Ratcliff/Obershelp similarity of two strings in `0.0..=1.0`.
///
/// `2 * M / T` where `T` is the total number of characters and `M` the number
/// of characters in matching blocks. Blocks are found by taking the longest
/// common substring (earliest on ties) and recursing on both sides of it.
#[must_use]
pub fn similarity(left: &str, right: &str) -> f64 {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();
    let total = left.len() + right.len();
    if total == 0 {
        return 1.0;
    }
    ratio(2 * matching_characters(&left, &right), total)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "street names are far shorter than 2^52 characters"
)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    left: usize,
    right: usize,
    size: usize,
}

fn matching_characters(left: &[char], right: &[char]) -> usize {
    let mut pending = vec![(0, left.len(), 0, right.len())];
    let mut matched = 0;
    while let Some((left_lo, left_hi, right_lo, right_hi)) = pending.pop() {
        let block = longest_match(left, right, (left_lo, left_hi), (right_lo, right_hi));
        if block.size == 0 {
            continue;
        }
        matched += block.size;
        if left_lo < block.left && right_lo < block.right {
            pending.push((left_lo, block.left, right_lo, block.right));
        }
        if block.left + block.size < left_hi && block.right + block.size < right_hi {
            pending.push((
                block.left + block.size,
                left_hi,
                block.right + block.size,
                right_hi,
            ));
        }
    }
    matched
}

/// Longest common run of `left[lo..hi]` and `right[lo..hi]`, earliest in `left`
/// then in `right` on ties.
fn longest_match(
    left: &[char],
    right: &[char],
    (left_lo, left_hi): (usize, usize),
    (right_lo, right_hi): (usize, usize),
) -> Block {
    let width = right_hi - right_lo;
    let mut best = Block {
        left: left_lo,
        right: right_lo,
        size: 0,
    };
    // row[offset + 1] holds the length of the run ending at right[right_lo + offset]
    let mut previous = vec![0_usize; width + 1];
    let mut current = vec![0_usize; width + 1];

    for (left_pos, left_char) in left.iter().enumerate().take(left_hi).skip(left_lo) {
        for (offset, right_char) in right.iter().skip(right_lo).take(width).enumerate() {
            let run = if left_char == right_char {
                previous.get(offset).copied().unwrap_or(0) + 1
            } else {
                0
            };
            if let Some(cell) = current.get_mut(offset + 1) {
                *cell = run;
            }
            if run > best.size {
                best = Block {
                    left: left_pos + 1 - run,
                    right: right_lo + offset + 1 - run,
                    size: run,
                };
            }
        }
        mem::swap(&mut previous, &mut current);
    }
    best
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::{DEFAULT_CUTOFF, MatchType, closest_matches, resolve, similarity};
    use crate::directory::{Directory, StreetEntry};

    fn directory() -> Directory {
        [
            ("Aaron Rd", Weekday::Mon),
            ("Abbott Rd", Weekday::Tue),
            ("Adams St", Weekday::Wed),
            ("Massachusetts Ave", Weekday::Thu),
        ]
        .into_iter()
        .map(|(name, day)| StreetEntry::uniform(name, &[day]))
        .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn similarity_matches_reference_ratios() {
        assert_close(similarity("abbot road", "abbott rd"), 16.0 / 19.0);
        assert_close(similarity("abbot road", "aaron road"), 0.7);
        assert_close(similarity("mass ave", "massachusetts ave"), 0.64);
        assert_close(similarity("abc", "abd"), 2.0 / 3.0);
        assert_close(similarity("abbott rd", "abbott rd"), 1.0);
        assert_close(similarity("", ""), 1.0);
        assert_close(similarity("abc", ""), 0.0);
    }

    #[test]
    fn similarity_is_order_sensitive_but_bounded() {
        let score = similarity("rd abbott", "abbott rd");
        assert!(score > 0.0 && score < 1.0, "partial overlap scores {score}");
    }

    #[test]
    fn exact_match() {
        let resolution = resolve("Abbott Rd", &directory(), DEFAULT_CUTOFF);
        assert_eq!(resolution.match_type, MatchType::Exact);
        assert_eq!(resolution.matched.as_deref(), Some("Abbott Rd"));
        assert_eq!(resolution.confidence, Some(1.0));
    }

    #[test]
    fn exact_match_ignores_case_and_whitespace() {
        let resolution = resolve("  abbott rd ", &directory(), DEFAULT_CUTOFF);
        assert_eq!(resolution.match_type, MatchType::Exact);
        assert_eq!(resolution.matched.as_deref(), Some("Abbott Rd"));
        assert_eq!(resolution.query, "  abbott rd ");
    }

    #[test]
    fn fuzzy_match_accepted() {
        let resolution = resolve("Abbot Road", &directory(), DEFAULT_CUTOFF);
        assert_eq!(resolution.match_type, MatchType::Fuzzy);
        assert_eq!(resolution.matched.as_deref(), Some("Abbott Rd"));
        let confidence = resolution.confidence.expect("fuzzy matches carry a score");
        assert!(confidence >= DEFAULT_CUTOFF, "confidence {confidence}");
        assert_close(confidence, 16.0 / 19.0);
    }

    #[test]
    fn fuzzy_match_rejected() {
        let resolution = resolve("Zzyzx Nonexistent Way", &directory(), DEFAULT_CUTOFF);
        assert_eq!(resolution.match_type, MatchType::Unmatched);
        assert!(!resolution.is_resolved(), "nothing should match");
        assert_eq!(resolution.confidence, None);
    }

    #[test]
    fn cutoff_is_a_hard_gate() {
        // "abbot road" scores 16/19 against "abbott rd"
        let strict = resolve("Abbot Road", &directory(), 0.9);
        assert_eq!(strict.match_type, MatchType::Unmatched);
    }

    #[test]
    fn empty_query_and_empty_directory_do_not_match() {
        assert_eq!(
            resolve("   ", &directory(), DEFAULT_CUTOFF).match_type,
            MatchType::Unmatched
        );
        assert_eq!(
            resolve("Abbott Rd", &Directory::new(), DEFAULT_CUTOFF).match_type,
            MatchType::Unmatched
        );
    }

    #[test]
    fn ties_go_to_directory_order() {
        // "oak st" scores 5/6 against both streets
        let first: Directory = [
            StreetEntry::uniform("Oak Sq", &[Weekday::Mon]),
            StreetEntry::uniform("Oak Pt", &[Weekday::Fri]),
        ]
        .into_iter()
        .collect();
        let second: Directory = [
            StreetEntry::uniform("Oak Pt", &[Weekday::Fri]),
            StreetEntry::uniform("Oak Sq", &[Weekday::Mon]),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            resolve("oak st", &first, DEFAULT_CUTOFF).matched.as_deref(),
            Some("Oak Sq")
        );
        assert_eq!(
            resolve("oak st", &second, DEFAULT_CUTOFF).matched.as_deref(),
            Some("Oak Pt")
        );
    }

    #[test]
    fn closest_matches_are_ranked() {
        let directory = directory();
        // "abbot road" scores 16/19 against "abbott rd" and 5/9 against "aaron rd"
        let names: Vec<&str> = closest_matches("Abbot Road", &directory, 0.5, 5)
            .into_iter()
            .map(|candidate| candidate.entry.name.as_str())
            .collect();
        assert_eq!(names, ["Abbott Rd", "Aaron Rd"]);

        let default_cutoff = closest_matches("Abbot Road", &directory, DEFAULT_CUTOFF, 5);
        assert_eq!(default_cutoff.len(), 1);

        let limited = closest_matches("Abbot Road", &directory, 0.5, 1);
        assert_eq!(limited.len(), 1);
        assert!(
            closest_matches("Abbot Road", &directory, DEFAULT_CUTOFF, 0).is_empty(),
            "limit 0 returns nothing"
        );
    }

    #[test]
    fn exact_match_ranks_first() {
        let directory = directory();
        let matches = closest_matches("aaron rd", &directory, DEFAULT_CUTOFF, 5);
        let first = matches.first().expect("exact street is listed");
        assert_eq!(first.entry.name, "Aaron Rd");
        assert_close(first.score, 1.0);
    }
}
