//! Fuzzy match scoring
//!
//! Scores are `<= 0`; `0` is an exact match and every deviation costs
//! points. Matching is case-insensitive. Each whitespace-separated query term
//! must match on its own and the term scores are summed.

/// Penalty for each break between matched characters
pub const GAP_PENALTY: i64 = 20;

/// Score `query` against `target`, `None` when some term does not match
pub fn fuzzy_score(query: &str, target: &str) -> Option<i64> {
    let terms: Vec<Vec<char>> = query
        .split_whitespace()
        .map(|term| term.to_lowercase().chars().collect())
        .collect();
    if terms.is_empty() {
        return None;
    }

    let target: Vec<char> = target.to_lowercase().chars().collect();
    terms
        .iter()
        .map(|term| score_term(term, &target))
        .sum()
}

fn score_term(term: &[char], target: &[char]) -> Option<i64> {
    if term.len() > target.len() {
        return None;
    }
    let unmatched = (target.len() - term.len()) as i64;

    // Contiguous match: only the start offset and the leftover length cost
    if let Some(start) = target.windows(term.len()).position(|window| window == term) {
        return Some(-(start as i64) - unmatched);
    }

    // Subsequence match, greedy from the left
    let mut positions = Vec::with_capacity(term.len());
    let mut cursor = 0;
    for ch in term {
        let offset = target[cursor..].iter().position(|c| c == ch)?;
        positions.push(cursor + offset);
        cursor += offset + 1;
    }

    let gaps = positions
        .windows(2)
        .filter(|pair| pair[1] != pair[0] + 1)
        .count() as i64;

    Some(-(positions[0] as i64) - gaps * GAP_PENALTY - unmatched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_zero() {
        assert_eq!(fuzzy_score("Rust", "rust"), Some(0));
    }

    #[test]
    fn test_prefix_beats_infix() {
        let prefix = fuzzy_score("rust", "rust book").unwrap();
        let infix = fuzzy_score("rust", "the rust b").unwrap();
        assert!(prefix > infix);
    }

    #[test]
    fn test_substring_beats_subsequence() {
        let substring = fuzzy_score("own", "ownership").unwrap();
        let subsequence = fuzzy_score("osp", "ownership").unwrap();
        assert!(substring > subsequence);
        assert_eq!(subsequence, -2 * GAP_PENALTY - 6);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(fuzzy_score("xyz", "ownership"), None);
        assert_eq!(fuzzy_score("ownerships", "ownership"), None);
        assert_eq!(fuzzy_score("   ", "ownership"), None);
    }

    #[test]
    fn test_every_term_must_match() {
        assert!(fuzzy_score("rust book", "the rust book").is_some());
        assert_eq!(fuzzy_score("rust cookbook", "the rust book"), None);
    }

    #[test]
    fn test_scores_are_never_positive() {
        for (query, target) in [("a", "a"), ("ab", "xaxb"), ("rust", "trust me")] {
            assert!(fuzzy_score(query, target).unwrap() <= 0);
        }
    }
}
