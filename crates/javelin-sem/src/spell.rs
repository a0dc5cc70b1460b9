//! Character-bag similarity for "did you mean" diagnostics.
//!
//! Scores two identifiers on a 0..=6 scale from the multiset of characters
//! they share, with a small bonus for matching first/last characters. The
//! acceptance threshold rises with length: very short names must match
//! almost exactly, long names tolerate a couple of stray characters.

use std::collections::HashMap;

/// Similarity index between 0 (nothing shared) and 6 (anagram or equal).
pub fn index(a: &str, b: &str) -> u32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 6;
    }

    let lower_a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let lower_b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();

    let mut bag: HashMap<char, usize> = HashMap::new();
    for &ch in &lower_a {
        *bag.entry(ch).or_default() += 1;
    }
    let mut common = 0usize;
    for &ch in &lower_b {
        if let Some(count) = bag.get_mut(&ch) {
            if *count > 0 {
                *count -= 1;
                common += 1;
            }
        }
    }

    let total = lower_a.len() + lower_b.len();
    let mut score = (6 * 2 * common / total) as u32;
    if score > 0 && lower_a.first() == lower_b.first() && lower_a.last() == lower_b.last() {
        score = (score + 1).min(6);
    }
    score
}

/// Whether `candidate` is plausibly a misspelling of `wanted`.
pub fn is_misspelling(wanted: &str, candidate: &str) -> bool {
    let len = wanted.chars().count().min(candidate.chars().count());
    let threshold = match len {
        0 => return false,
        1..=3 => 6,
        4..=5 => 5,
        _ => 4,
    };
    index(wanted, candidate) >= threshold
}

/// The best misspelling candidate from an iterator of names.
pub fn best_match<'a, I>(wanted: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(u32, &str)> = None;
    for candidate in candidates {
        if candidate == wanted || !is_misspelling(wanted, candidate) {
            continue;
        }
        let score = index(wanted, candidate);
        if best.map(|(b, _)| score > b).unwrap_or(true) {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, name)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpositions_score_high() {
        assert!(index("lenght", "length") >= 5);
        assert!(is_misspelling("lenght", "length"));
    }

    #[test]
    fn short_names_need_near_equality() {
        assert!(!is_misspelling("x", "y"));
        assert!(!is_misspelling("ab", "cd"));
    }

    #[test]
    fn unrelated_names_do_not_match() {
        assert!(!is_misspelling("counter", "deployment"));
    }

    #[test]
    fn picks_the_closest_candidate() {
        let candidates = ["length", "width", "lengthy"];
        assert_eq!(
            best_match("lenght", candidates.iter().copied()),
            Some("length".to_string())
        );
    }
}
