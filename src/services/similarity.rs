//! Fuzzy string scores on a 0–100 scale.
//!
//! `ratio` is the normalized Indel similarity from `rapidfuzz`:
//! `2 * LCS / (len_a + len_b)`. The other scores are built on top of it.

use std::collections::BTreeSet;

use rapidfuzz::fuzz;

/// Normalized Indel similarity of two strings, 0–100. Two empty strings score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    fuzz::ratio(a.iter().copied(), b.iter().copied()) * 100.0
}

/// Best `ratio` of the shorter string against any equally long window of the
/// longer one, including windows clipped at either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.len() == b.len() {
        return best_window(&a, &b).max(best_window(&b, &a));
    }
    if a.len() < b.len() {
        best_window(&a, &b)
    } else {
        best_window(&b, &a)
    }
}

fn best_window(short: &[char], long: &[char]) -> f64 {
    let n = short.len();
    let m = long.len();
    let mut best: f64 = 0.0;

    let windows = (1..n)
        .map(|end| &long[..end.min(m)])
        .chain((0..=m.saturating_sub(n)).map(|start| &long[start..start + n]))
        .chain((m.saturating_sub(n) + 1..m).map(|start| &long[start..]));

    for window in windows {
        best = best.max(ratio_chars(short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn tokens(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

/// `ratio` after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let mut ta = tokens(a);
    let mut tb = tokens(b);
    ta.sort_unstable();
    tb.sort_unstable();
    ratio(&ta.join(" "), &tb.join(" "))
}

/// Set-overlap comparison: the shared tokens are compared against each side's
/// shared-plus-remaining tokens and the best of the three pairings wins.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let sa: BTreeSet<&str> = tokens(a).into_iter().collect();
    let sb: BTreeSet<&str> = tokens(b).into_iter().collect();

    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }

    let sect: Vec<&str> = sa.intersection(&sb).copied().collect();
    let diff_ab: Vec<&str> = sa.difference(&sb).copied().collect();
    let diff_ba: Vec<&str> = sb.difference(&sa).copied().collect();

    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect = sect.join(" ");
    let combine = |diff: &[&str]| {
        let diff = diff.join(" ");
        if sect.is_empty() {
            diff
        } else if diff.is_empty() {
            sect.clone()
        } else {
            format!("{} {}", sect, diff)
        }
    };
    let sect_ab = combine(&diff_ab);
    let sect_ba = combine(&diff_ba);

    ratio(&sect, &sect_ab)
        .max(ratio(&sect, &sect_ba))
        .max(ratio(&sect_ab, &sect_ba))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ratio_matches_indel_similarity() {
        assert!(close(ratio("", ""), 100.0));
        assert!(close(ratio("abc", ""), 0.0));
        assert!(close(ratio("abc", "abc"), 100.0));
        // LCS("kitten","sitting") = 4 -> 2*4/13
        assert!(close(ratio("kitten", "sitting"), 800.0 / 13.0));
    }

    #[test]
    fn partial_ratio_finds_embedded_substring() {
        assert!(close(partial_ratio("bridge", "knights bridge watch"), 100.0));
        assert!(close(partial_ratio("watch", ""), 0.0));
        assert!(partial_ratio("bridge", "bridgx") < 100.0);
    }

    #[test]
    fn partial_ratio_scores_windows_clipped_at_the_edge() {
        // Best window is the clipped prefix "cd": LCS 2 over 4 + 2 chars
        assert!(close(partial_ratio("abcd", "cdxxxxxx"), 200.0 / 3.0));
        assert!(close(partial_ratio("cdxxxxxx", "abcd"), 200.0 / 3.0));
    }

    #[test]
    fn token_set_takes_the_best_of_three_pairings() {
        // "bridge knights coat" vs "bridge knights watch": LCS 17 over 39 chars
        let score = token_set_ratio("knights bridge coat", "knights bridge watch");
        assert!(close(score, 3400.0 / 39.0), "got {}", score);
        assert!(score > ratio("bridge knights", "bridge knights coat"));
    }

    #[test]
    fn token_sort_ignores_order() {
        assert!(close(
            token_sort_ratio("watch knights bridge", "knights bridge watch"),
            100.0
        ));
    }

    #[test]
    fn token_set_handles_subsets_and_disjoint_sets() {
        assert!(close(
            token_set_ratio("knights bridge", "knights bridge leather watch"),
            100.0
        ));
        assert!(close(token_set_ratio("", "watch"), 0.0));
        // No shared tokens: only the full strings are compared
        assert!(close(token_set_ratio("abc", "abd"), ratio("abc", "abd")));
    }

    #[test]
    fn scores_stay_in_range() {
        let pairs = [
            ("knights bridge watch", "oxford loafer"),
            ("a", "aaaaaaaa"),
            ("coat", "coat"),
        ];
        for (a, b) in pairs {
            for score in [
                ratio(a, b),
                partial_ratio(a, b),
                token_sort_ratio(a, b),
                token_set_ratio(a, b),
            ] {
                assert!((0.0..=100.0).contains(&score), "{} vs {} -> {}", a, b, score);
            }
        }
    }
}
