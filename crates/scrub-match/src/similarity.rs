//! # Name Similarity
//!
//! The fuzzy matcher compares name fragments through a
//! [`SimilarityStrategy`], so the metric can be swapped without touching
//! candidate scoring. The default, [`EditDistanceSoundex`], combines a
//! Levenshtein ratio with American Soundex codes.
//!
//! Inputs are expected to be normalized (see `scrub_core::normalize_name`).

/// A pluggable name-similarity metric.
pub trait SimilarityStrategy: Send + Sync {
    /// Similarity ratio in `[0, 1]`; `1.0` means identical. Must be
    /// symmetric.
    fn ratio(&self, a: &str, b: &str) -> f64;

    /// Whether the two fragments sound alike.
    fn phonetic_match(&self, a: &str, b: &str) -> bool;

    /// Short identifier for logging.
    fn name(&self) -> &'static str;
}

/// Levenshtein ratio plus Soundex phonetic equivalence.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistanceSoundex;

impl SimilarityStrategy for EditDistanceSoundex {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        levenshtein_ratio(a, b)
    }

    fn phonetic_match(&self, a: &str, b: &str) -> bool {
        match (soundex(a), soundex(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        "edit_distance_soundex"
    }
}

/// Levenshtein distance in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `1 - distance / longer length`. Two empty strings are identical.
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// American Soundex code, or `None` if `s` has no ASCII letters.
///
/// Vowels and `h`/`w`/`y` separate equal codes, so `Jonn` and `John` both
/// code to `J500`.
pub fn soundex(s: &str) -> Option<String> {
    let mut chars = s.chars().filter(|c| c.is_ascii_alphabetic());
    let first = chars.next()?.to_ascii_uppercase();

    let code = |c: char| -> Option<char> {
        match c.to_ascii_uppercase() {
            'B' | 'F' | 'P' | 'V' => Some('1'),
            'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
            'D' | 'T' => Some('3'),
            'L' => Some('4'),
            'M' | 'N' => Some('5'),
            'R' => Some('6'),
            _ => None,
        }
    };

    let mut result = String::with_capacity(4);
    result.push(first);
    let mut last_code = code(first);
    for c in chars {
        if result.len() >= 4 {
            break;
        }
        let current = code(c);
        if let Some(digit) = current {
            if current != last_code {
                result.push(digit);
            }
        }
        last_code = current;
    }
    while result.len() < 4 {
        result.push('0');
    }
    Some(result)
}
