//! # Redactor
//!
//! Replaces every occurrence of a set of terms with a marker. Matching is
//! case-insensitive and anchored on word boundaries; a multi-word term
//! matches across any run of whitespace, so `Kate   Bue` and `Kate\nBue`
//! are both caught. Straight and curly apostrophes are interchangeable.
//!
//! Terms are tried longest first, so `Kate Bue` becomes one marker rather
//! than two. Terms that occur inside the marker itself are dropped, which
//! keeps redaction idempotent.

use std::collections::HashSet;

use regex::{NoExpand, Regex};

use scrub_core::{normalize_name, word_tokens};

/// A compiled set of redaction terms.
#[derive(Debug, Clone)]
pub struct Redactor {
    pattern: Option<Regex>,
    marker: String,
    terms: usize,
}

impl Redactor {
    /// Compile `terms` for replacement by `marker`. Blank and duplicate
    /// terms are ignored.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the combined pattern exceeds the regex
    /// engine's size limits.
    pub fn new<I, S>(terms: I, marker: &str) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let marker_norm = format!(" {} ", normalize_name(marker));
        let mut seen = HashSet::new();
        let mut kept: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim();
            let norm = normalize_name(term);
            if norm.is_empty() || marker_norm.contains(&format!(" {norm} ")) {
                continue;
            }
            if seen.insert(term.to_lowercase()) {
                kept.push(term.to_string());
            }
        }
        kept.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

        let alternatives: Vec<String> = kept.iter().filter_map(|t| term_pattern(t)).collect();
        let pattern = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))?)
        };
        Ok(Self {
            pattern,
            marker: marker.to_string(),
            terms: alternatives.len(),
        })
    }

    /// Number of distinct terms compiled.
    pub fn term_count(&self) -> usize {
        self.terms
    }

    /// Replace every term occurrence in `text`.
    pub fn redact(&self, text: &str) -> String {
        match &self.pattern {
            Some(re) => re.replace_all(text, NoExpand(&self.marker)).into_owned(),
            None => text.to_string(),
        }
    }

    /// Number of term occurrences in `text`.
    pub fn count_matches(&self, text: &str) -> usize {
        self.pattern
            .as_ref()
            .map_or(0, |re| re.find_iter(text).count())
    }
}

fn term_pattern(term: &str) -> Option<String> {
    let words: Vec<String> = term
        .split_whitespace()
        .map(|w| regex::escape(w).replace(['\'', '\u{2019}'], "['\u{2019}]"))
        .collect();
    if words.is_empty() {
        return None;
    }
    let body = words.join(r"\s+");
    let lead = if term.chars().next().is_some_and(char::is_alphanumeric) {
        r"\b"
    } else {
        ""
    };
    let trail = if term.chars().last().is_some_and(char::is_alphanumeric) {
        r"\b"
    } else {
        ""
    };
    Some(format!("{lead}{body}{trail}"))
}

/// Replace the byte ranges `spans` of `text` with `marker`. Spans must not
/// overlap; order does not matter.
pub fn redact_spans(text: &str, spans: &[(usize, usize)], marker: &str) -> String {
    let mut spans = spans.to_vec();
    spans.sort_unstable();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in spans {
        if start < cursor || end > text.len() || start > end {
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.push_str(marker);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Whether `word` is part of the marker text (e.g. `REDACTED` in
/// `[REDACTED]`).
pub fn is_marker_word(word: &str, marker: &str) -> bool {
    let norm = normalize_name(word);
    !norm.is_empty() && word_tokens(marker).iter().any(|t| t.normalized() == norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MARK: &str = "[REDACTED]";

    fn redactor(terms: &[&str]) -> Redactor {
        Redactor::new(terms.iter().copied(), MARK).unwrap()
    }

    #[test]
    fn case_insensitive_whole_words() {
        let r = redactor(&["John", "Smith"]);
        assert_eq!(
            r.redact("JOHN smith met Johnny Smithson."),
            "[REDACTED] [REDACTED] met Johnny Smithson."
        );
    }

    #[test]
    fn longest_term_wins() {
        let r = redactor(&["Kate", "Bue", "Kate Bue"]);
        assert_eq!(r.redact("By Kate  Bue, and Kate."), "By [REDACTED], and [REDACTED].");
    }

    #[test]
    fn multi_word_term_spans_line_breaks() {
        let r = redactor(&["Kate Bue"]);
        assert_eq!(r.redact("Kate\n  Bue"), MARK);
    }

    #[test]
    fn apostrophes_are_interchangeable() {
        let r = redactor(&["O'Neil"]);
        assert_eq!(r.redact("o\u{2019}neil and O'NEIL"), "[REDACTED] and [REDACTED]");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let r = redactor(&["A+ Student", "St. Mary"]);
        assert_eq!(r.redact("the A+ Student from St. Mary"), "the [REDACTED] from [REDACTED]");
        assert_eq!(r.redact("AA Student"), "AA Student");
    }

    #[test]
    fn marker_words_are_never_terms() {
        let r = redactor(&["Redacted", "Kate"]);
        assert_eq!(r.term_count(), 1);
        let once = r.redact("Kate redacted");
        assert_eq!(once, "[REDACTED] redacted");
        assert_eq!(r.redact(&once), once);
    }

    #[test]
    fn empty_terms_leave_text_alone() {
        let r = redactor(&["", "  "]);
        assert_eq!(r.term_count(), 0);
        assert_eq!(r.redact("Kate Bue"), "Kate Bue");
    }

    #[test]
    fn spans_are_replaced() {
        let text = "Kaitlyn Bue\nbody";
        assert_eq!(redact_spans(text, &[(8, 11), (0, 7)], MARK), "[REDACTED] [REDACTED]\nbody");
    }

    #[test]
    fn marker_word_detection() {
        assert!(is_marker_word("REDACTED", MARK));
        assert!(!is_marker_word("Kate", MARK));
    }

    proptest! {
        #[test]
        fn redaction_is_idempotent(
            text in "[A-Za-z .,\n]{0,80}",
            terms in proptest::collection::vec("[A-Za-z]{1,8}( [A-Za-z]{1,8})?", 0..5),
        ) {
            let r = Redactor::new(terms.iter(), MARK).unwrap();
            let once = r.redact(&text);
            prop_assert_eq!(r.redact(&once), once.clone());
            prop_assert_eq!(r.count_matches(&once), 0);
        }
    }
}
