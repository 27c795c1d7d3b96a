//! # Name Normalization and Tokenization
//!
//! Every comparison between document text and the roster goes through
//! [`normalize_name`]: lowercase, punctuation stripped, whitespace
//! collapsed. `O'Brien`, `o’brien` and `OBRIEN` all normalize to `obrien`.
//!
//! [`word_tokens`] splits free text into word tokens with byte spans, so
//! callers can map a matched token back to its position in the document.

use serde::{Deserialize, Serialize};

/// Normalize a name or name fragment for comparison.
///
/// Case-folds, drops every character that is neither alphanumeric nor
/// whitespace, and collapses whitespace runs to a single space.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if !ch.is_alphanumeric() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(ch.to_lowercase().filter(|c| c.is_alphanumeric()));
    }
    out
}

/// A word token within a line of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token exactly as written.
    pub text: String,
    /// Byte offset of the first character within the source string.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    /// The normalized form of this token.
    pub fn normalized(&self) -> String {
        normalize_name(&self.text)
    }

    /// Whether the token starts with an uppercase letter.
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }

    /// Whether the token is made only of letters (apostrophes and hyphens
    /// inside the word are allowed).
    pub fn is_alphabetic(&self) -> bool {
        self.text
            .chars()
            .all(|c| c.is_alphabetic() || is_joiner(c))
    }

    /// Whether the token is made only of digits.
    pub fn is_numeric(&self) -> bool {
        self.text.chars().all(|c| c.is_ascii_digit())
    }
}

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

/// Split text into word tokens.
///
/// A token is a maximal run of alphanumeric characters, optionally joined
/// by a single apostrophe or hyphen (`O'Brien`, `Mary-Jane`). Trailing
/// joiners are not part of the token.
pub fn word_tokens(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut last_alnum_end = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch.is_alphanumeric() {
            if start.is_none() {
                start = Some(idx);
            }
            last_alnum_end = idx + ch.len_utf8();
            continue;
        }
        let continues = is_joiner(ch)
            && start.is_some()
            && chars.peek().is_some_and(|(_, next)| next.is_alphanumeric());
        if continues {
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(Token {
                text: text[s..last_alnum_end].to_string(),
                start: s,
                end: last_alnum_end,
            });
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: text[s..last_alnum_end].to_string(),
            start: s,
            end: last_alnum_end,
        });
    }
    tokens
}

/// Split a personal name into `(first, last)`.
///
/// Accepts `"Last, First [Middle]"` and `"First [Middle] Last"`. Returns
/// `None` when the name does not contain both parts.
pub fn split_full_name(raw: &str) -> Option<(String, String)> {
    if let Some((last, first)) = raw.split_once(',') {
        let first = collapse(first);
        let last = collapse(last);
        if first.is_empty() || last.is_empty() {
            return None;
        }
        return Some((first, last));
    }
    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let (last, first) = parts.split_last()?;
    Some((first.join(" "), (*last).to_string()))
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First line of `text` that contains at least one word token, with its
/// zero-based line index.
pub fn first_non_empty_line(text: &str) -> Option<(usize, &str)> {
    text.lines()
        .enumerate()
        .find(|(_, line)| line.chars().any(char::is_alphanumeric))
}
