//! Text normalization shared by the question map and incoming survey headers.
//!
//! Survey exports routinely carry encoding noise: decomposed accents, zero-width
//! joiners pasted from web forms, non-breaking spaces, doubled spaces. The same
//! normalization is applied to both sides of every lookup so that noise never
//! decides whether a question matches.

use unicode_normalization::UnicodeNormalization;

/// Canonical form of a piece of survey text.
///
/// Strips invisible format/control characters, applies Unicode NFC, collapses
/// every whitespace run to a single space and trims. Idempotent.
pub fn normalize_text(input: &str) -> String {
    let visible: String = input.chars().filter(|c| !is_invisible(*c)).collect();
    let composed: String = visible.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key: `normalize_text` plus lowercasing.
pub fn match_key(input: &str) -> String {
    normalize_text(input).to_lowercase()
}

/// Every code point of general category `Cf` (format), plus control characters
/// other than whitespace.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
    ) || (c.is_control() && !c.is_whitespace())
}

/// Returns the leading question-ID token of a header, if it has one.
///
/// `"Q12. I trust my peers"` → `Some("Q12")`, `"q3 - Purpose"` → `Some("q3")`.
/// A question ID is a `Q` followed by at least one digit, optionally followed by
/// more alphanumerics (`Q4a`), terminated by a separator or the end of input.
pub fn question_id_prefix(header: &str) -> Option<&str> {
    let header = header.trim_start();
    let mut chars = header.char_indices();
    match chars.next() {
        Some((_, 'Q' | 'q')) => {}
        _ => return None,
    }
    match chars.next() {
        Some((_, c)) if c.is_ascii_digit() => {}
        _ => return None,
    }
    let end = header
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric() && *c != '_')
        .map(|(i, _)| i)
        .unwrap_or(header.len());
    Some(&header[..end])
}
