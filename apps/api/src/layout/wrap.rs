//! Greedy word wrap inside a fixed width.

use crate::layout::font_metrics::FontMetricTable;

/// Wraps `text` into lines no wider than `max_width_pt` at `font_size_pt`.
///
/// Whitespace runs collapse to one space. A word wider than the whole line is
/// hard-broken at character boundaries. An empty string returns no lines.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    font_size_pt: f32,
    max_width_pt: f32,
) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![];
    }

    // Work in em units so the comparison matches `measure_str`.
    let max_width = (max_width_pt / font_size_pt).max(0.0);
    let space_w = metrics.space_width;

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in words {
        let word_w = metrics.measure_str(word);

        if word_w > max_width {
            // Flush, then split the oversized word into full-width pieces.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = hard_break(word, metrics, max_width);
            let last = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            current_width = metrics.measure_str(&last);
            current = last;
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + space_w + word_w > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += space_w + word_w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Splits a single word into pieces that each fit `max_width` em. Every piece
/// holds at least one character so the loop always advances.
fn hard_break(word: &str, metrics: &FontMetricTable, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;
    for c in word.chars() {
        let w = metrics.char_width(c);
        if !piece.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{get_metrics, PdfFont};

    fn helvetica() -> &'static FontMetricTable {
        get_metrics(PdfFont::Helvetica)
    }

    #[test]
    fn test_wrap_empty_returns_no_lines() {
        assert!(wrap_text("   ", helvetica(), 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_short_text_is_one_line() {
        let lines = wrap_text("Peers keep commitments.", helvetica(), 9.5, 244.0);
        assert_eq!(lines, vec!["Peers keep commitments."]);
    }

    #[test]
    fn test_long_note_wraps_within_column() {
        let note = "Leaders describe a shared commitment to the strategy, yet disagreements \
                    are settled offline and rarely revisited in the room, which slows decisions \
                    and leaves execution risks unspoken until they surface as missed milestones.";
        let width = 260.0 - 16.0;
        let lines = wrap_text(note, helvetica(), 9.5, width);
        assert!(lines.len() >= 3);
        for line in &lines {
            assert!(helvetica().width_pt(line, 9.5) <= width + 1e-3, "overflow: {line}");
        }
        assert_eq!(lines.join(" "), note.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_overlong_word_is_hard_broken() {
        let word = "Supercalifragilisticexpialidocious-Transformation-Programme";
        let lines = wrap_text(&format!("See {word} now"), helvetica(), 10.0, 80.0);
        assert!(lines.len() > 2);
        for line in &lines {
            assert!(helvetica().width_pt(line, 10.0) <= 80.0 + 1e-3, "overflow: {line}");
        }
        assert_eq!(lines.concat().replace(' ', ""), format!("See{word}now"));
    }

    #[test]
    fn test_zero_width_still_advances() {
        let lines = wrap_text("abc", helvetica(), 10.0, 0.0);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }
}
