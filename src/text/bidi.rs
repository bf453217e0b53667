//! # BiDi Text Support
//!
//! UAX#9 display ordering for mixed LTR/RTL lines, on top of
//! `unicode-bidi`.
//!
//! The output is the character sequence a plain left-to-right text operator
//! must receive: right-to-left runs are reversed in place and paired
//! brackets inside them are mirrored.

use serde::{Deserialize, Serialize};
use unicode_bidi::{bidi_class, BidiClass, BidiInfo, Level};

/// Paragraph base direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
    /// Detect from the first strong character.
    #[default]
    Auto,
}

/// True when nothing in `text` can start a right-to-left run, so display
/// order equals logical order.
pub fn is_pure_ltr(text: &str, direction: Direction) -> bool {
    direction != Direction::Rtl && !text.chars().any(is_rtl_char)
}

fn is_rtl_char(ch: char) -> bool {
    use BidiClass::*;
    matches!(bidi_class(ch), R | AL | AN | RLE | RLO | RLI)
}

/// Mirror image of a bracket-like character, for display inside RTL runs.
fn mirror(ch: char) -> char {
    match ch {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        '‹' => '›',
        '›' => '‹',
        _ => ch,
    }
}

/// Reorder a single line of logical-order text into display order.
///
/// Newlines are not expected here; callers split paragraphs first.
pub fn visual_order(text: &str, direction: Direction) -> String {
    if text.is_empty() || is_pure_ltr(text, direction) {
        return text.to_string();
    }

    let para_level = match direction {
        Direction::Ltr => Some(Level::ltr()),
        Direction::Rtl => Some(Level::rtl()),
        Direction::Auto => None, // BidiInfo will auto-detect
    };

    let bidi_info = BidiInfo::new(text, para_level);
    let mut out = String::with_capacity(text.len());

    for para in &bidi_info.paragraphs {
        let line = para.range.clone();
        let (levels, runs) = bidi_info.visual_runs(para, line);
        for run in runs {
            let segment = &text[run.clone()];
            if levels[run.start].is_rtl() {
                for ch in segment.chars().rev() {
                    out.push(mirror(ch));
                }
            } else {
                out.push_str(segment);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_ltr() {
        assert!(is_pure_ltr("Hello World", Direction::Ltr));
        assert!(is_pure_ltr("Hello World", Direction::Auto));
        assert!(!is_pure_ltr("Hello World", Direction::Rtl));
    }

    #[test]
    fn test_rtl_detection() {
        assert!(!is_pure_ltr("مرحبا", Direction::Ltr));
        assert!(!is_pure_ltr("שלום", Direction::Ltr));
    }

    #[test]
    fn test_ltr_unchanged() {
        assert_eq!(visual_order("Hello (World)", Direction::Auto), "Hello (World)");
        assert_eq!(visual_order("", Direction::Auto), "");
    }

    #[test]
    fn test_pure_rtl_reversed() {
        assert_eq!(visual_order("שלום", Direction::Auto), "םולש");
    }

    #[test]
    fn test_rtl_brackets_mirrored() {
        // Logical "א(ב)" displays as "(ב)א" reversed with mirrored parens.
        assert_eq!(visual_order("א(ב)", Direction::Auto), "(ב)א");
    }

    #[test]
    fn test_numbers_keep_order_inside_rtl() {
        // Digits are a weak LTR run and must not be reversed.
        let display = visual_order("שלום 123", Direction::Auto);
        assert_eq!(display, "123 םולש");
    }

    #[test]
    fn test_ltr_paragraph_with_rtl_word() {
        let display = visual_order("abc שלום def", Direction::Auto);
        assert_eq!(display, "abc םולש def");
    }

    #[test]
    fn test_arabic_digits_count_as_rtl() {
        assert!(!is_pure_ltr("٣", Direction::Auto));
        assert!(is_pure_ltr("3", Direction::Auto));
    }
}
