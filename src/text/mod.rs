//! # Text Shaping
//!
//! Turns logical-order text into the display-order string a straight
//! left-to-right text operator can draw:
//!
//! ```text
//! logical text
//!      ↓
//!  [arabic]  — contextual forms + lam-alef ligatures
//!      ↓
//!  [bidi]    — UAX#9 visual reordering, bracket mirroring
//!      ↓
//! display text
//! ```
//!
//! Shaping is pure: no font or page state is involved. Width measurement
//! of the result lives in [`shaping`] and [`crate::font`].

pub mod arabic;
pub mod bidi;
pub mod shaping;

pub use bidi::Direction;

/// Shape logical text for display with an auto-detected base direction.
pub fn shape(text: &str) -> String {
    shape_with_direction(text, Direction::Auto)
}

/// Shape logical text for display. Each line is shaped independently.
pub fn shape_with_direction(text: &str, direction: Direction) -> String {
    if text.is_empty() {
        return String::new();
    }
    text.split('\n')
        .map(|line| bidi::visual_order(&arabic::reshape(line), direction))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(shape(""), "");
    }

    #[test]
    fn test_ascii_idempotent() {
        for s in ["Hello", "A (b) [c] 12.5%", "  spaced  ", "x\ny"] {
            let once = shape(s);
            assert_eq!(once, s);
            assert_eq!(shape(&once), once);
        }
    }

    #[test]
    fn test_hebrew_keeps_codepoint_count() {
        let input = "שלום עולם";
        let out = shape(input);
        assert_eq!(out.chars().count(), input.chars().count());
        assert_eq!(out, "םלוע םולש");
    }

    #[test]
    fn test_arabic_reshaped_and_reversed() {
        // "بت" → initial beh, final teh, then reversed for display
        let out = shape("\u{0628}\u{062A}");
        assert_eq!(out, "\u{FE96}\u{FE91}");
    }

    #[test]
    fn test_arabic_name_with_latin_identifier() {
        let out = shape("\u{0628}\u{062A} ab12");
        // The Latin run stays in logical order on the left of the RTL word.
        assert!(out.starts_with("ab12"), "got {:?}", out);
        assert!(out.ends_with("\u{FE96}\u{FE91}"));
    }

    #[test]
    fn test_multiline() {
        assert_eq!(shape("שלום\nabc"), "םולש\nabc");
    }
}
