//! # Arabic Contextual Reshaping
//!
//! Replaces Arabic letters with their positional presentation forms
//! (isolated, final, initial, medial) so a renderer that places one glyph
//! per codepoint, left to right, still draws connected script.
//!
//! Joining follows the Unicode joining types: dual-joining letters connect
//! on both sides, right-joining letters only to the preceding letter, and
//! harakat are transparent (skipped when looking for neighbours). Lam
//! followed by an alef variant collapses into a single ligature.

use unicode_script::{Script, UnicodeScript};

/// Unicode joining behaviour of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joining {
    /// Joins on both sides.
    Dual,
    /// Joins only to the preceding letter.
    Right,
    /// Tatweel: forces joining on both sides but has no forms of its own.
    Causing,
    /// Combining marks, skipped when finding neighbours.
    Transparent,
    /// Everything else breaks the joining chain.
    None,
}

/// Presentation forms: (isolated, final, initial, medial).
/// Right-joining letters have no initial/medial form.
type Forms = (char, char, Option<char>, Option<char>);

fn forms(ch: char) -> Option<Forms> {
    let d = |iso: u32| {
        // Forms-B dual-joining letters occupy four consecutive codepoints.
        let c = |off: u32| char::from_u32(iso + off).unwrap_or(ch);
        (c(0), c(1), Some(c(2)), Some(c(3)))
    };
    let r = |iso: u32| {
        let c = |off: u32| char::from_u32(iso + off).unwrap_or(ch);
        (c(0), c(1), None, None)
    };
    let f = match ch {
        '\u{0621}' => ('\u{FE80}', '\u{FE80}', None, None),
        '\u{0622}' => r(0xFE81),
        '\u{0623}' => r(0xFE83),
        '\u{0624}' => r(0xFE85),
        '\u{0625}' => r(0xFE87),
        '\u{0626}' => d(0xFE89),
        '\u{0627}' => r(0xFE8D),
        '\u{0628}' => d(0xFE8F),
        '\u{0629}' => r(0xFE93),
        '\u{062A}' => d(0xFE95),
        '\u{062B}' => d(0xFE99),
        '\u{062C}' => d(0xFE9D),
        '\u{062D}' => d(0xFEA1),
        '\u{062E}' => d(0xFEA5),
        '\u{062F}' => r(0xFEA9),
        '\u{0630}' => r(0xFEAB),
        '\u{0631}' => r(0xFEAD),
        '\u{0632}' => r(0xFEAF),
        '\u{0633}' => d(0xFEB1),
        '\u{0634}' => d(0xFEB5),
        '\u{0635}' => d(0xFEB9),
        '\u{0636}' => d(0xFEBD),
        '\u{0637}' => d(0xFEC1),
        '\u{0638}' => d(0xFEC5),
        '\u{0639}' => d(0xFEC9),
        '\u{063A}' => d(0xFECD),
        '\u{0641}' => d(0xFED1),
        '\u{0642}' => d(0xFED5),
        '\u{0643}' => d(0xFED9),
        '\u{0644}' => d(0xFEDD),
        '\u{0645}' => d(0xFEE1),
        '\u{0646}' => d(0xFEE5),
        '\u{0647}' => d(0xFEE9),
        '\u{0648}' => r(0xFEED),
        '\u{0649}' => ('\u{FEEF}', '\u{FEF0}', Some('\u{FBE8}'), Some('\u{FBE9}')),
        '\u{064A}' => d(0xFEF1),
        '\u{0671}' => r(0xFB50),
        '\u{067E}' => d(0xFB56),
        '\u{0686}' => d(0xFB7A),
        '\u{0698}' => r(0xFB8A),
        '\u{06A9}' => d(0xFB8E),
        '\u{06AF}' => d(0xFB92),
        '\u{06CC}' => d(0xFBFC),
        _ => return None,
    };
    Some(f)
}

fn joining(ch: char) -> Joining {
    if ch == '\u{0640}' {
        return Joining::Causing;
    }
    if is_haraka(ch) {
        return Joining::Transparent;
    }
    match forms(ch) {
        Some((_, _, Some(_), _)) => Joining::Dual,
        Some((iso, fin, None, _)) if iso != fin => Joining::Right,
        _ => Joining::None,
    }
}

fn is_haraka(ch: char) -> bool {
    matches!(ch,
        '\u{0610}'..='\u{061A}' |
        '\u{064B}'..='\u{065F}' |
        '\u{0670}' |
        '\u{06D6}'..='\u{06DC}' |
        '\u{06DF}'..='\u{06E4}' |
        '\u{06E7}' | '\u{06E8}' |
        '\u{06EA}'..='\u{06ED}'
    )
}

/// Lam-alef ligature as (isolated, final) for the alef variant that follows lam.
fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

/// True if any character needs contextual reshaping.
pub fn needs_reshaping(text: &str) -> bool {
    text.chars().any(|ch| ch.script() == Script::Arabic && forms(ch).is_some())
}

/// Index of the nearest non-transparent char before `i`.
fn prev_solid(chars: &[char], i: usize) -> Option<usize> {
    (0..i).rev().find(|&j| joining(chars[j]) != Joining::Transparent)
}

/// Index of the nearest non-transparent char after `i`.
fn next_solid(chars: &[char], i: usize) -> Option<usize> {
    (i + 1..chars.len()).find(|&j| joining(chars[j]) != Joining::Transparent)
}

/// Reshape logical-order text. Non-Arabic characters pass through untouched,
/// so the result has the same length except where lam-alef ligatures form.
pub fn reshape(text: &str) -> String {
    if !needs_reshaping(text) {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let kind = joining(ch);
        if !matches!(kind, Joining::Dual | Joining::Right) {
            out.push(ch);
            i += 1;
            continue;
        }

        let joins_prev = prev_solid(&chars, i)
            .map(|j| matches!(joining(chars[j]), Joining::Dual | Joining::Causing))
            .unwrap_or(false);
        let next = next_solid(&chars, i);

        if ch == '\u{0644}' {
            if let Some(j) = next {
                if let Some((iso, fin)) = lam_alef(chars[j]) {
                    out.push(if joins_prev { fin } else { iso });
                    // Marks between lam and alef stay, after the ligature.
                    out.extend(&chars[i + 1..j]);
                    i = j + 1;
                    continue;
                }
            }
        }

        let joins_next = kind == Joining::Dual
            && next
                .map(|j| {
                    matches!(
                        joining(chars[j]),
                        Joining::Dual | Joining::Right | Joining::Causing
                    )
                })
                .unwrap_or(false);

        let (iso, fin, ini, med) = match forms(ch) {
            Some(f) => f,
            None => {
                out.push(ch);
                i += 1;
                continue;
            }
        };
        let shaped = match (joins_prev, joins_next) {
            (true, true) => med.unwrap_or(fin),
            (true, false) => fin,
            (false, true) => ini.unwrap_or(iso),
            (false, false) => iso,
        };
        out.push(shaped);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_untouched() {
        assert_eq!(reshape("Hello, World 123"), "Hello, World 123");
        assert!(!needs_reshaping("Hello"));
    }

    #[test]
    fn test_single_letter_isolated() {
        assert_eq!(reshape("\u{0628}"), "\u{FE8F}");
    }

    #[test]
    fn test_two_dual_letters() {
        // beh + teh: initial beh, final teh
        assert_eq!(reshape("\u{0628}\u{062A}"), "\u{FE91}\u{FE96}");
    }

    #[test]
    fn test_medial_form() {
        // beh beh beh: initial, medial, final
        assert_eq!(
            reshape("\u{0628}\u{0628}\u{0628}"),
            "\u{FE91}\u{FE92}\u{FE90}"
        );
    }

    #[test]
    fn test_right_joining_breaks_chain() {
        // dal does not join forward: beh-dal-beh → initial beh, final dal, isolated beh
        assert_eq!(
            reshape("\u{0628}\u{062F}\u{0628}"),
            "\u{FE91}\u{FEAA}\u{FE8F}"
        );
    }

    #[test]
    fn test_lam_alef_ligature() {
        assert_eq!(reshape("\u{0644}\u{0627}"), "\u{FEFB}");
        // beh + lam-alef: lam-alef joins the preceding beh
        assert_eq!(reshape("\u{0628}\u{0644}\u{0627}"), "\u{FE91}\u{FEFC}");
    }

    #[test]
    fn test_harakat_are_transparent() {
        // beh + fatha + teh still joins across the mark
        assert_eq!(
            reshape("\u{0628}\u{064E}\u{062A}"),
            "\u{FE91}\u{064E}\u{FE96}"
        );
    }

    #[test]
    fn test_words_separated_by_space() {
        let shaped = reshape("\u{0628}\u{062A} \u{0628}\u{062A}");
        assert_eq!(shaped, "\u{FE91}\u{FE96} \u{FE91}\u{FE96}");
    }

    #[test]
    fn test_persian_letters() {
        // peh + gaf
        assert_eq!(reshape("\u{067E}\u{06AF}"), "\u{FB58}\u{FB93}");
    }
}
