//! Helvetica advance widths, in 1/1000 em.

/// Metrics for a standard (non-embedded) font.
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E.
    ascii: &'static [u16; 95],
    /// Widths for U+00A0..=U+00FF.
    latin1: &'static [u16; 96],
    /// WinAnsi characters from the 0x80..=0x9F block.
    specials: &'static [(char, u16)],
    /// Width of `?`, which replaces anything WinAnsi can't encode.
    default: u16,
}

impl StandardFontMetrics {
    /// Advance width of a single char in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let cp = ch as u32;
        let w = match cp {
            0x20..=0x7E => self.ascii[(cp - 0x20) as usize],
            0xA0..=0xFF => self.latin1[(cp - 0xA0) as usize],
            _ => self
                .specials
                .iter()
                .find(|(c, _)| *c == ch)
                .map_or(self.default, |&(_, w)| w),
        };
        w as f64 / 1000.0 * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

#[rustfmt::skip]
static HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space ../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,                               // 0-9
    278, 278, 584, 584, 584, 556, 1015,                                             // : ; < = > ? @
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,                // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,                // N-Z
    278, 278, 278, 469, 556, 333,                                                   // [ \ ] ^ _ `
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,                // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,                // n-z
    334, 260, 334, 584,                                                             // { | } ~
];

#[rustfmt::skip]
static HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp ¡ .. ¯
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // ° .. ¿
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // À .. Ï
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Ð .. ß
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // à .. ï
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // ð .. ÿ
];

static HELVETICA_SPECIALS: [(char, u16); 27] = [
    ('€', 556), ('‚', 222), ('ƒ', 556), ('„', 333), ('…', 1000), ('†', 556), ('‡', 556),
    ('ˆ', 333), ('‰', 1000), ('Š', 667), ('‹', 333), ('Œ', 1000), ('Ž', 611), ('‘', 222),
    ('’', 222), ('“', 333), ('”', 333), ('•', 350), ('–', 556), ('—', 1000), ('˜', 333),
    ('™', 1000), ('š', 500), ('›', 333), ('œ', 944), ('ž', 500), ('Ÿ', 667),
];

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: &HELVETICA_ASCII,
    latin1: &HELVETICA_LATIN1,
    specials: &HELVETICA_SPECIALS,
    default: 556,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space() {
        assert!((HELVETICA.char_width(' ', 12.0) - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_helvetica_digits_uniform() {
        let w0 = HELVETICA.char_width('0', 6.0);
        for d in '1'..='9' {
            assert_eq!(HELVETICA.char_width(d, 6.0), w0);
        }
    }

    #[test]
    fn test_latin1_widths() {
        let cases = [('é', 556), ('Ü', 722), ('À', 667), ('ß', 611), ('©', 737), ('°', 400), ('ÿ', 500)];
        for (ch, w) in cases {
            assert!((HELVETICA.char_width(ch, 10.0) - w as f64 / 100.0).abs() < 1e-9, "{}", ch);
        }
        assert!((HELVETICA.measure_string("Müller", 10.0, 0.0) - 27.22).abs() < 1e-9);
    }

    #[test]
    fn test_winansi_specials() {
        assert!((HELVETICA.char_width('—', 10.0) - 10.0).abs() < 1e-9);
        assert!((HELVETICA.char_width('’', 10.0) - 2.22).abs() < 1e-9);
        assert!((HELVETICA.char_width('€', 10.0) - 5.56).abs() < 1e-9);
    }

    #[test]
    fn test_non_ascii_uses_default_width() {
        assert!((HELVETICA.measure_string("ب", 10.0, 0.0) - 5.56).abs() < 1e-9);
        assert!((HELVETICA.measure_string("ab", 10.0, 1.0) - 13.12).abs() < 1e-9);
    }
}
