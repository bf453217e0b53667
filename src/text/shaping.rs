//! # OpenType Shaping
//!
//! Runs rustybuzz over display-order text for embedded TrueType fonts, so
//! widths and glyph ids include kerning and ligatures. The standard
//! Helvetica face has no font program and is never shaped.

/// One output glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// Byte offset of the first source character mapped to this glyph.
    pub cluster: u32,
    /// Advance in font units.
    pub x_advance: i32,
}

/// A shaped line of text in the font's own units.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub glyphs: Vec<ShapedGlyph>,
    pub units_per_em: u16,
}

impl GlyphRun {
    /// Total advance in points.
    pub fn width(&self, font_size: f64) -> f64 {
        let advance: i64 = self.glyphs.iter().map(|g| i64::from(g.x_advance)).sum();
        advance as f64 * font_size / f64::from(self.units_per_em.max(1))
    }

    /// The source character each glyph starts at.
    pub fn source_chars<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (u16, Option<char>)> + 'a {
        self.glyphs.iter().map(move |g| {
            let ch = text.get(g.cluster as usize..).and_then(|s| s.chars().next());
            (g.glyph_id, ch)
        })
    }
}

/// Shape `text` left to right. The input is already in display order, so
/// the shaper must not reorder it again. `None` if the face can't be parsed.
pub fn shape_run(text: &str, font_data: &[u8]) -> Option<GlyphRun> {
    let face = rustybuzz::Face::from_slice(font_data, 0)?;
    let units_per_em = u16::try_from(face.units_per_em()).unwrap_or(1000);

    let mut buffer = rustybuzz::UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.set_direction(rustybuzz::Direction::LeftToRight);
    let output = rustybuzz::shape(&face, &[], buffer);

    let glyphs = output
        .glyph_infos()
        .iter()
        .zip(output.glyph_positions())
        .map(|(info, pos)| ShapedGlyph {
            glyph_id: info.glyph_id as u16,
            cluster: info.cluster,
            x_advance: pos.x_advance,
        })
        .collect();

    Some(GlyphRun { glyphs, units_per_em })
}

/// Width of `text` in points, or `None` if the face can't be shaped.
pub fn measure(text: &str, font_data: &[u8], font_size: f64) -> Option<f64> {
    if text.is_empty() {
        return Some(0.0);
    }
    shape_run(text, font_data).map(|run| run.width(font_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(advances: &[i32], upem: u16) -> GlyphRun {
        GlyphRun {
            glyphs: advances
                .iter()
                .enumerate()
                .map(|(i, &x_advance)| ShapedGlyph {
                    glyph_id: i as u16 + 1,
                    cluster: i as u32,
                    x_advance,
                })
                .collect(),
            units_per_em: upem,
        }
    }

    #[test]
    fn test_garbage_font() {
        assert!(shape_run("Hello", &[0, 1, 2, 3]).is_none());
        assert!(measure("Hello", &[0, 1, 2, 3], 12.0).is_none());
    }

    #[test]
    fn test_empty_text_needs_no_font() {
        assert_eq!(measure("", &[], 12.0), Some(0.0));
    }

    #[test]
    fn test_width_scales_by_em() {
        assert!((run(&[500, 600], 1000).width(10.0) - 11.0).abs() < 1e-9);
        assert!((run(&[1024], 2048).width(20.0) - 10.0).abs() < 1e-9);
        assert_eq!(run(&[], 1000).width(12.0), 0.0);
    }

    #[test]
    fn test_source_chars_follow_byte_clusters() {
        let text = "aب";
        let glyphs = GlyphRun {
            glyphs: vec![
                ShapedGlyph { glyph_id: 7, cluster: 0, x_advance: 1 },
                ShapedGlyph { glyph_id: 9, cluster: 1, x_advance: 1 },
                ShapedGlyph { glyph_id: 3, cluster: 99, x_advance: 1 },
            ],
            units_per_em: 1000,
        };
        let chars: Vec<_> = glyphs.source_chars(text).collect();
        assert_eq!(chars, vec![(7, Some('a')), (9, Some('ب')), (3, None)]);
    }
}
