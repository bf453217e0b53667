//! # Font Management
//!
//! Loading and measuring fonts for the overlay and grid renderers.
//!
//! Fonts are registered once at process start into a [`FontContext`], which
//! is immutable afterwards and shared by reference across concurrent renders.
//! Lookups that miss fall back to the standard Helvetica face, which needs no
//! embedding but can only draw WinAnsi text.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;
use crate::text::shaping;

/// Registered faces keyed by family and weight.
#[derive(Debug)]
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
}

impl FontKey {
    pub fn new(family: &str, weight: u32) -> Self {
        Self {
            family: family.to_string(),
            weight,
        }
    }

    pub fn helvetica() -> Self {
        Self::new("Helvetica", 400)
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// Standard face, referenced by name only.
    Standard(StandardFont),
    /// TrueType program embedded into the output.
    Custom { data: Vec<u8>, metrics: CustomFontMetrics },
}

/// Per-character glyph ids and advances of an embedded face.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    /// `char → glyph id`, from the face's Unicode cmap subtables.
    pub glyph_ids: HashMap<char, u16>,
    advances: HashMap<u16, u16>,
    missing_advance: u16,
}

impl CustomFontMetrics {
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let cmap = face.tables().cmap?;

        let mut glyph_ids = HashMap::new();
        for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
            subtable.codepoints(|cp| {
                let Some(ch) = char::from_u32(cp) else { return };
                if let Some(gid) = subtable.glyph_index(cp) {
                    glyph_ids.entry(ch).or_insert(gid.0);
                }
            });
        }

        let advances = glyph_ids
            .values()
            .filter_map(|&gid| Some((gid, face.glyph_hor_advance(ttf_parser::GlyphId(gid))?)))
            .collect();
        let missing_advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .unwrap_or(face.units_per_em() / 2);

        Some(Self {
            units_per_em: face.units_per_em(),
            glyph_ids,
            advances,
            missing_advance,
        })
    }

    /// Advance of `ch` in points, using the .notdef advance for unmapped chars.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let advance = self
            .glyph_ids
            .get(&ch)
            .and_then(|gid| self.advances.get(gid))
            .copied()
            .unwrap_or(self.missing_advance);
        f64::from(advance) * font_size / f64::from(self.units_per_em.max(1))
    }
}

/// Standard PDF faces. Only Helvetica is needed: it is the fallback for
/// anything not registered and the grid's label face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
}

impl StandardFont {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        fonts.insert(FontKey::helvetica(), FontData::Standard(StandardFont::Helvetica));
        Self { fonts }
    }

    /// The registered key a request lands on: the exact key, else the
    /// nearest weight of the same family (lighter wins a tie), else
    /// Helvetica.
    fn lookup(&self, family: &str, weight: u32) -> Option<(&FontKey, &FontData)> {
        let exact = FontKey::new(family, weight);
        self.fonts.get_key_value(&exact).or_else(|| {
            self.fonts
                .iter()
                .filter(|(k, _)| k.family == family)
                .min_by_key(|(k, _)| (k.weight.abs_diff(weight), k.weight))
        })
    }

    pub fn resolve(&self, family: &str, weight: u32) -> &FontData {
        self.lookup(family, weight).map_or(&FALLBACK, |(_, data)| data)
    }

    pub fn resolved_key(&self, family: &str, weight: u32) -> FontKey {
        self.lookup(family, weight)
            .map_or_else(FontKey::helvetica, |(key, _)| key.clone())
    }

    /// Register a TrueType face under `family`/`weight`, replacing any
    /// previous one.
    pub fn register(&mut self, family: &str, weight: u32, data: Vec<u8>) -> Result<(), ComposeError> {
        let metrics = CustomFontMetrics::from_font_data(&data).ok_or_else(|| {
            ComposeError::FontError(format!("'{}' ({}) is not a parseable TrueType font", family, weight))
        })?;
        self.fonts
            .insert(FontKey::new(family, weight), FontData::Custom { data, metrics });
        Ok(())
    }

    pub fn contains(&self, key: &FontKey) -> bool {
        self.fonts.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FontKey, &FontData)> {
        self.fonts.iter()
    }
}

static FALLBACK: FontData = FontData::Standard(StandardFont::Helvetica);

/// A font the engine should load at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FontSource {
    pub family: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// TrueType file to embed. Without it the family must already be known
    /// to the registry (or falls back to Helvetica).
    #[serde(default)]
    pub path: Option<String>,
}

fn default_weight() -> u32 {
    400
}

impl FontSource {
    pub fn key(&self) -> FontKey {
        FontKey::new(&self.family, self.weight)
    }
}

/// Fonts shared by the overlay and grid renderers.
#[derive(Debug)]
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Build a context and load every source that names a file.
    pub fn load<'a>(sources: impl IntoIterator<Item = &'a FontSource>) -> Result<Self, ComposeError> {
        let mut ctx = Self::new();
        for source in sources {
            let Some(path) = &source.path else { continue };
            if ctx.registry.contains(&source.key()) {
                continue;
            }
            ctx.load_file(&source.family, source.weight, path)?;
        }
        Ok(ctx)
    }

    /// Read and register a TrueType file.
    pub fn load_file(&mut self, family: &str, weight: u32, path: impl AsRef<Path>) -> Result<(), ComposeError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            ComposeError::FontError(format!("Failed to read font '{}': {}", path.display(), e))
        })?;
        self.registry.register(family, weight, data)?;
        log::info!("registered font {} {} from {}", family, weight, path.display());
        Ok(())
    }

    /// Measure the width of display-order text in points.
    pub fn measure_string(&self, text: &str, key: &FontKey, font_size: f64) -> f64 {
        match self.registry.resolve(&key.family, key.weight) {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size, 0.0),
            FontData::Custom { data, metrics } => {
                shaping::measure(text, data, font_size).unwrap_or_else(|| {
                    text.chars().map(|ch| metrics.char_width(ch, font_size)).sum()
                })
            }
        }
    }

    pub fn resolve(&self, key: &FontKey) -> &FontData {
        self.registry.resolve(&key.family, key.weight)
    }

    /// The key a lookup lands on after fallback.
    pub fn resolved_key(&self, key: &FontKey) -> FontKey {
        self.registry.resolved_key(&key.family, key.weight)
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.measure_string(" ", &FontKey::helvetica(), 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let w1 = ctx.measure_string("Abc", &FontKey::helvetica(), 12.0);
        let w2 = ctx.measure_string("Abc", &FontKey::new("NotoKufiArabic", 200), 12.0);
        assert!((w1 - w2).abs() < 0.001);
        assert_eq!(
            ctx.resolved_key(&FontKey::new("NotoKufiArabic", 200)),
            FontKey::helvetica()
        );
    }

    #[test]
    fn test_nearest_weight_in_family() {
        let ctx = FontContext::new();
        assert_eq!(
            ctx.resolved_key(&FontKey::new("Helvetica", 700)),
            FontKey::helvetica()
        );
        assert!(matches!(
            ctx.resolve(&FontKey::new("Helvetica", 300)),
            FontData::Standard(StandardFont::Helvetica)
        ));
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut ctx = FontContext::new();
        let err = ctx.registry_mut().register("Bad", 400, vec![0, 1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), "font_error");
    }

    #[test]
    fn test_load_skips_sources_without_path() {
        let sources = vec![FontSource {
            family: "Helvetica".to_string(),
            weight: 400,
            path: None,
        }];
        let ctx = FontContext::load(&sources).unwrap();
        assert_eq!(ctx.registry().iter().count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let sources = vec![FontSource {
            family: "Zain".to_string(),
            weight: 400,
            path: Some("/definitely/not/here.ttf".to_string()),
        }];
        assert!(FontContext::load(&sources).is_err());
    }
}
