//! # PDF Serializer
//!
//! Writes a single [`Canvas`] page as a standalone PDF document. The overlay
//! and grid renderers both produce their page through this writer; the
//! compositor later merges those pages onto a template.
//!
//! This is a from-scratch PDF 1.7 writer. Coordinates are PDF user space
//! (origin bottom-left, units of 1/72 inch), which is also the coordinate
//! system of the layout catalog, so nothing is flipped here.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- Catalog
//! 2 0 obj ... endobj  <- Pages
//! ...                 <- fonts, images, content stream, page
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Font Embedding
//!
//! The standard Helvetica face is a plain Type1 reference with
//! WinAnsiEncoding. Custom TrueType fonts are embedded whole as CIDFontType2
//! with Identity-H encoding, producing 5 PDF objects per font: FontFile2,
//! FontDescriptor, CIDFont, ToUnicode CMap, and the root Type0 dictionary.
//!
//! ## Determinism
//!
//! Fonts are emitted in [`FontKey`] order and images in draw order, and no
//! timestamps or random IDs are written, so the same canvas always
//! serializes to the same bytes.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::ComposeError;
use crate::font::{FontContext, FontData, FontKey};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::Rect;
use crate::model::PageGeometry;
use crate::text::shaping;

/// An RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }
}

/// A single drawing operation on a [`Canvas`].
#[derive(Debug, Clone)]
pub enum DrawOp {
    /// Display-order text with its baseline starting at `(x, y)`.
    Text {
        text: String,
        x: f64,
        y: f64,
        font: FontKey,
        font_size: f64,
        color: Color,
    },
    /// An image painted into `rect`, clipped to `clip`.
    Image {
        image: LoadedImage,
        rect: Rect,
        clip: Rect,
    },
    /// A straight stroked rule.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
}

/// A page under construction. Nothing is painted except the ops added to
/// it, so the serialized page is transparent everywhere else.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    ops: Vec<DrawOp>,
}

impl Canvas {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            width: geometry.width,
            height: geometry.height,
            ops: Vec::new(),
        }
    }

    pub fn text(&mut self, text: &str, x: f64, y: f64, font: &FontKey, font_size: f64) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
            font_size,
            color: Color::BLACK,
        });
    }

    pub fn image(&mut self, image: LoadedImage, rect: Rect, clip: Rect) {
        self.ops.push(DrawOp::Image { image, rect, clip });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width: 1.0,
            color: Color::BLACK,
        });
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }
}

pub struct PdfWriter;

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Glyph usage for one embedded TrueType font.
#[derive(Default)]
struct CustomFontUsage {
    /// Glyph ID -> first character that produced it (for ToUnicode).
    gid_to_char: BTreeMap<u16, char>,
}

/// Text after encoding for its resolved font.
enum EncodedText {
    /// WinAnsi bytes, already escaped for a literal string.
    Literal(String),
    /// Glyph IDs for an Identity-H font.
    Glyphs(Vec<u16>),
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Resolved font key -> Type0/Type1 object ID. Index in iteration order is /F{n}.
    font_objects: BTreeMap<FontKey, usize>,
    /// XObject IDs for images, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        Self {
            objects: vec![
                PdfObject { data: vec![] },
                PdfObject { data: vec![] },
                PdfObject { data: vec![] },
            ],
            font_objects: BTreeMap::new(),
            image_objects: Vec::new(),
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict_entries, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_resource_name(&self, key: &FontKey) -> Option<usize> {
        self.font_objects.keys().position(|k| k == key)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a canvas to a single-page PDF byte vector.
    pub fn write(&self, canvas: &Canvas, font_context: &FontContext) -> Result<Vec<u8>, ComposeError> {
        let mut builder = PdfBuilder::new();

        // Resolve every text op to the font it will actually use and encode
        // it, collecting glyph usage for embedded fonts on the way.
        let mut usage: BTreeMap<FontKey, CustomFontUsage> = BTreeMap::new();
        let mut encoded: Vec<Option<(FontKey, EncodedText)>> = Vec::with_capacity(canvas.ops.len());
        for op in &canvas.ops {
            let DrawOp::Text { text, font, .. } = op else {
                encoded.push(None);
                continue;
            };
            let resolved = font_context.resolved_key(font);
            let text = match font_context.resolve(&resolved) {
                FontData::Standard(_) => {
                    usage.entry(resolved.clone()).or_default();
                    EncodedText::Literal(Self::encode_winansi(text))
                }
                FontData::Custom { data, metrics } => {
                    let entry = usage.entry(resolved.clone()).or_default();
                    EncodedText::Glyphs(Self::encode_glyphs(text, data, &metrics.glyph_ids, entry))
                }
            };
            encoded.push(Some((resolved, text)));
        }

        self.register_fonts(&mut builder, &usage, font_context)?;
        self.register_images(&mut builder, canvas);

        let content = self.build_content_stream(canvas, &encoded, &builder);
        let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
        let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

        let page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.4} {:.4}] \
             /Contents {} 0 R /Resources << {} >> >>",
            canvas.width,
            canvas.height,
            content_obj_id,
            self.build_resource_dict(&builder),
        );
        let page_obj_id = builder.push(page_dict.into_bytes());

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        builder.objects[2].data =
            format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", page_obj_id).into_bytes();

        Ok(self.serialize(&builder))
    }

    /// Build the PDF content stream for the page.
    fn build_content_stream(
        &self,
        canvas: &Canvas,
        encoded: &[Option<(FontKey, EncodedText)>],
        builder: &PdfBuilder,
    ) -> String {
        let mut stream = String::new();
        let mut image_idx = 0usize;

        for (op, enc) in canvas.ops.iter().zip(encoded) {
            match op {
                DrawOp::Text { x, y, font_size, color, .. } => {
                    let Some((key, text)) = enc else { continue };
                    let font_idx = builder.font_resource_name(key).unwrap_or(0);
                    let _ = write!(
                        stream,
                        "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n",
                        color.r, color.g, color.b, font_idx, font_size, x, y
                    );
                    match text {
                        EncodedText::Literal(s) => {
                            let _ = write!(stream, "({}) Tj\n", s);
                        }
                        EncodedText::Glyphs(gids) => {
                            let hex: String = gids.iter().map(|g| format!("{:04X}", g)).collect();
                            let _ = write!(stream, "<{}> Tj\n", hex);
                        }
                    }
                    stream.push_str("ET\n");
                }

                DrawOp::Image { rect, clip, .. } => {
                    let _ = write!(
                        stream,
                        "q\n{:.2} {:.2} {:.2} {:.2} re W n\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        clip.x, clip.y, clip.width, clip.height,
                        rect.width, rect.height, rect.x, rect.y,
                        image_idx
                    );
                    image_idx += 1;
                }

                DrawOp::Line { x1, y1, x2, y2, width, color } => {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        color.r, color.g, color.b, width, x1, y1, x2, y2
                    );
                }
            }
        }

        stream
    }

    /// Register one font object per resolved key, in key order.
    fn register_fonts(
        &self,
        builder: &mut PdfBuilder,
        usage: &BTreeMap<FontKey, CustomFontUsage>,
        font_context: &FontContext,
    ) -> Result<(), ComposeError> {
        for (key, used) in usage {
            let obj_id = match font_context.resolve(key) {
                FontData::Standard(std_font) => {
                    let font_dict = format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        std_font.pdf_name()
                    );
                    builder.push(font_dict.into_bytes())
                }
                FontData::Custom { data, .. } => {
                    Self::write_custom_font_objects(builder, key, data, &used.gid_to_char)?
                }
            };
            builder.font_objects.insert(key.clone(), obj_id);
        }
        Ok(())
    }

    /// Create XObjects for every image op, in draw order.
    fn register_images(&self, builder: &mut PdfBuilder, canvas: &Canvas) {
        for op in &canvas.ops {
            if let DrawOp::Image { image, .. } = op {
                let xobj_id = Self::write_image_xobject(builder, image);
                builder.image_objects.push(xobj_id);
            }
        }
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    image.width_px, image.height_px, color_space_str
                );
                builder.push_stream(&dict, data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // Write SMask first if alpha channel exists
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let dict = format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                        image.width_px, image.height_px
                    );
                    builder.push_stream(&dict, &compressed_alpha)
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    image.width_px, image.height_px, smask_ref
                );
                builder.push_stream(&dict, &compressed_rgb)
            }
        }
    }

    fn build_resource_dict(&self, builder: &PdfBuilder) -> String {
        let mut resources = String::new();
        if !builder.font_objects.is_empty() {
            let fonts = builder
                .font_objects
                .values()
                .enumerate()
                .map(|(i, obj_id)| format!("/F{} {} 0 R", i, obj_id))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(resources, "/Font << {} >>", fonts);
        }
        if !builder.image_objects.is_empty() {
            let images = builder
                .image_objects
                .iter()
                .enumerate()
                .map(|(i, obj_id)| format!("/Im{} {} 0 R", i, obj_id))
                .collect::<Vec<_>>()
                .join(" ");
            if !resources.is_empty() {
                resources.push(' ');
            }
            let _ = write!(resources, "/XObject << {} >>", images);
        }
        resources
    }

    /// Encode display-order text as glyph IDs of an embedded font.
    ///
    /// Shaping runs left-to-right because the text is already in display
    /// order. Falls back to the font's cmap if the face can't be shaped.
    fn encode_glyphs(
        text: &str,
        font_data: &[u8],
        cmap: &std::collections::HashMap<char, u16>,
        usage: &mut CustomFontUsage,
    ) -> Vec<u16> {
        if let Some(run) = shaping::shape_run(text, font_data) {
            return run
                .source_chars(text)
                .map(|(gid, ch)| {
                    if let Some(ch) = ch {
                        usage.gid_to_char.entry(gid).or_insert(ch);
                    }
                    gid
                })
                .collect();
        }

        text.chars()
            .map(|ch| {
                let gid = cmap.get(&ch).copied().unwrap_or(0);
                usage.gid_to_char.entry(gid).or_insert(ch);
                gid
            })
            .collect()
    }

    /// Encode text for a standard font as an escaped WinAnsi literal.
    fn encode_winansi(text: &str) -> String {
        let mut out = String::new();
        let mut missing = 0usize;
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or_else(|| {
                missing += 1;
                b'?'
            });
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        if missing > 0 {
            log::warn!(
                "{} character(s) not encodable in a standard font; configure an embedded font",
                missing
            );
        }
        out
    }

    /// Write the 5 CIDFont PDF objects for a custom TrueType font.
    /// Returns the object ID of the Type0 root font dictionary.
    fn write_custom_font_objects(
        builder: &mut PdfBuilder,
        key: &FontKey,
        ttf_data: &[u8],
        gid_to_char: &BTreeMap<u16, char>,
    ) -> Result<usize, ComposeError> {
        let face = ttf_parser::Face::parse(ttf_data, 0).map_err(|e| {
            ComposeError::FontError(format!("Failed to parse TTF data for font '{}': {}", key.family, e))
        })?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let pdf_font_name = Self::sanitize_font_name(&key.family, key.weight);

        // 1. FontFile2 stream
        let compressed_ttf = compress_to_vec_zlib(ttf_data, 6);
        let fontfile2_id = builder.push_stream(
            &format!("/Length1 {} /Filter /FlateDecode", ttf_data.len()),
            &compressed_ttf,
        );

        // 2. FontDescriptor
        let bbox = face.global_bounding_box();
        let scale = 1000.0 / units_per_em as f64;
        let bbox_str = format!(
            "[{} {} {} {}]",
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
        );
        let cap_height = face.capital_height().unwrap_or(ascender) as f64 * scale;
        let stem_v = if key.weight >= 700 { 120 } else { 80 };
        let font_descriptor_dict = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox {} /ItalicAngle 0 \
             /Ascent {} /Descent {} /CapHeight {} /StemV {} \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            bbox_str,
            (ascender as f64 * scale) as i32,
            (descender as f64 * scale) as i32,
            cap_height as i32,
            stem_v,
            fontfile2_id,
        );
        let font_descriptor_id = builder.push(font_descriptor_dict.into_bytes());

        // 3. CIDFont dictionary (DescendantFont)
        let w_array = Self::build_w_array(gid_to_char.keys().copied(), &face, units_per_em);
        let default_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|adv| (adv as f64 * scale) as u32)
            .unwrap_or(1000);
        let cidfont_dict = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} \
             /CIDToGIDMap /Identity >>",
            pdf_font_name, font_descriptor_id, default_width, w_array,
        );
        let cidfont_id = builder.push(cidfont_dict.into_bytes());

        // 4. ToUnicode CMap
        let cmap_content = Self::build_tounicode_cmap(gid_to_char, &pdf_font_name);
        let compressed_cmap = compress_to_vec_zlib(cmap_content.as_bytes(), 6);
        let tounicode_id = builder.push_stream("/Filter /FlateDecode", &compressed_cmap);

        // 5. Type0 font dictionary (the root, referenced by /Resources)
        let type0_dict = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        Ok(builder.push(type0_dict.into_bytes()))
    }

    /// Build the /W array for per-glyph widths in CIDFont.
    /// Format: [gid [width] gid [width] ...]
    fn build_w_array(
        gids: impl Iterator<Item = u16>,
        face: &ttf_parser::Face,
        units_per_em: u16,
    ) -> String {
        let scale = 1000.0 / units_per_em as f64;
        let mut result = String::from("[");
        for gid in gids {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            let _ = write!(result, " {} [{}]", gid, (advance as f64 * scale) as u32);
        }
        result.push_str(" ]");
        result
    }

    /// Build a ToUnicode CMap for text extraction/copy-paste support.
    fn build_tounicode_cmap(gid_to_char: &BTreeMap<u16, char>, font_name: &str) -> String {
        let entries: Vec<(u16, char)> = gid_to_char.iter().map(|(&g, &c)| (g, c)).collect();

        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo\n");
        cmap.push_str("<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        // beginbfchar blocks hold at most 100 entries
        for chunk in entries.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for &(gid, ch) in chunk {
                let mut utf16 = [0u16; 2];
                let units: String = ch
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|u| format!("{:04X}", u))
                    .collect();
                let _ = writeln!(cmap, "<{:04X}> <{}>", gid, units);
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");
        cmap
    }

    /// Sanitize a font name for use as a PDF name object.
    /// Strips spaces and special characters, appends a weight suffix.
    fn sanitize_font_name(family: &str, weight: u32) -> String {
        let mut name: String = family
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();

        if name.is_empty() {
            name = "CustomFont".to_string();
        }
        if weight >= 700 {
            name.push_str("-Bold");
        } else if weight <= 300 {
            name.push_str("-Light");
        }
        name
    }

    /// Escape special characters in a PDF string.
    pub fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// contains special mappings for smart quotes, bullets, dashes, etc.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            xref_offset
        );

        output
    }
}
