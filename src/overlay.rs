//! # Overlay Renderer
//!
//! Draws the dynamic part of a certificate onto a blank, transparent page:
//! the nominee label and a centered row of signature blocks (image, name,
//! title). The page is later merged onto the template by [`crate::compose`].
//!
//! ```text
//! signers ──▶ plan_row ──▶ placed (decoded image + slot)
//!                   │
//!                   └────▶ skipped (missing / undecodable image)
//! ```
//!
//! Every signer image is decoded before any slot is assigned, so `n` in the
//! row layout is the number of signers that will actually be drawn and a
//! dropped signer never leaves a gap.

use crate::error::ComposeError;
use crate::font::{FontContext, FontKey};
use crate::image_loader::{decode_image_bytes, LoadedImage};
use crate::layout::{fit_contain, layout_row, Rect};
use crate::model::{LabelAnchor, LabelSpec, LayoutSpec, PageGeometry, SignatureRowSpec, Signer};
use crate::pdf::{Canvas, PdfWriter};
use crate::text;

/// Line advance for multi-line labels, as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Font selection for the three kinds of overlay text.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFonts {
    pub label: FontKey,
    pub name: FontKey,
    pub title: FontKey,
}

impl Default for OverlayFonts {
    fn default() -> Self {
        Self {
            label: FontKey::new("NotoKufiArabic", 400),
            name: FontKey::new("NotoKufiArabic", 400),
            title: FontKey::new("NotoKufiArabic", 200),
        }
    }
}

/// Render-time knobs that are not part of a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub fonts: OverlayFonts,
    /// Horizontal gap between signature slots.
    pub signature_spacing: f64,
    /// Title drawn for signers without one.
    pub placeholder_title: String,
    pub grid_step: f64,
    pub grid_font_size: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fonts: OverlayFonts::default(),
            signature_spacing: 50.0,
            placeholder_title: "العنوان الوظيفي".to_string(),
            grid_step: 50.0,
            grid_font_size: 6.0,
        }
    }
}

/// Why a signer was left out of the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingImage,
    UndecodableImage(String),
}

/// A signer that was not drawn. Not an error: the render still succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSigner {
    pub identifier: String,
    pub reason: SkipReason,
}

/// A signer with a decoded image and its assigned slot.
#[derive(Debug, Clone)]
pub struct PlacedSigner<'a> {
    pub signer: &'a Signer,
    pub image: LoadedImage,
    /// The full slot box: slot left edge, row y, row width and height.
    pub slot: Rect,
}

/// Result of the filter-then-layout stage.
#[derive(Debug, Clone, Default)]
pub struct RowPlan<'a> {
    pub placed: Vec<PlacedSigner<'a>>,
    pub skipped: Vec<SkippedSigner>,
}

/// Decode every signer's image, drop those that can't be drawn, and lay out
/// the survivors in input order.
pub fn plan_row<'a>(signers: &'a [Signer], row: &SignatureRowSpec, spacing: f64) -> RowPlan<'a> {
    let mut ready: Vec<(&Signer, LoadedImage)> = Vec::with_capacity(signers.len());
    let mut skipped = Vec::new();

    for signer in signers {
        let Some(bytes) = signer.signature_image.as_deref() else {
            skipped.push(SkippedSigner {
                identifier: signer.identifier.clone(),
                reason: SkipReason::MissingImage,
            });
            continue;
        };
        match decode_image_bytes(bytes) {
            Ok(image) => ready.push((signer, image)),
            Err(reason) => skipped.push(SkippedSigner {
                identifier: signer.identifier.clone(),
                reason: SkipReason::UndecodableImage(reason.to_string()),
            }),
        }
    }

    let xs = layout_row(ready.len(), row.width, spacing, row.x_center);
    log::debug!("signature row: {} slot(s) at {:?}", xs.len(), xs);

    let placed = ready
        .into_iter()
        .zip(xs)
        .map(|((signer, image), x)| PlacedSigner {
            signer,
            image,
            slot: Rect {
                x,
                y: row.y,
                width: row.width,
                height: row.height,
            },
        })
        .collect();

    RowPlan { placed, skipped }
}

/// A rendered overlay page plus what ended up on it.
#[derive(Debug, Clone)]
pub struct RenderedOverlay {
    pub bytes: Vec<u8>,
    /// Slot boxes of the drawn signers, in row order.
    pub slots: Vec<Rect>,
    pub skipped: Vec<SkippedSigner>,
}

/// Render the label and signature row for one certificate.
pub fn render(
    geometry: PageGeometry,
    spec: &LayoutSpec,
    label_text: &str,
    signers: &[Signer],
    fonts: &FontContext,
    options: &RenderOptions,
) -> Result<RenderedOverlay, ComposeError> {
    let mut canvas = Canvas::new(geometry);

    draw_label(&mut canvas, &spec.label, label_text, &options.fonts.label, fonts);

    let row = &spec.signature_row;
    let plan = plan_row(signers, row, options.signature_spacing);
    for skipped in &plan.skipped {
        log::warn!("skipping signer '{}': {:?}", skipped.identifier, skipped.reason);
    }

    let mut slots = Vec::with_capacity(plan.placed.len());
    for placed in plan.placed {
        let slot = placed.slot;
        let fitted = fit_contain(placed.image.width_px, placed.image.height_px, slot);
        canvas.image(placed.image, fitted, slot);

        let name = if placed.signer.display_name.is_empty() {
            &placed.signer.identifier
        } else {
            &placed.signer.display_name
        };
        let title = if placed.signer.title.is_empty() {
            &options.placeholder_title
        } else {
            &placed.signer.title
        };

        let center_x = slot.center_x();
        draw_centered(&mut canvas, name, center_x, row.name_y, &options.fonts.name, row.name_font_size, fonts);
        draw_centered(&mut canvas, title, center_x, row.title_y, &options.fonts.title, row.title_font_size, fonts);
        slots.push(slot);
    }

    let bytes = PdfWriter::new().write(&canvas, fonts)?;
    Ok(RenderedOverlay {
        bytes,
        slots,
        skipped: plan.skipped,
    })
}

fn draw_label(canvas: &mut Canvas, label: &LabelSpec, text: &str, font: &FontKey, fonts: &FontContext) {
    let shaped = text::shape(text);
    for (i, line) in shaped.split('\n').enumerate() {
        let width = fonts.measure_string(line, font, label.font_size);
        let x = match label.anchor {
            LabelAnchor::Center => label.x - width / 2.0,
            LabelAnchor::Right => label.x - width,
        };
        let y = label.y - i as f64 * label.font_size * LINE_HEIGHT_FACTOR;
        canvas.text(line, x, y, font, label.font_size);
    }
}

fn draw_centered(
    canvas: &mut Canvas,
    text: &str,
    center_x: f64,
    y: f64,
    font: &FontKey,
    font_size: f64,
    fonts: &FontContext,
) {
    let shaped = text::shape(text);
    let width = fonts.measure_string(&shaped, font, font_size);
    canvas.text(&shaped, center_x - width / 2.0, y, font, font_size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LayoutCatalog;
    use crate::model::Orientation;

    fn png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([0, 0, 0, 200]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 2, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    fn jpeg(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb([(x * 4) as u8, (y * 8) as u8, 90]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgb8)
            .unwrap();
        buf
    }

    fn signer(id: &str, image: Option<Vec<u8>>) -> Signer {
        Signer {
            identifier: id.to_string(),
            display_name: format!("Name {}", id),
            title: String::new(),
            signature_image: image,
            signature_src: None,
        }
    }

    fn row() -> SignatureRowSpec {
        SignatureRowSpec {
            x_center: 400.0,
            y: 120.0,
            name_y: 95.0,
            title_y: 80.0,
            width: 100.0,
            height: 50.0,
            name_font_size: 18.0,
            title_font_size: 14.0,
        }
    }

    fn content(bytes: &[u8]) -> String {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    #[test]
    fn test_plan_row_filters_before_layout() {
        let signers = vec![
            signer("a", Some(png())),
            signer("b", None),
            signer("c", Some(b"garbage bytes".to_vec())),
            signer("d", Some(png())),
            signer("e", Some(png())),
        ];
        let plan = plan_row(&signers, &row(), 50.0);

        let ids: Vec<&str> = plan.placed.iter().map(|p| p.signer.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "d", "e"]);
        let xs: Vec<f64> = plan.placed.iter().map(|p| p.slot.x).collect();
        assert_eq!(xs, vec![200.0, 350.0, 500.0]);

        assert_eq!(plan.skipped.len(), 2);
        assert_eq!(plan.skipped[0].reason, SkipReason::MissingImage);
        assert!(matches!(plan.skipped[1].reason, SkipReason::UndecodableImage(_)));
    }

    #[test]
    fn test_plan_row_empty() {
        let plan = plan_row(&[], &row(), 50.0);
        assert!(plan.placed.is_empty());
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_single_signer_centered() {
        let signers = vec![signer("a", Some(png()))];
        let plan = plan_row(&signers, &row(), 50.0);
        assert_eq!(plan.placed[0].slot.x, 350.0);
        assert_eq!(plan.placed[0].slot.center_x(), 400.0);
    }

    #[test]
    fn test_render_draws_one_image_per_placed_signer() {
        let spec = LayoutCatalog::builtin().resolve("alzain_male");
        let signers = vec![signer("a", Some(png())), signer("b", None), signer("c", Some(png()))];
        let out = render(
            PageGeometry::a4(Orientation::Landscape),
            &spec,
            "Label",
            &signers,
            &FontContext::new(),
            &RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(out.slots.len(), 2);
        assert_eq!(out.skipped.len(), 1);
        let content = content(&out.bytes);
        assert_eq!(content.matches(" Do\n").count(), 2);
        assert!(content.contains("/Im1 Do"));
    }

    #[test]
    fn test_undecodable_signer_matches_absent_signer() {
        let spec = LayoutCatalog::builtin().resolve("abda3t_female");
        let fonts = FontContext::new();
        let options = RenderOptions::default();
        let geometry = PageGeometry::a4(Orientation::Landscape);

        let with_bad = vec![
            signer("a", Some(png())),
            signer("bad", Some(vec![0x89, 0x50, 0x4E, 0x47, 0, 0, 0, 0])),
            signer("c", Some(png())),
        ];
        let without = vec![signer("a", Some(png())), signer("c", Some(png()))];

        let a = render(geometry, &spec, "X", &with_bad, &fonts, &options).unwrap();
        let b = render(geometry, &spec, "X", &without, &fonts, &options).unwrap();
        assert_eq!(a.slots, b.slots);
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn test_truncated_jpeg_signer_matches_absent_signer() {
        let spec = LayoutCatalog::builtin().resolve("alzain_male");
        let fonts = FontContext::new();
        let options = RenderOptions::default();
        let geometry = PageGeometry::a4(Orientation::Landscape);

        let jpeg = jpeg(64, 32);
        let sof = jpeg.windows(2).position(|w| w == [0xFF, 0xC0]).unwrap();
        let truncated = jpeg[..sof + 20].to_vec();

        let with_bad = vec![
            signer("a", Some(png())),
            signer("cut", Some(truncated)),
            signer("c", Some(jpeg.clone())),
        ];
        let without = vec![signer("a", Some(png())), signer("c", Some(jpeg))];

        let a = render(geometry, &spec, "X", &with_bad, &fonts, &options).unwrap();
        let b = render(geometry, &spec, "X", &without, &fonts, &options).unwrap();
        assert_eq!(a.slots.len(), 2);
        assert_eq!(a.slots, b.slots);
        assert_eq!(a.bytes, b.bytes);
        assert_eq!(a.skipped.len(), 1);
        assert_eq!(a.skipped[0].identifier, "cut");
        assert!(matches!(a.skipped[0].reason, SkipReason::UndecodableImage(_)));
    }

    #[test]
    fn test_label_anchor() {
        let fonts = FontContext::new();
        let options = RenderOptions::default();
        let geometry = PageGeometry::a4(Orientation::Portrait);
        // "AB" in Helvetica at 10pt is 6.67 + 6.67 = 13.34pt wide.
        let mut spec = LayoutCatalog::default_spec();
        spec.label = LabelSpec { x: 300.0, y: 600.0, font_size: 10.0, anchor: LabelAnchor::Right };

        let right = render(geometry, &spec, "AB", &[], &fonts, &options).unwrap();
        assert!(content(&right.bytes).contains("286.66 600.00 Td"));

        spec.label.anchor = LabelAnchor::Center;
        let center = render(geometry, &spec, "AB", &[], &fonts, &options).unwrap();
        assert!(content(&center.bytes).contains("293.33 600.00 Td"));
    }

    #[test]
    fn test_empty_title_uses_placeholder() {
        let fonts = FontContext::new();
        let options = RenderOptions {
            placeholder_title: "Officer".to_string(),
            ..RenderOptions::default()
        };
        let spec = LayoutCatalog::builtin().resolve("alzain_male");
        let mut titled = signer("b", Some(png()));
        titled.title = "Chief".to_string();
        let signers = vec![signer("a", Some(png())), titled];

        let out = render(PageGeometry::a4(Orientation::Landscape), &spec, "", &signers, &fonts, &options)
            .unwrap();
        let content = content(&out.bytes);
        assert!(content.contains("(Officer) Tj"));
        assert!(content.contains("(Chief) Tj"));
        assert!(content.contains("(Name a) Tj"));
    }

    #[test]
    fn test_missing_display_name_uses_identifier() {
        let mut s = signer("ceo", Some(png()));
        s.display_name.clear();
        let spec = LayoutCatalog::builtin().resolve("alzain_male");
        let out = render(
            PageGeometry::a4(Orientation::Landscape),
            &spec,
            "",
            &[s],
            &FontContext::new(),
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(content(&out.bytes).contains("(ceo) Tj"));
    }
}
