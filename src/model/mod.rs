//! # Request Model
//!
//! The input and output representation for a single certificate render.
//! Everything here is request-scoped: built fresh from externally supplied
//! data at the start of a render and dropped once the bytes are returned.
//!
//! Coordinates are PDF user-space points with the origin at the bottom-left
//! of the page, which is also how layout catalog entries are tuned.

use serde::{Deserialize, Serialize};

/// Base page size (A4) in points, portrait.
pub const A4_WIDTH: f64 = 595.275_590_551_181_2;
pub const A4_HEIGHT: f64 = 841.889_763_779_527_7;

/// Identifier of a template variant, e.g. `alzain_female`.
pub type TemplateKind = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Where the label's x coordinate sits relative to the drawn text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelAnchor {
    Center,
    #[default]
    Right,
}

/// Placement of the main label (the nominee's name).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LabelSpec {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub anchor: LabelAnchor,
}

/// Geometry of the centered signature row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignatureRowSpec {
    /// Horizontal center of the whole row.
    pub x_center: f64,
    /// Bottom edge of the signature image boxes.
    pub y: f64,
    /// Baseline of the signer's name.
    pub name_y: f64,
    /// Baseline of the signer's title.
    pub title_y: f64,
    /// Slot width, also the image box width.
    pub width: f64,
    /// Image box height.
    pub height: f64,
    pub name_font_size: f64,
    pub title_font_size: f64,
}

/// Everything needed to place content on one template variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutSpec {
    pub orientation: Orientation,
    pub label: LabelSpec,
    pub signature_row: SignatureRowSpec,
}

/// Width/height of a page in points plus the orientation it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
}

impl PageGeometry {
    /// A4 page, rotated for landscape.
    pub fn a4(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => Self {
                width: A4_WIDTH,
                height: A4_HEIGHT,
                orientation,
            },
            Orientation::Landscape => Self {
                width: A4_HEIGHT,
                height: A4_WIDTH,
                orientation,
            },
        }
    }
}

/// One person whose signature block may appear in the row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub identifier: String,
    /// Localized display name in logical order. The caller substitutes the
    /// identifier when no name is known.
    #[serde(default)]
    pub display_name: String,
    /// Localized job title. Empty means "use the placeholder title".
    #[serde(default)]
    pub title: String,
    /// Raw image bytes. Never deserialized directly; the CLI resolves
    /// `signatureSrc` into this field.
    #[serde(skip)]
    pub signature_image: Option<Vec<u8>>,
    /// Where to load the signature from: data URI, base64, or a file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_src: Option<String>,
}

/// A single render invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template_kind: TemplateKind,
    pub label_text: String,
    /// Fallback orientation. Catalog entries always carry their own, so this
    /// is informational for built-in and configured layouts.
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub signers: Vec<Signer>,
    #[serde(default)]
    pub show_grid: bool,
}

/// The final single-page document handed back to the caller.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: &'static str,
    /// Signers silently left out of the row (no image or undecodable image).
    pub dropped_signers: usize,
}

impl ComposedDocument {
    pub const CONTENT_TYPE: &'static str = "application/pdf";
    pub const FILENAME: &'static str = "report.pdf";

    pub fn new(bytes: Vec<u8>, dropped_signers: usize) -> Self {
        Self {
            bytes,
            content_type: Self::CONTENT_TYPE,
            filename: Self::FILENAME,
            dropped_signers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_swaps_dimensions() {
        let p = PageGeometry::a4(Orientation::Portrait);
        let l = PageGeometry::a4(Orientation::Landscape);
        assert_eq!(p.width, l.height);
        assert_eq!(p.height, l.width);
        assert!(l.width > l.height);
    }

    #[test]
    fn test_request_json_defaults() {
        let json = r#"{ "templateKind": "alzain_male", "labelText": "Hi" }"#;
        let req: RenderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.orientation, Orientation::Portrait);
        assert!(req.signers.is_empty());
        assert!(!req.show_grid);
    }

    #[test]
    fn test_signer_json() {
        let json = r#"{ "identifier": "ceo", "displayName": "X", "signatureSrc": "./a.png" }"#;
        let s: Signer = serde_json::from_str(json).unwrap();
        assert_eq!(s.identifier, "ceo");
        assert_eq!(s.title, "");
        assert!(s.signature_image.is_none());
        assert_eq!(s.signature_src.as_deref(), Some("./a.png"));
    }
}
