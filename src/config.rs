//! # Engine Configuration
//!
//! Process-wide settings, read once at startup from a JSON file:
//!
//! ```json
//! {
//!   "fonts": {
//!     "label": { "family": "NotoKufiArabic", "weight": 400, "path": "fonts/NotoKufiArabic-Regular.ttf" },
//!     "title": { "family": "NotoKufiArabic", "weight": 200, "path": "fonts/NotoKufiArabic-ExtraLight.ttf" }
//!   },
//!   "signatureSpacing": 50,
//!   "layouts": { "alzain_male": { ... } }
//! }
//! ```
//!
//! Every key is optional. Unknown keys are rejected so a typo doesn't
//! silently fall back to a default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{KindPolicy, LayoutCatalog};
use crate::error::ComposeError;
use crate::font::{FontContext, FontSource};
use crate::grid::MIN_GRID_STEP;
use crate::model::LayoutSpec;
use crate::overlay::{OverlayFonts, RenderOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FontsConfig {
    pub label: FontSource,
    pub name: FontSource,
    pub title: FontSource,
}

impl Default for FontsConfig {
    fn default() -> Self {
        let regular = FontSource {
            family: "NotoKufiArabic".to_string(),
            weight: 400,
            path: None,
        };
        Self {
            label: regular.clone(),
            name: regular,
            title: FontSource {
                family: "NotoKufiArabic".to_string(),
                weight: 200,
                path: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct EngineConfig {
    pub fonts: FontsConfig,
    pub signature_spacing: f64,
    pub placeholder_title: String,
    pub grid_step: f64,
    pub grid_font_size: f64,
    /// Record states that may be rendered.
    pub renderable_states: Vec<String>,
    /// A signer needs at least one of these roles.
    pub allowed_roles: Vec<String>,
    pub ungendered_kinds: Vec<String>,
    pub rejected_kinds: Vec<String>,
    /// Extra or replacement catalog entries.
    pub layouts: BTreeMap<String, LayoutSpec>,
    pub default_layout: Option<LayoutSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        let policy = KindPolicy::default();
        Self {
            fonts: FontsConfig::default(),
            signature_spacing: options.signature_spacing,
            placeholder_title: options.placeholder_title,
            grid_step: options.grid_step,
            grid_font_size: options.grid_font_size,
            renderable_states: vec!["approved".to_string(), "final_approval".to_string()],
            allowed_roles: ["hr_chief", "chief", "director", "ceo"]
                .iter()
                .map(|r| r.to_string())
                .collect(),
            ungendered_kinds: policy.ungendered,
            rejected_kinds: policy.rejected,
            layouts: BTreeMap::new(),
            default_layout: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ComposeError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ComposeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ComposeError::ConfigError(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), ComposeError> {
        if !(self.signature_spacing.is_finite() && self.signature_spacing >= 0.0) {
            return Err(ComposeError::ConfigError(
                "signatureSpacing must be zero or positive".to_string(),
            ));
        }
        if !(self.grid_step.is_finite() && self.grid_step >= MIN_GRID_STEP) {
            return Err(ComposeError::ConfigError(format!(
                "gridStep must be at least {}",
                MIN_GRID_STEP
            )));
        }
        if !(self.grid_font_size > 0.0) {
            return Err(ComposeError::ConfigError("gridFontSize must be positive".to_string()));
        }
        for (kind, spec) in &self.layouts {
            check_layout(kind, spec)?;
        }
        if let Some(spec) = &self.default_layout {
            check_layout("defaultLayout", spec)?;
        }
        Ok(())
    }

    /// The built-in catalog with this config's layouts applied.
    pub fn catalog(&self) -> LayoutCatalog {
        LayoutCatalog::builtin().with_overrides(
            self.layouts.iter().map(|(k, v)| (k.clone(), *v)),
            self.default_layout,
        )
    }

    pub fn kind_policy(&self) -> KindPolicy {
        KindPolicy {
            ungendered: self.ungendered_kinds.clone(),
            rejected: self.rejected_kinds.clone(),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            fonts: OverlayFonts {
                label: self.fonts.label.key(),
                name: self.fonts.name.key(),
                title: self.fonts.title.key(),
            },
            signature_spacing: self.signature_spacing,
            placeholder_title: self.placeholder_title.clone(),
            grid_step: self.grid_step,
            grid_font_size: self.grid_font_size,
        }
    }

    /// Load every configured font that names a file. Paths are taken
    /// relative to `base_dir` when given.
    pub fn load_fonts(&self, base_dir: Option<&Path>) -> Result<FontContext, ComposeError> {
        let sources: Vec<FontSource> = [&self.fonts.label, &self.fonts.name, &self.fonts.title]
            .into_iter()
            .map(|source| {
                let mut source = source.clone();
                if let (Some(base), Some(path)) = (base_dir, source.path.as_ref()) {
                    if Path::new(path).is_relative() {
                        source.path = Some(base.join(path).to_string_lossy().into_owned());
                    }
                }
                source
            })
            .collect();
        FontContext::load(&sources)
    }
}

fn check_layout(name: &str, spec: &LayoutSpec) -> Result<(), ComposeError> {
    let row = &spec.signature_row;
    if row.width > 0.0 && row.height > 0.0 && spec.label.font_size > 0.0 {
        Ok(())
    } else {
        Err(ComposeError::ConfigError(format!(
            "layout '{}' needs a positive label font size and signature box",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LabelAnchor;

    #[test]
    fn test_empty_object_is_default() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config.signature_spacing, 50.0);
        assert_eq!(config.grid_step, 50.0);
        assert_eq!(config.placeholder_title, "العنوان الوظيفي");
        assert_eq!(config.renderable_states, vec!["approved", "final_approval"]);
        assert_eq!(config.allowed_roles.len(), 4);
        assert_eq!(config.fonts.title.weight, 200);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "signatureSpacin": 10 }"#).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_invalid_grid_step() {
        let err = EngineConfig::from_json_str(r#"{ "gridStep": 0 }"#).unwrap_err();
        assert_eq!(err.kind(), "config_error");
        let err = EngineConfig::from_json_str(r#"{ "gridStep": 0.0000001 }"#).unwrap_err();
        assert_eq!(err.kind(), "config_error");
    }

    #[test]
    fn test_layout_override() {
        let json = r#"{
            "layouts": {
                "gold_male": {
                    "orientation": "portrait",
                    "label": { "x": 100, "y": 200, "fontSize": 30, "anchor": "center" },
                    "signatureRow": {
                        "xCenter": 300, "y": 90, "nameY": 65, "titleY": 50,
                        "width": 120, "height": 60, "nameFontSize": 20, "titleFontSize": 16
                    }
                }
            }
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        let catalog = config.catalog();
        assert!(catalog.contains("gold_male"));
        assert!(catalog.contains("alzain_male"));
        let spec = catalog.resolve("gold_male");
        assert_eq!(spec.label.anchor, LabelAnchor::Center);
        assert_eq!(spec.label.x, 100.0);
    }

    #[test]
    fn test_partial_layout_rejected() {
        let json = r#"{ "layouts": { "x": { "orientation": "portrait" } } }"#;
        let err = EngineConfig::from_json_str(json).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_render_options_follow_config() {
        let json = r#"{ "fonts": { "name": { "family": "Zain" } }, "signatureSpacing": 20 }"#;
        let options = EngineConfig::from_json_str(json).unwrap().render_options();
        assert_eq!(options.fonts.name.family, "Zain");
        assert_eq!(options.fonts.name.weight, 400);
        assert_eq!(options.fonts.label.family, "NotoKufiArabic");
        assert_eq!(options.signature_spacing, 20.0);
    }

    #[test]
    fn test_load_fonts_without_paths() {
        let ctx = EngineConfig::default().load_fonts(None).unwrap();
        assert_eq!(ctx.registry().iter().count(), 1);
    }

    #[test]
    fn test_missing_font_file() {
        let json = r#"{ "fonts": { "label": { "family": "Zain", "path": "nope.ttf" } } }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        let err = config.load_fonts(Some(Path::new("/nonexistent"))).unwrap_err();
        assert_eq!(err.kind(), "font_error");
    }
}
