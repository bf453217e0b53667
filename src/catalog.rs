//! # Layout Catalog
//!
//! Maps a template kind to the hand-tuned geometry of that template. Lookup
//! is total: an unknown kind resolves to the default entry, which is just as
//! complete as the named ones.
//!
//! The label anchor lives on the entry itself, so the one template that
//! centers its label is a property of the catalog rather than a branch in
//! the renderer.

use std::collections::HashMap;

use crate::error::ComposeError;
use crate::model::{LabelAnchor, LabelSpec, LayoutSpec, Orientation, SignatureRowSpec};

/// Template-kind policy: which request types are used verbatim and which
/// are refused outright. Everything else is suffixed with the nominee's gender.
#[derive(Debug, Clone)]
pub struct KindPolicy {
    pub ungendered: Vec<String>,
    pub rejected: Vec<String>,
}

impl Default for KindPolicy {
    fn default() -> Self {
        Self {
            ungendered: vec!["3ashat_idak".to_string()],
            rejected: vec!["grey".to_string(), "purple".to_string()],
        }
    }
}

/// Turn a record's request type into the catalog/template key.
pub fn resolve_template_kind(
    request_type: &str,
    gender: &str,
    policy: &KindPolicy,
) -> Result<String, ComposeError> {
    if policy.rejected.iter().any(|k| k == request_type) {
        return Err(ComposeError::RecordNotRenderable(format!(
            "request type '{}' is not supported",
            request_type
        )));
    }
    if policy.ungendered.iter().any(|k| k == request_type) {
        return Ok(request_type.to_string());
    }
    Ok(format!("{}_{}", request_type, gender))
}

/// Immutable kind → LayoutSpec table with a default fallback.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    entries: HashMap<String, LayoutSpec>,
    default: LayoutSpec,
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LayoutCatalog {
    /// The certificate variants shipped with the engine.
    pub fn builtin() -> Self {
        let idak = LayoutSpec {
            orientation: Orientation::Portrait,
            label: LabelSpec {
                x: 300.0,
                y: 600.0,
                font_size: 48.0,
                anchor: LabelAnchor::Center,
            },
            signature_row: wide_row(),
        };
        let alzain = LayoutSpec {
            orientation: Orientation::Landscape,
            label: LabelSpec {
                x: 425.0,
                y: 380.0,
                font_size: 24.0,
                anchor: LabelAnchor::Right,
            },
            signature_row: landscape_row(),
        };
        let abda3t = LayoutSpec {
            orientation: Orientation::Landscape,
            label: LabelSpec {
                x: 400.0,
                y: 355.0,
                font_size: 31.0,
                anchor: LabelAnchor::Right,
            },
            signature_row: landscape_row(),
        };

        let mut entries = HashMap::new();
        entries.insert("3ashat_idak".to_string(), idak);
        entries.insert("alzain_male".to_string(), alzain);
        entries.insert("alzain_female".to_string(), alzain);
        entries.insert("abda3t_male".to_string(), abda3t);
        entries.insert("abda3t_female".to_string(), abda3t);

        Self {
            entries,
            default: Self::default_spec(),
        }
    }

    /// The entry used for any kind not in the table.
    pub fn default_spec() -> LayoutSpec {
        LayoutSpec {
            orientation: Orientation::Landscape,
            label: LabelSpec {
                x: 300.0,
                y: 600.0,
                font_size: 48.0,
                anchor: LabelAnchor::Right,
            },
            signature_row: wide_row(),
        }
    }

    /// Add or replace entries, e.g. from configuration.
    pub fn with_overrides(
        mut self,
        layouts: impl IntoIterator<Item = (String, LayoutSpec)>,
        default: Option<LayoutSpec>,
    ) -> Self {
        self.entries.extend(layouts);
        if let Some(d) = default {
            self.default = d;
        }
        self
    }

    /// Look up a template kind. Never fails.
    pub fn resolve(&self, kind: &str) -> LayoutSpec {
        match self.entries.get(kind) {
            Some(spec) => *spec,
            None => {
                log::debug!("no layout for template kind '{}', using default", kind);
                self.default
            }
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Known kinds in sorted order.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

fn wide_row() -> SignatureRowSpec {
    SignatureRowSpec {
        x_center: 300.0,
        y: 90.0,
        name_y: 65.0,
        title_y: 50.0,
        width: 120.0,
        height: 60.0,
        name_font_size: 20.0,
        title_font_size: 16.0,
    }
}

fn landscape_row() -> SignatureRowSpec {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn is_complete(spec: &LayoutSpec) -> bool {
        let r = &spec.signature_row;
        spec.label.font_size > 0.0
            && r.width > 0.0
            && r.height > 0.0
            && r.name_font_size > 0.0
            && r.title_font_size > 0.0
    }

    #[test]
    fn test_named_entry() {
        let catalog = LayoutCatalog::builtin();
        let spec = catalog.resolve("alzain_female");
        assert_eq!(spec.orientation, Orientation::Landscape);
        assert_eq!(spec.label.x, 425.0);
        assert_eq!(spec.signature_row.x_center, 400.0);
    }

    #[test]
    fn test_only_idak_is_centered() {
        let catalog = LayoutCatalog::builtin();
        for kind in catalog.kinds() {
            let anchor = catalog.resolve(kind).label.anchor;
            if kind == "3ashat_idak" {
                assert_eq!(anchor, LabelAnchor::Center);
            } else {
                assert_eq!(anchor, LabelAnchor::Right, "kind {}", kind);
            }
        }
    }

    #[test]
    fn test_resolve_is_total() {
        let catalog = LayoutCatalog::builtin();
        for kind in ["", "nope", "alzain_", "\u{0}", "🙂", "ALZAIN_MALE"] {
            let spec = catalog.resolve(kind);
            assert!(is_complete(&spec));
            assert_eq!(spec, LayoutCatalog::default_spec());
        }
        for kind in catalog.kinds() {
            assert!(is_complete(&catalog.resolve(kind)));
        }
    }

    #[test]
    fn test_overrides_replace_entries() {
        let mut custom = LayoutCatalog::default_spec();
        custom.label.x = 10.0;
        let catalog = LayoutCatalog::builtin()
            .with_overrides(vec![("alzain_male".to_string(), custom)], None);
        assert_eq!(catalog.resolve("alzain_male").label.x, 10.0);
        assert_eq!(catalog.resolve("alzain_female").label.x, 425.0);
    }

    #[test]
    fn test_kind_resolution() {
        let policy = KindPolicy::default();
        assert_eq!(
            resolve_template_kind("3ashat_idak", "male", &policy).unwrap(),
            "3ashat_idak"
        );
        assert_eq!(
            resolve_template_kind("alzain", "female", &policy).unwrap(),
            "alzain_female"
        );
        assert_eq!(resolve_template_kind("abda3t", "", &policy).unwrap(), "abda3t_");
        let err = resolve_template_kind("grey", "male", &policy).unwrap_err();
        assert_eq!(err.kind(), "record_not_renderable");
        assert!(resolve_template_kind("purple", "female", &policy).is_err());
    }
}
