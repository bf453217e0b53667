//! # certforme
//!
//! A certificate composition engine.
//!
//! A certificate is a static template PDF plus a small amount of dynamic
//! content: the nominee's name and a row of signature blocks whose length
//! isn't known until render time. certforme draws that content onto a
//! transparent overlay page and stamps it onto the template, producing a
//! single-page PDF.
//!
//! ## Architecture
//!
//! ```text
//! RenderRequest
//!       ↓
//!   [catalog]  — template kind → LayoutSpec (total, default fallback)
//!       ↓
//!   [text]     — Arabic joining + bidi reordering to display order
//!       ↓
//!   [layout]   — centered slot positions for the signature row
//!       ↓
//!   [overlay]  — label + signature blocks on a blank page → [pdf]
//!       ↓
//!   [compose]  — overlay (+ optional [grid]) stamped on the template
//!       ↓
//! ComposedDocument
//! ```
//!
//! [`service`] sits in front of this pipeline and turns a record identifier
//! into a [`RenderRequest`] via a pluggable storage backend.

pub mod catalog;
pub mod compose;
pub mod config;
pub mod error;
pub mod font;
pub mod grid;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod overlay;
pub mod pdf;
pub mod service;
pub mod text;

use std::path::Path;

use catalog::LayoutCatalog;
use config::EngineConfig;
use error::ComposeError;
use font::FontContext;
use model::{ComposedDocument, PageGeometry, RenderRequest};
use overlay::RenderOptions;

/// Render one certificate onto `template`.
///
/// This is the primary entry point. Per-signer image problems never fail
/// the render; they are counted on [`ComposedDocument::dropped_signers`].
pub fn render(
    request: &RenderRequest,
    template: &[u8],
    catalog: &LayoutCatalog,
    fonts: &FontContext,
    options: &RenderOptions,
) -> Result<ComposedDocument, ComposeError> {
    let spec = catalog.resolve(&request.template_kind);
    let geometry = PageGeometry::a4(spec.orientation);

    let overlay = overlay::render(
        geometry,
        &spec,
        &request.label_text,
        &request.signers,
        fonts,
        options,
    )?;

    let grid = if request.show_grid {
        Some(grid::make_grid(geometry, options.grid_step, options.grid_font_size, fonts)?)
    } else {
        None
    };

    let bytes = compose::compose(template, &overlay.bytes, grid.as_deref())?;

    log::info!(
        "rendered '{}': {} bytes, {} signer(s) placed, {} dropped",
        request.template_kind,
        bytes.len(),
        overlay.slots.len(),
        overlay.skipped.len()
    );
    Ok(ComposedDocument::new(bytes, overlay.skipped.len()))
}

/// Render a request described as JSON. Signers' `signatureSrc` entries are
/// loaded first; a source that can't be read leaves the signer without an
/// image.
pub fn render_json(json: &str, template: &[u8], engine: &Engine) -> Result<ComposedDocument, ComposeError> {
    let mut request: RenderRequest = serde_json::from_str(json)?;
    load_signature_sources(&mut request);
    engine.render(&request, template)
}

/// Fill `signature_image` from `signature_src` where it isn't set yet.
pub fn load_signature_sources(request: &mut RenderRequest) {
    for signer in &mut request.signers {
        if signer.signature_image.is_some() {
            continue;
        }
        let Some(src) = signer.signature_src.as_deref() else { continue };
        match image_loader::read_source_bytes(src) {
            Ok(bytes) => signer.signature_image = Some(bytes),
            Err(e) => log::warn!("signature for '{}' unavailable: {}", signer.identifier, e),
        }
    }
}

/// Everything a render needs that outlives a single request: the layout
/// catalog, loaded fonts and render options. Immutable once built, so one
/// engine can serve concurrent renders.
pub struct Engine {
    catalog: LayoutCatalog,
    fonts: FontContext,
    options: RenderOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(LayoutCatalog::builtin(), FontContext::new(), RenderOptions::default())
    }
}

impl Engine {
    pub fn new(catalog: LayoutCatalog, fonts: FontContext, options: RenderOptions) -> Self {
        Self {
            catalog,
            fonts,
            options,
        }
    }

    /// Build an engine from configuration, loading its fonts. Relative font
    /// paths resolve against `base_dir`.
    pub fn from_config(config: &EngineConfig, base_dir: Option<&Path>) -> Result<Self, ComposeError> {
        Ok(Self::new(
            config.catalog(),
            config.load_fonts(base_dir)?,
            config.render_options(),
        ))
    }

    pub fn render(&self, request: &RenderRequest, template: &[u8]) -> Result<ComposedDocument, ComposeError> {
        render(request, template, &self.catalog, &self.fonts, &self.options)
    }

    /// A standalone calibration grid page for `orientation`.
    pub fn grid(&self, orientation: model::Orientation, step: Option<f64>) -> Result<Vec<u8>, ComposeError> {
        grid::make_grid(
            PageGeometry::a4(orientation),
            step.unwrap_or(self.options.grid_step),
            self.options.grid_font_size,
            &self.fonts,
        )
    }

    pub fn catalog(&self) -> &LayoutCatalog {
        &self.catalog
    }

    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}
