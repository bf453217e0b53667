//! Structured error types for the certificate composition engine.
//!
//! Every fatal condition a render can hit maps to one variant, so callers
//! can report a stable kind plus a message instead of a low-level decode
//! error. Per-signer problems are not errors; see
//! [`crate::overlay::SkippedSigner`].

use thiserror::Error;

/// The unified error type returned by all public certforme API functions.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The record is missing, malformed, or not in a renderable state.
    #[error("Record not renderable: {0}")]
    RecordNotRenderable(String),
    /// No template bytes exist for the resolved template kind.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    /// The eligible-signer lookup came back empty.
    #[error("No eligible signers: {0}")]
    NoEligibleSigners(String),
    /// The template could not be decoded as a PDF with at least one page.
    #[error("Template invalid: {0}")]
    TemplateInvalid(String),
    /// A font could not be loaded or parsed.
    #[error("Font error: {0}")]
    FontError(String),
    /// Overlay generation or composition failed.
    #[error("Render error: {0}")]
    RenderError(String),
    /// Engine configuration is inconsistent or unreadable.
    #[error("Config error: {0}")]
    ConfigError(String),
    /// JSON input failed to parse.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    ParseError {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl ComposeError {
    /// Stable machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ComposeError::RecordNotRenderable(_) => "record_not_renderable",
            ComposeError::TemplateNotFound(_) => "template_not_found",
            ComposeError::NoEligibleSigners(_) => "no_eligible_signers",
            ComposeError::TemplateInvalid(_) => "template_invalid",
            ComposeError::FontError(_) => "font_error",
            ComposeError::RenderError(_) => "render_error",
            ComposeError::ConfigError(_) => "config_error",
            ComposeError::ParseError { .. } => "parse_error",
        }
    }
}

impl From<serde_json::Error> for ComposeError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ComposeError::ParseError { source: e, hint }
    }
}
