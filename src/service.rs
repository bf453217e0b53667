//! # Certificate Service
//!
//! Drives a render from a record identifier: checks the record is
//! renderable, picks the template, gathers eligible signers with their
//! signature images and hands the assembled [`RenderRequest`] to the engine.
//!
//! Storage is behind [`CertificateSource`]. [`DirectorySource`] is a plain
//! on-disk layout used by the CLI and tests:
//!
//! ```text
//! <root>/records/<id>.json
//! <root>/users/<id>.json
//! <root>/templates/<kind>.pdf
//! <root>/signatures/<id>.{png,jpg,jpeg}
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{resolve_template_kind, KindPolicy};
use crate::config::EngineConfig;
use crate::error::ComposeError;
use crate::model::{ComposedDocument, RenderRequest, Signer};
use crate::Engine;

/// The thing a certificate is issued for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Approval state, e.g. `approved`.
    pub state: String,
    /// Request type; combined with the nominee's gender to pick a template.
    #[serde(rename = "type")]
    pub request_type: String,
    pub nominee_id: String,
    /// Everyone who handled the record, in order. Candidate signers.
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// External lookups the service depends on. `Ok(None)` means "not found".
pub trait CertificateSource {
    fn fetch_record(&self, id: &str) -> Result<Option<Record>, ComposeError>;
    fn fetch_user(&self, id: &str) -> Result<Option<UserProfile>, ComposeError>;
    fn fetch_template(&self, kind: &str) -> Result<Option<Vec<u8>>, ComposeError>;
    fn fetch_signature(&self, user_id: &str) -> Result<Option<Vec<u8>>, ComposeError>;
}

/// Record-to-PDF pipeline over a [`CertificateSource`].
pub struct CertificateService<S: CertificateSource> {
    source: S,
    engine: Engine,
    policy: KindPolicy,
    renderable_states: Vec<String>,
    allowed_roles: Vec<String>,
}

impl<S: CertificateSource> CertificateService<S> {
    pub fn new(source: S, engine: Engine, config: &EngineConfig) -> Self {
        Self {
            source,
            engine,
            policy: config.kind_policy(),
            renderable_states: config.renderable_states.clone(),
            allowed_roles: config.allowed_roles.clone(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Build the certificate for `record_id`.
    pub fn generate(&self, record_id: &str, show_grid: bool) -> Result<ComposedDocument, ComposeError> {
        let request = self.build_request(record_id, show_grid)?;

        let template = self
            .source
            .fetch_template(&request.template_kind)?
            .ok_or_else(|| ComposeError::TemplateNotFound(request.template_kind.clone()))?;

        self.engine.render(&request, &template)
    }

    /// Resolve a record into a render request without rendering it.
    pub fn build_request(&self, record_id: &str, show_grid: bool) -> Result<RenderRequest, ComposeError> {
        let record = self
            .source
            .fetch_record(record_id)?
            .ok_or_else(|| ComposeError::RecordNotRenderable(format!("record '{}' not found", record_id)))?;

        if !self.renderable_states.iter().any(|s| *s == record.state) {
            return Err(ComposeError::RecordNotRenderable(format!(
                "record '{}' is in state '{}'",
                record_id, record.state
            )));
        }

        let nominee = self.source.fetch_user(&record.nominee_id)?.ok_or_else(|| {
            ComposeError::RecordNotRenderable(format!("nominee '{}' not found", record.nominee_id))
        })?;
        let gender = nominee.gender.as_deref().unwrap_or("");
        let template_kind = resolve_template_kind(&record.request_type, gender, &self.policy)?;
        log::debug!("record '{}' uses template kind '{}'", record_id, template_kind);

        let signers = self.eligible_signers(&record)?;
        if signers.is_empty() {
            return Err(ComposeError::NoEligibleSigners(format!(
                "no participant of record '{}' holds a signing role",
                record_id
            )));
        }

        let label_text = non_empty(nominee.display_name).unwrap_or_else(|| record.nominee_id.clone());

        Ok(RenderRequest {
            template_kind,
            label_text,
            orientation: Default::default(),
            signers,
            show_grid,
        })
    }

    /// Participants holding an allowed role, de-duplicated in first-seen order.
    fn eligible_signers(&self, record: &Record) -> Result<Vec<Signer>, ComposeError> {
        let mut seen = HashSet::new();
        let mut signers = Vec::new();

        for id in &record.participants {
            if !seen.insert(id.as_str()) {
                continue;
            }
            let Some(user) = self.source.fetch_user(id)? else {
                log::debug!("participant '{}' has no profile", id);
                continue;
            };
            if !user.roles.iter().any(|r| self.allowed_roles.contains(r)) {
                continue;
            }
            signers.push(Signer {
                identifier: id.clone(),
                display_name: non_empty(user.display_name).unwrap_or_else(|| id.clone()),
                title: user.title.unwrap_or_default(),
                signature_image: self.source.fetch_signature(id)?,
                signature_src: None,
            });
        }

        Ok(signers)
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// A [`CertificateSource`] backed by a directory tree.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a file, mapping "doesn't exist" to `None`.
    fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, ComposeError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ComposeError::RenderError(format!(
                "Failed to read '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    /// Reject identifiers that would escape the store directory.
    fn file_name(id: &str) -> Option<&str> {
        let ok = !id.is_empty() && !id.contains(&['/', '\\'][..]) && id != "." && id != "..";
        ok.then_some(id)
    }
}

impl CertificateSource for DirectorySource {
    fn fetch_record(&self, id: &str) -> Result<Option<Record>, ComposeError> {
        let Some(name) = Self::file_name(id) else { return Ok(None) };
        let path = self.root.join("records").join(format!("{}.json", name));
        let Some(bytes) = Self::read_optional(&path)? else { return Ok(None) };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ComposeError::RecordNotRenderable(format!("record '{}' is malformed: {}", id, e)))
    }

    fn fetch_user(&self, id: &str) -> Result<Option<UserProfile>, ComposeError> {
        let Some(name) = Self::file_name(id) else { return Ok(None) };
        let path = self.root.join("users").join(format!("{}.json", name));
        match Self::read_optional(&path)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn fetch_template(&self, kind: &str) -> Result<Option<Vec<u8>>, ComposeError> {
        let Some(name) = Self::file_name(kind) else { return Ok(None) };
        Self::read_optional(&self.root.join("templates").join(format!("{}.pdf", name)))
    }

    fn fetch_signature(&self, user_id: &str) -> Result<Option<Vec<u8>>, ComposeError> {
        let Some(name) = Self::file_name(user_id) else { return Ok(None) };
        for ext in ["png", "jpg", "jpeg"] {
            let path = self.root.join("signatures").join(format!("{}.{}", name, ext));
            if let Some(bytes) = Self::read_optional(&path)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}
