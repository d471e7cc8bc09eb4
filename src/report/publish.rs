//! Artifact naming, local delivery and upload.
//!
//! Upload and local delivery are independent: a failed upload never prevents
//! the local copy from being written.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::pdf::render_pdf;
use super::types::Document;
use super::ReportError;
use crate::assets::ReportAssets;
use crate::models::PatientRecord;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Serialized report ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Storage endpoint is not reachable at {0}")]
    Connection(String),

    #[error("Storage rejected upload (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),
}

fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "Unknown".to_string()
    } else {
        cleaned
    }
}

/// `{lastName}_{firstName}_Medical_Report.pdf`, with path-unsafe characters replaced.
pub fn artifact_filename(patient: &PatientRecord) -> String {
    format!(
        "{}_{}_Medical_Report.pdf",
        sanitize_component(&patient.last_name),
        sanitize_component(&patient.first_name)
    )
}

/// Serializes the document and names it after the patient.
pub fn publish(
    document: &Document,
    patient: &PatientRecord,
    assets: &ReportAssets,
) -> Result<Artifact, ReportError> {
    let filename = artifact_filename(patient);
    let title = filename.trim_end_matches(".pdf").replace('_', " ");
    let bytes = render_pdf(document, &title, assets)?;
    Ok(Artifact {
        filename,
        content_type: PDF_CONTENT_TYPE.to_string(),
        bytes,
    })
}

/// Saves the artifact into `dir`, creating it if needed. Returns the written path.
pub fn deliver_local(artifact: &Artifact, dir: &Path) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&artifact.filename);
    std::fs::write(&path, &artifact.bytes)?;
    tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "Report written");
    Ok(path)
}

pub trait ArtifactStore {
    fn upload(&self, artifact: &Artifact) -> Result<(), UploadError>;
}

/// Uploads once, logging a failure at warn. The caller decides what a failure means.
pub fn upload(store: &dyn ArtifactStore, artifact: &Artifact) -> Result<(), UploadError> {
    store.upload(artifact).inspect_err(|e| {
        tracing::warn!(bytes = artifact.bytes.len(), error = %e, "Report upload failed");
    })
}

/// Multipart POST with the artifact in the `file` field.
pub struct HttpArtifactStore {
    url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpArtifactStore {
    pub fn new(url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self, UploadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| UploadError::Http(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            token,
            client,
        })
    }
}

impl ArtifactStore for HttpArtifactStore {
    fn upload(&self, artifact: &Artifact) -> Result<(), UploadError> {
        let part = reqwest::blocking::multipart::Part::bytes(artifact.bytes.clone())
            .file_name(artifact.filename.clone())
            .mime_str(&artifact.content_type)
            .map_err(|e| UploadError::Http(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                UploadError::Connection(self.url.clone())
            } else {
                UploadError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(bytes = artifact.bytes.len(), "Report uploaded");
        Ok(())
    }
}

/// Records uploaded filenames; optionally rejects every upload.
#[derive(Default)]
pub struct RecordingStore {
    uploaded: std::sync::Mutex<Vec<String>>,
    reject: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded
            .lock()
            .map(|names| names.clone())
            .unwrap_or_default()
    }
}

impl ArtifactStore for RecordingStore {
    fn upload(&self, artifact: &Artifact) -> Result<(), UploadError> {
        if self.reject {
            return Err(UploadError::Rejected {
                status: 503,
                body: "storage unavailable".into(),
            });
        }
        if let Ok(mut names) = self.uploaded.lock() {
            names.push(artifact.filename.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PracticeInfo;
    use crate::report::assemble::DocumentAssembler;

    fn jane() -> PatientRecord {
        PatientRecord {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            ..Default::default()
        }
    }

    #[test]
    fn filename_uses_last_then_first_name() {
        assert_eq!(artifact_filename(&jane()), "Doe_Jane_Medical_Report.pdf");
    }

    #[test]
    fn filename_replaces_path_unsafe_characters() {
        let patient = PatientRecord {
            first_name: "Mary Ann".into(),
            last_name: "O'Brien/../x".into(),
            ..Default::default()
        };
        let name = artifact_filename(&patient);
        assert_eq!(name, "O_Brien_.._x_Mary_Ann_Medical_Report.pdf");
        assert!(!name.contains('/'));
    }

    #[test]
    fn filename_with_missing_names() {
        let name = artifact_filename(&PatientRecord::default());
        assert_eq!(name, "Unknown_Unknown_Medical_Report.pdf");
    }

    #[test]
    fn publish_produces_pdf_artifact() {
        let doc = DocumentAssembler::new(PracticeInfo::default()).assemble(&jane(), &[], "");
        let artifact = publish(&doc, &jane(), &ReportAssets::none()).unwrap();
        assert_eq!(artifact.filename, "Doe_Jane_Medical_Report.pdf");
        assert_eq!(artifact.content_type, "application/pdf");
        assert!(artifact.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn deliver_local_creates_directory_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("exports");
        let artifact = Artifact {
            filename: "Doe_Jane_Medical_Report.pdf".into(),
            content_type: PDF_CONTENT_TYPE.into(),
            bytes: b"%PDF-1.3 test".to_vec(),
        };
        let path = deliver_local(&artifact, &target).unwrap();
        assert_eq!(path, target.join("Doe_Jane_Medical_Report.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.3 test");
    }

    #[test]
    fn recording_store_tracks_uploads_and_rejects() {
        let artifact = Artifact {
            filename: "a.pdf".into(),
            content_type: PDF_CONTENT_TYPE.into(),
            bytes: vec![],
        };
        let store = RecordingStore::new();
        store.upload(&artifact).unwrap();
        assert_eq!(store.uploaded(), vec!["a.pdf"]);

        let err = RecordingStore::rejecting().upload(&artifact).unwrap_err();
        assert!(matches!(err, UploadError::Rejected { status: 503, .. }));
    }
}
