pub mod ollama;
pub mod prompt;

pub use ollama::*;
pub use prompt::*;

use thiserror::Error;

use crate::models::{PatientRecord, VisitRecord};

#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("Narrative request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Narrative service returned an empty response")]
    EmptyResponse,
}

/// Produces free narrative text with `**Heading:**` markers for one patient.
pub trait NarrativeGenerator {
    fn generate(
        &self,
        patient: &PatientRecord,
        visits: &[VisitRecord],
    ) -> Result<String, NarrativeError>;
}

/// Mock narrator for testing. Returns a fixed text, or fails as unreachable.
pub struct MockNarrator {
    response: Option<String>,
}

impl MockNarrator {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    pub fn unavailable() -> Self {
        Self { response: None }
    }
}

impl NarrativeGenerator for MockNarrator {
    fn generate(
        &self,
        _patient: &PatientRecord,
        _visits: &[VisitRecord],
    ) -> Result<String, NarrativeError> {
        match &self.response {
            Some(text) if text.trim().is_empty() => Err(NarrativeError::EmptyResponse),
            Some(text) => Ok(text.clone()),
            None => Err(NarrativeError::OllamaConnection("mock".into())),
        }
    }
}
