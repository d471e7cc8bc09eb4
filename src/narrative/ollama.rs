use serde::{Deserialize, Serialize};

use super::prompt::{build_narrative_prompt, NARRATIVE_SYSTEM_PROMPT};
use super::{NarrativeError, NarrativeGenerator};
use crate::models::{PatientRecord, VisitRecord};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "medgemma";

/// Narrative generator backed by a local Ollama instance.
pub struct OllamaNarrator {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaNarrator {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, NarrativeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NarrativeError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Default Ollama instance at localhost:11434 with a 5-minute timeout.
    pub fn default_local() -> Result<Self, NarrativeError> {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_MODEL, 300)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> Result<String, NarrativeError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system: NARRATIVE_SYSTEM_PROMPT,
            stream: false,
            options: GenerateOptions {
                temperature: 0.3,
                num_predict: 2000,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    NarrativeError::OllamaConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    NarrativeError::Timeout(self.timeout_secs)
                } else {
                    NarrativeError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NarrativeError::OllamaError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| NarrativeError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl NarrativeGenerator for OllamaNarrator {
    fn generate(
        &self,
        patient: &PatientRecord,
        visits: &[VisitRecord],
    ) -> Result<String, NarrativeError> {
        let prompt = build_narrative_prompt(patient, visits);
        tracing::info!(
            model = %self.model,
            visits = visits.len(),
            prompt_chars = prompt.len(),
            "Requesting narrative"
        );

        let text = self.complete(&prompt)?;
        if text.trim().is_empty() {
            return Err(NarrativeError::EmptyResponse);
        }
        tracing::debug!(chars = text.len(), "Narrative received");
        Ok(text)
    }
}
