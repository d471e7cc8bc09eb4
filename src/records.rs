//! Patient and visit read interface.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{PatientRecord, VisitRecord};

#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("Records service is not reachable at {0}")]
    Connection(String),

    #[error("Patient not found: {0}")]
    NotFound(String),

    #[error("Records service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

pub trait RecordSource {
    fn fetch_patient(&self, patient_id: &str) -> Result<PatientRecord, RecordsError>;
    fn fetch_visits(&self, patient_id: &str) -> Result<Vec<VisitRecord>, RecordsError>;
}

/// JSON records API: `GET {base}/api/patients/{id}` and `.../{id}/visits`.
pub struct HttpRecordSource {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpRecordSource {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, RecordsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RecordsError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn patient_url(&self, patient_id: &str) -> String {
        format!("{}/api/patients/{}", self.base_url, patient_id)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, patient_id: &str) -> Result<T, RecordsError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                RecordsError::Connection(self.base_url.clone())
            } else {
                RecordsError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RecordsError::NotFound(patient_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RecordsError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .map_err(|e| RecordsError::HttpClient(e.to_string()))?;
        parse_json(&text)
    }
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, RecordsError> {
    serde_json::from_str(text).map_err(|e| RecordsError::Malformed(e.to_string()))
}

impl RecordSource for HttpRecordSource {
    fn fetch_patient(&self, patient_id: &str) -> Result<PatientRecord, RecordsError> {
        let url = self.patient_url(patient_id);
        self.get_json(&url, patient_id)
    }

    fn fetch_visits(&self, patient_id: &str) -> Result<Vec<VisitRecord>, RecordsError> {
        let url = format!("{}/visits", self.patient_url(patient_id));
        let visits: Vec<VisitRecord> = self.get_json(&url, patient_id)?;
        tracing::debug!(patient_id, visits = visits.len(), "Fetched visits");
        Ok(visits)
    }
}

/// In-memory record source for testing.
#[derive(Default)]
pub struct InMemoryRecords {
    patients: HashMap<String, PatientRecord>,
    visits: HashMap<String, Vec<VisitRecord>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patient(mut self, patient: PatientRecord, visits: Vec<VisitRecord>) -> Self {
        self.visits.insert(patient.id.clone(), visits);
        self.patients.insert(patient.id.clone(), patient);
        self
    }
}

impl RecordSource for InMemoryRecords {
    fn fetch_patient(&self, patient_id: &str) -> Result<PatientRecord, RecordsError> {
        self.patients
            .get(patient_id)
            .cloned()
            .ok_or_else(|| RecordsError::NotFound(patient_id.to_string()))
    }

    fn fetch_visits(&self, patient_id: &str) -> Result<Vec<VisitRecord>, RecordsError> {
        if !self.patients.contains_key(patient_id) {
            return Err(RecordsError::NotFound(patient_id.to_string()));
        }
        Ok(self.visits.get(patient_id).cloned().unwrap_or_default())
    }
}
