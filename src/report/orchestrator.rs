use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::assemble::DocumentAssembler;
use super::publish::{
    deliver_local, publish, upload, Artifact, ArtifactStore, HttpArtifactStore, UploadError,
};
use super::types::Document;
use super::ReportError;
use crate::assets::{AssetFetcher, DefaultAssetFetcher, ReportAssets};
use crate::config::{PracticeInfo, ReportConfig};
use crate::narrative::{NarrativeGenerator, OllamaNarrator};
use crate::records::{HttpRecordSource, RecordSource};

/// What happened to the upload half of delivery.
#[derive(Debug)]
pub enum UploadStatus {
    Uploaded,
    /// No storage endpoint configured, or upload disabled.
    Skipped,
    Failed(UploadError),
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub filename: String,
    pub total_pages: usize,
    pub upload: UploadStatus,
}

/// Runs one report end to end:
/// records → assets → narrative → layout → PDF → upload + local copy
pub struct ReportComposer {
    records: Box<dyn RecordSource + Send + Sync>,
    narrator: Box<dyn NarrativeGenerator + Send + Sync>,
    assets: Box<dyn AssetFetcher + Send + Sync>,
    store: Option<Box<dyn ArtifactStore + Send + Sync>>,
    assembler: DocumentAssembler,
    logo: Option<String>,
    signature: Option<String>,
}

impl ReportComposer {
    pub fn new(
        records: Box<dyn RecordSource + Send + Sync>,
        narrator: Box<dyn NarrativeGenerator + Send + Sync>,
        assets: Box<dyn AssetFetcher + Send + Sync>,
        practice: PracticeInfo,
    ) -> Self {
        Self {
            records,
            narrator,
            assets,
            store: None,
            assembler: DocumentAssembler::new(practice),
            logo: None,
            signature: None,
        }
    }

    pub fn with_store(mut self, store: Box<dyn ArtifactStore + Send + Sync>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_asset_locations(mut self, logo: Option<String>, signature: Option<String>) -> Self {
        self.logo = logo;
        self.signature = signature;
        self
    }

    /// HTTP collaborators from configuration. `upload` false disables the store
    /// even when an endpoint is configured.
    pub fn from_config(config: &ReportConfig, upload: bool) -> Result<Self, ReportError> {
        let records = HttpRecordSource::new(
            &config.records_url,
            config.api_token.clone(),
            config.timeout_secs,
        )
        .map_err(|e| ReportError::Config(e.to_string()))?;
        let narrator = OllamaNarrator::new(&config.ollama_url, &config.model, config.timeout_secs)
            .map_err(|e| ReportError::Config(e.to_string()))?;
        let assets = DefaultAssetFetcher::new(config.timeout_secs)
            .map_err(|e| ReportError::Config(e.to_string()))?;

        let mut composer = Self::new(
            Box::new(records),
            Box::new(narrator),
            Box::new(assets),
            config.practice.clone(),
        )
        .with_asset_locations(config.logo.clone(), config.signature.clone());

        if let (true, Some(url)) = (upload, &config.upload_url) {
            let store = HttpArtifactStore::new(url, config.api_token.clone(), config.timeout_secs)
                .map_err(|e| ReportError::Config(e.to_string()))?;
            composer = composer.with_store(Box::new(store));
        }
        Ok(composer)
    }

    /// Fetches, lays out and serializes the report without delivering it.
    pub fn compose_artifact(&self, patient_id: &str) -> Result<(Document, Artifact), ReportError> {
        let patient = self.records.fetch_patient(patient_id)?;
        let visits = self.records.fetch_visits(patient_id)?;
        tracing::info!(visits = visits.len(), "Records fetched");

        let assets = ReportAssets::load(
            self.assets.as_ref(),
            self.logo.as_deref(),
            self.signature.as_deref(),
        );

        let narrative = self.narrator.generate(&patient, &visits)?;

        let document = self.assembler.assemble(&patient, &visits, &narrative);
        let artifact = publish(&document, &patient, &assets)?;
        Ok((document, artifact))
    }

    /// Generates the report, uploads it when a store is configured and writes
    /// the local copy into `export_dir`. A failed upload is reported in the
    /// outcome, never as an error.
    pub fn generate_report(
        &self,
        patient_id: &str,
        export_dir: &Path,
    ) -> Result<ReportOutcome, ReportError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("generate_report", %request_id, patient_id);
        let _guard = span.enter();

        let (document, artifact) = self.compose_artifact(patient_id).inspect_err(|e| {
            tracing::error!(error = %e, "Report generation failed");
        })?;

        let upload_status = match &self.store {
            Some(store) => match upload(store.as_ref(), &artifact) {
                Ok(()) => UploadStatus::Uploaded,
                Err(e) => UploadStatus::Failed(e),
            },
            None => UploadStatus::Skipped,
        };

        let path = deliver_local(&artifact, export_dir)?;

        tracing::info!(
            pages = document.total_pages,
            bytes = artifact.bytes.len(),
            uploaded = matches!(upload_status, UploadStatus::Uploaded),
            "Report generated"
        );

        Ok(ReportOutcome {
            path,
            filename: artifact.filename,
            total_pages: document.total_pages,
            upload: upload_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::assets::tests::{tiny_png, StaticAssets};
    use crate::models::{DischargeVisit, InitialVisit, PatientRecord, VisitCommon, VisitRecord};
    use crate::narrative::MockNarrator;
    use crate::records::InMemoryRecords;
    use crate::report::publish::RecordingStore;

    const NARRATIVE: &str = "Here is the report.\n\
        **Chief Complaint:** Low back pain after a rear-end collision.\n\
        **Assessment:** Lumbar sprain, improving with care.\n\
        **Plan:** Continue home exercises.";

    fn jane() -> PatientRecord {
        PatientRecord {
            id: "p-1".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            date_of_birth: "1985-03-14".into(),
            ..Default::default()
        }
    }

    fn visits() -> Vec<VisitRecord> {
        vec![
            VisitRecord::Initial(InitialVisit {
                common: VisitCommon {
                    date: "2024-01-10".into(),
                    ..Default::default()
                },
                chief_complaint: Some("Low back pain".into()),
                ..Default::default()
            }),
            VisitRecord::Discharge(DischargeVisit {
                prognosis: Some("Good".into()),
                ..Default::default()
            }),
        ]
    }

    fn composer(narrator: MockNarrator) -> ReportComposer {
        let assets = StaticAssets(HashMap::from([("logo.png".to_string(), tiny_png())]));
        ReportComposer::new(
            Box::new(InMemoryRecords::new().with_patient(jane(), visits())),
            Box::new(narrator),
            Box::new(assets),
            PracticeInfo::default(),
        )
        .with_asset_locations(Some("logo.png".into()), Some("missing-signature.png".into()))
    }

    #[test]
    fn composes_sections_in_fixed_order() {
        let (document, artifact) = composer(MockNarrator::new(NARRATIVE))
            .compose_artifact("p-1")
            .unwrap();
        assert_eq!(
            document.section_titles(),
            vec![
                "PATIENT INFORMATION",
                "INITIAL VISIT",
                "DISCHARGE VISIT",
                "CHIEF COMPLAINT",
                "ASSESSMENT",
                "PLAN",
                "SIGNATURE",
            ]
        );
        assert_eq!(artifact.filename, "Doe_Jane_Medical_Report.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn generate_report_writes_file_and_skips_upload_without_store() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = composer(MockNarrator::new(NARRATIVE))
            .generate_report("p-1", dir.path())
            .unwrap();
        assert_eq!(outcome.path, dir.path().join("Doe_Jane_Medical_Report.pdf"));
        assert!(outcome.path.exists());
        assert!(outcome.total_pages >= 1);
        assert!(matches!(outcome.upload, UploadStatus::Skipped));
    }

    #[test]
    fn upload_failure_still_delivers_locally() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = composer(MockNarrator::new(NARRATIVE))
            .with_store(Box::new(RecordingStore::rejecting()))
            .generate_report("p-1", dir.path())
            .unwrap();
        assert!(outcome.path.exists());
        assert!(matches!(
            outcome.upload,
            UploadStatus::Failed(UploadError::Rejected { status: 503, .. })
        ));
    }

    #[test]
    fn successful_upload_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = composer(MockNarrator::new(NARRATIVE))
            .with_store(Box::new(RecordingStore::new()))
            .generate_report("p-1", dir.path())
            .unwrap();
        assert!(matches!(outcome.upload, UploadStatus::Uploaded));
    }

    #[test]
    fn unknown_patient_is_data_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = composer(MockNarrator::new(NARRATIVE))
            .generate_report("nobody", dir.path())
            .unwrap_err();
        assert!(matches!(err, ReportError::DataFetch(_)));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn narrative_failure_aborts_whole_report() {
        let dir = tempfile::tempdir().unwrap();
        let err = composer(MockNarrator::unavailable())
            .generate_report("p-1", dir.path())
            .unwrap_err();
        assert!(matches!(err, ReportError::Narrative(_)));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn narrative_without_headings_still_produces_report() {
        let (document, _) = composer(MockNarrator::new("Patient is improving."))
            .compose_artifact("p-1")
            .unwrap();
        assert_eq!(
            document.section_titles(),
            vec!["PATIENT INFORMATION", "INITIAL VISIT", "DISCHARGE VISIT", "SIGNATURE"]
        );
    }

    #[test]
    fn from_config_respects_upload_flag() {
        let config = ReportConfig {
            upload_url: Some("http://localhost:5000/api/reports/upload".into()),
            ..ReportConfig::default()
        };
        assert!(ReportComposer::from_config(&config, true).unwrap().store.is_some());
        assert!(ReportComposer::from_config(&config, false).unwrap().store.is_none());
        let no_url = ReportConfig::default();
        assert!(ReportComposer::from_config(&no_url, true).unwrap().store.is_none());
    }
}
