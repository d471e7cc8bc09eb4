use std::path::PathBuf;

use crate::narrative::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

/// Application-level constants
pub const APP_NAME: &str = "MedReport";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_RECORDS_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Application data directory: ~/MedReport/, or ./MedReport when no home
/// directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Where generated reports are written by default.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Autosaved intake drafts.
pub fn drafts_dir() -> PathBuf {
    app_data_dir().join("drafts")
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medreport=info,warn"
}

/// Practice branding printed in the header, footer and signature block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub provider_name: String,
    pub provider_title: String,
}

impl Default for PracticeInfo {
    fn default() -> Self {
        Self {
            name: "The Wellness Studio".into(),
            address: "3711 Long Beach Blvd., Suite 200, Long Beach, CA, 90807".into(),
            phone: "(562) 980-0555".into(),
            provider_name: "Harold Iseke, D.C.".into(),
            provider_title: "Treating Provider".into(),
        }
    }
}

/// Runtime settings for one report run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub records_url: String,
    pub api_token: Option<String>,
    /// Storage endpoint; uploads are skipped when unset.
    pub upload_url: Option<String>,
    pub ollama_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub logo: Option<String>,
    pub signature: Option<String>,
    pub export_dir: PathBuf,
    pub practice: PracticeInfo,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            records_url: DEFAULT_RECORDS_URL.into(),
            api_token: None,
            upload_url: None,
            ollama_url: DEFAULT_OLLAMA_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            logo: None,
            signature: None,
            export_dir: exports_dir(),
            practice: PracticeInfo::default(),
        }
    }
}

impl ReportConfig {
    /// Reads `MEDREPORT_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source. Blank values
    /// count as unset; an unparseable timeout falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let timeout_secs = match get("MEDREPORT_TIMEOUT_SECS") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid MEDREPORT_TIMEOUT_SECS, using default");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            records_url: get("MEDREPORT_RECORDS_URL").unwrap_or(defaults.records_url),
            api_token: get("MEDREPORT_API_TOKEN"),
            upload_url: get("MEDREPORT_UPLOAD_URL"),
            ollama_url: get("MEDREPORT_OLLAMA_URL").unwrap_or(defaults.ollama_url),
            model: get("MEDREPORT_MODEL").unwrap_or(defaults.model),
            timeout_secs,
            logo: get("MEDREPORT_LOGO"),
            signature: get("MEDREPORT_SIGNATURE"),
            export_dir: get("MEDREPORT_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            practice: defaults.practice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("MedReport"));
    }

    #[test]
    fn exports_and_drafts_under_app_data() {
        let app = app_data_dir();
        assert!(exports_dir().starts_with(&app));
        assert!(exports_dir().ends_with("exports"));
        assert!(drafts_dir().starts_with(&app));
        assert!(drafts_dir().ends_with("drafts"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ReportConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ReportConfig::default());
        assert!(config.upload_url.is_none());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ReportConfig::from_lookup(lookup(&[
            ("MEDREPORT_RECORDS_URL", "https://emr.example.com"),
            ("MEDREPORT_API_TOKEN", "secret"),
            ("MEDREPORT_UPLOAD_URL", "https://emr.example.com/api/upload"),
            ("MEDREPORT_MODEL", "medgemma:27b"),
            ("MEDREPORT_TIMEOUT_SECS", "60"),
            ("MEDREPORT_LOGO", "/srv/logo.png"),
            ("MEDREPORT_EXPORT_DIR", "/tmp/reports"),
        ]));
        assert_eq!(config.records_url, "https://emr.example.com");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.upload_url.as_deref(), Some("https://emr.example.com/api/upload"));
        assert_eq!(config.model, "medgemma:27b");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.logo.as_deref(), Some("/srv/logo.png"));
        assert!(config.signature.is_none());
        assert_eq!(config.export_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn blank_and_invalid_values_fall_back() {
        let config = ReportConfig::from_lookup(lookup(&[
            ("MEDREPORT_API_TOKEN", "   "),
            ("MEDREPORT_TIMEOUT_SECS", "soon"),
        ]));
        assert!(config.api_token.is_none());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn practice_defaults() {
        let practice = PracticeInfo::default();
        assert_eq!(practice.name, "The Wellness Studio");
        assert_eq!(practice.phone, "(562) 980-0555");
    }
}
