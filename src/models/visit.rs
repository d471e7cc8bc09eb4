//! Visit records as a tagged union over the three visit kinds.
//!
//! The records API stores every visit in one collection distinguished by
//! `visitType`. Each kind gets its own struct so that section building can
//! match exhaustively; an unknown `visitType` fails deserialization instead
//! of silently producing an empty visit.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "visitType", rename_all = "lowercase")]
pub enum VisitRecord {
    Initial(InitialVisit),
    Followup(FollowupVisit),
    Discharge(DischargeVisit),
}

impl VisitRecord {
    pub fn kind(&self) -> VisitKind {
        match self {
            Self::Initial(_) => VisitKind::Initial,
            Self::Followup(_) => VisitKind::Followup,
            Self::Discharge(_) => VisitKind::Discharge,
        }
    }

    pub fn common(&self) -> &VisitCommon {
        match self {
            Self::Initial(v) => &v.common,
            Self::Followup(v) => &v.common,
            Self::Discharge(v) => &v.common,
        }
    }
}

/// Visit kind tag, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VisitKind {
    Initial,
    Followup,
    Discharge,
}

impl VisitKind {
    pub const REPORT_ORDER: [VisitKind; 3] = [Self::Initial, Self::Followup, Self::Discharge];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Followup => "followup",
            Self::Discharge => "discharge",
        }
    }

    /// Banner title used in the composed report.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Initial => "INITIAL VISIT",
            Self::Followup => "FOLLOW-UP VISIT",
            Self::Discharge => "DISCHARGE VISIT",
        }
    }
}

impl fmt::Display for VisitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a patient or doctor: a bare id, or the populated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonRef {
    Id(String),
    Person(PersonSummary),
}

impl PersonRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Person(p) => &p.id,
        }
    }

    /// Populated name, if the reference was expanded by the records API.
    pub fn display_name(&self) -> Option<String> {
        match self {
            Self::Id(_) => None,
            Self::Person(p) => {
                let name = format!("{} {}", p.first_name.trim(), p.last_name.trim());
                let name = name.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
        }
    }
}

impl Default for PersonRef {
    fn default() -> Self {
        Self::Id(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonSummary {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
}

/// A count or measure the forms send either as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(t) if t.trim().is_empty())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => f.write_str(t.trim()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitCommon {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub patient: PersonRef,
    #[serde(deserialize_with = "null_as_default")]
    pub doctor: PersonRef,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    pub notes: Option<String>,
}

// ─── Initial visit ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialVisit {
    #[serde(flatten)]
    pub common: VisitCommon,
    pub chief_complaint: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub chiropractic_adjustment: Vec<String>,
    pub chiropractic_other: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub acupuncture: Vec<String>,
    pub acupuncture_other: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub physiotherapy: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub rehabilitation_exercises: Vec<String>,
    pub duration_frequency: Option<DurationFrequency>,
    #[serde(deserialize_with = "null_as_default")]
    pub referrals: Vec<String>,
    pub imaging: Option<Imaging>,
    pub diagnostic_ultrasound: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub nerve_study: Vec<String>,
    pub restrictions: Option<Restrictions>,
    pub disability_duration: Option<String>,
    pub other_notes: Option<String>,
    pub assessment: Option<String>,
    /// Palpation findings keyed by body region ("cervical", "lumbar", ...).
    /// Labels are free text per region; there is no shared vocabulary.
    #[serde(deserialize_with = "null_as_default")]
    pub tenderness: BTreeMap<String, Vec<String>>,
    #[serde(deserialize_with = "null_as_default")]
    pub spasm: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DurationFrequency {
    pub times_per_week: Option<Quantity>,
    pub re_eval_in_weeks: Option<Quantity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Imaging {
    #[serde(deserialize_with = "null_as_default")]
    pub xray: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub mri: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub ct: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Restrictions {
    pub avoid_activity_weeks: Option<Quantity>,
    pub lifting_limit_lbs: Option<Quantity>,
    pub avoid_prolonged_sitting: Option<bool>,
}

// ─── Follow-up visit ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowupVisit {
    #[serde(flatten)]
    pub common: VisitCommon,
    pub areas: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub areas_improving: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub areas_exacerbated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub areas_same: bool,
    pub muscle_palpation: Option<String>,
    pub pain_radiating: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub rom_wnl_no_pain: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub rom_wnl_with_pain: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub rom_improved: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub rom_decreased: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub rom_same: bool,
    pub orthos: Option<Orthos>,
    pub activities_cause_pain: Option<String>,
    pub activities_cause_pain_other: Option<String>,
    pub treatment_plan: Option<TreatmentPlan>,
    pub overall_response: Option<OverallResponse>,
    pub diagnostic_study: Option<DiagnosticStudy>,
    #[serde(deserialize_with = "null_as_default")]
    pub home_care: Vec<String>,
    pub referral: Option<String>,
    pub other_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Orthos {
    pub tests: Option<String>,
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreatmentPlan {
    pub treatments: Option<String>,
    pub times_per_week: Option<Quantity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub improving: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub worse: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub same: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticStudy {
    pub study: Option<String>,
    pub body_part: Option<String>,
    pub result: Option<String>,
}

// ─── Discharge visit ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DischargeVisit {
    #[serde(flatten)]
    pub common: VisitCommon,
    pub prognosis: Option<String>,
    pub rom_percent: Option<Quantity>,
    pub diagnostic_study: Option<DiagnosticStudy>,
    #[serde(deserialize_with = "null_as_default")]
    pub future_medical_care: Vec<String>,
    pub croft_criteria: Option<String>,
    pub ama_disability: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub home_care: Vec<String>,
    pub referrals_notes: Option<String>,
    pub treatment_summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub discharge_diagnosis: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub medications_at_discharge: Vec<DischargeMedication>,
    pub follow_up_instructions: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub return_precautions: Vec<String>,
    pub discharge_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DischargeMedication {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dosage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub frequency: String,
    #[serde(deserialize_with = "null_as_default")]
    pub duration: String,
}
