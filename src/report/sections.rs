//! Builds report sections from the patient identity and from visit records.
//!
//! Field order follows each visit schema. Nested objects are composed through
//! fixed templates; empty values never produce an entry (see `Section::push`).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};

use super::theme;
use super::types::{FieldValue, Section, SectionKind};
use crate::config::PracticeInfo;
use crate::models::{
    DiagnosticStudy, DischargeVisit, DurationFrequency, FollowupVisit, Imaging, InitialVisit,
    Orthos, PatientRecord, Quantity, Restrictions, TreatmentPlan, VisitKind, VisitRecord,
};

// ─── Patient identity ─────────────────────────────────────────────────────────

pub fn patient_section(patient: &PatientRecord) -> Section {
    let mut section = Section::new(theme::TABLE_TITLE, theme::PRIMARY, SectionKind::PatientTable);
    section.push("Name", FieldValue::text(patient.full_name()));
    section.push("Date of Birth", FieldValue::text(format_date(&patient.date_of_birth)));
    section.push(
        "Date of Accident",
        FieldValue::text(format_date(patient.accident_date.as_deref().unwrap_or(""))),
    );
    section.push("Type of Accident", FieldValue::opt_text(&patient.accident_type));
    section
}

// ─── Visits ───────────────────────────────────────────────────────────────────

pub fn visit_section(visit: &VisitRecord) -> Section {
    match visit {
        VisitRecord::Initial(v) => initial_section(v),
        VisitRecord::Followup(v) => followup_section(v),
        VisitRecord::Discharge(v) => discharge_section(v),
    }
}

fn initial_section(v: &InitialVisit) -> Section {
    let mut s = Section::new(
        VisitKind::Initial.title(),
        theme::ACCENT,
        SectionKind::Fields,
    );
    s.push("Chief Complaint", FieldValue::opt_text(&v.chief_complaint));
    s.push("Chiropractic Adjustment", FieldValue::list(&v.chiropractic_adjustment));
    s.push("Chiropractic Other Notes", FieldValue::opt_text(&v.chiropractic_other));
    s.push("Acupuncture", FieldValue::list(&v.acupuncture));
    s.push("Acupuncture Other Notes", FieldValue::opt_text(&v.acupuncture_other));
    s.push("Physiotherapy", FieldValue::list(&v.physiotherapy));
    s.push("Rehabilitation Exercises", FieldValue::list(&v.rehabilitation_exercises));
    s.push(
        "Treatment Frequency",
        FieldValue::composite(v.duration_frequency.as_ref().and_then(duration_frequency)),
    );
    s.push("Referrals", FieldValue::list(&v.referrals));
    s.push("Imaging", FieldValue::composite(v.imaging.as_ref().and_then(imaging)));
    s.push("Diagnostic Ultrasound", FieldValue::opt_text(&v.diagnostic_ultrasound));
    s.push("Nerve Study", FieldValue::list(&v.nerve_study));
    s.push("Tenderness", FieldValue::composite(regional_findings(&v.tenderness)));
    s.push("Spasm", FieldValue::composite(regional_findings(&v.spasm)));
    s.push(
        "Restrictions",
        FieldValue::composite(v.restrictions.as_ref().and_then(restrictions)),
    );
    s.push("Disability Duration", FieldValue::opt_text(&v.disability_duration));
    s.push("Assessment", FieldValue::opt_text(&v.assessment));
    s.push("Other Notes", FieldValue::opt_text(&v.other_notes));
    s
}

fn followup_section(v: &FollowupVisit) -> Section {
    let mut s = Section::new(
        VisitKind::Followup.title(),
        theme::SUCCESS,
        SectionKind::Fields,
    );
    s.push("Areas", FieldValue::opt_text(&v.areas));
    s.push(
        "Areas Status",
        FieldValue::composite(flags(&[
            (v.areas_improving, "Improving"),
            (v.areas_exacerbated, "Exacerbated"),
            (v.areas_same, "Same"),
        ])),
    );
    s.push("Muscle Palpation", FieldValue::opt_text(&v.muscle_palpation));
    s.push("Pain Radiating", FieldValue::opt_text(&v.pain_radiating));
    s.push(
        "Range of Motion",
        FieldValue::composite(flags(&[
            (v.rom_wnl_no_pain, "WNL (No Pain)"),
            (v.rom_wnl_with_pain, "WNL (With Pain)"),
            (v.rom_improved, "Improved"),
            (v.rom_decreased, "Decreased"),
            (v.rom_same, "Same"),
        ])),
    );
    s.push("Orthopedic Tests", FieldValue::composite(v.orthos.as_ref().and_then(orthos)));
    s.push(
        "Activities Causing Pain",
        FieldValue::composite(join_present(
            &[&v.activities_cause_pain, &v.activities_cause_pain_other],
            " ",
        )),
    );
    s.push(
        "Treatment Plan",
        FieldValue::composite(v.treatment_plan.as_ref().and_then(treatment_plan)),
    );
    s.push(
        "Overall Response",
        FieldValue::composite(v.overall_response.as_ref().and_then(|r| {
            flags(&[(r.improving, "Improving"), (r.worse, "Worse"), (r.same, "Same")])
        })),
    );
    s.push(
        "Diagnostic Study",
        FieldValue::composite(v.diagnostic_study.as_ref().and_then(diagnostic_study)),
    );
    s.push("Home Care", FieldValue::list(&v.home_care));
    s.push("Referral", FieldValue::opt_text(&v.referral));
    s.push("Notes", FieldValue::opt_text(&v.other_notes));
    s
}

fn discharge_section(v: &DischargeVisit) -> Section {
    let mut s = Section::new(
        VisitKind::Discharge.title(),
        theme::SECONDARY,
        SectionKind::Fields,
    );
    s.push("Prognosis", FieldValue::opt_text(&v.prognosis));
    s.push(
        "Range of Motion",
        FieldValue::composite(
            present(&v.rom_percent).map(|pct| format!("{pct}% of pre-injury ROM")),
        ),
    );
    s.push(
        "Diagnostic Study",
        FieldValue::composite(v.diagnostic_study.as_ref().and_then(diagnostic_study)),
    );
    s.push("Recommended Future Medical Care", FieldValue::list(&v.future_medical_care));
    s.push("Croft Criteria", FieldValue::opt_text(&v.croft_criteria));
    s.push("AMA Disability", FieldValue::opt_text(&v.ama_disability));
    s.push("Home Care Instructions", FieldValue::list(&v.home_care));
    s.push("Referrals / Notes", FieldValue::opt_text(&v.referrals_notes));
    s.push("Treatment Summary", FieldValue::opt_text(&v.treatment_summary));
    s.push("Discharge Diagnosis", FieldValue::list(&v.discharge_diagnosis));
    s.push(
        "Medications at Discharge",
        FieldValue::records(
            v.medications_at_discharge
                .iter()
                .filter(|m| !m.name.trim().is_empty())
                .map(|m| {
                    let details = [m.dosage.trim(), m.frequency.trim(), m.duration.trim()]
                        .into_iter()
                        .filter(|d| !d.is_empty())
                        .collect::<Vec<_>>()
                        .join(", ");
                    if details.is_empty() {
                        m.name.trim().to_string()
                    } else {
                        format!("{} ({details})", m.name.trim())
                    }
                })
                .collect(),
        ),
    );
    s.push("Follow-up Instructions", FieldValue::opt_text(&v.follow_up_instructions));
    s.push("Return Precautions", FieldValue::list(&v.return_precautions));
    s.push("Discharge Status", FieldValue::opt_text(&v.discharge_status));
    s
}

// ─── Signature ────────────────────────────────────────────────────────────────

pub fn signature_section(practice: &PracticeInfo) -> Section {
    let mut s = Section::new(theme::SIGNATURE_TITLE, theme::PRIMARY, SectionKind::Signature);
    s.push("Provider", FieldValue::text(practice.provider_name.clone()));
    s.push("Title", FieldValue::text(practice.provider_title.clone()));
    s
}

// ─── Templates ────────────────────────────────────────────────────────────────

fn present(q: &Option<Quantity>) -> Option<String> {
    q.as_ref().filter(|q| !q.is_blank()).map(|q| q.to_string())
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn join_present(parts: &[&Option<String>], sep: &str) -> Option<String> {
    let joined = parts
        .iter()
        .filter_map(|p| non_blank(p))
        .collect::<Vec<_>>()
        .join(sep);
    (!joined.is_empty()).then_some(joined)
}

fn flags(set: &[(bool, &str)]) -> Option<String> {
    let labels: Vec<&str> = set.iter().filter(|(on, _)| *on).map(|(_, l)| *l).collect();
    (!labels.is_empty()).then(|| labels.join(", "))
}

/// "3 times/week, re-eval in 4 weeks"
fn duration_frequency(d: &DurationFrequency) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(n) = present(&d.times_per_week) {
        parts.push(format!("{n} times/week"));
    }
    if let Some(n) = present(&d.re_eval_in_weeks) {
        parts.push(format!("re-eval in {n} weeks"));
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// "XRAY: Lumbar, Cervical; MRI: Lumbar"
fn imaging(i: &Imaging) -> Option<String> {
    let parts: Vec<String> = [("XRAY", &i.xray), ("MRI", &i.mri), ("CT", &i.ct)]
        .into_iter()
        .filter_map(|(modality, parts)| {
            FieldValue::list(parts)
                .display()
                .map(|joined| format!("{modality}: {joined}"))
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// "Avoid activity for 2 weeks, lifting limit 20 lbs, avoid prolonged sitting"
fn restrictions(r: &Restrictions) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(weeks) = present(&r.avoid_activity_weeks) {
        parts.push(format!("avoid activity for {weeks} weeks"));
    }
    if let Some(lbs) = present(&r.lifting_limit_lbs) {
        parts.push(format!("lifting limit {lbs} lbs"));
    }
    if r.avoid_prolonged_sitting == Some(true) {
        parts.push("avoid prolonged sitting".to_string());
    }
    if parts.is_empty() {
        return None;
    }
    Some(capitalize_first(&parts.join(", ")))
}

fn orthos(o: &Orthos) -> Option<String> {
    join_present(&[&o.tests, &o.result], " - ")
}

/// "Chiropractic (3 times/week)"
fn treatment_plan(p: &TreatmentPlan) -> Option<String> {
    match (non_blank(&p.treatments), present(&p.times_per_week)) {
        (Some(t), Some(n)) => Some(format!("{t} ({n} times/week)")),
        (Some(t), None) => Some(t.to_string()),
        (None, Some(n)) => Some(format!("{n} times/week")),
        (None, None) => None,
    }
}

/// "MRI of Lumbar: Mild disc bulge"
fn diagnostic_study(d: &DiagnosticStudy) -> Option<String> {
    let subject = match (non_blank(&d.study), non_blank(&d.body_part)) {
        (Some(study), Some(part)) => Some(format!("{study} of {part}")),
        (Some(study), None) => Some(study.to_string()),
        (None, Some(part)) => Some(part.to_string()),
        (None, None) => None,
    };
    match (subject, non_blank(&d.result)) {
        (Some(subject), Some(result)) => Some(format!("{subject}: {result}")),
        (Some(subject), None) => Some(subject),
        (None, Some(result)) => Some(result.to_string()),
        (None, None) => None,
    }
}

/// "Cervical: C5, C6; Lumbar: L4"
fn regional_findings(findings: &BTreeMap<String, Vec<String>>) -> Option<String> {
    let parts: Vec<String> = findings
        .iter()
        .filter_map(|(region, labels)| {
            FieldValue::list(labels)
                .display()
                .map(|joined| format!("{}: {joined}", capitalize_first(region)))
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders ISO dates (with or without time) as MM/DD/YYYY; anything else is
/// returned trimmed and unchanged.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%m/%d/%Y").to_string();
    }
    let date_part = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%m/%d/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}
