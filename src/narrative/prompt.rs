use std::fmt::Write;

use crate::models::{BodyPartIntake, PatientRecord, VisitRecord};

pub const NARRATIVE_SYSTEM_PROMPT: &str = r#"
You are a medical documentation assistant that helps create professional,
accurate medical narratives based on provided clinical data.

RULES:
1. Use ONLY the information provided. Do not invent findings, dates or values.
2. Write in a formal, clinical style, as narrative prose.
3. Do not include raw field names.
4. Start every section with its heading in bold followed by a colon, exactly
   like: **Chief Complaint:** followed by the section text.
5. Do not use bold anywhere except section headings.
"#;

/// Headings the narrative is asked to produce, in order.
pub const NARRATIVE_HEADINGS: &[&str] = &[
    "Chief Complaint",
    "Physical Examination Findings",
    "Assessment and Plan",
    "Medical History",
    "Subjective Intake",
    "Initial Visit",
    "Follow-up Visit",
    "Discharge Visit",
];

fn joined_or(items: &[String], fallback: &str) -> String {
    let present: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if present.is_empty() {
        fallback.to_string()
    } else {
        present.join(", ")
    }
}

fn text_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn sides(right: bool, left: bool) -> String {
    let set: Vec<&str> = [(right, "Right"), (left, "Left")]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect();
    if set.is_empty() {
        "None".to_string()
    } else {
        set.join(", ")
    }
}

fn write_intake(out: &mut String, intake: &BodyPartIntake) {
    let _ = writeln!(out, "{}:", intake.label());
    let _ = writeln!(out, "- Severity: {}", text_or(&intake.severity, "N/A"));
    let _ = writeln!(out, "- Timing: {}", text_or(&intake.timing, "N/A"));
    let _ = writeln!(out, "- Context: {}", text_or(&intake.context, "N/A"));
    let _ = writeln!(out, "- Quality: {}", joined_or(&intake.quality, "N/A"));
    let _ = writeln!(out, "- Exacerbated By: {}", joined_or(&intake.exacerbated_by, "N/A"));
    let _ = writeln!(out, "- Symptoms: {}", joined_or(&intake.symptoms, "N/A"));
    let _ = writeln!(out, "- Radiating To: {}", text_or(&intake.radiating_to, "N/A"));
    let _ = writeln!(out, "- Radiating Pain: {}", sides(intake.radiating_right, intake.radiating_left));
    let _ = writeln!(out, "- Sciatica: {}", sides(intake.sciatica_right, intake.sciatica_left));
    if !intake.headache.is_empty() {
        let _ = writeln!(out, "- Headache: {}", joined_or(&intake.headache, "N/A"));
    }
    let _ = writeln!(out, "- Notes: {}", text_or(&intake.notes, "N/A"));
}

/// Build the narrative prompt for one patient and their visits.
pub fn build_narrative_prompt(patient: &PatientRecord, visits: &[VisitRecord]) -> String {
    let mut out = format!(
        "Generate a comprehensive, professional medical narrative report for the following \
         patient. Use these headings, in this order, and skip a heading only when there is no \
         information for it: {}.\n\n",
        NARRATIVE_HEADINGS.join(", ")
    );

    let _ = writeln!(out, "Patient:");
    let _ = writeln!(out, "- Name: {}", text_or(&patient.full_name(), "N/A"));
    let _ = writeln!(out, "- Date of Birth: {}", text_or(&patient.date_of_birth, "N/A"));
    let _ = writeln!(out, "- Gender: {}", text_or(&patient.gender, "N/A"));
    if let Some(date) = &patient.accident_date {
        let _ = writeln!(out, "- Date of Accident: {}", text_or(date, "N/A"));
    }
    if let Some(kind) = &patient.accident_type {
        let _ = writeln!(out, "- Type of Accident: {}", text_or(kind, "N/A"));
    }
    out.push('\n');

    let history = &patient.medical_history;
    let _ = writeln!(out, "Medical History:");
    let _ = writeln!(out, "- Allergies: {}", joined_or(&history.allergies, "None"));
    let _ = writeln!(out, "- Medications: {}", joined_or(&history.medications, "None"));
    let _ = writeln!(out, "- Conditions: {}", joined_or(&history.conditions, "None"));
    let _ = writeln!(out, "- Surgeries: {}", joined_or(&history.surgeries, "None"));
    let _ = writeln!(out, "- Family History: {}", joined_or(&history.family_history, "None"));
    out.push('\n');

    if let Some(subjective) = &patient.subjective {
        let _ = writeln!(out, "Subjective Intake:");
        let review = [
            ("Physical", &subjective.physical),
            ("Sleep", &subjective.sleep),
            ("Cognitive", &subjective.cognitive),
            ("Digestive", &subjective.digestive),
            ("Emotional", &subjective.emotional),
        ];
        for (label, items) in review {
            if !items.is_empty() {
                let _ = writeln!(out, "- {label}: {}", joined_or(items, "None"));
            }
        }
        for intake in &subjective.intakes {
            write_intake(&mut out, intake);
        }
        out.push('\n');
    }

    if !visits.is_empty() {
        let _ = writeln!(out, "Visits:");
        for (i, visit) in visits.iter().enumerate() {
            let common = visit.common();
            let _ = writeln!(out, "{} #{}:", visit.kind().title(), i + 1);
            let _ = writeln!(out, "- Date: {}", text_or(&common.date, "N/A"));
            if let Some(doctor) = common.doctor.display_name() {
                let _ = writeln!(out, "- Provider: Dr. {doctor}");
            }
            let _ = writeln!(
                out,
                "- Notes: {}",
                text_or(common.notes.as_deref().unwrap_or(""), "N/A")
            );
        }
        out.push('\n');
    }

    out.push_str(
        "Write the report in a narrative, professional style, using the above information. \
         Format every heading exactly as **Heading:** followed by its text.",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InitialVisit, MedicalHistory, SubjectiveIntake, VisitCommon};

    fn patient() -> PatientRecord {
        PatientRecord {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            date_of_birth: "1985-03-14".into(),
            medical_history: MedicalHistory {
                allergies: vec!["Penicillin".into(), "Latex".into()],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn empty_history_lists_read_none() {
        let prompt = build_narrative_prompt(&patient(), &[]);
        assert!(prompt.contains("- Allergies: Penicillin, Latex"));
        assert!(prompt.contains("- Medications: None"));
        assert!(prompt.contains("- Family History: None"));
    }

    #[test]
    fn requests_every_heading_and_marker_format() {
        let prompt = build_narrative_prompt(&patient(), &[]);
        for heading in NARRATIVE_HEADINGS {
            assert!(prompt.contains(heading), "missing {heading}");
        }
        assert!(prompt.contains("**Heading:**"));
        assert!(NARRATIVE_SYSTEM_PROMPT.contains("**Chief Complaint:**"));
    }

    #[test]
    fn includes_each_body_part_intake() {
        let mut lumbar = BodyPartIntake::new("Lumbar", "Left");
        lumbar.severity = "7/10".into();
        lumbar.sciatica_left = true;
        let mut p = patient();
        p.subjective = Some(SubjectiveIntake {
            intakes: vec![lumbar, BodyPartIntake::new("Cervical", "")],
            ..Default::default()
        });

        let prompt = build_narrative_prompt(&p, &[]);
        assert!(prompt.contains("Lumbar (Left):"));
        assert!(prompt.contains("- Severity: 7/10"));
        assert!(prompt.contains("- Sciatica: Left"));
        assert!(prompt.contains("Cervical:"));
    }

    #[test]
    fn summarizes_visits_in_given_order() {
        let visit = VisitRecord::Initial(InitialVisit {
            common: VisitCommon {
                date: "2024-01-10".into(),
                notes: Some("Initial consult".into()),
                ..Default::default()
            },
            ..Default::default()
        });
        let prompt = build_narrative_prompt(&patient(), &[visit]);
        assert!(prompt.contains("INITIAL VISIT #1:"));
        assert!(prompt.contains("- Date: 2024-01-10"));
        assert!(prompt.contains("- Notes: Initial consult"));
    }

    #[test]
    fn omits_subjective_block_without_intake() {
        let prompt = build_narrative_prompt(&patient(), &[]);
        assert!(!prompt.contains("Subjective Intake:\n"));
    }
}
