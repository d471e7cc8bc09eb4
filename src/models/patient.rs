//! Patient record as served by the records API (camelCase JSON, Mongo `_id`).

use serde::{Deserialize, Serialize};

use super::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRecord {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date_of_birth: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub accident_date: Option<String>,
    pub accident_type: Option<String>,
    pub marital_status: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub address: Address,
    #[serde(deserialize_with = "null_as_default")]
    pub medical_history: MedicalHistory,
    pub subjective: Option<SubjectiveIntake>,
    pub attorney: Option<Attorney>,
}

impl PatientRecord {
    /// "First Last", trimmed when either part is missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Body-part intakes, empty when no subjective intake was recorded.
    pub fn intakes(&self) -> &[BodyPartIntake] {
        self.subjective
            .as_ref()
            .map(|s| s.intakes.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    #[serde(deserialize_with = "null_as_default")]
    pub street: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub zip_code: String,
    pub country: Option<String>,
}

impl Address {
    /// Single-line postal form, skipping blank parts.
    pub fn one_line(&self) -> String {
        let state_zip = [self.state.trim(), self.zip_code.trim()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [
            self.street.trim(),
            self.city.trim(),
            state_zip.as_str(),
            self.country.as_deref().unwrap_or("").trim(),
        ]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Five free-form history categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalHistory {
    #[serde(deserialize_with = "null_as_default")]
    pub allergies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub medications: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub conditions: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub surgeries: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub family_history: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectiveIntake {
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub physical: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub sleep: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub cognitive: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub digestive: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub emotional: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub intakes: Vec<BodyPartIntake>,
}

/// Subjective complaint for one affected body part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyPartIntake {
    #[serde(deserialize_with = "null_as_default")]
    pub body_part: String,
    #[serde(deserialize_with = "null_as_default")]
    pub side: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headache: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quality: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub timing: String,
    #[serde(deserialize_with = "null_as_default")]
    pub context: String,
    #[serde(deserialize_with = "null_as_default")]
    pub exacerbated_by: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub symptoms: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub radiating_to: String,
    #[serde(deserialize_with = "null_as_default")]
    pub radiating_right: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub radiating_left: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub sciatica_right: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub sciatica_left: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
}

impl BodyPartIntake {
    pub fn new(body_part: &str, side: &str) -> Self {
        Self {
            body_part: body_part.to_string(),
            side: side.to_string(),
            ..Default::default()
        }
    }

    /// "Lumbar (Left)" or just the body part when no side is set.
    pub fn label(&self) -> String {
        if self.side.trim().is_empty() {
            self.body_part.clone()
        } else {
            format!("{} ({})", self.body_part, self.side)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attorney {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub firm: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    pub case_number: Option<String>,
    pub address: Option<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_patient() {
        let json = r#"{
            "_id": "p-1",
            "firstName": "Jane",
            "lastName": "Doe",
            "dateOfBirth": "1985-04-12",
            "address": {"street": "1 Main St", "city": "Long Beach", "state": "CA", "zipCode": "90807"},
            "medicalHistory": {"allergies": ["Penicillin"], "familyHistory": []},
            "subjective": {"intakes": [{"bodyPart": "Lumbar", "side": "Left", "severity": "7/10", "radiatingLeft": true}]},
            "__v": 0
        }"#;
        let patient: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(patient.id, "p-1");
        assert_eq!(patient.full_name(), "Jane Doe");
        assert_eq!(patient.medical_history.allergies, vec!["Penicillin"]);
        assert_eq!(patient.intakes().len(), 1);
        assert!(patient.intakes()[0].radiating_left);
        assert!(patient.attorney.is_none());
    }

    #[test]
    fn full_name_trims_missing_parts() {
        let patient = PatientRecord {
            first_name: "  ".into(),
            last_name: "Doe".into(),
            ..Default::default()
        };
        assert_eq!(patient.full_name(), "Doe");
    }

    #[test]
    fn address_one_line_skips_blanks() {
        let address = Address {
            street: "3711 Long Beach Blvd.".into(),
            city: "Long Beach".into(),
            state: "CA".into(),
            zip_code: "90807".into(),
            country: None,
        };
        assert_eq!(address.one_line(), "3711 Long Beach Blvd., Long Beach, CA 90807");
        assert_eq!(Address::default().one_line(), "");
    }

    #[test]
    fn intake_label_with_and_without_side() {
        assert_eq!(BodyPartIntake::new("Neck", "").label(), "Neck");
        assert_eq!(BodyPartIntake::new("Knee", "Right").label(), "Knee (Right)");
    }
}
