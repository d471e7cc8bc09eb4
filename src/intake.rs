//! Typed edits for patient intake data.
//!
//! Each editable structure has a field enum carrying the new value, so an edit
//! can only target a field that exists and can only store a value of the
//! right type. Edits return a modified copy; the input record is untouched.

use thiserror::Error;

use crate::models::{Address, Attorney, BodyPartIntake, InitialVisit, PatientRecord, SubjectiveIntake};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Intake index {index} out of range ({len} intakes)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("At least one body-part intake must remain")]
    LastIntake,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddressField {
    Street(String),
    City(String),
    State(String),
    ZipCode(String),
    Country(Option<String>),
}

impl AddressField {
    pub fn apply(self, address: &mut Address) {
        match self {
            Self::Street(v) => address.street = v,
            Self::City(v) => address.city = v,
            Self::State(v) => address.state = v,
            Self::ZipCode(v) => address.zip_code = v,
            Self::Country(v) => address.country = v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttorneyField {
    Name(String),
    Firm(String),
    Phone(String),
    Email(String),
    CaseNumber(Option<String>),
    Address(AddressField),
}

impl AttorneyField {
    pub fn apply(self, attorney: &mut Attorney) {
        match self {
            Self::Name(v) => attorney.name = v,
            Self::Firm(v) => attorney.firm = v,
            Self::Phone(v) => attorney.phone = v,
            Self::Email(v) => attorney.email = v,
            Self::CaseNumber(v) => attorney.case_number = v,
            Self::Address(field) => field.apply(attorney.address.get_or_insert_with(Address::default)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeField {
    BodyPart(String),
    Side(String),
    Headache(Vec<String>),
    Severity(String),
    Quality(Vec<String>),
    Timing(String),
    Context(String),
    ExacerbatedBy(Vec<String>),
    Symptoms(Vec<String>),
    RadiatingTo(String),
    RadiatingRight(bool),
    RadiatingLeft(bool),
    SciaticaRight(bool),
    SciaticaLeft(bool),
    Notes(String),
}

impl IntakeField {
    pub fn apply(self, intake: &mut BodyPartIntake) {
        match self {
            Self::BodyPart(v) => intake.body_part = v,
            Self::Side(v) => intake.side = v,
            Self::Headache(v) => intake.headache = v,
            Self::Severity(v) => intake.severity = v,
            Self::Quality(v) => intake.quality = v,
            Self::Timing(v) => intake.timing = v,
            Self::Context(v) => intake.context = v,
            Self::ExacerbatedBy(v) => intake.exacerbated_by = v,
            Self::Symptoms(v) => intake.symptoms = v,
            Self::RadiatingTo(v) => intake.radiating_to = v,
            Self::RadiatingRight(v) => intake.radiating_right = v,
            Self::RadiatingLeft(v) => intake.radiating_left = v,
            Self::SciaticaRight(v) => intake.sciatica_right = v,
            Self::SciaticaLeft(v) => intake.sciatica_left = v,
            Self::Notes(v) => intake.notes = v,
        }
    }
}

impl PatientRecord {
    pub fn update_address(&self, field: AddressField) -> PatientRecord {
        let mut next = self.clone();
        field.apply(&mut next.address);
        next
    }

    /// Creates the attorney block on first edit.
    pub fn update_attorney(&self, field: AttorneyField) -> PatientRecord {
        let mut next = self.clone();
        field.apply(next.attorney.get_or_insert_with(Attorney::default));
        next
    }

    pub fn update_intake(&self, index: usize, field: IntakeField) -> Result<PatientRecord, IntakeError> {
        let mut next = self.clone();
        let intakes = &mut next.subjective.get_or_insert_with(SubjectiveIntake::default).intakes;
        let len = intakes.len();
        let intake = intakes
            .get_mut(index)
            .ok_or(IntakeError::IndexOutOfRange { index, len })?;
        field.apply(intake);
        Ok(next)
    }

    pub fn add_intake(&self, body_part: &str, side: &str) -> PatientRecord {
        let mut next = self.clone();
        next.subjective
            .get_or_insert_with(SubjectiveIntake::default)
            .intakes
            .push(BodyPartIntake::new(body_part, side));
        next
    }

    /// Removes one intake. The last remaining intake cannot be removed.
    pub fn remove_intake(&self, index: usize) -> Result<PatientRecord, IntakeError> {
        let mut next = self.clone();
        let intakes = &mut next.subjective.get_or_insert_with(SubjectiveIntake::default).intakes;
        let len = intakes.len();
        if index >= len {
            return Err(IntakeError::IndexOutOfRange { index, len });
        }
        if len == 1 {
            return Err(IntakeError::LastIntake);
        }
        intakes.remove(index);
        Ok(next)
    }
}

/// Palpation finding group on an initial visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    Tenderness,
    Spasm,
}

impl InitialVisit {
    /// Checks or unchecks `label` for `region`. Regions left with no labels
    /// are dropped.
    pub fn toggle_finding(&self, finding: Finding, region: &str, label: &str, checked: bool) -> InitialVisit {
        let mut next = self.clone();
        let map = match finding {
            Finding::Tenderness => &mut next.tenderness,
            Finding::Spasm => &mut next.spasm,
        };
        let labels = map.entry(region.to_string()).or_default();
        let present = labels.iter().any(|l| l == label);
        if checked && !present {
            labels.push(label.to_string());
        } else if !checked {
            labels.retain(|l| l != label);
        }
        if labels.is_empty() {
            map.remove(region);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_with_intakes(n: usize) -> PatientRecord {
        let mut p = PatientRecord::default();
        for i in 0..n {
            p = p.add_intake(&format!("Part {i}"), "Left");
        }
        p
    }

    #[test]
    fn address_update_leaves_original_untouched() {
        let original = PatientRecord::default();
        let updated = original.update_address(AddressField::City("Long Beach".into()));
        assert_eq!(updated.address.city, "Long Beach");
        assert_eq!(original.address.city, "");
    }

    #[test]
    fn attorney_created_on_first_edit() {
        let updated = PatientRecord::default()
            .update_attorney(AttorneyField::Name("Saul Goodman".into()))
            .update_attorney(AttorneyField::Address(AddressField::ZipCode("87101".into())));
        let attorney = updated.attorney.unwrap();
        assert_eq!(attorney.name, "Saul Goodman");
        assert_eq!(attorney.address.unwrap().zip_code, "87101");
    }

    #[test]
    fn intake_update_is_bounds_checked() {
        let p = patient_with_intakes(2);
        let updated = p.update_intake(1, IntakeField::Severity("6/10".into())).unwrap();
        assert_eq!(updated.intakes()[1].severity, "6/10");
        assert_eq!(p.intakes()[1].severity, "");

        assert_eq!(
            p.update_intake(5, IntakeField::SciaticaLeft(true)).unwrap_err(),
            IntakeError::IndexOutOfRange { index: 5, len: 2 }
        );
    }

    #[test]
    fn cannot_remove_last_intake() {
        let p = patient_with_intakes(2);
        let one = p.remove_intake(0).unwrap();
        assert_eq!(one.intakes().len(), 1);
        assert_eq!(one.intakes()[0].body_part, "Part 1");
        assert_eq!(one.remove_intake(0).unwrap_err(), IntakeError::LastIntake);
        assert!(matches!(
            one.remove_intake(3),
            Err(IntakeError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn toggling_findings_adds_and_removes_labels() {
        let visit = InitialVisit::default()
            .toggle_finding(Finding::Tenderness, "lumbar", "L4", true)
            .toggle_finding(Finding::Tenderness, "lumbar", "L5", true)
            .toggle_finding(Finding::Tenderness, "lumbar", "L4", true)
            .toggle_finding(Finding::Spasm, "cervical", "C3", true);
        assert_eq!(visit.tenderness["lumbar"], vec!["L4", "L5"]);
        assert_eq!(visit.spasm["cervical"], vec!["C3"]);

        let cleared = visit.toggle_finding(Finding::Spasm, "cervical", "C3", false);
        assert!(!cleared.spasm.contains_key("cervical"));
        assert!(visit.spasm.contains_key("cervical"));
    }
}
