//! Patient demographics and visit state.

use crate::NullTime;
use serde::Deserialize;

/// A coded value such as an ethnicity, a relationship or a test name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodedElement {
    pub id: String,
    pub text: String,
    pub coding_system: String,
    pub alternate_text: String,
}

impl CodedElement {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Address {
    pub first_line: String,
    pub second_line: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    /// Address type, e.g. `HOME`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A person: either a patient or someone associated with one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Person {
    pub prefix: String,
    pub first_name: String,
    pub middle_name: String,
    pub surname: String,
    pub suffix: String,
    pub degree: String,
    pub gender: String,
    pub ethnicity: Option<CodedElement>,
    pub birth: NullTime,
    pub date_of_death: NullTime,
    pub address: Option<Address>,
    pub phone_number: String,
    pub mrn: String,
    pub nhs: String,
    pub death_indicator: String,
}

/// A bed, room or other place a patient can be assigned to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatientLocation {
    /// Point of care, usually the ward.
    pub poc: String,
    pub room: String,
    pub bed: String,
    pub facility: String,
    pub location_type: String,
    pub building: String,
    pub floor: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Doctor {
    pub id: String,
    pub surname: String,
    pub first_name: String,
    pub prefix: String,
    /// Informational only; never written to a message.
    pub specialty: String,
}

/// Next of kin or another contact for a patient.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssociatedParty {
    pub person: Person,
    pub relationship: Option<CodedElement>,
    pub contact_role: Option<CodedElement>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Allergy {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: CodedElement,
    pub severity: String,
    pub reaction: String,
    pub identification_date_time: NullTime,
}

/// A diagnosis or a procedure; both share the same shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosisOrProcedure {
    pub description: Option<CodedElement>,
    #[serde(rename = "type")]
    pub kind: String,
    pub clinician: Option<Doctor>,
    pub date_time: NullTime,
}

/// The organisation a patient is registered with, e.g. their GP practice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrimaryFacility {
    pub organization: String,
    pub id: String,
}

/// A patient together with the state of their current visit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatientInfo {
    pub person: Person,
    /// Patient class: EMERGENCY, INPATIENT, OUTPATIENT, PREADMIT, ...
    pub class: String,
    /// Trust-specific patient type.
    pub patient_type: String,
    /// Zero when the patient has no visit.
    pub visit_id: u64,
    pub hospital_service: String,
    pub admit_reason: String,
    pub location: Option<PatientLocation>,
    pub prior_location: Option<PatientLocation>,
    pub pending_location: Option<PatientLocation>,
    pub prior_pending_location: Option<PatientLocation>,
    pub temporary_location: Option<PatientLocation>,
    pub prior_temporary_location: Option<PatientLocation>,
    pub attending_doctor: Option<Doctor>,
    pub account_status: String,
    pub admission_date: NullTime,
    pub discharge_date: NullTime,
    pub transfer_date: NullTime,
    pub expected_admit_date_time: NullTime,
    pub expected_discharge_date_time: NullTime,
    pub expected_transfer_date_time: NullTime,
    pub associated_parties: Vec<AssociatedParty>,
    pub allergies: Vec<Allergy>,
    pub diagnoses: Vec<DiagnosisOrProcedure>,
    pub procedures: Vec<DiagnosisOrProcedure>,
    pub primary_facility: Option<PrimaryFacility>,
}
