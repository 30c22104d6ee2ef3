//! Fixtures shared by the builder tests.

use crate::{Hl7Config, SegmentBuilder};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use hl7_header::HeaderInfo;
use sim_record::{
    Address, Allergy, AssociatedParty, ClinicalNote, ClinicalNoteContent, CodedElement,
    DiagnosisOrProcedure, Doctor, Document, NullTime, Order, OrderResult, PatientInfo,
    PatientLocation, Person,
};

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

pub fn london_config() -> Hl7Config {
    Hl7Config::new(Tz::Europe__London)
}

pub fn london_builder() -> SegmentBuilder {
    SegmentBuilder::new(london_config())
}

fn coded(id: &str, text: &str, coding_system: &str) -> CodedElement {
    CodedElement {
        coding_system: coding_system.into(),
        ..CodedElement::new(id, text)
    }
}

pub fn header() -> HeaderInfo {
    HeaderInfo {
        sending_application: "CERNER".into(),
        sending_facility: "RAL1".into(),
        receiving_application: "STREAMS".into(),
        receiving_facility: "RAL".into(),
        message_control_id: "1".into(),
    }
}

pub fn doctor() -> Doctor {
    Doctor {
        id: "216865551019".into(),
        surname: "Osman".into(),
        first_name: "Arthur".into(),
        prefix: "Dr".into(),
        specialty: "Cardiology".into(),
    }
}

pub fn person_female() -> Person {
    Person {
        prefix: "Miss".into(),
        first_name: "Helen".into(),
        middle_name: "Matilda".into(),
        surname: "Smiths".into(),
        suffix: "Junior".into(),
        degree: "Dr".into(),
        gender: "F".into(),
        ethnicity: Some(CodedElement::new("A", "White British")),
        birth: NullTime::valid(utc(1994, 7, 4, 12, 35, 18)),
        date_of_death: NullTime::valid(utc(2020, 5, 26, 19, 28, 28)),
        address: Some(Address {
            first_line: "1 Goodwill Hunting Road".into(),
            second_line: "Kings Cross".into(),
            city: "London".into(),
            postal_code: "N1C 4AG".into(),
            country: "GBR".into(),
            kind: "HOME".into(),
        }),
        phone_number: "020 7031 3000".into(),
        mrn: "12529150521124992".into(),
        nhs: "3333381389".into(),
        death_indicator: "DECEASED".into(),
    }
}

pub fn associated_party() -> AssociatedParty {
    AssociatedParty {
        person: Person {
            prefix: "Mr".into(),
            first_name: "John".into(),
            middle_name: "George".into(),
            surname: "Smiths".into(),
            suffix: "Senior".into(),
            gender: "M".into(),
            address: Some(Address {
                first_line: "5 Goodwill Hunting Road".into(),
                city: "London".into(),
                postal_code: "N1D 4AG".into(),
                country: "GBR".into(),
                kind: "HOME".into(),
                ..Address::default()
            }),
            phone_number: "020 7031 4000".into(),
            ..Person::default()
        },
        relationship: Some(CodedElement::new("S", "SPOUSE")),
        contact_role: Some(CodedElement::new("F", "FAMILYMEM")),
    }
}

pub fn allergy() -> Allergy {
    Allergy {
        kind: "FA".into(),
        description: coded("E", "egg-containing compound", "ZAL"),
        severity: "MO".into(),
        reaction: "Skin rash".into(),
        identification_date_time: NullTime::invalid(),
    }
}

pub fn diagnosis() -> DiagnosisOrProcedure {
    DiagnosisOrProcedure {
        description: Some(CodedElement::new("A01.0", "Typhoid fever")),
        kind: "Admitting".into(),
        clinician: Some(doctor()),
        date_time: NullTime::valid(utc(2017, 1, 28, 15, 24, 24)),
    }
}

pub fn procedure() -> DiagnosisOrProcedure {
    DiagnosisOrProcedure {
        description: Some(CodedElement::new("A01.1", "Hemispherectomy")),
        kind: "A".into(),
        clinician: Some(doctor()),
        date_time: NullTime::valid(utc(2017, 1, 29, 15, 24, 24)),
    }
}

pub fn patient_info() -> PatientInfo {
    let location = PatientLocation {
        poc: "RAL 12 West".into(),
        room: "Bay01".into(),
        bed: "Bed10".into(),
        facility: "RAL RF".into(),
        location_type: "BED".into(),
        building: "RFH".into(),
        ..PatientLocation::default()
    };
    PatientInfo {
        person: person_female(),
        class: "INPATIENT".into(),
        patient_type: "EMERGENCY".into(),
        visit_id: 12341234,
        hospital_service: "180".into(),
        admit_reason: "Eye problems".into(),
        prior_location: Some(PatientLocation {
            poc: "RAL 12 East".into(),
            room: "Bay02".into(),
            bed: "Bed11".into(),
            ..location.clone()
        }),
        location: Some(location),
        attending_doctor: Some(doctor()),
        admission_date: NullTime::valid(utc(2017, 1, 26, 15, 24, 21)),
        discharge_date: NullTime::valid(utc(2018, 2, 26, 15, 24, 21)),
        transfer_date: NullTime::valid(utc(2018, 4, 28, 22, 38, 13)),
        expected_admit_date_time: NullTime::valid(utc(2017, 1, 26, 15, 24, 22)),
        expected_discharge_date_time: NullTime::valid(utc(2017, 1, 26, 15, 24, 23)),
        expected_transfer_date_time: NullTime::valid(utc(2017, 1, 26, 15, 24, 24)),
        associated_parties: vec![associated_party()],
        allergies: vec![allergy()],
        diagnoses: vec![diagnosis()],
        procedures: vec![procedure()],
        ..PatientInfo::default()
    }
}

/// A pathology order placed at `now`, with no results yet.
pub fn order(now: DateTime<Utc>) -> Order {
    Order {
        order_profile: Some(coded("lpdc-3969", "UREA AND ELECTROLYTES", "WinPath")),
        placer: "9984058".into(),
        filler: "1902082".into(),
        order_date_time: NullTime::valid(now),
        order_control: "RE".into(),
        order_status: "IP".into(),
        results_status: "C".into(),
        ..Order::default()
    }
}

/// [`order`] with two results. The first one carries two notes.
pub fn order_with_result(now: DateTime<Utc>) -> Order {
    let mut order = order(now);
    order.results = vec![
        OrderResult {
            test_name: Some(coded("lpdc-2011", "Creatinine", "WinPath")),
            value: "700".into(),
            unit: "UML".into(),
            value_type: "NM".into(),
            range: "39.00 - 308.00".into(),
            abnormal_flag: "HIGH".into(),
            observation_date_time: order.collected_date_time,
            status: "F".into(),
            notes: vec!["Note1".into(), "Note2".into()],
            clinical_note: None,
        },
        OrderResult {
            test_name: Some(coded("lpdc-2012", "Potassium", "WinPath")),
            value: "600".into(),
            unit: "UML".into(),
            value_type: "NM".into(),
            range: "39.00 - 308.00".into(),
            abnormal_flag: "HIGH".into(),
            observation_date_time: order.collected_date_time,
            status: "F".into(),
            ..OrderResult::default()
        },
    ];
    order
}

/// An `MDOC` order with one result carrying an ECG note with two content blocks, the first
/// holding `content`.
pub fn order_with_clinical_note(now: DateTime<Utc>, content: &str) -> Order {
    Order {
        order_profile: Some(CodedElement {
            alternate_text: "document-title".into(),
            ..CodedElement::new("document-type", "document-type")
        }),
        ordering_provider: Some(doctor()),
        diagnostic_serv_id: "MDOC".into(),
        results: vec![OrderResult {
            observation_date_time: NullTime::valid(now),
            clinical_note: Some(ClinicalNote {
                date_time: NullTime::valid(now),
                document_title: "document-title".into(),
                document_type: "ECG".into(),
                document_id: "document_id".into(),
                contents: vec![
                    ClinicalNoteContent {
                        observation_date_time: NullTime::valid(now),
                        content_type: "PNG".into(),
                        document_encoding: "BASE64".into(),
                        document_content: content.into(),
                    },
                    ClinicalNoteContent {
                        observation_date_time: NullTime::valid(now),
                        content_type: "rtf".into(),
                        document_encoding: "TEXT".into(),
                        document_content: "content".into(),
                    },
                ],
            }),
            ..OrderResult::default()
        }],
        ..Order::default()
    }
}

pub fn document() -> Document {
    Document {
        activity_date_time: NullTime::valid(utc(2019, 6, 15, 8, 13, 40)),
        edit_date_time: NullTime::valid(utc(2019, 11, 4, 8, 13, 40)),
        document_type: "DS".into(),
        document_completion_status: "DO".into(),
        unique_document_number: "9298345CE5003".into(),
        observation_identifier: Some(coded(
            "Established Patient 15",
            "Established Patient 15",
            "Simulation",
        )),
        content_line: vec![
            "Name : SULLY, J K (65yo, F) ID# 47Q66Q585".into(),
            "Visit date : 06/15/2019".into(),
        ],
    }
}
