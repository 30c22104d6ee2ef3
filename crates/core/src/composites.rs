//! Composite data types shared by the segment builders.
//!
//! Each function binds one record value to its sub-template. Functions taking an `Option` (or a
//! value with a natural "unset" state, like an empty phone number or a zero visit id) return
//! `None` when there is nothing to render, which blanks the whole composite in the enclosing
//! field. Coded elements escape their free-text components; identifiers and coding systems are
//! written as they are.

use crate::encoding::escape_text;
use crate::templates::{Bindings, TemplateId, TEMPLATES};
use crate::Hl7Result;
use sim_record::{
    Address, ClinicalNote, ClinicalNoteContent, CodedElement, Doctor, PatientLocation, Person,
    PrimaryFacility,
};

fn render_present<T>(
    value: Option<T>,
    id: TemplateId,
    bind: impl FnOnce(T) -> Bindings,
) -> Hl7Result<Option<String>> {
    value
        .map(|value| TEMPLATES.render(id, &bind(value)))
        .transpose()
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// PL: a bed or other assignable location.
pub fn location(location: Option<&PatientLocation>) -> Hl7Result<Option<String>> {
    render_present(location, TemplateId::Location, |l| {
        Bindings::new()
            .with("poc", l.poc.as_str())
            .with("room", l.room.as_str())
            .with("bed", l.bed.as_str())
            .with("facility", l.facility.as_str())
            .with("location_type", l.location_type.as_str())
            .with("building", l.building.as_str())
            .with("floor", l.floor.as_str())
    })
}

/// XCN: a clinician.
pub fn doctor(doctor: Option<&Doctor>) -> Hl7Result<Option<String>> {
    render_present(doctor, TemplateId::Doctor, |d| {
        Bindings::new()
            .with("id", d.id.as_str())
            .with("surname", d.surname.as_str())
            .with("first_name", d.first_name.as_str())
            .with("prefix", d.prefix.as_str())
    })
}

/// XPN: a person's current name. Always rendered.
pub fn person_name(person: &Person) -> Hl7Result<String> {
    let bindings = Bindings::new()
        .with("surname", person.surname.as_str())
        .with("first_name", person.first_name.as_str())
        .with("middle_name", person.middle_name.as_str())
        .with("suffix", person.suffix.as_str())
        .with("prefix", person.prefix.as_str())
        .with("degree", person.degree.as_str());
    TEMPLATES.render(TemplateId::PersonName, &bindings)
}

/// XAD: a postal address.
pub fn address(address: Option<&Address>) -> Hl7Result<Option<String>> {
    render_present(address, TemplateId::Address, |a| {
        Bindings::new()
            .with("first_line", a.first_line.as_str())
            .with("second_line", a.second_line.as_str())
            .with("city", a.city.as_str())
            .with("postal_code", a.postal_code.as_str())
            .with("country", a.country.as_str())
            .with("type", a.kind.as_str())
    })
}

/// XTN: a home phone number. Empty numbers are absent.
pub fn home_number(number: &str) -> Hl7Result<Option<String>> {
    render_present(non_empty(number), TemplateId::HomeNumber, |n| {
        Bindings::new().with("number", n)
    })
}

/// CE: a coded element.
pub fn coded_element(element: Option<&CodedElement>) -> Hl7Result<Option<String>> {
    render_present(element, TemplateId::CodedElement, |ce| {
        Bindings::new()
            .with("id", escape_text(&ce.id))
            .with("text", escape_text(&ce.text))
            .with("coding_system", ce.coding_system.as_str())
            .with("alternate_text", escape_text(&ce.alternate_text))
    })
}

/// The observation identifier of a clinical note. Always rendered.
pub fn coded_note(note: &ClinicalNote) -> Hl7Result<String> {
    let bindings = Bindings::new().with("document_type", note.document_type.as_str());
    TEMPLATES.render(TemplateId::CodedNote, &bindings)
}

/// PV2-3: the admit reason as coded-element text. Empty reasons are absent.
pub fn admit_reason(reason: &str) -> Hl7Result<Option<String>> {
    render_present(non_empty(reason), TemplateId::AdmitReason, |r| {
        Bindings::new().with("reason", r)
    })
}

/// XON: the organisation a patient is registered with.
pub fn primary_facility(facility: Option<&PrimaryFacility>) -> Hl7Result<Option<String>> {
    render_present(facility, TemplateId::PrimaryFacility, |f| {
        Bindings::new()
            .with("organization", f.organization.as_str())
            .with("id", f.id.as_str())
    })
}

/// CX: a visit number. Zero means no visit.
pub fn visit_id(visit_id: u64) -> Hl7Result<Option<String>> {
    render_present((visit_id != 0).then_some(visit_id), TemplateId::VisitId, |id| {
        Bindings::new().with("visit_id", id.to_string())
    })
}

/// CX: a medical record number. Always rendered, even when empty.
pub fn mrn(mrn: &str) -> Hl7Result<String> {
    TEMPLATES.render(TemplateId::Mrn, &Bindings::new().with("mrn", mrn))
}

/// OBX-5 for a clinical document: type, encoding and escaped content.
pub fn note_value(content: &ClinicalNoteContent) -> Hl7Result<String> {
    let bindings = Bindings::new()
        .with("content_type", content.content_type.as_str())
        .with("document_encoding", content.document_encoding.as_str())
        .with("document_content", escape_text(&content.document_content));
    TEMPLATES.render(TemplateId::NoteValue, &bindings)
}
