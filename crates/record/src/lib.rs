//! # Simulated clinical record
//!
//! Read-only clinical data consumed by the HL7v2 message builders:
//! - Patients, their visit state and the people and facilities attached to them
//! - Orders, their results and any clinical notes carried in place of lab values
//! - Standalone clinical documents
//!
//! Every type deserialises from YAML or JSON so scenarios and fixtures can be authored as data.
//! Field names follow snake_case; absent fields fall back to their empty values.

mod document;
mod order;
mod patient;
mod time;

pub use document::Document;
pub use order::{ClinicalNote, ClinicalNoteContent, Order, OrderResult};
pub use patient::{
    Address, Allergy, AssociatedParty, CodedElement, DiagnosisOrProcedure, Doctor, PatientInfo,
    PatientLocation, Person, PrimaryFacility,
};
pub use time::NullTime;

/// Re-exported so callers can build zoned timestamps without a direct `chrono-tz` dependency.
pub use chrono_tz::Tz;
