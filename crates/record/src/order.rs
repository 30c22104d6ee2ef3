//! Orders and their results.

use crate::{CodedElement, Doctor, NullTime};
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Order {
    pub order_profile: Option<CodedElement>,
    pub placer: String,
    pub filler: String,
    pub order_date_time: NullTime,
    pub collected_date_time: NullTime,
    pub received_in_lab_date_time: NullTime,
    pub reported_date_time: NullTime,
    /// ORC-1, e.g. `NW`, `RE`, `CA`.
    pub order_control: String,
    /// Control id of the message that placed the order; echoed in acknowledgements.
    pub message_control_id_original_order: String,
    pub order_status: String,
    pub results_status: String,
    pub results: Vec<OrderResult>,
    /// Results sent inside the order message itself rather than in a result message.
    pub results_for_orm: Vec<OrderResult>,
    pub notes_for_orm: Vec<String>,
    pub ordering_provider: Option<Doctor>,
    pub specimen_source: String,
    /// OBR-24. `MDOC` marks an order that carries clinical documents.
    pub diagnostic_serv_id: String,
    /// Results already sent for this order in earlier messages.
    pub number_of_previous_results: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrderResult {
    pub test_name: Option<CodedElement>,
    /// Multi-valued results separate their values with `\n`.
    pub value: String,
    pub unit: String,
    pub value_type: String,
    pub range: String,
    pub abnormal_flag: String,
    pub observation_date_time: NullTime,
    pub status: String,
    pub notes: Vec<String>,
    pub clinical_note: Option<ClinicalNote>,
}

/// A clinical document sent as the payload of a result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClinicalNote {
    pub date_time: NullTime,
    pub document_title: String,
    pub document_type: String,
    pub document_id: String,
    pub contents: Vec<ClinicalNoteContent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClinicalNoteContent {
    pub observation_date_time: NullTime,
    pub content_type: String,
    pub document_encoding: String,
    pub document_content: String,
}
