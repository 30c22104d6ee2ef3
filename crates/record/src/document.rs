//! Standalone clinical documents.

use crate::{CodedElement, NullTime};
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Document {
    pub activity_date_time: NullTime,
    pub edit_date_time: NullTime,
    pub document_type: String,
    pub document_completion_status: String,
    pub unique_document_number: String,
    pub observation_identifier: Option<CodedElement>,
    /// One entry per line of the document body.
    pub content_line: Vec<String>,
}
