//! Scenario files describing one message to build.
//!
//! ```yaml
//! message_type: ADT^A01
//! event_time: 2018-04-28T22:38:14Z
//! patient:
//!   person: { first_name: Helen, surname: Smiths, mrn: "1234" }
//!   class: INPATIENT
//! ```
//!
//! Only `message_type` and `patient` are required. The header is either given inline or
//! generated from a header config, and times default to now.

use anyhow::Context;
use chrono::{DateTime, Utc};
use hl7_core::constants::ORU;
use hl7_core::{BuildRequest, MessageType};
use hl7_header::{HeaderGenerator, HeaderInfo, HeaderKind, HeaderOverrides};
use serde::Deserialize;
use sim_record::{Document, Order, PatientInfo};
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub message_type: MessageType,
    #[serde(default)]
    pub event_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_time: Option<DateTime<Utc>>,
    /// Used as is when present, instead of a generated header.
    #[serde(default)]
    pub header: Option<HeaderInfo>,
    #[serde(default)]
    pub header_overrides: Option<HeaderOverrides>,
    pub patient: PatientInfo,
    #[serde(default)]
    pub other_patient: Option<PatientInfo>,
    #[serde(default)]
    pub order: Option<Order>,
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub prior_mrns: Vec<String>,
}

impl Scenario {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse scenario")
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("in {}", path.display()))
    }

    /// The inline header, or a fresh one from `generator`.
    pub fn header(&self, generator: &HeaderGenerator) -> HeaderInfo {
        if let Some(header) = &self.header {
            return header.clone();
        }
        let kind = if self.message_type.code() == ORU {
            HeaderKind::Results
        } else {
            HeaderKind::Default
        };
        generator.new_header(kind, self.header_overrides.as_ref())
    }

    /// Everything the message builder needs, with missing times set to `now`.
    pub fn request<'a>(&'a self, header: &'a HeaderInfo, now: DateTime<Utc>) -> BuildRequest<'a> {
        let event_time = self.event_time.unwrap_or(now);
        let message_time = self.message_time.unwrap_or(event_time);
        let mut request = BuildRequest::new(
            &self.message_type,
            header,
            &self.patient,
            event_time,
            message_time,
        )
        .with_prior_mrns(&self.prior_mrns);
        if let Some(order) = &self.order {
            request = request.with_order(order);
        }
        if let Some(document) = &self.document {
            request = request.with_document(document);
        }
        if let Some(other) = &self.other_patient {
            request = request.with_other_patient(other);
        }
        request
    }
}
