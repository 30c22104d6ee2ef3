use crate::{HeaderError, HeaderInfo, HeaderResult, MessageControlGenerator};
use serde::Deserialize;
use std::path::Path;

/// Sending and receiving parties for one family of messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderForType {
    pub sending_application: String,
    pub sending_facility: String,
    pub receiving_application: String,
    pub receiving_facility: String,
}

/// Header configuration, usually loaded from a YAML file.
///
/// ```yaml
/// default:
///   sending_application: SIMHOSP
///   sending_facility: SFAC
///   receiving_application: RAPP
///   receiving_facility: RFAC
/// oru:
///   sending_application: CERNER
///   ...
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderConfig {
    /// Used for every message without a more specific entry.
    pub default: HeaderForType,
    /// Used for result messages when present.
    #[serde(default)]
    pub oru: Option<HeaderForType>,
}

impl HeaderConfig {
    pub fn from_yaml_str(yaml: &str) -> HeaderResult<Self> {
        serde_yaml::from_str(yaml).map_err(HeaderError::YamlDeserialization)
    }

    pub fn from_path(path: &Path) -> HeaderResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(HeaderError::FileRead)?;
        Self::from_yaml_str(&yaml)
    }
}

/// Which configured header applies to a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderKind {
    Default,
    Results,
}

/// Per-message replacements for configured values. Empty strings leave the configured value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderOverrides {
    pub sending_application: String,
    pub sending_facility: String,
    pub receiving_application: String,
    pub receiving_facility: String,
}

/// Produces a [`HeaderInfo`] with a unique control id for each message.
#[derive(Debug)]
pub struct HeaderGenerator {
    config: HeaderConfig,
    control_ids: MessageControlGenerator,
}

impl HeaderGenerator {
    pub fn new(config: HeaderConfig) -> Self {
        Self::with_control_ids(config, MessageControlGenerator::new())
    }

    pub fn with_control_ids(config: HeaderConfig, control_ids: MessageControlGenerator) -> Self {
        Self {
            config,
            control_ids,
        }
    }

    /// Builds the header for the next message.
    ///
    /// Result messages use the `oru` entry when one is configured. Non-empty overrides then
    /// replace individual values, and a fresh control id is always assigned.
    pub fn new_header(&self, kind: HeaderKind, overrides: Option<&HeaderOverrides>) -> HeaderInfo {
        let base = match (kind, &self.config.oru) {
            (HeaderKind::Results, Some(oru)) => oru,
            _ => &self.config.default,
        };

        let mut header = HeaderInfo {
            sending_application: base.sending_application.clone(),
            sending_facility: base.sending_facility.clone(),
            receiving_application: base.receiving_application.clone(),
            receiving_facility: base.receiving_facility.clone(),
            message_control_id: self.control_ids.next_control_id(),
        };

        if let Some(overrides) = overrides {
            override_if_set(&mut header.sending_application, &overrides.sending_application);
            override_if_set(&mut header.sending_facility, &overrides.sending_facility);
            override_if_set(
                &mut header.receiving_application,
                &overrides.receiving_application,
            );
            override_if_set(&mut header.receiving_facility, &overrides.receiving_facility);
        }

        header
    }
}

fn override_if_set(target: &mut String, value: &str) {
    if !value.is_empty() {
        *target = value.to_string();
    }
}
