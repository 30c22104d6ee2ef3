//! Message header values for generated HL7v2 messages.
//!
//! Every message needs the sending and receiving application and facility plus a message
//! control id that is unique within the process. This crate provides:
//! - [`HeaderInfo`], the values written to the MSH segment
//! - [`MessageControlGenerator`], a thread-safe source of control ids (`"1"`, `"2"`, ...)
//! - [`HeaderGenerator`], which combines a [`HeaderConfig`] loaded from YAML with per-message
//!   overrides and a fresh control id

mod control;
mod generator;

pub use control::MessageControlGenerator;
pub use generator::{HeaderConfig, HeaderForType, HeaderGenerator, HeaderKind, HeaderOverrides};

use serde::Deserialize;

/// Values written to the MSH segment of a single message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderInfo {
    pub sending_application: String,
    pub sending_facility: String,
    pub receiving_application: String,
    pub receiving_facility: String,
    /// MSH-10 Message Control ID.
    pub message_control_id: String,
}

/// Error type for header configuration.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("failed to read header config: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize header config: {0}")]
    YamlDeserialization(serde_yaml::Error),
}

/// Result type for header operations.
pub type HeaderResult<T> = Result<T, HeaderError>;
