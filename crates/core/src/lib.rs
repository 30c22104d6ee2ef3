//! # HL7 Core
//!
//! Builds HL7v2 (version 2.3) messages from simulated clinical records.
//!
//! This crate contains pure text construction, layered bottom-up:
//! - [`encoding`]: timestamps, escaping and repetition packing for single fields
//! - [`templates`]: the named segment and composite layouts with `{slot}` placeholders
//! - [`composites`]: composite data types (names, locations, coded elements, ...)
//! - [`segments`]: one builder per segment type
//! - [`messages`]: one assembler per message variant, plus runtime dispatch by message type
//!
//! **No I/O**: builders never read files, the environment or the clock. The protocol time
//! zone is resolved once at startup into an [`Hl7Config`] and passed in; times come from the
//! caller.

pub mod composites;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod messages;
pub mod segments;
pub mod templates;

#[cfg(test)]
mod testdata;

pub use config::{timezone_from_env_value, Hl7Config};
pub use error::{Hl7Error, Hl7Result, RenderCause};
pub use messages::{BuildRequest, Hl7Message, MessageBuilder, MessageType, SUPPORTED_VARIANTS};
pub use segments::SegmentBuilder;
