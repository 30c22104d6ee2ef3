//! Constants used throughout the HL7 core crate.
//!
//! This module contains the wire-format delimiters, escape sequences and identifiers so that
//! every encoder and template agrees on them.

use chrono_tz::Tz;

/// Separates components within a field.
pub const COMPONENT_SEPARATOR: char = '^';

/// Separates repeated values within a field.
pub const REPETITION_SEPARATOR: char = '~';

/// Separates sub-components within a component.
pub const SUB_COMPONENT_SEPARATOR: char = '&';

/// Introduces an escape sequence.
pub const ESCAPE_CHARACTER: char = '\\';

/// Line break inside free text.
pub const LINE_BREAK: char = '\n';

pub const ESCAPED_COMPONENT_SEPARATOR: &str = "\\S\\";
pub const ESCAPED_SUB_COMPONENT_SEPARATOR: &str = "\\T\\";
pub const ESCAPED_LINE_BREAK: &str = "\\.br\\";
pub const ESCAPED_ESCAPE_CHARACTER: &str = "\\E\\";

/// Terminates every segment of a message.
pub const SEGMENT_TERMINATOR: &str = "\r";

/// HL7v2 version written to MSH-12.
pub const HL7_VERSION: &str = "2.3";

/// `YYYYMMDDhhmmss`, the format of every timestamp on the wire.
pub const HL7_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Time zone used when none is configured.
pub const DEFAULT_TIMEZONE: Tz = Tz::UTC;

/// Environment variable holding the protocol time zone name.
pub const TIMEZONE_ENV_VAR: &str = "HL7_TIMEZONE";

/// Environment variable holding the path of the header config YAML.
pub const HEADER_CONFIG_ENV_VAR: &str = "HL7_HEADER_CONFIG";

/// OBR-24 value identifying orders that carry clinical documents.
pub const DIAGNOSTIC_SERV_ID_MDOC: &str = "MDOC";

/// Message codes.
pub const ADT: &str = "ADT";
pub const ORM: &str = "ORM";
pub const ORR: &str = "ORR";
pub const ORU: &str = "ORU";
pub const MDM: &str = "MDM";

/// Segment identifiers used in error context.
pub const MSH: &str = "MSH";
pub const MSA: &str = "MSA";
pub const EVN: &str = "EVN";
pub const PID: &str = "PID";
pub const PD1: &str = "PD1";
pub const PV1: &str = "PV1";
pub const PV2: &str = "PV2";
pub const NK1: &str = "NK1";
pub const AL1: &str = "AL1";
pub const ORC: &str = "ORC";
pub const OBR: &str = "OBR";
pub const OBX: &str = "OBX";
pub const NTE: &str = "NTE";
pub const MRG: &str = "MRG";
pub const DG1: &str = "DG1";
pub const PR1: &str = "PR1";
pub const TXA: &str = "TXA";
