//! Field encoding.
//!
//! Pure conversions from record values to wire-safe field text: timestamp formatting in the
//! protocol time zone, escaping of reserved characters, and packing of multi-line values.

use crate::composites;
use crate::constants::{
    COMPONENT_SEPARATOR, ESCAPED_COMPONENT_SEPARATOR, ESCAPED_ESCAPE_CHARACTER,
    ESCAPED_LINE_BREAK, ESCAPED_SUB_COMPONENT_SEPARATOR, ESCAPE_CHARACTER, HL7_DATE_FORMAT,
    LINE_BREAK, REPETITION_SEPARATOR, SUB_COMPONENT_SEPARATOR,
};
use crate::{Hl7Error, Hl7Result};
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use sim_record::NullTime;

/// Formats a nullable timestamp as `YYYYMMDDhhmmss` local time in `timezone`.
///
/// - An invalid (absent) timestamp renders as an empty string.
/// - A valid timestamp is converted into `timezone`.
/// - A midnight timestamp is converted into `timezone` first and then truncated to that local
///   date's midnight, so a date-only value can land on the next or previous calendar day
///   compared to its UTC representation.
///
/// # Errors
///
/// Returns [`Hl7Error::NonUtcTimestamp`] if the timestamp is not held in UTC. Callers must
/// normalise before formatting; the value is never shifted silently.
pub fn format_date(value: &NullTime, timezone: Tz) -> Hl7Result<String> {
    let (at, midnight) = match value {
        NullTime::Invalid => return Ok(String::new()),
        NullTime::Valid(at) => (at, false),
        NullTime::Midnight(at) => (at, true),
    };

    if at.timezone() != Tz::UTC {
        return Err(Hl7Error::NonUtcTimestamp {
            timezone: at.timezone().name().to_string(),
        });
    }

    let local = at.with_timezone(&timezone);
    if midnight {
        let local_midnight = local.date_naive().and_time(NaiveTime::MIN);
        return Ok(local_midnight.format(HL7_DATE_FORMAT).to_string());
    }
    Ok(local.format(HL7_DATE_FORMAT).to_string())
}

/// Formats an instant that is known to be UTC, such as a message or event time.
pub fn format_instant(at: DateTime<Utc>, timezone: Tz) -> String {
    at.with_timezone(&timezone)
        .format(HL7_DATE_FORMAT)
        .to_string()
}

/// Turns a multi-line value into repeated values of one field.
pub fn pack_repeated(value: &str) -> String {
    value.replace(LINE_BREAK, &REPETITION_SEPARATOR.to_string())
}

/// Escapes the reserved characters of free text.
///
/// Every `^`, `&`, line break and `\` is replaced by its escape sequence in a single pass, so
/// the backslashes introduced by one replacement are never escaped again.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            COMPONENT_SEPARATOR => escaped.push_str(ESCAPED_COMPONENT_SEPARATOR),
            SUB_COMPONENT_SEPARATOR => escaped.push_str(ESCAPED_SUB_COMPONENT_SEPARATOR),
            LINE_BREAK => escaped.push_str(ESCAPED_LINE_BREAK),
            ESCAPE_CHARACTER => escaped.push_str(ESCAPED_ESCAPE_CHARACTER),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escapes a unit of measure. Only the component separator is reserved in units.
pub fn escape_unit(value: &str) -> String {
    value.replace(COMPONENT_SEPARATOR, ESCAPED_COMPONENT_SEPARATOR)
}

/// Renders identifiers as repeated MRN composites.
pub fn expand_identifier_list(identifiers: &[String]) -> Hl7Result<String> {
    let rendered = identifiers
        .iter()
        .map(|identifier| composites::mrn(identifier))
        .collect::<Hl7Result<Vec<_>>>()?;
    Ok(rendered.join(&REPETITION_SEPARATOR.to_string()))
}
