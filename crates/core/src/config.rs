//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the builders. Builders never read environment variables themselves, so every
//! message built in one process uses the same time zone regardless of which thread builds it.

use crate::constants::DEFAULT_TIMEZONE;
use crate::{Hl7Error, Hl7Result};
use chrono_tz::Tz;

/// Message construction configuration resolved at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hl7Config {
    timezone: Tz,
}

impl Hl7Config {
    /// Create a new `Hl7Config`.
    ///
    /// `timezone` is the protocol time zone: every timestamp is rendered as local time in it, and
    /// date-only timestamps are re-based to its midnight.
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl Default for Hl7Config {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

/// Parse the protocol time zone from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns UTC. Names are IANA zone names such as
/// `Europe/London`.
pub fn timezone_from_env_value(value: Option<String>) -> Hl7Result<Tz> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value
        .map(|v| {
            v.parse::<Tz>()
                .map_err(|e| Hl7Error::InvalidInput(format!("unknown time zone '{v}': {e}")))
        })
        .transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_TIMEZONE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timezone_is_utc() {
        assert_eq!(Hl7Config::default().timezone(), Tz::UTC);
    }

    #[test]
    fn test_timezone_from_env_value() {
        assert_eq!(timezone_from_env_value(None).unwrap(), Tz::UTC);
        assert_eq!(
            timezone_from_env_value(Some("   ".into())).unwrap(),
            Tz::UTC
        );
        assert_eq!(
            timezone_from_env_value(Some(" Europe/London ".into())).unwrap(),
            Tz::Europe__London
        );
    }

    #[test]
    fn test_timezone_from_env_value_rejects_unknown_zone() {
        let err = timezone_from_env_value(Some("Mars/Olympus".into()))
            .expect_err("unknown zone should fail");
        match err {
            Hl7Error::InvalidInput(msg) => assert!(msg.contains("Mars/Olympus")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }
}
