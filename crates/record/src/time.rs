//! Nullable timestamps.
//!
//! Clinical timestamps are frequently unknown, and some are only meaningful as a calendar date
//! (for example a date of birth). [`NullTime`] captures those three states explicitly.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// A timestamp that may be absent or may only carry a date.
///
/// Values built through [`NullTime::valid`] and [`NullTime::midnight`] are always stored in UTC.
/// The variants are public so that callers can also hold zoned values; message encoders reject
/// those rather than silently shifting them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<NullTimeRepr>")]
pub enum NullTime {
    /// No value.
    #[default]
    Invalid,
    /// A precise instant.
    Valid(DateTime<Tz>),
    /// A date-only value. Only the calendar date of the instant, seen from the protocol time
    /// zone, is significant.
    Midnight(DateTime<Tz>),
}

impl NullTime {
    pub fn valid(at: DateTime<Utc>) -> Self {
        Self::Valid(at.with_timezone(&Tz::UTC))
    }

    pub fn midnight(at: DateTime<Utc>) -> Self {
        Self::Midnight(at.with_timezone(&Tz::UTC))
    }

    pub fn invalid() -> Self {
        Self::Invalid
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Returns the underlying instant for valid and midnight values.
    pub fn instant(&self) -> Option<DateTime<Tz>> {
        match self {
            Self::Invalid => None,
            Self::Valid(at) | Self::Midnight(at) => Some(*at),
        }
    }
}

impl From<DateTime<Utc>> for NullTime {
    fn from(at: DateTime<Utc>) -> Self {
        Self::valid(at)
    }
}

/// Serialised forms: either a bare RFC 3339 instant or `{ at, midnight }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum NullTimeRepr {
    Instant(DateTime<Utc>),
    Detailed {
        at: DateTime<Utc>,
        #[serde(default)]
        midnight: bool,
    },
}

impl From<Option<NullTimeRepr>> for NullTime {
    fn from(repr: Option<NullTimeRepr>) -> Self {
        match repr {
            None => Self::Invalid,
            Some(NullTimeRepr::Instant(at)) => Self::valid(at),
            Some(NullTimeRepr::Detailed { at, midnight: true }) => Self::midnight(at),
            Some(NullTimeRepr::Detailed { at, midnight: false }) => Self::valid(at),
        }
    }
}
