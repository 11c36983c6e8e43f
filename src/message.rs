//! Message record and its RFC 3339 wire encoding.
//!
//! Internally a message carries its timestamp as epoch seconds plus the
//! offset (seconds east of UTC) it was written with. The offset is kept only
//! so the timestamp can be rendered back exactly as it arrived; ordering and
//! indexing use `time` alone.

use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Malformed or unrepresentable message input.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid RFC 3339 timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("invalid RFC 3339 timestamp {0:?}: 'T' and 'Z' must be upper case")]
    LowercaseDesignator(String),
    #[error("message has no timestamp")]
    MissingTimestamp,
    #[error("timestamp out of range: {0}")]
    TimeOutOfRange(i64),
    #[error("timezone offset out of range: {0}")]
    OffsetOutOfRange(i32),
}

/// A stored message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Message {
    pub id: String,
    pub name: String,
    pub email: String,
    pub text: String,
    /// Seconds since the Unix epoch, UTC.
    pub time: i64,
    /// Seconds east of UTC.
    pub tz_offset: i32,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        text: impl Into<String>,
        time: i64,
        tz_offset: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            text: text.into(),
            time,
            tz_offset,
        }
    }

    /// Build a message from an RFC 3339 timestamp string.
    pub fn with_timestamp(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        text: impl Into<String>,
        timestamp: &str,
    ) -> Result<Self, MessageError> {
        let (time, tz_offset) = parse_timestamp(timestamp)?;
        Ok(Self::new(id, name, email, text, time, tz_offset))
    }

    /// The timestamp rendered in the offset it was written with.
    pub fn timestamp(&self) -> Result<String, MessageError> {
        format_timestamp(self.time, self.tz_offset)
    }
}

/// Parse an RFC 3339 timestamp into `(epoch seconds, offset seconds)`.
///
/// Fractional seconds are accepted and truncated. The date/time separator and
/// the UTC designator must be upper case.
pub fn parse_timestamp(value: &str) -> Result<(i64, i32), MessageError> {
    let parsed =
        OffsetDateTime::parse(value, &Rfc3339).map_err(|source| MessageError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })?;
    // A parsed value always starts with a ten byte `YYYY-MM-DD` date.
    if value.as_bytes().get(10) == Some(&b't') || value.ends_with('z') {
        return Err(MessageError::LowercaseDesignator(value.to_string()));
    }
    Ok((parsed.unix_timestamp(), parsed.offset().whole_seconds()))
}

/// Format `(epoch seconds, offset seconds)` as RFC 3339 in the given offset.
///
/// The offset is always written numerically, so a zero offset renders as
/// `+00:00` rather than `Z`.
pub fn format_timestamp(time: i64, tz_offset: i32) -> Result<String, MessageError> {
    UtcOffset::from_whole_seconds(tz_offset)
        .map_err(|_| MessageError::OffsetOutOfRange(tz_offset))?;

    // Shift to wall-clock time first so no offset conversion can overflow.
    let local = time
        .checked_add(i64::from(tz_offset))
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .filter(|local| (0..=9999).contains(&local.year()))
        .ok_or(MessageError::TimeOutOfRange(time))?;

    let clock = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let mut out = local
        .format(clock)
        .map_err(|_| MessageError::TimeOutOfRange(time))?;

    let sign = if tz_offset < 0 { '-' } else { '+' };
    let abs = tz_offset.unsigned_abs();
    out.push_str(&format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60));
    Ok(out)
}

/// JSON body of a message as it travels over the wire.
///
/// String fields default to empty when absent; the timestamp is kept raw so
/// callers can decide how to report a missing or malformed value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl TryFrom<WireMessage> for Message {
    type Error = MessageError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let timestamp = wire.time.ok_or(MessageError::MissingTimestamp)?;
        Message::with_timestamp(wire.id, wire.name, wire.email, wire.text, &timestamp)
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let timestamp = self.timestamp().map_err(S::Error::custom)?;
        let mut state = serializer.serialize_struct("Message", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("text", &self.text)?;
        state.serialize_field("time", &timestamp)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireMessage::deserialize(deserializer)?;
        Message::try_from(wire).map_err(serde::de::Error::custom)
    }
}
