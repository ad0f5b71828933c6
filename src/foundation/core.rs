use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDate};

use crate::foundation::error::{PlaceError, PlaceResult};

/// Opaque user identifier as decoded from a source record.
///
/// Ordering is unsigned lexicographic byte comparison, which is what the dictionary index order
/// is defined by.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawUserId(Box<[u8]>);

impl RawUserId {
    /// Wrap raw identifier bytes.
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a standard-alphabet base64 field.
    pub fn from_base64(field: &str) -> PlaceResult<Self> {
        STANDARD
            .decode(field.trim())
            .map(|b| Self(b.into_boxed_slice()))
            .map_err(|e| PlaceError::format(format!("invalid base64 user id '{field}': {e}")))
    }

    /// Encode back to standard-alphabet base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// One normalized pixel-paint event.
///
/// Serializes to the canonical `timestamp,user,x,y,color` line and parses back losslessly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Milliseconds since the Unix epoch, UTC.
    pub timestamp: i64,
    /// Dense index into the run's user dictionary.
    pub user: u32,
    /// Column, 0-based from the left edge.
    pub x: u32,
    /// Row, 0-based from the top edge.
    pub y: u32,
    /// Index into the epoch's palette.
    pub color: u8,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.timestamp, self.user, self.x, self.y, self.color
        )
    }
}

impl FromStr for Placement {
    type Err = PlaceError;

    fn from_str(s: &str) -> PlaceResult<Self> {
        let mut fields = s.trim_end_matches(['\r', '\n']).split(',');
        let placement = Self {
            timestamp: parse_field(fields.next(), "timestamp", s)?,
            user: parse_field(fields.next(), "user", s)?,
            x: parse_field(fields.next(), "x", s)?,
            y: parse_field(fields.next(), "y", s)?,
            color: parse_field(fields.next(), "color", s)?,
        };
        if fields.next().is_some() {
            return Err(PlaceError::format(format!(
                "canonical placement has more than 5 fields: '{s}'"
            )));
        }
        Ok(placement)
    }
}

fn parse_field<T: FromStr>(field: Option<&str>, name: &str, line: &str) -> PlaceResult<T> {
    let field =
        field.ok_or_else(|| PlaceError::format(format!("missing {name} field in '{line}'")))?;
    field
        .parse::<T>()
        .map_err(|_| PlaceError::format(format!("invalid {name} '{field}' in '{line}'")))
}

/// Parse a `YYYY-MM-DD HH:MM:SS[.f{1,3}][ UTC]` field into UTC milliseconds since the epoch.
///
/// One fractional digit is deciseconds, two centiseconds, three milliseconds. Any other
/// fractional width is a format error.
pub fn parse_utc_millis(field: &str) -> PlaceResult<i64> {
    let b = field.as_bytes();
    let bad = || PlaceError::format(format!("invalid timestamp '{field}'"));
    if b.len() < 19
        || b[4] != b'-'
        || b[7] != b'-'
        || (b[10] != b' ' && b[10] != b'T')
        || b[13] != b':'
        || b[16] != b':'
    {
        return Err(bad());
    }

    let year = digits(&b[0..4]).ok_or_else(bad)?;
    let month = digits(&b[5..7]).ok_or_else(bad)?;
    let day = digits(&b[8..10]).ok_or_else(bad)?;
    let hour = digits(&b[11..13]).ok_or_else(bad)?;
    let minute = digits(&b[14..16]).ok_or_else(bad)?;
    let second = digits(&b[17..19]).ok_or_else(bad)?;
    let millis = parse_fraction_millis(&b[19..]).ok_or_else(|| {
        PlaceError::format(format!(
            "malformed fractional seconds in timestamp '{field}'"
        ))
    })?;

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_milli_opt(hour, minute, second, millis))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(bad)
}

fn parse_fraction_millis(rest: &[u8]) -> Option<u32> {
    let (millis, tail) = match rest.split_first() {
        Some((b'.', frac)) => {
            let len = frac.iter().take_while(|c| c.is_ascii_digit()).count();
            let scale = match len {
                1 => 100,
                2 => 10,
                3 => 1,
                _ => return None,
            };
            (digits(&frac[..len])? * scale, &frac[len..])
        }
        _ => (0, rest),
    };
    // Only a space-separated zone suffix (` UTC`) may follow.
    (tail.is_empty() || tail[0] == b' ').then_some(millis)
}

fn digits(b: &[u8]) -> Option<u32> {
    if b.is_empty() {
        return None;
    }
    b.iter().try_fold(0u32, |acc, &c| {
        c.is_ascii_digit().then(|| acc * 10 + u32::from(c - b'0'))
    })
}

/// Render a millisecond timestamp as a fixed-width, lexically sortable UTC stamp
/// (`20220401T000500.000Z`).
pub fn sortable_utc_stamp(millis: i64) -> PlaceResult<String> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y%m%dT%H%M%S%.3fZ").to_string())
        .ok_or_else(|| PlaceError::validation(format!("timestamp {millis} is out of range")))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
