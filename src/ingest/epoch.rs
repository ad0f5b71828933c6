use std::fmt;
use std::str::FromStr;

use memchr::memchr_iter;

use crate::foundation::core::{Placement, RawUserId, parse_utc_millis};
use crate::foundation::error::{PlaceError, PlaceResult};
use crate::foundation::palette::{COLORS_2017, COLORS_2022, COLORS_2023, Palette};
use crate::ingest::context::RunContext;
use crate::ingest::users::UserDictionary;

/// Highest valid coordinate in the 2017 dataset; larger values are known-bad rows.
const LEGACY_MAX_COORD: u32 = 999;
/// 2023 coordinates are centered; this shifts them to a top-left origin.
const CENTERED_ORIGIN_2023: (i64, i64) = (1500, 1000);

/// Dataset generation. Selects field layout, color encoding and palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Epoch {
    /// `ts,user,x,y,color` with a bare palette index.
    #[serde(rename = "2017")]
    Y2017,
    /// `ts,user,#RRGGBB,"x,y"`.
    #[serde(rename = "2022")]
    Y2022,
    /// `ts,user,"x,y",#RRGGBB` with centered coordinates.
    #[serde(rename = "2023")]
    Y2023,
}

impl Epoch {
    /// Full color table of this epoch.
    pub fn palette(self) -> Palette {
        match self {
            Self::Y2017 => Palette::new(&COLORS_2017),
            Self::Y2022 => Palette::new(&COLORS_2022),
            Self::Y2023 => Palette::new(&COLORS_2023),
        }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Y2017 => "2017",
            Self::Y2022 => "2022",
            Self::Y2023 => "2023",
        })
    }
}

impl FromStr for Epoch {
    type Err = PlaceError;

    fn from_str(s: &str) -> PlaceResult<Self> {
        match s.trim() {
            "2017" => Ok(Self::Y2017),
            "2022" => Ok(Self::Y2022),
            "2023" => Ok(Self::Y2023),
            other => Err(PlaceError::validation(format!(
                "epoch must be 2017, 2022 or 2023 (got '{other}')"
            ))),
        }
    }
}

/// Result of parsing one source line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A normalized placement.
    Placement(Placement),
    /// Extra fields: a moderation or administrative line, kept verbatim elsewhere.
    Anomaly,
    /// Well-shaped but known-invalid legacy record; excluded silently.
    Dropped,
}

/// Per-epoch line parser, chosen once per run.
#[derive(Clone, Copy, Debug)]
pub struct RecordParser {
    epoch: Epoch,
    palette: Palette,
}

impl RecordParser {
    /// Create the parser for `epoch`.
    pub fn new(epoch: Epoch) -> Self {
        Self {
            epoch,
            palette: epoch.palette(),
        }
    }

    /// The epoch this parser was built for.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Extract just the user field (second column), for dictionary building.
    pub fn user_id(&self, line: &str) -> PlaceResult<RawUserId> {
        let c = Commas::scan(line.as_bytes());
        if c.len < 2 {
            return Err(malformed(line));
        }
        RawUserId::from_base64(&line[c.pos[0] + 1..c.pos[1]])
    }

    /// Parse one line against the frozen dictionary in `ctx`.
    ///
    /// Anomalies are appended to the context's anomaly collection before returning.
    pub fn parse(&self, line: &str, ctx: &RunContext) -> PlaceResult<ParseOutcome> {
        let outcome = self.parse_with(line, ctx.users())?;
        match outcome {
            ParseOutcome::Anomaly => ctx.push_anomaly(line),
            ParseOutcome::Dropped => ctx.count_dropped(),
            ParseOutcome::Placement(_) => {}
        }
        Ok(outcome)
    }

    /// Parse one line without recording side effects.
    pub fn parse_with(&self, line: &str, users: &UserDictionary) -> PlaceResult<ParseOutcome> {
        match self.epoch {
            Epoch::Y2017 => self.parse_2017(line, users),
            Epoch::Y2022 => self.parse_2022(line, users),
            Epoch::Y2023 => self.parse_2023(line, users),
        }
    }

    fn parse_2017(&self, line: &str, users: &UserDictionary) -> PlaceResult<ParseOutcome> {
        let c = Commas::scan(line.as_bytes());
        if c.len > 4 {
            return Ok(ParseOutcome::Anomaly);
        }
        let [c1, c2, c3, c4] = c.exact4(line)?;

        let (x, y) = (&line[c2 + 1..c3], &line[c3 + 1..c4]);
        if x.is_empty() || y.is_empty() {
            return Ok(ParseOutcome::Dropped);
        }
        let x = coord(x, line)?;
        let y = coord(y, line)?;
        if !(0..=i64::from(LEGACY_MAX_COORD)).contains(&x)
            || !(0..=i64::from(LEGACY_MAX_COORD)).contains(&y)
        {
            return Ok(ParseOutcome::Dropped);
        }

        let color = line[c4 + 1..]
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|&i| usize::from(i) < self.palette.len())
            .ok_or_else(|| {
                PlaceError::format(format!("invalid color index in '{line}'"))
            })?;

        Ok(ParseOutcome::Placement(Placement {
            timestamp: parse_utc_millis(&line[..c1])?,
            user: user_index(users, &line[c1 + 1..c2])?,
            x: x as u32,
            y: y as u32,
            color,
        }))
    }

    fn parse_2022(&self, line: &str, users: &UserDictionary) -> PlaceResult<ParseOutcome> {
        let c = Commas::scan(line.as_bytes());
        if c.len > 4 {
            return Ok(ParseOutcome::Anomaly);
        }
        let [c1, c2, c3, c4] = c.exact4(line)?;

        let x = unquote_start(&line[c3 + 1..c4], line)?;
        let y = unquote_end(&line[c4 + 1..], line)?;

        Ok(ParseOutcome::Placement(Placement {
            timestamp: parse_utc_millis(&line[..c1])?,
            user: user_index(users, &line[c1 + 1..c2])?,
            x: non_negative(coord(x, line)?, line)?,
            y: non_negative(coord(y, line)?, line)?,
            color: self.palette.index_of_hex(line[c2 + 1..c3].trim())?,
        }))
    }

    fn parse_2023(&self, line: &str, users: &UserDictionary) -> PlaceResult<ParseOutcome> {
        let c = Commas::scan(line.as_bytes());
        if c.len > 4 {
            return Ok(ParseOutcome::Anomaly);
        }
        let [c1, c2, c3, c4] = c.exact4(line)?;

        let x = unquote_start(&line[c2 + 1..c3], line)?;
        let y = unquote_end(&line[c3 + 1..c4], line)?;
        let (ox, oy) = CENTERED_ORIGIN_2023;

        Ok(ParseOutcome::Placement(Placement {
            timestamp: parse_utc_millis(&line[..c1])?,
            user: user_index(users, &line[c1 + 1..c2])?,
            x: non_negative(coord(x, line)? + ox, line)?,
            y: non_negative(coord(y, line)? + oy, line)?,
            color: self.palette.index_of_hex(line[c4 + 1..].trim())?,
        }))
    }
}

/// Positions of the first five separators in a line.
struct Commas {
    pos: [usize; 5],
    len: usize,
}

impl Commas {
    fn scan(bytes: &[u8]) -> Self {
        let mut pos = [0usize; 5];
        let mut len = 0;
        for p in memchr_iter(b',', bytes).take(pos.len()) {
            pos[len] = p;
            len += 1;
        }
        Self { pos, len }
    }

    fn exact4(&self, line: &str) -> PlaceResult<[usize; 4]> {
        if self.len != 4 {
            return Err(malformed(line));
        }
        Ok([self.pos[0], self.pos[1], self.pos[2], self.pos[3]])
    }
}

fn malformed(line: &str) -> PlaceError {
    PlaceError::format(format!("record has too few fields: '{line}'"))
}

fn user_index(users: &UserDictionary, field: &str) -> PlaceResult<u32> {
    let id = RawUserId::from_base64(field)?;
    users
        .index_of(&id)
        .ok_or_else(|| PlaceError::format(format!("user '{field}' is not in the dictionary")))
}

fn coord(field: &str, line: &str) -> PlaceResult<i64> {
    field
        .trim()
        .parse::<i64>()
        .map_err(|_| PlaceError::format(format!("invalid coordinate '{field}' in '{line}'")))
}

fn non_negative(v: i64, line: &str) -> PlaceResult<u32> {
    u32::try_from(v)
        .map_err(|_| PlaceError::format(format!("coordinate {v} out of range in '{line}'")))
}

fn unquote_start<'a>(field: &'a str, line: &str) -> PlaceResult<&'a str> {
    field
        .strip_prefix('"')
        .ok_or_else(|| PlaceError::format(format!("expected quoted coordinates in '{line}'")))
}

fn unquote_end<'a>(field: &'a str, line: &str) -> PlaceResult<&'a str> {
    field
        .strip_suffix('"')
        .ok_or_else(|| PlaceError::format(format!("expected quoted coordinates in '{line}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/epoch.rs"]
mod tests;
