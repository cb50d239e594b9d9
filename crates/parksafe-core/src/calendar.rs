//! Day and time-of-day encodings fed to the scorer.
//!
//! Days use a fixed numeric code that is *not* calendar order: it is the
//! alphabetical position of the English day name. Hours are carried as a
//! point on the unit circle so that 23:00 and 00:00 sit next to each other.

use crate::error::ScoreError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Day name to day code, ordered by code.
pub const DAY_CODE_TABLE: [(&str, u8); 7] = [
    ("Friday", 0),
    ("Monday", 1),
    ("Saturday", 2),
    ("Sunday", 3),
    ("Thursday", 4),
    ("Tuesday", 5),
    ("Wednesday", 6),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }

    pub fn code(self) -> DayCode {
        match self {
            DayOfWeek::Friday => DayCode(0),
            DayOfWeek::Monday => DayCode(1),
            DayOfWeek::Saturday => DayCode(2),
            DayOfWeek::Sunday => DayCode(3),
            DayOfWeek::Thursday => DayCode(4),
            DayOfWeek::Tuesday => DayCode(5),
            DayOfWeek::Wednesday => DayCode(6),
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = ScoreError;

    /// Exact, case-sensitive match on the English day name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| ScoreError::UnknownDay(s.to_string()))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric day code in `0..=6`. Construction is checked, so every
/// `DayCode` the scorer sees is in range.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayCode(u8);

impl DayCode {
    pub fn value(self) -> u8 {
        self.0
    }

    pub fn day(self) -> DayOfWeek {
        match self.0 {
            0 => DayOfWeek::Friday,
            1 => DayOfWeek::Monday,
            2 => DayOfWeek::Saturday,
            3 => DayOfWeek::Sunday,
            4 => DayOfWeek::Thursday,
            5 => DayOfWeek::Tuesday,
            _ => DayOfWeek::Wednesday,
        }
    }
}

impl TryFrom<u8> for DayCode {
    type Error = ScoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        if (code as usize) < DAY_CODE_TABLE.len() {
            Ok(DayCode(code))
        } else {
            Err(ScoreError::DayCodeOutOfRange(code))
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Meridiem {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Meridiem {
    pub fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

impl FromStr for Meridiem {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AM" => Ok(Meridiem::Am),
            "PM" => Ok(Meridiem::Pm),
            other => Err(ScoreError::InvalidMeridiem(other.to_string())),
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a 12-hour clock value, tolerating surrounding whitespace.
pub fn parse_hour12(raw: &str) -> Result<u8, ScoreError> {
    let hour: u8 = raw
        .trim()
        .parse()
        .map_err(|_| ScoreError::InvalidHour(raw.to_string()))?;
    if (1..=12).contains(&hour) {
        Ok(hour)
    } else {
        Err(ScoreError::InvalidHour(raw.to_string()))
    }
}

/// 12 AM is midnight (0) and 12 PM is noon (12).
pub fn to_hour24(hour12: u8, meridiem: Meridiem) -> Result<u8, ScoreError> {
    if !(1..=12).contains(&hour12) {
        return Err(ScoreError::InvalidHour(hour12.to_string()));
    }
    Ok(match (meridiem, hour12) {
        (Meridiem::Pm, 12) => 12,
        (Meridiem::Pm, h) => h + 12,
        (Meridiem::Am, 12) => 0,
        (Meridiem::Am, h) => h,
    })
}

pub fn to_hour12(hour24: u8) -> Result<(u8, Meridiem), ScoreError> {
    let meridiem = match hour24 {
        0..=11 => Meridiem::Am,
        12..=23 => Meridiem::Pm,
        other => return Err(ScoreError::Hour24OutOfRange(other)),
    };
    let hour12 = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    Ok((hour12, meridiem))
}

/// A clock hour as `(sin, cos)` of its angle on a 24-hour circle.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct HourEncoding {
    pub sin: f64,
    pub cos: f64,
}

impl HourEncoding {
    pub fn from_hour24(hour24: u8) -> Result<Self, ScoreError> {
        if hour24 > 23 {
            return Err(ScoreError::Hour24OutOfRange(hour24));
        }
        let angle = 2.0 * PI * f64::from(hour24) / 24.0;
        Ok(Self {
            sin: angle.sin(),
            cos: angle.cos(),
        })
    }

    pub fn from_components(sin: f64, cos: f64) -> Result<Self, ScoreError> {
        if sin.is_finite() && cos.is_finite() {
            Ok(Self { sin, cos })
        } else {
            Err(ScoreError::NonFiniteEncoding { sin, cos })
        }
    }

    /// Nearest whole clock hour in `0..=23`.
    pub fn clock_hour(&self) -> u8 {
        let hours = self.sin.atan2(self.cos) * 12.0 / PI;
        (hours.round() as i64).rem_euclid(24) as u8
    }
}
