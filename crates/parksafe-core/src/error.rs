use thiserror::Error;

/// Errors raised while turning raw request values into scorer inputs.
///
/// The scorer itself is total over its typed inputs; everything here is
/// a boundary failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("unrecognized day of week: {0}")]
    UnknownDay(String),
    #[error("day code out of range: {0}")]
    DayCodeOutOfRange(u8),
    #[error("hour must be an integer between 1 and 12, got {0}")]
    InvalidHour(String),
    #[error("24-hour value out of range: {0}")]
    Hour24OutOfRange(u8),
    #[error("meridiem must be AM or PM, got {0}")]
    InvalidMeridiem(String),
    #[error("zipcode must be exactly five digits, got {0}")]
    InvalidZipcode(String),
    #[error("hour encoding is not finite: sin={sin}, cos={cos}")]
    NonFiniteEncoding { sin: f64, cos: f64 },
}
