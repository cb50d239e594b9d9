use crate::error::ScoreError;

/// Los Angeles ZIP codes with elevated parking-violation rates.
/// Kept sorted so membership is a binary search.
pub const HIGH_RISK_ZIPS: [&str; 21] = [
    "90001", "90002", "90003", "90011", "90015", "90017", "90019", "90028", "90038", "90042",
    "90057", "90062", "90210", "90211", "90291", "90292", "90401", "90402", "90403", "90404",
    "90405",
];

pub fn is_high_risk_zip(zipcode: &str) -> bool {
    HIGH_RISK_ZIPS.binary_search(&zipcode).is_ok()
}

/// Accepts exactly five ASCII digits.
pub fn validate_zipcode(zipcode: &str) -> Result<&str, ScoreError> {
    if zipcode.len() == 5 && zipcode.bytes().all(|b| b.is_ascii_digit()) {
        Ok(zipcode)
    } else {
        Err(ScoreError::InvalidZipcode(zipcode.to_string()))
    }
}
