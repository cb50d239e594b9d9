//! JSON shapes exchanged with the dashboard.
//!
//! Inbound fields are read as loose JSON values: the dashboard sends
//! strings, but older clients post the hour as a number, and an empty
//! string counts as absent.

use chrono::{SecondsFormat, Utc};
use parksafe_core::{DayOfWeek, RiskAnalysis, RiskLevel, RiskResult, TimelinePoint};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SERVICE_VERSION: &str = "1.0.0";

#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub zipcode: Option<Value>,
    #[serde(default)]
    pub day_of_week: Option<Value>,
    #[serde(default)]
    pub hour: Option<Value>,
    #[serde(default)]
    pub am_pm: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineRequest {
    #[serde(default)]
    pub zipcode: Option<Value>,
    #[serde(default)]
    pub day_of_week: Option<Value>,
}

/// Parses a request body. Well-formed JSON that is not an object carries
/// no fields, so it reaches presence validation instead of failing here.
pub fn parse_fields<T>(body: &[u8]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    let value: Value = serde_json::from_slice(body)?;
    match value {
        Value::Object(_) => serde_json::from_value(value),
        _ => Ok(T::default()),
    }
}

/// Text of a present field, or `None` for null, empty, zero and `false`.
pub fn field_text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Binary High / not-High view kept for clients that predate the
/// three-level classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegacyClassification {
    pub prediction: u8,
    pub probabilities: [f64; 2],
}

impl LegacyClassification {
    pub fn derive(level: RiskLevel, risk_percentage: u8) -> Self {
        let p = f64::from(risk_percentage);
        if level == RiskLevel::High {
            Self {
                prediction: 0,
                probabilities: [p / 100.0, (100.0 - p) / 100.0],
            }
        } else {
            Self {
                prediction: 1,
                probabilities: [(100.0 - p) / 100.0, p / 100.0],
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestEcho {
    pub zipcode: String,
    pub time: String,
    pub day: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedResult {
    pub risk_score: f64,
    pub risk_percentage: u8,
    pub confidence: u8,
    pub analysis: RiskAnalysis,
    pub timestamp: String,
    pub location: RequestEcho,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub risk_level: RiskLevel,
    pub prediction: u8,
    pub probabilities: [f64; 2],
    pub message: String,
    pub enhanced: EnhancedResult,
}

impl PredictResponse {
    pub fn new(result: RiskResult, echo: RequestEcho) -> Self {
        let assessment = result.assessment;
        let legacy =
            LegacyClassification::derive(assessment.risk_level, assessment.risk_percentage);
        Self {
            risk_level: assessment.risk_level,
            prediction: legacy.prediction,
            probabilities: legacy.probabilities,
            message: format!("Risk Level: {}", assessment.risk_level),
            enhanced: EnhancedResult {
                risk_score: assessment.risk_score,
                risk_percentage: assessment.risk_percentage,
                confidence: result.confidence,
                analysis: assessment.analysis,
                timestamp: now_iso8601(),
                location: echo,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineResponse {
    pub zipcode: String,
    pub day: DayOfWeek,
    pub points: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn now() -> Self {
        Self {
            status: "healthy",
            timestamp: now_iso8601(),
            version: SERVICE_VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// UTC with millisecond precision and a `Z` suffix.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
