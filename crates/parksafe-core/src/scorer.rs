//! The three-factor parking risk model.
//!
//! `risk_score = location + timing + day_of_week`, each factor capped by its
//! weight in [`WEIGHTS`]. Everything except the confidence draw is a pure
//! function of `(zipcode, day code, clock hour)`.

use crate::advice;
use crate::calendar::{to_hour12, DayCode, HourEncoding, Meridiem};
use crate::error::ScoreError;
use crate::factors::{day_factor, location_factor, timing_factor, RiskFactor, WEIGHTS};
use crate::zones::is_high_risk_zip;
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::Serialize;
use std::fmt;

pub const HIGH_RISK_THRESHOLD: f64 = 0.5;
pub const MODERATE_RISK_THRESHOLD: f64 = 0.3;

pub const CONFIDENCE_MIN: u8 = 85;
pub const CONFIDENCE_MAX: u8 = 95;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    High,
    Moderate,
    Low,
}

impl RiskLevel {
    /// Thresholds are inclusive on the high side.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if score >= MODERATE_RISK_THRESHOLD {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactors {
    pub location: RiskFactor,
    pub timing: RiskFactor,
    #[serde(rename = "dayOfWeek")]
    pub day_of_week: RiskFactor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAnalysis {
    pub factors: RiskFactors,
    pub recommendations: Vec<&'static str>,
    pub insights: Vec<&'static str>,
}

/// The deterministic part of a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub risk_percentage: u8,
    pub analysis: RiskAnalysis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskResult {
    pub assessment: RiskAssessment,
    pub confidence: u8,
}

/// Supplies the cosmetic confidence figure attached to each result.
pub trait ConfidenceSource {
    fn draw(&mut self) -> u8;
}

/// `CONFIDENCE_MIN + u * 10` rounded half away from zero, `u` uniform in
/// `[0, 1)`. The two endpoints get half the weight of the inner values.
pub struct RandomConfidence<R = ThreadRng> {
    rng: R,
}

impl RandomConfidence<ThreadRng> {
    pub fn thread_local() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl<R: Rng> RandomConfidence<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ConfidenceSource for RandomConfidence<R> {
    fn draw(&mut self) -> u8 {
        let span = f64::from(CONFIDENCE_MAX - CONFIDENCE_MIN);
        let u: f64 = self.rng.gen();
        (f64::from(CONFIDENCE_MIN) + u * span).round() as u8
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedConfidence(pub u8);

impl ConfidenceSource for FixedConfidence {
    fn draw(&mut self) -> u8 {
        self.0
    }
}

/// Risk across one clock hour, for the dashboard's 24-hour chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub hour24: u8,
    pub hour12: u8,
    pub am_pm: Meridiem,
    pub label: String,
    pub risk: u8,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, zipcode: &str, day: DayCode, hour: HourEncoding) -> RiskAssessment {
        let clock_hour = hour.clock_hour();

        let location = location_factor(is_high_risk_zip(zipcode));
        let timing = timing_factor(clock_hour);
        let day_of_week = day_factor(day);

        let mut risk_score = 0.0;
        risk_score += location.score;
        risk_score += timing.score;
        risk_score += day_of_week.score;
        debug_assert!(risk_score <= WEIGHTS.location + WEIGHTS.timing + WEIGHTS.day_of_week);

        let risk_percentage = (risk_score * 100.0).round().clamp(0.0, 100.0) as u8;
        let risk_level = RiskLevel::from_score(risk_score);

        let recommendations = advice::recommendations(&location, &timing, &day_of_week, clock_hour);
        let insights = advice::insights(risk_percentage, &location, &timing);

        RiskAssessment {
            risk_level,
            risk_score,
            risk_percentage,
            analysis: RiskAnalysis {
                factors: RiskFactors {
                    location,
                    timing,
                    day_of_week,
                },
                recommendations,
                insights,
            },
        }
    }

    pub fn score<C: ConfidenceSource + ?Sized>(
        &self,
        zipcode: &str,
        day: DayCode,
        hour: HourEncoding,
        confidence: &mut C,
    ) -> RiskResult {
        RiskResult {
            assessment: self.assess(zipcode, day, hour),
            confidence: confidence.draw(),
        }
    }

    pub fn timeline(&self, zipcode: &str, day: DayCode) -> Result<Vec<TimelinePoint>, ScoreError> {
        (0u8..24)
            .map(|hour24| -> Result<TimelinePoint, ScoreError> {
                let assessment = self.assess(zipcode, day, HourEncoding::from_hour24(hour24)?);
                let (hour12, am_pm) = to_hour12(hour24)?;
                Ok(TimelinePoint {
                    hour24,
                    hour12,
                    am_pm,
                    label: format!("{hour12}{am_pm}"),
                    risk: assessment.risk_percentage,
                    risk_level: assessment.risk_level,
                })
            })
            .collect()
    }
}
