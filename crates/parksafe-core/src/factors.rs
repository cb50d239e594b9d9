use crate::calendar::DayCode;
use serde::Serialize;

/// Maximum contribution of each factor to the overall score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    pub location: f64,
    pub timing: f64,
    pub day_of_week: f64,
}

pub const WEIGHTS: FactorWeights = FactorWeights {
    location: 0.4,
    timing: 0.35,
    day_of_week: 0.25,
};

/// Scores above this count as "high" for location and timing advice.
pub const HIGH_FACTOR_THRESHOLD: f64 = 0.2;
/// Day scores above this trigger the weekend advice.
pub const HIGH_DAY_THRESHOLD: f64 = 0.15;

/// Extra context carried by a factor on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactorContext {
    Hour { hour: u8 },
    Day { day: &'static str },
}

/// One scored dimension of risk. `0 <= score <= weight`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub score: f64,
    pub weight: f64,
    pub percentage: u8,
    pub status: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub context: Option<FactorContext>,
}

impl RiskFactor {
    fn new(
        score: f64,
        weight: f64,
        status: &'static str,
        description: &'static str,
        context: Option<FactorContext>,
    ) -> Self {
        Self {
            score,
            weight,
            percentage: share_of_weight(score, weight),
            status,
            description,
            context,
        }
    }

    pub fn is_high(&self) -> bool {
        self.score > HIGH_FACTOR_THRESHOLD
    }
}

/// How much of the factor's own budget was consumed, as a whole percent.
pub fn share_of_weight(score: f64, weight: f64) -> u8 {
    ((score / weight) * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn location_factor(in_high_risk_zone: bool) -> RiskFactor {
    let score = if in_high_risk_zone { WEIGHTS.location } else { 0.0 };
    let (status, description) = if score > HIGH_FACTOR_THRESHOLD {
        (
            "High Risk Area",
            "This ZIP code has elevated parking violation rates",
        )
    } else {
        (
            "Moderate Risk Area",
            "This area has relatively lower parking violation rates",
        )
    };
    RiskFactor::new(score, WEIGHTS.location, status, description, None)
}

/// Enforcement bands over the 24-hour clock, tested in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBand {
    PeakEnforcement,
    Shoulder,
    BusinessHours,
    Daytime,
}

impl TimeBand {
    pub fn for_hour(hour: u8) -> Self {
        match hour {
            22..=23 | 0..=5 => TimeBand::PeakEnforcement,
            h if h >= 18 || h <= 8 => TimeBand::Shoulder,
            9..=17 => TimeBand::BusinessHours,
            _ => TimeBand::Daytime,
        }
    }

    pub fn score(self) -> f64 {
        match self {
            TimeBand::PeakEnforcement => 0.35,
            TimeBand::Shoulder => 0.15,
            TimeBand::BusinessHours => 0.05,
            TimeBand::Daytime => 0.1,
        }
    }

    pub fn status(self) -> &'static str {
        match self {
            TimeBand::PeakEnforcement => "Very High Risk Hours",
            TimeBand::Shoulder | TimeBand::Daytime => "Moderate Risk Hours",
            TimeBand::BusinessHours => "Low Risk Hours",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TimeBand::PeakEnforcement => {
                "Late night/early morning hours have highest violation rates"
            }
            TimeBand::Shoulder => "Evening/early morning hours have moderate violation rates",
            TimeBand::BusinessHours => "Business hours typically have lower violation rates",
            TimeBand::Daytime => "Standard daytime hours with moderate violation rates",
        }
    }
}

pub fn is_business_hour(hour: u8) -> bool {
    (9..=17).contains(&hour)
}

pub fn timing_factor(hour: u8) -> RiskFactor {
    let band = TimeBand::for_hour(hour);
    RiskFactor::new(
        band.score(),
        WEIGHTS.timing,
        band.status(),
        band.description(),
        Some(FactorContext::Hour { hour }),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBand {
    High,
    Moderate,
    Low,
}

impl DayBand {
    pub fn for_code(code: DayCode) -> Self {
        match code.value() {
            0 | 2 | 3 => DayBand::High,
            4 | 5 => DayBand::Moderate,
            _ => DayBand::Low,
        }
    }

    pub fn score(self) -> f64 {
        match self {
            DayBand::High => 0.25,
            DayBand::Moderate => 0.1,
            DayBand::Low => 0.05,
        }
    }

    pub fn status(self) -> &'static str {
        match self {
            DayBand::High => "High Risk Day",
            DayBand::Moderate => "Moderate Risk Day",
            DayBand::Low => "Low Risk Day",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DayBand::High => "Weekends have increased parking enforcement and violations",
            DayBand::Moderate => "Weekdays have moderate parking enforcement",
            DayBand::Low => "Weekdays typically have lower violation rates",
        }
    }
}

pub fn day_factor(code: DayCode) -> RiskFactor {
    let band = DayBand::for_code(code);
    RiskFactor::new(
        band.score(),
        WEIGHTS.day_of_week,
        band.status(),
        band.description(),
        Some(FactorContext::Day {
            day: code.day().name(),
        }),
    )
}
