use crate::factors::{is_business_hour, RiskFactor, HIGH_DAY_THRESHOLD};

pub const AVOID_AREA: &str = "Consider alternative parking areas if possible";
pub const USE_PAID_PARKING: &str = "Use paid parking or parking apps to ensure compliance";
pub const AVOID_PEAK_HOURS: &str = "Avoid parking during peak enforcement hours (10 PM - 5 AM)";
pub const BUSINESS_HOURS_SAFER: &str = "Business hours are generally safer for parking";
pub const WEEKEND_CAUTION: &str = "Weekend parking requires extra caution";
pub const SPECIAL_EVENTS: &str = "Check for special event restrictions";
pub const CHECK_SIGNS: &str = "Always check posted parking signs";
pub const METER_APPS: &str = "Consider using parking meter apps for convenience";

pub const MULTIPLE_HIGH_RISK: &str = "⚠️ Multiple high-risk factors detected";
pub const HIGH_RISK_AREA_AND_HOURS: &str = "🏙️ High-risk area during high-risk hours";
pub const FAVORABLE_CONDITIONS: &str = "✅ Generally favorable parking conditions";

pub fn recommendations(
    location: &RiskFactor,
    timing: &RiskFactor,
    day: &RiskFactor,
    hour: u8,
) -> Vec<&'static str> {
    let mut out = Vec::with_capacity(8);

    if location.is_high() {
        out.push(AVOID_AREA);
        out.push(USE_PAID_PARKING);
    }

    if timing.is_high() {
        out.push(AVOID_PEAK_HOURS);
        if is_business_hour(hour) {
            out.push(BUSINESS_HOURS_SAFER);
        }
    }

    if day.score > HIGH_DAY_THRESHOLD {
        out.push(WEEKEND_CAUTION);
        out.push(SPECIAL_EVENTS);
    }

    out.push(CHECK_SIGNS);
    out.push(METER_APPS);
    out
}

pub fn insights(
    risk_percentage: u8,
    location: &RiskFactor,
    timing: &RiskFactor,
) -> Vec<&'static str> {
    let mut out = Vec::with_capacity(3);
    if risk_percentage >= 70 {
        out.push(MULTIPLE_HIGH_RISK);
    }
    if location.is_high() && timing.is_high() {
        out.push(HIGH_RISK_AREA_AND_HOURS);
    }
    if risk_percentage <= 30 {
        out.push(FAVORABLE_CONDITIONS);
    }
    out
}
