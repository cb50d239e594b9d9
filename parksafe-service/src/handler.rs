use crate::error::RequestError;
use crate::wire::{
    field_text, parse_fields, PredictRequest, PredictResponse, RequestEcho, TimelineRequest,
    TimelineResponse,
};
use parksafe_core::{
    parse_hour12, to_hour24, validate_zipcode, ConfidenceSource, DayOfWeek, HourEncoding,
    Meridiem, RiskScorer,
};
use parksafe_metrics::ScoringMetrics;
use tracing::{info, warn};

/// Validates request bodies, runs the scorer and builds wire responses.
pub struct RequestHandler {
    scorer: RiskScorer,
    metrics: ScoringMetrics,
}

/// Inputs that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    pub zipcode: String,
    pub day: DayOfWeek,
    pub meridiem: Meridiem,
    pub hour24: u8,
    pub raw_hour: String,
}

impl RequestHandler {
    pub fn new(scorer: RiskScorer, metrics: ScoringMetrics) -> Self {
        Self { scorer, metrics }
    }

    pub fn metrics(&self) -> &ScoringMetrics {
        &self.metrics
    }

    pub fn predict(
        &self,
        body: &[u8],
        confidence: &mut dyn ConfidenceSource,
    ) -> Result<PredictResponse, RequestError> {
        let outcome = self.predict_inner(body, confidence);
        if let Err(e) = &outcome {
            self.reject(e);
        }
        outcome
    }

    fn predict_inner(
        &self,
        body: &[u8],
        confidence: &mut dyn ConfidenceSource,
    ) -> Result<PredictResponse, RequestError> {
        let request: PredictRequest =
            parse_fields(body).map_err(|e| RequestError::MalformedBody(e.to_string()))?;
        let input = validate_predict(&request)?;

        let encoding = HourEncoding::from_hour24(input.hour24)?;
        let result = self
            .scorer
            .score(&input.zipcode, input.day.code(), encoding, confidence);
        self.metrics.observe_assessment(&result.assessment);

        info!(
            zipcode = %input.zipcode,
            day = %input.day,
            hour24 = input.hour24,
            risk_level = %result.assessment.risk_level,
            risk_percentage = result.assessment.risk_percentage,
            "risk assessed"
        );

        let echo = RequestEcho {
            time: format!("{}:00 {}", input.raw_hour, input.meridiem),
            day: input.day.name().to_string(),
            zipcode: input.zipcode,
        };
        Ok(PredictResponse::new(result, echo))
    }

    pub fn timeline(&self, body: &[u8]) -> Result<TimelineResponse, RequestError> {
        let outcome = self.timeline_inner(body);
        if let Err(e) = &outcome {
            self.reject(e);
        }
        outcome
    }

    fn timeline_inner(&self, body: &[u8]) -> Result<TimelineResponse, RequestError> {
        let request: TimelineRequest =
            parse_fields(body).map_err(|e| RequestError::MalformedBody(e.to_string()))?;
        let (Some(zipcode), Some(day)) = (
            field_text(&request.zipcode),
            field_text(&request.day_of_week),
        ) else {
            return Err(RequestError::MissingFields);
        };
        validate_zipcode(&zipcode)?;
        let day: DayOfWeek = day.parse()?;

        let points = self.scorer.timeline(&zipcode, day.code())?;
        info!(zipcode = %zipcode, day = %day, "timeline computed");
        Ok(TimelineResponse {
            zipcode,
            day,
            points,
        })
    }

    pub fn reject(&self, error: &RequestError) {
        warn!(reason = error.reason(), error = %error, "request rejected");
        self.metrics.observe_rejection(error.reason());
    }
}

/// Presence first, then format: zipcode, hour, meridiem, day.
pub fn validate_predict(request: &PredictRequest) -> Result<ValidatedInput, RequestError> {
    let (Some(zipcode), Some(day), Some(raw_hour), Some(am_pm)) = (
        field_text(&request.zipcode),
        field_text(&request.day_of_week),
        field_text(&request.hour),
        field_text(&request.am_pm),
    ) else {
        return Err(RequestError::MissingFields);
    };

    validate_zipcode(&zipcode)?;
    let hour12 = parse_hour12(&raw_hour)?;
    let meridiem: Meridiem = am_pm.parse()?;
    let day: DayOfWeek = day.parse()?;
    let hour24 = to_hour24(hour12, meridiem)?;

    Ok(ValidatedInput {
        zipcode,
        day,
        meridiem,
        hour24,
        raw_hour,
    })
}
