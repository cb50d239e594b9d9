use hyper::StatusCode;
use parksafe_core::ScoreError;
use thiserror::Error;

/// Anything that stops a request before it reaches the scorer.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("missing required fields")]
    MissingFields,
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("invalid input: {0}")]
    Invalid(#[from] ScoreError),
    #[error("no route for {method} {path}")]
    NotFound { method: String, path: String },
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::MissingFields
            | RequestError::MalformedBody(_)
            | RequestError::Invalid(_) => StatusCode::BAD_REQUEST,
            RequestError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// Message placed in the `error` field of the JSON body.
    pub fn public_message(&self) -> &'static str {
        match self {
            RequestError::MissingFields => "Missing required fields",
            RequestError::MalformedBody(_) => "Invalid JSON or server error",
            RequestError::BodyTooLarge { .. } => "Request body too large",
            RequestError::NotFound { .. } => "Not Found",
            RequestError::Invalid(e) => match e {
                ScoreError::InvalidZipcode(_) => "Please enter a valid 5-digit ZIP code",
                ScoreError::InvalidHour(_) | ScoreError::Hour24OutOfRange(_) => {
                    "Please enter a valid hour (1-12)"
                }
                ScoreError::InvalidMeridiem(_) => "Please select AM or PM",
                ScoreError::UnknownDay(_) | ScoreError::DayCodeOutOfRange(_) => {
                    "Please select a day of the week"
                }
                ScoreError::NonFiniteEncoding { .. } => "Invalid JSON or server error",
            },
        }
    }

    /// Metric label for rejected requests.
    pub fn reason(&self) -> &'static str {
        match self {
            RequestError::MissingFields => "missing_fields",
            RequestError::MalformedBody(_) => "malformed_body",
            RequestError::BodyTooLarge { .. } => "body_too_large",
            RequestError::Invalid(ScoreError::InvalidZipcode(_)) => "invalid_zipcode",
            RequestError::Invalid(ScoreError::UnknownDay(_) | ScoreError::DayCodeOutOfRange(_)) => {
                "unknown_day"
            }
            RequestError::Invalid(ScoreError::InvalidMeridiem(_)) => "invalid_meridiem",
            RequestError::Invalid(_) => "invalid_hour",
            RequestError::NotFound { .. } => "not_found",
        }
    }
}
