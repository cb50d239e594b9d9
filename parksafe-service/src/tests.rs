use crate::error::RequestError;
use crate::handler::{validate_predict, RequestHandler};
use crate::routes::{handle_request, AppState, SharedState};
use crate::server::{serve_until, AcceptBackoff};
use crate::wire::{field_text, LegacyClassification, PredictRequest};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::HeaderValue;
use hyper::{Method, Request, StatusCode};
use parksafe_core::{FixedConfidence, RiskLevel, RiskScorer, ScoreError};
use parksafe_metrics::ScoringMetrics;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

fn handler() -> RequestHandler {
    RequestHandler::new(RiskScorer::new(), ScoringMetrics::new().unwrap())
}

fn state() -> SharedState {
    Arc::new(AppState {
        handler: handler(),
        allow_origin: HeaderValue::from_static("*"),
        max_body_bytes: 1024,
    })
}

async fn call(state: &SharedState, method: Method, path: &str, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap();
    let resp = handle_request(Arc::clone(state), req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn predict_body(zipcode: &str, day: &str, hour: &str, am_pm: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "zipcode": zipcode,
        "day_of_week": day,
        "hour": hour,
        "am_pm": am_pm,
    }))
    .unwrap()
}

#[test]
fn predict_max_risk_envelope() {
    let body = predict_body("90210", "Friday", "2", "AM");
    let resp = handler().predict(&body, &mut FixedConfidence(91)).unwrap();
    let v = serde_json::to_value(&resp).unwrap();

    assert_eq!(v["risk_level"], "High");
    assert_eq!(v["prediction"], 0);
    assert_eq!(v["probabilities"], json!([1.0, 0.0]));
    assert_eq!(v["message"], "Risk Level: High");

    let enhanced = &v["enhanced"];
    assert_eq!(enhanced["riskPercentage"], 100);
    assert_eq!(enhanced["confidence"], 91);
    assert_eq!(enhanced["location"]["zipcode"], "90210");
    assert_eq!(enhanced["location"]["time"], "2:00 AM");
    assert_eq!(enhanced["location"]["day"], "Friday");
    assert!(enhanced["timestamp"].as_str().unwrap().ends_with('Z'));

    let factors = &enhanced["analysis"]["factors"];
    assert_eq!(factors["location"]["weight"], 0.4);
    assert_eq!(factors["timing"]["hour"], 2);
    assert_eq!(factors["timing"]["status"], "Very High Risk Hours");
    assert_eq!(factors["dayOfWeek"]["day"], "Friday");
    assert_eq!(enhanced["analysis"]["recommendations"].as_array().unwrap().len(), 7);
}

#[test]
fn predict_min_risk_envelope() {
    let body = predict_body("90010", "Monday", "2", "PM");
    let resp = handler().predict(&body, &mut FixedConfidence(88)).unwrap();
    assert_eq!(resp.risk_level, RiskLevel::Low);
    assert_eq!(resp.prediction, 1);
    assert_eq!(resp.probabilities, [0.9, 0.1]);
    assert_eq!(resp.enhanced.risk_percentage, 10);
    assert_eq!(resp.enhanced.location.time, "2:00 PM");
    assert_eq!(
        resp.enhanced.analysis.insights,
        vec!["✅ Generally favorable parking conditions"]
    );
}

#[test]
fn legacy_fields_keep_their_own_derivation() {
    assert_eq!(
        LegacyClassification::derive(RiskLevel::High, 65),
        LegacyClassification {
            prediction: 0,
            probabilities: [0.65, 0.35],
        }
    );
    // Moderate is "not High" on the legacy axis
    assert_eq!(
        LegacyClassification::derive(RiskLevel::Moderate, 40),
        LegacyClassification {
            prediction: 1,
            probabilities: [0.6, 0.4],
        }
    );
}

#[test]
fn twelve_am_and_twelve_pm() {
    let midnight = validate_predict(&request("90210", "Friday", json!("12"), "AM")).unwrap();
    assert_eq!(midnight.hour24, 0);
    let noon = validate_predict(&request("90210", "Friday", json!("12"), "PM")).unwrap();
    assert_eq!(noon.hour24, 12);
}

#[test]
fn numeric_hour_is_accepted() {
    let input = validate_predict(&request("90210", "Sunday", json!(11), "PM")).unwrap();
    assert_eq!(input.hour24, 23);
    assert_eq!(input.raw_hour, "11");
}

fn request(zipcode: &str, day: &str, hour: Value, am_pm: &str) -> PredictRequest {
    PredictRequest {
        zipcode: Some(json!(zipcode)),
        day_of_week: Some(json!(day)),
        hour: Some(hour),
        am_pm: Some(json!(am_pm)),
    }
}

#[test]
fn missing_or_empty_fields_are_rejected() {
    let mut req = request("90210", "Friday", json!("2"), "AM");
    req.am_pm = None;
    assert!(matches!(validate_predict(&req), Err(RequestError::MissingFields)));

    let req = request("", "Friday", json!("2"), "AM");
    assert!(matches!(validate_predict(&req), Err(RequestError::MissingFields)));

    let mut req = request("90210", "Friday", json!("2"), "AM");
    req.hour = Some(Value::Null);
    assert!(matches!(validate_predict(&req), Err(RequestError::MissingFields)));
}

#[test]
fn field_text_treats_falsy_values_as_absent() {
    assert_eq!(field_text(&None), None);
    assert_eq!(field_text(&Some(json!(""))), None);
    assert_eq!(field_text(&Some(json!(0))), None);
    assert_eq!(field_text(&Some(json!(false))), None);
    assert_eq!(field_text(&Some(json!("7"))), Some("7".to_string()));
    assert_eq!(field_text(&Some(json!(7))), Some("7".to_string()));
}

#[test]
fn format_errors_carry_field_messages() {
    let cases = [
        (request("9021", "Friday", json!("2"), "AM"), "Please enter a valid 5-digit ZIP code"),
        (request("90210", "Friday", json!("13"), "AM"), "Please enter a valid hour (1-12)"),
        (request("90210", "Friday", json!("2"), "am"), "Please select AM or PM"),
        (request("90210", "Fryday", json!("2"), "AM"), "Please select a day of the week"),
    ];
    for (req, message) in cases {
        let err = validate_predict(&req).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), message);
    }
}

#[test]
fn non_object_json_has_no_fields() {
    let h = handler();
    for body in [&b"\"x\""[..], &b"42"[..], &b"[1, 2]"[..], &b"null"[..]] {
        let err = h.predict(body, &mut FixedConfidence(90)).unwrap_err();
        assert!(matches!(err, RequestError::MissingFields));
        assert_eq!(err.public_message(), "Missing required fields");
    }
    assert!(matches!(h.timeline(b"true"), Err(RequestError::MissingFields)));
}

#[test]
fn unknown_day_is_a_validation_error() {
    let err = validate_predict(&request("90210", "friday", json!("2"), "AM")).unwrap_err();
    assert!(matches!(err, RequestError::Invalid(ScoreError::UnknownDay(_))));
}

#[test]
fn rejections_are_counted() {
    let h = handler();
    let _ = h.predict(b"{not json", &mut FixedConfidence(90));
    let _ = h.predict(br#"{"zipcode":"90210"}"#, &mut FixedConfidence(90));
    let metrics = h.metrics();
    assert_eq!(
        metrics
            .rejected_requests_total
            .with_label_values(&["malformed_body"])
            .get(),
        1
    );
    assert_eq!(
        metrics
            .rejected_requests_total
            .with_label_values(&["missing_fields"])
            .get(),
        1
    );
}

#[tokio::test]
async fn route_predict_ok() {
    let state = state();
    let body = r#"{"zipcode":"90210","day_of_week":"Friday","hour":"11","am_pm":"PM"}"#;
    let (status, v) = call(&state, Method::POST, "/predict", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["risk_level"], "High");
    let confidence = v["enhanced"]["confidence"].as_u64().unwrap();
    assert!((85..=95).contains(&confidence));
    assert_eq!(state.handler.metrics().assessments_at(RiskLevel::High), 1);
}

#[tokio::test]
async fn route_missing_fields() {
    let (status, v) = call(&state(), Method::POST, "/predict", r#"{"zipcode":"90210"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v, json!({"error": "Missing required fields"}));
}

#[tokio::test]
async fn route_scalar_body_is_missing_fields() {
    let (status, v) = call(&state(), Method::POST, "/predict", r#""x""#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v, json!({"error": "Missing required fields"}));
}

#[tokio::test]
async fn route_malformed_json() {
    let (status, v) = call(&state(), Method::POST, "/predict", "{oops").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v, json!({"error": "Invalid JSON or server error"}));
}

#[tokio::test]
async fn route_body_too_large() {
    let big = format!(r#"{{"zipcode":"{}"}}"#, "9".repeat(4096));
    let (status, v) = call(&state(), Method::POST, "/predict", &big).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(v["error"], "Request body too large");
}

#[tokio::test]
async fn route_health() {
    let (status, v) = call(&state(), Method::GET, "/health", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["version"], "1.0.0");
    assert!(v["timestamp"].is_string());
}

#[tokio::test]
async fn route_not_found() {
    let (status, v) = call(&state(), Method::GET, "/predict", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v, json!({"error": "Not Found"}));
}

#[tokio::test]
async fn route_preflight_has_cors_headers() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let resp = handle_request(state(), req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}

#[tokio::test]
async fn route_timeline() {
    let body = r#"{"zipcode":"90010","day_of_week":"Monday"}"#;
    let (status, v) = call(&state(), Method::POST, "/timeline", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["day"], "Monday");
    let points = v["points"].as_array().unwrap();
    assert_eq!(points.len(), 24);
    assert_eq!(points[14]["label"], "2PM");
    assert_eq!(points[14]["risk"], 10);
    assert_eq!(points[14]["amPm"], "PM");
    assert_eq!(points[23]["riskLevel"], "Moderate");
}

#[tokio::test]
async fn route_metrics_exposition() {
    let state = state();
    let body = r#"{"zipcode":"90010","day_of_week":"Monday","hour":"2","am_pm":"PM"}"#;
    call(&state, Method::POST, "/predict", body).await;
    let req = Request::builder()
        .method(Method::GET)
        .uri("/metrics")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let resp = handle_request(Arc::clone(&state), req).await.unwrap();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("parksafe_assessments_total{risk_level=\"Low\"} 1"));
}

#[test]
fn accept_backoff_doubles_to_a_ceiling() {
    let mut backoff = AcceptBackoff::default();
    let delays: Vec<u128> = (0..6).map(|_| backoff.next_delay().as_millis()).collect();
    assert_eq!(delays, [100, 200, 400, 800, 1000, 1000]);
    backoff.reset();
    assert_eq!(backoff.next_delay(), Duration::from_millis(100));
}

#[tokio::test]
async fn server_answers_then_stops_on_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_until(
        listener,
        state(),
        Duration::from_secs(2),
        async move {
            let _ = stop_rx.await;
        },
    ));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();
    assert!(text.starts_with("HTTP/1.1 200 OK"));
    assert!(text.contains("\"status\":\"healthy\""));

    // an idle keep-alive connection must not hold shutdown open
    let _idle = TcpStream::connect(addr).await.unwrap();
    stop_tx.send(()).unwrap();
    let stopped = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(stopped.is_ok());
}
