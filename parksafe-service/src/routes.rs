use crate::error::RequestError;
use crate::handler::RequestHandler;
use crate::wire::{ErrorBody, HealthResponse};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::{Method, Request, Response, StatusCode};
use parksafe_core::RandomConfidence;
use serde::Serialize;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::debug;

pub type HttpBody = Full<Bytes>;

const FALLBACK_ERROR: &[u8] = br#"{"error":"Invalid JSON or server error"}"#;

/// Shared, immutable per-process state.
pub struct AppState {
    pub handler: RequestHandler,
    pub allow_origin: HeaderValue,
    pub max_body_bytes: usize,
}

pub type SharedState = Arc<AppState>;

pub async fn handle_request<B>(
    state: SharedState,
    req: Request<B>,
) -> Result<Response<HttpBody>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match (&method, path.as_str()) {
        (&Method::OPTIONS, _) => empty(&state, StatusCode::OK),
        (&Method::GET, "/health") => json(&state, StatusCode::OK, &HealthResponse::now()),
        (&Method::GET, "/metrics") => metrics(&state),
        (&Method::POST, "/predict") => {
            match read_body(req.into_body(), state.max_body_bytes).await {
                Ok(body) => {
                    let mut confidence = RandomConfidence::thread_local();
                    match state.handler.predict(&body, &mut confidence) {
                        Ok(resp) => json(&state, StatusCode::OK, &resp),
                        Err(e) => error(&state, &e),
                    }
                }
                Err(e) => {
                    state.handler.reject(&e);
                    error(&state, &e)
                }
            }
        }
        (&Method::POST, "/timeline") => {
            match read_body(req.into_body(), state.max_body_bytes).await {
                Ok(body) => match state.handler.timeline(&body) {
                    Ok(resp) => json(&state, StatusCode::OK, &resp),
                    Err(e) => error(&state, &e),
                },
                Err(e) => {
                    state.handler.reject(&e);
                    error(&state, &e)
                }
            }
        }
        _ => error(
            &state,
            &RequestError::NotFound {
                method: method.to_string(),
                path: path.clone(),
            },
        ),
    };

    debug!(%method, path = %path, status = response.status().as_u16(), "request served");
    Ok(response)
}

async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, RequestError>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(RequestError::BodyTooLarge { limit }),
        Err(e) => Err(RequestError::MalformedBody(e.to_string())),
    }
}

fn metrics(state: &AppState) -> Response<HttpBody> {
    match state.handler.metrics().render() {
        Ok(text) => {
            let mut resp = empty(state, StatusCode::OK);
            *resp.body_mut() = Full::new(Bytes::from(text));
            resp.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            resp
        }
        Err(e) => {
            tracing::error!(error = %e, "metrics rendering failed");
            fallback(state)
        }
    }
}

fn error(state: &AppState, err: &RequestError) -> Response<HttpBody> {
    json(
        state,
        err.status(),
        &ErrorBody {
            error: err.public_message(),
        },
    )
}

fn json<T: Serialize>(state: &AppState, status: StatusCode, value: &T) -> Response<HttpBody> {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut resp = empty(state, status);
            *resp.body_mut() = Full::new(Bytes::from(body));
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            resp
        }
        Err(e) => {
            tracing::error!(error = %e, "response serialization failed");
            fallback(state)
        }
    }
}

fn fallback(state: &AppState) -> Response<HttpBody> {
    let mut resp = empty(state, StatusCode::INTERNAL_SERVER_ERROR);
    *resp.body_mut() = Full::new(Bytes::from_static(FALLBACK_ERROR));
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

/// Empty response carrying the CORS headers every route shares.
fn empty(state: &AppState, status: StatusCode) -> Response<HttpBody> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    let headers = resp.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, state.allow_origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    resp
}
