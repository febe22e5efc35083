//! HTTP routing for the generation service.

use std::sync::Arc;

use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::memo::{GenerateRequest, MemoError, ResolutionSource};
use crate::server::AppState;

/// Largest request body accepted by `POST /generate`.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Response header naming whether the generator ran.
pub const RESOLUTION_HEADER: &str = "x-devgen-resolution";

/// Response type produced by every route.
pub type HttpResponse = Response<Full<Bytes>>;

/// Dispatches one request. Never fails; every error becomes a JSON response.
pub async fn route<B>(request: Request<B>, state: Arc<AppState>) -> HttpResponse
where
    B: Body + Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let path = request.uri().path().to_string();
    match path.as_str() {
        "/health" => {
            if request.method() == Method::GET {
                json_response(StatusCode::OK, &json!({ "status": "ok" }))
            } else {
                method_not_allowed("GET")
            }
        }
        "/generate" => {
            if let Err(e) = state.auth.authenticate(request.headers()) {
                return error_response(StatusCode::UNAUTHORIZED, &e.to_string());
            }
            if request.method() == Method::POST {
                generate(request, &state).await
            } else {
                method_not_allowed("POST")
            }
        }
        "/code" => {
            if let Err(e) = state.auth.authenticate(request.headers()) {
                return error_response(StatusCode::UNAUTHORIZED, &e.to_string());
            }
            if request.method() == Method::GET {
                let device = request.uri().query().and_then(device_param).unwrap_or_default();
                code(&device, &state).await
            } else {
                method_not_allowed("GET")
            }
        }
        _ => error_response(StatusCode::NOT_FOUND, "not found"),
    }
}

async fn generate<B>(request: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body + Send,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let body = match Limited::new(request.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
        Err(e) => {
            debug!(error = %e, "Failed to read request body");
            return error_response(StatusCode::BAD_REQUEST, "could not read request body");
        }
    };

    let generate_request: GenerateRequest = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "Rejected malformed JSON body");
            return error_response(StatusCode::BAD_REQUEST, "invalid JSON");
        }
    };

    match state.coordinator.resolve(generate_request).await {
        Ok(resolution) => {
            let mut response = json_response(StatusCode::OK, &resolution.entry);
            response.headers_mut().insert(
                RESOLUTION_HEADER,
                HeaderValue::from_static(match resolution.source {
                    ResolutionSource::Cached => "cached",
                    ResolutionSource::Generated => "generated",
                }),
            );
            response
        }
        Err(e) => memo_error_response(&e),
    }
}

async fn code(device: &str, state: &AppState) -> HttpResponse {
    match state.coordinator.fetch(device).await {
        Ok(entry) => json_response(StatusCode::OK, &entry),
        Err(e) => memo_error_response(&e),
    }
}

/// Extracts and percent-decodes the `device` query parameter.
fn device_param(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != "device" {
            return None;
        }
        let value = value.replace('+', " ");
        urlencoding::decode(&value).ok().map(|decoded| decoded.into_owned())
    })
}

/// Maps a coordinator error onto its HTTP status and client-facing message.
fn memo_error_response(err: &MemoError) -> HttpResponse {
    match err {
        MemoError::InvalidInput(msg) => error_response(StatusCode::BAD_REQUEST, msg),
        MemoError::UnknownDevice(_) => error_response(StatusCode::NOT_FOUND, "device not found"),
        MemoError::Generation(e) => {
            warn!(error = %e, "Generation failed");
            error_response(StatusCode::BAD_GATEWAY, &format!("generation failed: {e}"))
        }
        MemoError::Storage(e) => {
            error!(error = %e, "Storage failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage failure")
        }
    }
}

fn method_not_allowed(allow: &'static str) -> HttpResponse {
    let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    response.headers_mut().insert(ALLOW, HeaderValue::from_static(allow));
    response
}

fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    json_response(status, &json!({ "error": message }))
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            error!(error = %e, "Failed to serialize response body");
            (StatusCode::INTERNAL_SERVER_ERROR, br#"{"error":"internal error"}"#.to_vec())
        }
    };
    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
