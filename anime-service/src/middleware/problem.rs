//! Completes problem-detail bodies on the way out
//!
//! Errors are converted to responses deep inside handlers and extractors,
//! where the request path is unknown. This middleware fills in `path` and
//! `requestId` on any response that carries [`ProblemDetails`], and gives a
//! problem body to error responses produced without one (body limit,
//! timeout, panic recovery).

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ProblemDetails;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn problem_details(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let request_id = header_request_id(request.headers());

    let response = next.run(request).await;
    let request_id = request_id.or_else(|| header_request_id(response.headers()));

    let problem = match response.extensions().get::<ProblemDetails>() {
        Some(problem) => {
            if problem.path.is_some() && (problem.request_id.is_some() || request_id.is_none()) {
                return response;
            }
            problem.clone()
        }
        None if response.status().is_client_error() || response.status().is_server_error() => {
            let status = response.status();
            tracing::debug!(status = status.as_u16(), path = %path, "error response without problem body");
            ProblemDetails::new(status, bare_message(status))
        }
        None => return response,
    };

    let problem = ProblemDetails {
        path: problem.path.or(Some(path)),
        request_id: problem.request_id.or(request_id),
        ..problem
    };

    let (parts, _) = response.into_parts();
    let mut rebuilt = problem.into_response();
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_LENGTH
            && name != header::CONTENT_TYPE
            && name != header::CONTENT_ENCODING
        {
            rebuilt.headers_mut().append(name.clone(), value.clone());
        }
    }
    rebuilt
}

fn header_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Message for an error response that arrived without a body of ours
fn bare_message(status: StatusCode) -> String {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "Request body exceeds the size limit".to_string(),
        StatusCode::REQUEST_TIMEOUT => "Request timed out".to_string(),
        StatusCode::METHOD_NOT_ALLOWED => "Request method not supported for this route".to_string(),
        status if status.is_server_error() => "An internal error occurred".to_string(),
        status => status.canonical_reason().unwrap_or("Request failed").to_string(),
    }
}
