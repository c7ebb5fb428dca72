use std::time::Duration;
use tower_http::{
    classify::ServerErrorsFailureClass,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, debug, error, info_span};

use axum::{
    Router,
    body::Bytes,
    extract::{MatchedPath, Request},
    http::{HeaderMap, Method, header},
    response::Response,
};

/// Id or age taken from the request path when the route has a parameter.
fn student_key<'a>(matched_path: Option<&str>, path: &'a str) -> Option<&'a str> {
    if !matched_path?.ends_with('}') {
        return None;
    }
    path.trim_end_matches('/').rsplit('/').next()
}

pub fn tower_trace(routes: Router) -> Router {
    routes.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);
                let student_key = student_key(matched_path, request.uri().path());

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                    student_key,
                    status = tracing::field::Empty,
                )
            })
            .on_request(|request: &Request<_>, _span: &Span| {
                debug!("New request: {} {}", request.method(), request.uri().path())
            })
            .on_response(|response: &Response, latency: Duration, span: &Span| {
                span.record("status", response.status().as_u16());
                debug!("Response generated in {:?}", latency)
            })
            .on_body_chunk(|chunk: &Bytes, _latency: Duration, _span: &Span| {
                debug!("Sending {} bytes", chunk.len())
            })
            .on_eos(
                |_trailers: Option<&HeaderMap>, stream_duration: Duration, _span: &Span| {
                    debug!("Stream closed after {:?}", stream_duration)
                },
            )
            .on_failure(
                |error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                    error!(
                        "Something went wrong {} in {:?}",
                        error.to_string(),
                        latency
                    )
                },
            ),
    )
}

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_key() {
        assert_eq!(
            student_key(Some("/api/students/{key}"), "/api/students/21"),
            Some("21")
        );
        assert_eq!(
            student_key(
                Some("/api/students/id/{id}"),
                "/api/students/id/65f1c0ffee0123456789abcd"
            ),
            Some("65f1c0ffee0123456789abcd")
        );
        assert_eq!(student_key(Some("/api/students/"), "/api/students/"), None);
        assert_eq!(student_key(None, "/api/students/3"), None);
    }
}
