//! Middleware for logging requests and responses.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body, in bytes, the middleware will read. Matches the
/// default limit of axum's `Json` extractor.
pub const REQUEST_BODY_LIMIT: usize = 2 * 1024 * 1024;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// The value of the `Authorization` header is never logged.
///
/// Request bodies larger than [REQUEST_BODY_LIMIT] bytes are rejected with
/// 413 Payload Too Large.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match to_bytes(body, REQUEST_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::debug!(
                "Could not read request body within {REQUEST_BODY_LIMIT} bytes: {error}"
            );
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    tracing::info!(
        "Received request: {} {} {:?}\nheaders: {:#?}\nbody: {}",
        parts.method,
        parts.uri,
        parts.version,
        redact_headers(&parts.headers),
        truncate_body(&body_text)
    );
    if body_text.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::debug!("Full request body: {body_text:?}");
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    tracing::info!(
        "Sending response: {}\nheaders: {:#?}\nbody: {}",
        parts.status,
        parts.headers,
        truncate_body(&body_text)
    );
    if body_text.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::debug!("Full response body: {body_text:?}");
    }

    Response::from_parts(parts, Body::from(body_bytes))
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static(REDACTED));
    }

    headers
}

/// Cut `body` down to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate_body(body: &str) -> String {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return format!("{body:?}");
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{:?}...", &body[..end])
}



#[cfg(test)]
mod logging_middleware_tests {
    use axum::{Router, http::StatusCode, middleware, routing::post};
    use axum_test::TestServer;

    use super::{REQUEST_BODY_LIMIT, logging_middleware};

    async fn echo(body: String) -> String {
        body
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let server = get_test_server();
        let body = "x".repeat(200);

        let response = server
            .post("/echo")
            .add_header("Authorization", "Basic U2FyYWg6YWJjMTIz")
            .text(&body)
            .await;

        response.assert_status_ok();
        response.assert_text(body);
    }

    #[tokio::test]
    async fn rejects_oversized_request_body() {
        let server = get_test_server();

        let response = server
            .post("/echo")
            .text("x".repeat(REQUEST_BODY_LIMIT + 1))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }
}
