use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Longest caller-supplied id that is propagated as-is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID extension type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

fn is_acceptable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id.bytes().all(|b| b.is_ascii_graphic())
}

/// Tags every request with an id, taken from `X-Request-ID` when the caller sent a
/// usable one and generated otherwise. The id is stored in the request extensions and
/// echoed in the response header.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| is_acceptable(id))
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Extract request ID from request extensions
pub fn get_request_id(request: &Request) -> Option<String> {
    request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use axum_test::TestServer;

    fn server() -> TestServer {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_generates_id() {
        let response = server().get("/").await;
        let id = response.header(REQUEST_ID_HEADER);
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_propagates_caller_id() {
        let response = server()
            .get("/")
            .add_header(REQUEST_ID_HEADER, "trace-abc-123")
            .await;
        assert_eq!(response.header(REQUEST_ID_HEADER), "trace-abc-123");
    }

    #[tokio::test]
    async fn test_replaces_oversized_id() {
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        let response = server()
            .get("/")
            .add_header(REQUEST_ID_HEADER, long.as_str())
            .await;
        assert_ne!(response.header(REQUEST_ID_HEADER), long.as_str());
    }
}
