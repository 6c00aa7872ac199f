use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// HTTP header used to correlate a request across services
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request extension carrying the correlation id for the current request
#[derive(Clone, Debug)]
pub struct RequestId(Uuid);

impl RequestId {
    fn from_request(request: &Request) -> Self {
        // Honor an id supplied by an upstream caller, otherwise mint one
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId)
            .unwrap_or_else(|| RequestId(Uuid::new_v4()))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attaches a request id to the request extensions and echoes it back on the
/// response so clients and logs can be correlated.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_request(&request);
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Span factory for the router's TraceLayer; every handler log line carries
/// the method, uri, and request id.
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(RequestId::to_string)
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_upstream_request_id() {
        let upstream = Uuid::new_v4();
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, upstream.to_string())
            .body(Body::empty())
            .unwrap();
        let id = RequestId::from_request(&request);
        assert_eq!(id.to_string(), upstream.to_string());
    }

    #[test]
    fn mints_id_when_header_is_malformed() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let id = RequestId::from_request(&request);
        assert!(Uuid::parse_str(&id.to_string()).is_ok());
    }
}
