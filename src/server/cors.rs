use axum::{
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN},
    },
    response::Response,
};

/// Cross-origin headers attached to every response: any origin, POST only.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 2] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST")),
    ]
}

pub fn apply_cors(headers: &mut HeaderMap) {
    for (name, value) in cors_headers() {
        headers.insert(name, value);
    }
}

pub async fn with_cors_headers(mut response: Response) -> Response {
    apply_cors(response.headers_mut());
    response
}
