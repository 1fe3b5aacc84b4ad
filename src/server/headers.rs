//! CORS and cross-origin isolation headers applied to every route

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

const X_CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrf-token");
const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");
const ACCEPT_VERSION: HeaderName = HeaderName::from_static("accept-version");
const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");
const X_API_VERSION: HeaderName = HeaderName::from_static("x-api-version");

/// Permissive CORS: any origin, GET and OPTIONS, the usual client headers
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            X_CSRF_TOKEN,
            X_REQUESTED_WITH,
            header::ACCEPT,
            ACCEPT_VERSION,
            header::CONTENT_LENGTH,
            CONTENT_MD5,
            header::CONTENT_TYPE,
            header::DATE,
            X_API_VERSION,
        ])
}

/// `Access-Control-Allow-Methods` sent on non-preflight responses
pub const ALLOWED_METHODS: &str = "GET,OPTIONS";

/// `Access-Control-Allow-Headers` sent on non-preflight responses
pub const ALLOWED_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

/// Static response headers: CORS allowances plus cross-origin isolation.
///
/// [`CorsLayer`] only emits allowed methods and headers on preflight answers, and
/// refuses to combine credentials with a wildcard origin, so those are set here.
/// Values already present (preflight answers) are left alone.
pub fn static_headers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    [
        ("access-control-allow-methods", ALLOWED_METHODS),
        ("access-control-allow-headers", ALLOWED_HEADERS),
        ("access-control-allow-credentials", "true"),
        ("cross-origin-embedder-policy", "credentialless"),
        ("cross-origin-opener-policy", "same-origin"),
        ("cross-origin-resource-policy", "cross-origin"),
    ]
    .into_iter()
    .map(|(name, value)| {
        SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        )
    })
    .collect()
}
