//! Mapping of export errors onto HTTP responses

use crate::error::ExportError;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::warn;

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&ExportError> for ErrorBody {
    fn from(err: &ExportError) -> Self {
        Self {
            error: err.summary(),
            details: err.details(),
        }
    }
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!("Export failed with {}: {}", status, self);
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
