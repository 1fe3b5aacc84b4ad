use axum::http::StatusCode;
use thiserror::Error;

/// Failure while retrieving one of the upstream JSON documents
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// URL of the document that could not be fetched
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    MissingParameter(String),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("No sequences matched the requested metadata fields")]
    NoMatch,
}

impl ExportError {
    /// HTTP status reported to the client for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExportError::MissingParameter(_) | ExportError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ExportError::NoMatch => StatusCode::NOT_FOUND,
            ExportError::Fetch(_) | ExportError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable message for the `error` field
    pub fn summary(&self) -> String {
        match self {
            ExportError::MissingParameter(msg) | ExportError::InvalidParameter(msg) => {
                msg.clone()
            }
            ExportError::NoMatch => self.to_string(),
            ExportError::Fetch(_) => "Failed to fetch upstream data".to_string(),
            ExportError::Processing(_) => "Failed to process files".to_string(),
        }
    }

    /// Detail string attached to internal failures only
    pub fn details(&self) -> Option<String> {
        match self {
            ExportError::Fetch(e) => Some(e.to_string()),
            ExportError::Processing(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ExportError::MissingParameter("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ExportError::InvalidParameter("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ExportError::NoMatch.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ExportError::Processing("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_only_for_internal_failures() {
        let missing = ExportError::MissingParameter("sequencesUrl is required".into());
        assert_eq!(missing.summary(), "sequencesUrl is required");
        assert!(missing.details().is_none());

        let fetch = ExportError::from(FetchError::Status {
            url: "http://upstream/seq".into(),
            status: 503,
        });
        assert_eq!(fetch.summary(), "Failed to fetch upstream data");
        assert_eq!(
            fetch.details().as_deref(),
            Some("Request to http://upstream/seq returned HTTP status 503")
        );
    }

    #[test]
    fn test_fetch_error_url() {
        let err = FetchError::Decode {
            url: "http://upstream/meta".into(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert_eq!(err.url(), "http://upstream/meta");
        assert!(err.to_string().starts_with("Response from http://upstream/meta"));
    }
}
