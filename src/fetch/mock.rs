//! In-memory fetcher for tests

use super::JsonFetcher;
use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockResponse {
    Json(Value),
    Status(u16),
    Body(String),
}

/// Mock implementation of JsonFetcher for testing
///
/// URLs without a registered response answer with HTTP 404.
#[derive(Debug, Default, Clone)]
pub struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    calls: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` for `url`
    pub fn with_json(self, url: &str, document: Value) -> Self {
        self.insert(url, MockResponse::Json(document));
        self
    }

    /// Answer `url` with a non-success status
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.insert(url, MockResponse::Status(status));
        self
    }

    /// Answer `url` with a raw body that must still decode as JSON
    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.insert(url, MockResponse::Body(body.to_string()));
        self
    }

    /// Number of fetches issued so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs fetched so far, in call order
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }

    fn insert(&self, url: &str, response: MockResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url.to_string(), response);
        }
    }
}

#[async_trait]
impl JsonFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }

        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(url).cloned());

        match response {
            Some(MockResponse::Json(document)) => Ok(document),
            Some(MockResponse::Body(body)) => {
                serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                    url: url.to_string(),
                    source,
                })
            }
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
