//! Retrieval of upstream JSON documents
//!
//! The export pipeline only needs "GET this URL and decode it as JSON". The
//! [`JsonFetcher`] trait keeps that seam open so tests can run the whole
//! pipeline against [`MockFetcher`] instead of real servers.

pub mod http;
pub mod mock;

pub use http::HttpFetcher;
pub use mock::MockFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// Fetches a URL and decodes the body as JSON.
///
/// Implementations must fail on transport errors, non-2xx statuses and
/// undecodable bodies. They must not retry.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}
