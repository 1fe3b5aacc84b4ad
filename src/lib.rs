//! # fasta-combine
//!
//! An HTTP service that joins a sequences JSON document with a sample metadata
//! JSON document by `accessionVersion` and returns the result as FASTA.
//!
//! ## Usage
//!
//! ```bash
//! fasta-combine --port 3000
//! curl 'http://localhost:3000/api/combine?sequencesUrl=...&metadataUrl=...&fields=displayName,sampleCollectionDate'
//! ```
//!
//! ## Modules
//!
//! - `app` - Configuration layering and logging setup
//! - `error` - Fetch and export error types
//! - `export` - Metadata index, inclusion policies, FASTA headers and the export pipeline
//! - `fetch` - Upstream JSON retrieval behind the `JsonFetcher` trait
//! - `server` - axum router, CORS and error responses
pub mod app;
pub mod error;
pub mod export;
pub mod fetch;
pub mod server;

pub use error::{ExportError, FetchError, Result};
