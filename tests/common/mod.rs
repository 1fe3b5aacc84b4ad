//! Common test utilities and helpers
#![allow(dead_code)]

use axum::{http::StatusCode, routing::get, Json, Router};
use fasta_combine::export::ExportSettings;
use fasta_combine::fetch::JsonFetcher;
use fasta_combine::server::{build_router, AppState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub const SEQUENCES_URL: &str = "http://upstream.test/sequences";
pub const METADATA_URL: &str = "http://upstream.test/metadata";

/// Sequences document in the default `data` envelope
pub fn sequences_doc(records: &[(&str, &str)]) -> Value {
    let data: Vec<Value> = records
        .iter()
        .map(|(accession, sequence)| json!({"accessionVersion": accession, "main": sequence}))
        .collect();
    json!({ "data": data, "info": {"dataVersion": "1"} })
}

/// Metadata document in the default `data` envelope
pub fn metadata_doc(records: Vec<Value>) -> Value {
    json!({ "data": records })
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    addr
}

/// Start the export service on an ephemeral port
pub async fn spawn_app(fetcher: Arc<dyn JsonFetcher>, settings: ExportSettings) -> SocketAddr {
    spawn(build_router(AppState::new(fetcher, settings))).await
}

/// Start a fake upstream data server:
///
/// - `/sequences` and `/metadata` serve small `data`-wrapped documents
/// - `/broken` returns a non-JSON body with status 200
/// - `/error` returns 500
/// - `/slow` answers after two seconds
pub async fn spawn_upstream() -> SocketAddr {
    let router = Router::new()
        .route(
            "/sequences",
            get(|| async {
                Json(sequences_doc(&[("A.1", "ACGT"), ("B.1", "GGCC"), ("C.1", "TTAA")]))
            }),
        )
        .route(
            "/metadata",
            get(|| async {
                Json(metadata_doc(vec![
                    json!({"accessionVersion": "A.1", "displayName": "Sample A", "sampleCollectionDate": "2023-05-01"}),
                    json!({"accessionVersion": "B.1", "displayName": "Sample B", "sampleCollectionDate": "2023-02-30"}),
                ]))
            }),
        )
        .route("/broken", get(|| async { "<html>not json</html>" }))
        .route(
            "/error",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"data": []}))
            }),
        );
    spawn(router).await
}
