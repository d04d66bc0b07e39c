//! Integration tests for the HTTP sources against an in-process server
//!
//! Tests cover:
//! - Remote fetch sends a cache-busting `t` query parameter
//! - Non-2xx and non-JSON bodies are recoverable source failures
//! - Remote write PATCHes the gist with token auth and the catalog content
//! - HttpFallback reads a static document

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use reel_common::config::RemoteConfig;
use reel_common::sources::{BundledFallback, HttpFallback, HttpRemoteStore, RemoteCredentials, RemoteStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct ServerLog {
    queries: Vec<HashMap<String, String>>,
    patches: Vec<(String, Option<String>, Value)>,
}

type Shared = Arc<Mutex<ServerLog>>;

async fn videos(State(log): State<Shared>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    log.lock().unwrap().queries.push(query);
    Json(json!([
        {"id": "r1", "name": "Remote One", "category": "Reel", "role": "Director", "description": "", "timestamp": 1},
        {"id": "r2", "category": "Legacy", "timestamp": 2}
    ]))
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn html() -> &'static str {
    "<html>not json</html>"
}

async fn update_gist(
    State(log): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let authorized = auth.as_deref() == Some("token good-token");
    log.lock().unwrap().patches.push((id, auth, body));

    if authorized {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

/// Test helper: start the fake document server, returning its base URL
async fn start_server() -> (String, Shared) {
    let log: Shared = Arc::new(Mutex::new(ServerLog::default()));
    let app = Router::new()
        .route("/videos.json", get(videos))
        .route("/broken.json", get(broken))
        .route("/html.json", get(html))
        .route("/gists/:id", patch(update_gist))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    (format!("http://{}", addr), log)
}

fn remote_config(base: &str) -> RemoteConfig {
    RemoteConfig {
        api_base: base.to_string(),
        document_file: "videos.json".to_string(),
    }
}

#[tokio::test]
async fn test_remote_fetch_is_cache_busted() {
    let (base, log) = start_server().await;
    let remote = HttpRemoteStore::new(format!("{}/videos.json", base), &remote_config(&base), Duration::from_secs(5)).unwrap();

    let videos = remote.fetch().await.unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].name, "Remote One");
    assert_eq!(videos[1].name, "Untitled Video");

    let log = log.lock().unwrap();
    let t = log.queries[0].get("t").expect("cache-busting parameter");
    assert!(t.parse::<i64>().unwrap() > 0);
}

#[tokio::test]
async fn test_remote_fetch_failures_are_recoverable() {
    let (base, _) = start_server().await;

    for path in ["broken.json", "html.json", "missing.json"] {
        let remote = HttpRemoteStore::new(format!("{}/{}", base, path), &remote_config(&base), Duration::from_secs(5)).unwrap();
        let err = remote.fetch().await.unwrap_err();
        assert!(err.is_recoverable_source_failure(), "{} gave {:?}", path, err);
    }
}

#[tokio::test]
async fn test_remote_write_patches_gist() {
    let (base, log) = start_server().await;
    let remote = HttpRemoteStore::new(format!("{}/videos.json", base), &remote_config(&base), Duration::from_secs(5)).unwrap();
    let credentials = RemoteCredentials {
        document_id: "gist42".to_string(),
        token: "good-token".to_string(),
    };

    remote.write(&credentials, "[{\"id\":\"x\"}]").await.unwrap();

    let log = log.lock().unwrap();
    let (id, auth, body) = &log.patches[0];
    assert_eq!(id, "gist42");
    assert_eq!(auth.as_deref(), Some("token good-token"));
    assert_eq!(body["files"]["videos.json"]["content"], "[{\"id\":\"x\"}]");
}

#[tokio::test]
async fn test_remote_write_rejected_token_is_error() {
    let (base, _) = start_server().await;
    let remote = HttpRemoteStore::new(format!("{}/videos.json", base), &remote_config(&base), Duration::from_secs(5)).unwrap();
    let credentials = RemoteCredentials {
        document_id: "gist42".to_string(),
        token: "stale".to_string(),
    };

    let err = remote.write(&credentials, "[]").await.unwrap_err();
    assert!(matches!(err, reel_common::Error::Network(_)));
}

#[tokio::test]
async fn test_http_fallback_reads_static_document() {
    let (base, log) = start_server().await;
    let fallback = HttpFallback::new(format!("{}/videos.json", base), Duration::from_secs(5)).unwrap();

    let videos = fallback.fetch().await.unwrap();

    assert_eq!(videos[0].id, "r1");
    // Static fallback is not cache-busted
    assert!(log.lock().unwrap().queries[0].get("t").is_none());
}
