//! Integration tests for [`BucketSink`] against a local S3-compatible server.
//!
//! The sink is configured the way the binary configures it: `SINK_KIND=s3`
//! with `S3_ENDPOINT_URL` pointing at an axum router on `127.0.0.1:0` and
//! static credentials, so requests arrive path-style as
//! `PUT /<bucket>/<key>`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::put;
use axum::Router;

use framemark_core::{RemoteSink, SinkError};
use framemark_delivery::{build_sink, SinkConfig};

const PRECONDITION_FAILED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>PreconditionFailed</Code><Message>At least one of the pre-conditions you specified did not hold</Message><Condition>If-None-Match</Condition><RequestId>0001</RequestId></Error>"#;

const ACCESS_DENIED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message><RequestId>0002</RequestId></Error>"#;

#[derive(Debug, Clone)]
struct Upload {
    bucket: String,
    key: String,
    content_type: Option<String>,
    if_none_match: Option<String>,
    body: Vec<u8>,
}

#[derive(Clone)]
struct ObjectStore {
    reply: (StatusCode, Option<&'static str>),
    uploads: Arc<Mutex<Vec<Upload>>>,
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn put_object(
    State(store): State<ObjectStore>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    store.uploads.lock().unwrap().push(Upload {
        bucket,
        key,
        content_type: header_value(&headers, header::CONTENT_TYPE),
        if_none_match: header_value(&headers, header::IF_NONE_MATCH),
        body: body.to_vec(),
    });

    match store.reply {
        (status, Some(xml)) => (status, [(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
        (status, None) => (status, [(header::ETAG, "\"0123456789abcdef\"")]).into_response(),
    }
}

/// Start an object store that answers every PUT with `reply`.
async fn spawn_store(
    reply: (StatusCode, Option<&'static str>),
) -> (String, Arc<Mutex<Vec<Upload>>>) {
    let uploads = Arc::new(Mutex::new(Vec::new()));
    let store = ObjectStore {
        reply,
        uploads: Arc::clone(&uploads),
    };

    let app = Router::new()
        .route("/{bucket}/{key}", put(put_object))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), uploads)
}

async fn sink_for(endpoint: &str) -> Arc<dyn RemoteSink> {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SINK_KIND", "s3"),
        ("S3_BUCKET", "labels"),
        ("S3_REGION", "us-east-1"),
        ("S3_ENDPOINT_URL", endpoint),
        ("S3_ACCESS_KEY_ID", "AKIDEXAMPLE"),
        ("S3_SECRET_ACCESS_KEY", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
    ]);
    let config = SinkConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
    build_sink(&config).await.unwrap()
}

fn is_timestamped_key(key: &str) -> bool {
    key.strip_prefix("annotations-")
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|millis| !millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit()))
}

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn puts_timestamped_key_without_overwrite() {
    let (endpoint, uploads) = spawn_store((StatusCode::OK, None)).await;
    let sink = sink_for(&endpoint).await;
    assert_eq!(sink.name(), "s3");

    let body = b"[\n  {\n    \"frame\": 7,\n    \"label\": \"hello\"\n  }\n]".to_vec();
    let receipt = sink
        .send(body.clone(), "application/json", "annotations.json")
        .await
        .expect("upload should succeed");

    let uploads = uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    let upload = &uploads[0];
    assert_eq!(upload.bucket, "labels");
    assert!(is_timestamped_key(&upload.key), "unexpected key {}", upload.key);
    assert_eq!(upload.content_type.as_deref(), Some("application/json"));
    assert_eq!(upload.if_none_match.as_deref(), Some("*"));
    assert_eq!(upload.body, body);

    assert_eq!(receipt.sink, "s3");
    assert_eq!(receipt.location, format!("s3://labels/{}", upload.key));
}

#[tokio::test]
async fn repeated_exports_use_fresh_keys() {
    let (endpoint, uploads) = spawn_store((StatusCode::OK, None)).await;
    let sink = sink_for(&endpoint).await;

    sink.send(b"[]".to_vec(), "application/json", "annotations.json")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    sink.send(b"[]".to_vec(), "application/json", "annotations.json")
        .await
        .unwrap();

    let uploads = uploads.lock().unwrap();
    assert_eq!(uploads.len(), 2);
    assert_ne!(uploads[0].key, uploads[1].key);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn existing_object_is_reported_as_conflict() {
    let (endpoint, uploads) =
        spawn_store((StatusCode::PRECONDITION_FAILED, Some(PRECONDITION_FAILED))).await;
    let sink = sink_for(&endpoint).await;

    let err = sink
        .send(b"[]".to_vec(), "application/json", "annotations.json")
        .await
        .unwrap_err();

    let key = uploads.lock().unwrap()[0].key.clone();
    assert_eq!(err, SinkError::Conflict(key));
}

#[tokio::test]
async fn other_service_errors_are_upload_failures() {
    let (endpoint, _uploads) = spawn_store((StatusCode::FORBIDDEN, Some(ACCESS_DENIED))).await;
    let sink = sink_for(&endpoint).await;

    let err = sink
        .send(b"[]".to_vec(), "application/json", "annotations.json")
        .await
        .unwrap_err();

    assert_matches!(err, SinkError::Upload(detail) if detail.contains("AccessDenied"));
}
