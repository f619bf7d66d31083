//! Local stand-in for the remote file API
//!
//! Records every request it receives and answers with canned bodies. A few
//! URLs trigger failures:
//! - a merged file containing `locked` gets a 422 with a message
//! - a split source containing `broken` gets a 500 with a plain-text body
//! - `GET /splits` always answers 503 with a message
//! - `GET /merges/:id` always answers 404 with an empty JSON object

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct Remote {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Remote {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn posts(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.method == "POST").collect()
    }

    fn record(&self, method: &'static str, path: impl Into<String>, body: Value) {
        self.calls.lock().push(Call {
            method,
            path: path.into(),
            body,
        });
    }
}

/// Start the stand-in on an ephemeral port and return its base URL
pub async fn spawn_remote() -> (String, Remote) {
    let remote = Remote::default();
    let app = Router::new()
        .route("/merges", get(list_merges).post(create_merge))
        .route("/merges/:id", get(get_merge))
        .route("/splits", get(list_splits).post(create_split))
        .route("/splits/:id", get(get_split))
        .route("/conversions", get(list_conversions).post(create_conversion))
        .with_state(remote.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), remote)
}

/// Base URL nothing listens on
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn create_merge(State(remote): State<Remote>, Json(body): Json<Value>) -> Response {
    remote.record("POST", "/merges", body.clone());
    let merged = body["merged_file"].as_str().unwrap_or_default();
    if merged.contains("locked") {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "Destination is locked" })),
        )
            .into_response();
    }
    Json(json!({ "files": body["files"], "merged_file": merged })).into_response()
}

async fn list_merges(State(remote): State<Remote>) -> Response {
    remote.record("GET", "/merges", Value::Null);
    Json(json!([])).into_response()
}

async fn get_merge(State(remote): State<Remote>, Path(id): Path<u64>) -> Response {
    remote.record("GET", format!("/merges/{}", id), Value::Null);
    (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
}

async fn create_split(State(remote): State<Remote>, Json(body): Json<Value>) -> Response {
    remote.record("POST", "/splits", body.clone());
    let file_name = body["file_name"].as_str().unwrap_or_default();
    if file_name.contains("broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    Json(json!({
        "id": 7,
        "file_name": file_name,
        "page_ranges": body["page_ranges"],
        "split_files": body["split_files"],
    }))
    .into_response()
}

async fn list_splits(State(remote): State<Remote>) -> Response {
    remote.record("GET", "/splits", Value::Null);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "message": "Split history is under maintenance" })),
    )
        .into_response()
}

async fn get_split(State(remote): State<Remote>, Path(id): Path<u64>) -> Response {
    remote.record("GET", format!("/splits/{}", id), Value::Null);
    Json(json!({
        "id": id,
        "file_name": "https://files.example.com/book.pdf",
        "page_ranges": [[1, 2], [3, 4]],
        "split_files": [
            "https://files.example.com/book_part_1.pdf",
            "https://files.example.com/book_part_2.pdf"
        ],
    }))
    .into_response()
}

async fn create_conversion(State(remote): State<Remote>, Json(body): Json<Value>) -> Response {
    remote.record("POST", "/conversions", body.clone());
    Json(json!({
        "file_type": body["file_type"],
        "file_url": body["file_url"],
        "output_file_url": body["output_file_url"],
        "target_type": body["target_type"],
    }))
    .into_response()
}

async fn list_conversions(State(remote): State<Remote>) -> Response {
    remote.record("GET", "/conversions", Value::Null);
    Json(json!([
        {
            "file_type": "pdf",
            "file_url": "https://files.example.com/report.pdf",
            "output_file_url": "https://files.example.com/report.png",
            "target_type": "png"
        },
        {
            "file_type": "webp",
            "file_url": "https://files.example.com/photo.webp",
            "output_file_url": "not a url",
            "target_type": "jpg"
        }
    ]))
    .into_response()
}
