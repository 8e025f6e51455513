//! Test Helper Utilities
//!
//! In-process fake of the wardrobe backend: upload-URL service, object store
//! and catalog query service on one axum server bound to 127.0.0.1:0.
//!
//! Stored objects become listable only after `index_lag` further catalog
//! queries, which stands in for backend indexing lag.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedUploadRequest {
    pub user_id: String,
    pub file_name: String,
    pub content_type: String,
    pub category: String,
}

#[derive(Debug, Clone)]
struct Grant {
    request: RecordedUploadRequest,
    key: String,
}

#[derive(Debug, Clone)]
struct PendingItem {
    item: Value,
    remaining_queries: u32,
}

pub struct FakeBackend {
    pub base_url: String,
    /// Every request, in arrival order, as "METHOD path"
    pub calls: Mutex<Vec<String>>,
    pub upload_requests: Mutex<Vec<RecordedUploadRequest>>,
    /// (content type, body length) of every transfer
    pub transfers: Mutex<Vec<(String, usize)>>,
    pub catalog_queries: Mutex<Vec<HashMap<String, String>>>,
    pub auth_headers: Mutex<Vec<Option<String>>>,
    pub deny_uploads: AtomicBool,
    pub fail_transfers: AtomicBool,
    pub fail_catalog: AtomicBool,
    pub index_lag: u32,
    issued: AtomicU32,
    grants: Mutex<HashMap<u32, Grant>>,
    pending: Mutex<Vec<PendingItem>>,
    indexed: Mutex<Vec<Value>>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Pre-populate an already indexed item
    pub fn seed_item(&self, id: &str, user_id: &str, category: &str) {
        self.indexed.lock().unwrap().push(json!({
            "id": id,
            "userId": user_id,
            "category": category,
            "imageUrl": format!("https://cdn.example.com/{}.jpg", id),
        }));
    }

    pub fn authorization_url(&self) -> String {
        format!("{}/upload-url", self.base_url)
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/items", self.base_url)
    }

    fn record(&self, call: String, headers: &HeaderMap) {
        self.calls.lock().unwrap().push(call);
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push(auth);
    }
}

/// Start a fake backend; objects are indexed after `index_lag` catalog queries
pub async fn spawn_backend(index_lag: u32) -> Arc<FakeBackend> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let backend = Arc::new(FakeBackend {
        base_url: format!("http://{}", addr),
        calls: Mutex::new(Vec::new()),
        upload_requests: Mutex::new(Vec::new()),
        transfers: Mutex::new(Vec::new()),
        catalog_queries: Mutex::new(Vec::new()),
        auth_headers: Mutex::new(Vec::new()),
        deny_uploads: AtomicBool::new(false),
        fail_transfers: AtomicBool::new(false),
        fail_catalog: AtomicBool::new(false),
        index_lag,
        issued: AtomicU32::new(0),
        grants: Mutex::new(HashMap::new()),
        pending: Mutex::new(Vec::new()),
        indexed: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/upload-url", post(issue_upload_url))
        .route("/store/:n", put(store_object))
        .route("/items", get(list_items))
        .with_state(backend.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    backend
}

async fn issue_upload_url(
    State(backend): State<Arc<FakeBackend>>,
    headers: HeaderMap,
    Json(request): Json<RecordedUploadRequest>,
) -> Response {
    backend.record("POST /upload-url".to_string(), &headers);
    backend.upload_requests.lock().unwrap().push(request.clone());

    if backend.deny_uploads.load(Ordering::SeqCst) {
        return (StatusCode::FORBIDDEN, "session expired").into_response();
    }

    let n = backend.issued.fetch_add(1, Ordering::SeqCst) + 1;
    let key = format!("{}/{}/{}", request.user_id, n, request.file_name);
    backend.grants.lock().unwrap().insert(
        n,
        Grant {
            request,
            key: key.clone(),
        },
    );

    Json(json!({
        "uploadUrl": format!("{}/store/{}", backend.base_url, n),
        "key": key,
    }))
    .into_response()
}

async fn store_object(
    State(backend): State<Arc<FakeBackend>>,
    Path(n): Path<u32>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    backend.record(format!("PUT /store/{}", n), &headers);

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    backend
        .transfers
        .lock()
        .unwrap()
        .push((content_type.clone(), body.len()));

    if backend.fail_transfers.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let Some(grant) = backend.grants.lock().unwrap().remove(&n) else {
        // Upload URLs are single use
        return StatusCode::FORBIDDEN.into_response();
    };
    if grant.request.content_type != content_type {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let item = json!({
        "id": format!("item-{}", n),
        "userId": grant.request.user_id,
        "category": grant.request.category,
        "imageUrl": format!("https://cdn.example.com/{}", grant.key),
        "fileName": grant.request.file_name,
    });

    if backend.index_lag == 0 {
        backend.indexed.lock().unwrap().push(item);
    } else {
        backend.pending.lock().unwrap().push(PendingItem {
            item,
            remaining_queries: backend.index_lag,
        });
    }

    StatusCode::OK.into_response()
}

async fn list_items(
    State(backend): State<Arc<FakeBackend>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    backend.record("GET /items".to_string(), &headers);
    backend.catalog_queries.lock().unwrap().push(params.clone());

    if backend.fail_catalog.load(Ordering::SeqCst) {
        return (StatusCode::BAD_GATEWAY, "catalog unavailable").into_response();
    }

    let user_id = params.get("userId").cloned().unwrap_or_default();
    let category = params.get("category").cloned();

    let items: Vec<Value> = backend
        .indexed
        .lock()
        .unwrap()
        .iter()
        .filter(|item| item["userId"] == user_id.as_str())
        .filter(|item| match &category {
            Some(c) => item["category"] == c.as_str(),
            None => true,
        })
        .cloned()
        .collect();

    // Indexing progresses one step per catalog query
    {
        let mut pending = backend.pending.lock().unwrap();
        let mut indexed = backend.indexed.lock().unwrap();
        for entry in pending.iter_mut() {
            entry.remaining_queries -= 1;
        }
        let (ready, waiting): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|entry| entry.remaining_queries == 0);
        *pending = waiting;
        indexed.extend(ready.into_iter().map(|entry| entry.item));
    }

    Json(json!({ "items": items })).into_response()
}
