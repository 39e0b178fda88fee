//! Shared fixtures: an in-process stand-in for the remote document store.
#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use document_sync::config::{StoreSettings, UploadSettings};
use document_sync::services::{HttpDocumentStore, SyncController};
use document_sync::startup::build_router;
use document_sync::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// One multipart create request as the fake store received it.
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub assistant: Option<String>,
}

#[derive(Default)]
pub struct RemoteState {
    pub documents: Mutex<Vec<Value>>,
    pub next_id: AtomicI64,
    pub uploads: Mutex<Vec<ReceivedUpload>>,
    pub deleted_paths: Mutex<Vec<String>>,
    /// Answer list requests with a body that is not a document array.
    pub garbled_list: AtomicBool,
}

impl RemoteState {
    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    /// Seed a document the way the store reports it: integer id, server-side status.
    pub fn seed(&self, filename: &str, status: &str) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.documents.lock().unwrap().push(json!({
            "id": id,
            "filename": filename,
            "upload_date": "2024-05-01T10:00:00",
            "status": status,
        }));
        id
    }
}

pub struct FakeRemoteStore {
    pub base_url: String,
    pub state: Arc<RemoteState>,
}

impl FakeRemoteStore {
    pub async fn spawn() -> Self {
        let state = Arc::new(RemoteState::default());

        let app = Router::new()
            .route("/api/documents", get(list_documents).post(create_document))
            .route("/api/documents/:id", delete(delete_document))
            .layer(DefaultBodyLimit::disable())
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake store");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    pub fn http_store(&self) -> HttpDocumentStore {
        http_store(&self.base_url)
    }

    /// Router wired to a fresh controller that talks to this fake over HTTP.
    pub fn app(&self) -> (axum::Router, Arc<SyncController>) {
        self.app_with_upload_limit(UploadSettings::default().max_bytes)
    }

    pub fn app_with_upload_limit(&self, max_bytes: usize) -> (axum::Router, Arc<SyncController>) {
        let controller = Arc::new(SyncController::new(Arc::new(self.http_store())));
        let router = build_router(
            AppState::new(controller.clone()),
            &UploadSettings { max_bytes },
        );
        (router, controller)
    }
}

pub fn http_store(base_url: &str) -> HttpDocumentStore {
    HttpDocumentStore::new(&StoreSettings {
        base_url: base_url.to_string(),
    })
    .expect("valid store URL")
}

/// A base URL nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

async fn list_documents(State(state): State<Arc<RemoteState>>) -> Response {
    if state.garbled_list.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    Json(state.documents.lock().unwrap().clone()).into_response()
}

async fn create_document(
    State(state): State<Arc<RemoteState>>,
    mut multipart: Multipart,
) -> Response {
    let mut file = None;
    let mut assistant = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.unwrap_or_default().to_vec();
                file = Some((filename, content_type, bytes));
            }
            "assistant" => assistant = field.text().await.ok(),
            _ => {}
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "file is required"})),
        )
            .into_response();
    };

    state.uploads.lock().unwrap().push(ReceivedUpload {
        filename: filename.clone(),
        content_type,
        bytes,
        assistant,
    });

    if filename.ends_with(".exe") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "unsupported file type"})),
        )
            .into_response();
    }

    state.seed(&filename, "pending");
    Json(json!({"filename": filename, "owner_id": 1})).into_response()
}

async fn delete_document(
    State(state): State<Arc<RemoteState>>,
    Path(id): Path<String>,
) -> Response {
    state.deleted_paths.lock().unwrap().push(id.clone());

    let mut documents = state.documents.lock().unwrap();
    let position = documents
        .iter()
        .position(|doc| doc["id"].to_string() == id);

    match position {
        Some(index) => {
            documents.remove(index);
            Json(json!({"message": "Document deleted"})).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Document not found or you don't have permission to delete it"})),
        )
            .into_response(),
    }
}

pub const BOUNDARY: &str = "----document-sync-test-boundary";

/// Build a browser-style upload form. `None` mimics submitting with no file chosen.
pub fn upload_form(file: Option<(&str, &[u8])>, assistant: &str) -> Vec<u8> {
    let (filename, bytes) = file.unwrap_or(("", &b""[..]));
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(
        format!(
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"assistant\"\r\n\r\n{assistant}\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );
    body
}

pub fn upload_request(file: Option<(&str, &[u8])>, assistant: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/documents")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(upload_form(file, assistant)))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete_request(id: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/documents/{}/delete", id))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Number of rendered document rows in a page.
pub fn row_count(html: &str) -> usize {
    html.matches("<li>").count()
}
