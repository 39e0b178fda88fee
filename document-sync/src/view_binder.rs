//! Translation between browser gestures and the [`SyncController`].
//!
//! The binder keeps no document state. Every page it produces is rendered from the
//! controller's published snapshot, so a failed gesture shows the rows as they were.

use crate::error::SyncError;
use crate::models::{DocumentId, NewDocument, Snapshot};
use crate::services::sync_controller::SyncController;
use askama::Template;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use sync_core::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub id: String,
    pub filename: String,
    pub status: String,
    pub upload_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            NoticeKind::Success => "notice-success",
            NoticeKind::Error => "notice-error",
        }
    }
}

/// The `<ul>` of document rows.
#[derive(Template, Debug, Clone, PartialEq, Eq)]
#[template(path = "partials/document_list.html")]
pub struct DocumentListFragment {
    pub rows: Vec<DocumentRow>,
}

/// Full page: upload form, optional notice and the document list.
///
/// The form inputs are always rendered empty, which is what clears them after a
/// submit regardless of its outcome.
#[derive(Template)]
#[template(path = "documents.html")]
pub struct DocumentsPage {
    pub rows: Vec<DocumentRow>,
    pub notice: Option<Notice>,
}

/// A rendered page plus the status code describing the gesture's outcome.
pub struct PageView {
    pub status: StatusCode,
    pub page: DocumentsPage,
}

impl IntoResponse for PageView {
    fn into_response(self) -> Response {
        (self.status, self.page).into_response()
    }
}

#[derive(Clone)]
pub struct ViewBinder {
    controller: Arc<SyncController>,
}

impl ViewBinder {
    pub fn new(controller: Arc<SyncController>) -> Self {
        Self { controller }
    }

    /// One row per document, in snapshot order.
    pub fn render(snapshot: &Snapshot) -> DocumentListFragment {
        DocumentListFragment {
            rows: snapshot
                .documents()
                .iter()
                .map(|doc| DocumentRow {
                    id: doc.id.to_string(),
                    filename: doc.filename.clone(),
                    status: doc.status.to_string(),
                    upload_date: doc.upload_date.clone(),
                })
                .collect(),
        }
    }

    /// Page load: fetch the collection and render it.
    pub async fn on_load(&self) -> PageView {
        match self.controller.refresh().await {
            Ok(snapshot) => Self::page(&snapshot, None, StatusCode::OK),
            Err(e) => self.failure(e).await,
        }
    }

    /// Upload form submit. `file` is `None` when nothing was selected; a selected but
    /// empty file is treated the same way.
    pub async fn on_submit(&self, file: Option<NewDocument>, assistant_tag: String) -> PageView {
        let Some(file) = file.filter(|file| !file.bytes.is_empty()) else {
            return self
                .current(
                    Notice::error("Select a file to upload."),
                    StatusCode::UNPROCESSABLE_ENTITY,
                )
                .await;
        };

        let filename = file.filename.clone();
        match self.controller.upload(file, &assistant_tag).await {
            Ok(snapshot) => Self::page(
                &snapshot,
                Some(Notice::success(format!("Uploaded {}.", filename))),
                StatusCode::OK,
            ),
            Err(e) => self.failure(e).await,
        }
    }

    /// Upload form whose body could not be read, e.g. a file over the size limit.
    /// Nothing reaches the controller.
    pub async fn on_unreadable_upload(&self, message: String, status: StatusCode) -> PageView {
        self.current(Notice::error(message), status).await
    }

    /// Delete button for the row keyed by `id`.
    pub async fn on_delete_click(&self, id: DocumentId) -> PageView {
        match self.controller.remove(&id).await {
            Ok(snapshot) => Self::page(&snapshot, None, StatusCode::OK),
            Err(e) => self.failure(e).await,
        }
    }

    async fn failure(&self, err: SyncError) -> PageView {
        let message = err.to_string();
        let status = AppError::from(err).status_code();
        self.current(Notice::error(message), status).await
    }

    /// Render whatever the controller last published, or no rows before the first
    /// successful refresh.
    async fn current(&self, notice: Notice, status: StatusCode) -> PageView {
        let snapshot = self.controller.snapshot().await.unwrap_or_default();
        Self::page(&snapshot, Some(notice), status)
    }

    fn page(snapshot: &Snapshot, notice: Option<Notice>, status: StatusCode) -> PageView {
        PageView {
            status,
            page: DocumentsPage {
                rows: Self::render(snapshot).rows,
                notice,
            },
        }
    }
}
