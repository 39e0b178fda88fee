use crate::models::{DocumentId, NewDocument};
use crate::view_binder::PageView;
use crate::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use sync_core::error::AppError;

/// `GET /`
pub async fn documents_page(State(state): State<AppState>) -> PageView {
    state.view.on_load().await
}

/// `POST /documents` with multipart fields `file` and `assistant`.
///
/// A form that cannot be parsed is a plain 400. A body over the upload limit, or a
/// field that fails partway, is shown on the page like any other failed submit.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<PageView, AppError> {
    let mut file = None;
    let mut assistant_tag = String::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                tracing::warn!(error = %e, "Upload exceeds body limit");
                return Ok(state
                    .view
                    .on_unreadable_upload(unreadable_message("The upload", &e), e.status())
                    .await);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Malformed upload form");
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Malformed upload form: {}",
                    e
                )));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(
                            filename = %filename,
                            error = %e,
                            "Failed to read uploaded file"
                        );
                        return Ok(state
                            .view
                            .on_unreadable_upload(unreadable_message(&filename, &e), e.status())
                            .await);
                    }
                };

                // Browsers send an empty, unnamed part when no file was chosen.
                if !filename.is_empty() {
                    file = Some(NewDocument {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "assistant" => match field.text().await {
                Ok(text) => assistant_tag = text,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read assistant field");
                    let message = format!("Could not read the upload form: {}", e);
                    return Ok(state.view.on_unreadable_upload(message, e.status()).await);
                }
            },
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(state.view.on_submit(file, assistant_tag).await)
}

fn unreadable_message(filename: &str, err: &MultipartError) -> String {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        format!("{} is larger than the upload limit.", filename)
    } else {
        format!("Could not read {}: {}", filename, err)
    }
}

/// `POST /documents/:id/delete`
pub async fn delete_document(State(state): State<AppState>, Path(id): Path<String>) -> PageView {
    state.view.on_delete_click(DocumentId::new(id)).await
}
