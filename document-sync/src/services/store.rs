//! Remote document store access.
//!
//! The store is the source of truth for the collection. Everything the client knows
//! about documents comes through [`DocumentStore::list`].

use crate::config::StoreSettings;
use crate::error::SyncError;
use crate::models::{Document, DocumentId, NewDocument};
use async_trait::async_trait;
use reqwest::{multipart, Client, Url};
use sync_core::observability::TracedClientExt;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the full collection.
    async fn list(&self) -> Result<Vec<Document>, SyncError>;
    /// Create a document tagged with `assistant_tag`. The response body is ignored.
    async fn create(&self, file: NewDocument, assistant_tag: &str) -> Result<(), SyncError>;
    async fn delete(&self, id: &DocumentId) -> Result<(), SyncError>;
}

/// [`DocumentStore`] over the store's HTTP API (`/api/documents`).
pub struct HttpDocumentStore {
    client: Client,
    base_url: Url,
}

impl HttpDocumentStore {
    pub fn new(settings: &StoreSettings) -> Result<Self, SyncError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            SyncError::InvalidInput(format!("invalid store URL '{}': {}", settings.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidInput(format!(
                "store URL '{}' cannot carry a path",
                settings.base_url
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/api/documents[/<id>]`, with the id percent-encoded as one segment.
    fn documents_url(&self, id: Option<&DocumentId>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "documents"]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }
}

/// Turn any non-2xx response into [`SyncError::Rejected`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SyncError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list(&self) -> Result<Vec<Document>, SyncError> {
        let url = self.documents_url(None);

        let response = self.client.traced_get(url.clone()).send().await.map_err(|e| {
            tracing::error!("Failed to send GET request to {}: {}", url, e);
            SyncError::from(e)
        })?;
        let response = ensure_success(response).await?;

        response.json::<Vec<Document>>().await.map_err(|e| {
            tracing::error!(error = %e, "Document list response could not be decoded");
            SyncError::Transport(format!("invalid document list: {}", e))
        })
    }

    async fn create(&self, file: NewDocument, assistant_tag: &str) -> Result<(), SyncError> {
        let url = self.documents_url(None);
        let content_type = file.content_type().to_string();

        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.filename.clone())
            .mime_str(&content_type)
            .map_err(|e| {
                SyncError::InvalidInput(format!("invalid content type '{}': {}", content_type, e))
            })?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("assistant", assistant_tag.to_string());

        let response = self
            .client
            .traced_post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                SyncError::from(e)
            })?;
        ensure_success(response).await?;

        Ok(())
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), SyncError> {
        let url = self.documents_url(Some(id));

        let response = self
            .client
            .traced_delete(url.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(document_id = %id, "Failed to send DELETE request to {}: {}", url, e);
                SyncError::from(e)
            })?;
        ensure_success(response).await?;

        Ok(())
    }
}
