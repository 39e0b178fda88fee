use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Store-assigned identifier. Opaque to the client; the store may send it as a JSON
/// string or integer and both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(s) => DocumentId(s),
            WireId::Signed(n) => DocumentId(n.to_string()),
            WireId::Unsigned(n) => DocumentId(n.to_string()),
        })
    }
}

/// Lifecycle tag reported by the store. The vocabulary belongs to the store, so this
/// is displayed as-is and never matched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentStatus(String);

impl DocumentStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of `GET /api/documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: DocumentId::new(id),
            filename: filename.into(),
            status: DocumentStatus::new(status),
            upload_date: None,
        }
    }
}

/// File selected for upload.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl NewDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// The document collection as of the last successful refresh.
///
/// Built once and then shared behind an `Arc`; there is no way to mutate a published
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    documents: Vec<Document>,
}

impl Snapshot {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.iter().any(|doc| &doc.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_accepts_integer_ids() {
        let body = r#"[
            {"id": 7, "filename": "notes.txt", "status": "processed", "upload_date": "2024-05-01T10:00:00"},
            {"id": "abc", "filename": "a.pdf", "status": "pending", "owner_id": 3}
        ]"#;

        let documents: Vec<Document> = serde_json::from_str(body).unwrap();

        assert_eq!(documents[0].id.as_str(), "7");
        assert_eq!(documents[0].upload_date.as_deref(), Some("2024-05-01T10:00:00"));
        assert_eq!(documents[1].id, DocumentId::new("abc"));
        assert_eq!(documents[1].status.as_str(), "pending");
        assert_eq!(documents[1].upload_date, None);
    }

    #[test]
    fn test_missing_filename_is_rejected() {
        let result: Result<Document, _> = serde_json::from_str(r#"{"id": 1, "status": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_content_type() {
        let file = NewDocument::new("a.pdf", b"%PDF".to_vec());
        assert_eq!(file.content_type(), "application/octet-stream");
        assert_eq!(
            file.with_content_type("application/pdf").content_type(),
            "application/pdf"
        );
    }
}
