pub mod document;

pub use document::{Document, DocumentId, DocumentStatus, NewDocument, Snapshot};
