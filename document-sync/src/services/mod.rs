pub mod metrics;
pub mod store;
pub mod sync_controller;

pub use store::{DocumentStore, HttpDocumentStore};
pub use sync_controller::SyncController;
