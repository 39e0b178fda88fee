//! sync-core: Shared infrastructure for the document sync workspace.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
