pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod view_binder;

use services::SyncController;
use std::sync::Arc;
use view_binder::ViewBinder;

/// Shared application state: the controller and the binder that drives it.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SyncController>,
    pub view: ViewBinder,
}

impl AppState {
    pub fn new(controller: Arc<SyncController>) -> Self {
        Self {
            view: ViewBinder::new(controller.clone()),
            controller,
        }
    }
}
