use serde::Deserialize;
use sync_core::config::{load_settings, TelemetrySettings};
use sync_core::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    #[serde(default)]
    pub upload: UploadSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    /// Root of the remote document store; `/api/documents` is appended to it.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadSettings {
    /// Largest accepted `POST /documents` body, multipart framing included.
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;

    // Check if we're already in document-sync directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("document-sync") {
        base_path.join("config")
    } else {
        base_path.join("document-sync").join("config")
    };

    load_settings(&configuration_directory)
}
