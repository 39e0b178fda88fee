use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Logging and trace export settings shared by every binary in the workspace.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC collector endpoint (e.g. http://tempo:4317). Export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load settings from `<dir>/base.yaml`, overridden by `APP_`-prefixed environment
/// variables using `__` as the nesting separator (`APP_STORE__BASE_URL`).
pub fn load_settings<T: DeserializeOwned>(configuration_directory: &Path) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let settings = Cfg::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        telemetry: TelemetrySettings,
    }

    #[test]
    fn test_missing_directory_falls_back_to_defaults() {
        let sample: Sample =
            load_settings(Path::new("does/not/exist")).expect("defaults should deserialize");
        assert_eq!(sample.telemetry.otlp_endpoint, None);
        assert!(!sample.telemetry.log_level.is_empty());
    }
}
