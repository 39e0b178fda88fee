use document_sync::config::get_configuration;
use document_sync::services::metrics::init_metrics;
use document_sync::startup::Application;
use sync_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "document-sync",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    init_metrics().map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let app = Application::build(configuration)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start document-sync: {}", e))?;

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
