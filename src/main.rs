use anomaly_rs::config::AnomalyConfig;
use anomaly_rs::http_server::AnomalyHttpServer;
use anomaly_rs::logging::{self, LogConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration and initialize logging
    let config = AnomalyConfig::load()?;
    let log_level = config
        .server
        .log_level
        .clone()
        .unwrap_or_else(|| "info".to_string());
    let _guard = logging::init(&LogConfig::with_level(&log_level))?;

    // Generate a sample configuration file and exit
    if std::env::args().any(|arg| arg == "--generate-config") {
        AnomalyConfig::generate_sample_config()?;
        return Ok(());
    }

    let addr = config
        .server
        .bind_addr
        .clone()
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());

    info!(
        "anomaly-rs starting with {} strategy",
        config.detector.strategy
    );

    let server = AnomalyHttpServer::new(&config);
    server.serve(&addr).await?;

    Ok(())
}
