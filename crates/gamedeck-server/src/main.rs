use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use gamedeck_server::config::{ConfigSource, LogFormat, ServerConfig};
use gamedeck_server::{build_app, spawn_limiter_cleanup};

#[tokio::main]
async fn main() {
    let (config, source) = ServerConfig::load();
    init_tracing(config.log_format);

    match &source {
        ConfigSource::File(path) => tracing::info!(path = %path.display(), "Loaded config"),
        ConfigSource::Defaults => tracing::info!("No config file found, using defaults"),
        ConfigSource::Invalid { path, error } => {
            tracing::warn!(path = %path.display(), "Invalid config file, using defaults: {error}")
        },
    }

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();
    let (app, state) = build_app(config);
    spawn_limiter_cleanup(state.clone());

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen_addr, "Failed to bind: {e}");
            std::process::exit(1);
        },
    };
    tracing::info!(
        %listen_addr,
        games = state.catalog.len(),
        web_root = %state.config.web_root,
        "Gamedeck server listening"
    );

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;
    if let Err(e) = served {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
    tracing::info!("Gamedeck server stopped");
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
