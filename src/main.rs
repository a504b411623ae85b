use jenkins_discord_relay::{AppState, RelayConfig, app, logging};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = match RelayConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = match logging::setup_logging(config.log_dir.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging: {}", e);
            std::process::exit(1);
        }
    };

    let state = match AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let config = &state.config;
    let bind_address = config.bind_address();

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            std::process::exit(1);
        }
    };

    info!("Starting server on {}", bind_address);
    match &config.jenkins_url {
        Some(url) => info!("Relaying events from Jenkins at {}", url),
        None => warn!("JENKINS_URL not set"),
    }
    info!("Input shape: {}", config.input_shape);
    info!(
        "Jenkins webhook endpoint: http://localhost:{}/webhook/jenkins",
        config.port
    );
    info!(
        "Print request body endpoint: http://localhost:{}/webhook/print",
        config.port
    );
    info!("Health check endpoint: http://localhost:{}/health", config.port);

    let app = app(state.clone());
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
