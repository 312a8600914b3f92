use std::net::SocketAddr;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use sheetdrop::config::Config;
use sheetdrop::state::AppState;

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Credentials are decoded here; a bad blob stops the process before any request
    let config = Config::from_env().expect("Failed to load configuration");

    let in_lambda = std::env::var_os("AWS_LAMBDA_RUNTIME_API").is_some();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if in_lambda {
        // CloudWatch timestamps every line already
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .without_time()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        "Starting sheetdrop for sheet '{}' as {}",
        config.table_name,
        config.service_account.client_email
    );

    let addr = SocketAddr::new(config.host, config.port);
    let state = AppState::from_config(config).expect("Failed to initialise Sheets client");
    let app = sheetdrop::build_app(state);

    if in_lambda {
        tracing::info!("Running inside AWS Lambda");
        lambda_http::run(app).await?;
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
