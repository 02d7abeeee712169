use maestro_gateway::api::app;
use maestro_gateway::build_state;
use maestro_gateway::config::ServerConfig;
use maestro_gateway::error::StartupError;
use rootcause::Report;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!(error = %report, "Gateway stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Report<StartupError>> {
    let config = ServerConfig::from_env().map_err(|e| StartupError::Config {
        reason: e.to_string(),
    })?;
    tracing::info!(version = %config.version, "Loaded configuration");

    let state = build_state(&config).await?;
    let app = app(Arc::new(state));

    let address = config.http.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| StartupError::Serve {
            address: address.clone(),
            reason: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            address,
            reason: e.to_string(),
        })?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
