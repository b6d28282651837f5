use std::sync::Arc;

use anyhow::Result;
use store::{DatabaseConfig, Store};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod jwt;
mod middleware;
mod models;
mod password;
mod ranking;
mod referrals;
mod repositories;
mod routes;
mod service;
mod state;
mod validation;
mod waitlist;

use crate::{
    config::ServerConfig,
    jwt::{JwtConfig, JwtService},
    password::Argon2Hasher,
    service::LeaderboardService,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting leaderboard service");

    let server_config = ServerConfig::load()?;

    // Open the store, replaying any journal left by the last run
    let db_config = DatabaseConfig::from_env()?;
    info!("Opening store at {}", db_config.path.display());
    let store = Store::open(db_config)?;

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config)?;

    let service = LeaderboardService::new(
        store.clone(),
        Arc::new(Argon2Hasher),
        Arc::new(jwt_service.clone()),
        server_config.app_url.clone(),
    );

    match server_config.admin_account() {
        Some(admin) => service.ensure_admin(&admin)?,
        None => warn!("No admin account configured"),
    }

    let app_state = AppState {
        service,
        jwt_service,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Leaderboard service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Writing final checkpoint");
    store.checkpoint()?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
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
}
