//! Main entry point for the identity backend.
//!
//! This file initializes logging and configuration, opens the user store,
//! wires the credential and token services together and serves the HTTP API
//! until the process is asked to shut down.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod utils;

use crate::api::common::ApiResponse;
use crate::auth::cookies::CookieSettings;
use crate::auth::service::AuthService;
use crate::auth::state::AppState;
use crate::auth::token_service::TokenService;
use crate::repositories::UserStore;
use crate::repositories::memory::InMemoryUserStore;
use crate::repositories::user_repository::UserRepository;
use crate::utils::password::PasswordManager;
use anyhow::Context;
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// `DATABASE_URL` value that selects the non-durable in-memory store.
const IN_MEMORY_STORE: &str = "memory";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(?config, "configuration loaded");

    let (store, db): (Arc<dyn UserStore>, Option<Database>) =
        if config.database_url == IN_MEMORY_STORE {
            warn!("Using the in-memory user store; accounts are lost on restart");
            let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
            (store, None)
        } else {
            let db = Database::new(&config).await?;
            let store: Arc<dyn UserStore> = Arc::new(UserRepository::new(db.pool().clone()));
            (store, Some(db))
        };

    let passwords = PasswordManager::new(config.bcrypt_cost, config.blocking_timeout())
        .context("failed to initialise password hashing")?;
    let tokens = TokenService::new(&config.token_config())
        .context("failed to initialise token service")?;
    let auth = AuthService::new(
        store,
        passwords,
        Arc::new(tokens),
        config.blocking_timeout(),
    );
    let state = AppState::new(
        auth,
        CookieSettings {
            secure: config.cookie_secure,
        },
    );

    let app = Router::new()
        .route("/", get(root_handler))
        .merge(auth::routes::auth_router())
        .layer(Extension(state));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    info!("Starting identity server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(db) = db {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Identity Backend",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the identity API",
    ))
}
