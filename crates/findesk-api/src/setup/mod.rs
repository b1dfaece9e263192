//! Application setup and initialization
//!
//! All application initialization logic extracted from main.rs for better
//! organization and testability.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod telemetry;

use crate::state::AppState;
use anyhow::{Context, Result};
use chrono::Utc;
use findesk_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    // Setup database
    let pool = database::setup_database(&config).await?;

    // Setup storage
    let storage = storage::setup_storage(&config).await?;

    // Initialize all repositories and services
    let state = services::initialize_services(&config, pool, storage);

    // Compensate completion runs a previous process left unfinished.
    let recovered = state
        .services
        .engine
        .recover_stalled(Utc::now())
        .await
        .context("Failed to recover stalled completion runs")?;
    if recovered > 0 {
        tracing::warn!(recovered, "Compensated stalled completion runs at startup");
    }

    // Setup routes
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
