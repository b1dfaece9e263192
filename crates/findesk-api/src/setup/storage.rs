//! Storage backend setup

use anyhow::{Context, Result};
use findesk_core::Config;
use findesk_storage::{create_storage, Storage};
use std::sync::Arc;

/// Create the storage backend from configuration
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(backend = %storage.backend_type(), "Storage backend initialized");
    Ok(storage)
}
