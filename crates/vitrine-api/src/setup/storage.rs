//! Media storage setup

use anyhow::{Context, Result};
use std::sync::Arc;
use vitrine_core::Config;
use vitrine_storage::{LocalMediaStore, MediaStore};

/// Create the media root and the store writing into it
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn MediaStore>> {
    let store = LocalMediaStore::new(config.media_root.clone())
        .await
        .with_context(|| format!("Failed to open media root {}", config.media_root.display()))?;

    tracing::info!(media_root = %config.media_root.display(), "Local media storage ready");
    Ok(Arc::new(store))
}
