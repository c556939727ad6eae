use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{StaticConfig, get_config};
use crate::services::{ClickCapture, CodePolicy, LinkService, RandomCodeGenerator};
use crate::storage::{LinkStore, StorageFactory};

pub struct StartupContext {
    pub store: Arc<dyn LinkStore>,
    pub link_service: Arc<LinkService>,
}

/// 准备服务器启动的上下文（存储 + 业务服务）
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = get_config();
    prepare_with_config(&config).await
}

/// 基于给定配置构建上下文
pub async fn prepare_with_config(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    config
        .validate()
        .context("Invalid configuration")?;

    let store = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", store.backend_name());

    let policy = CodePolicy::from(&config.shortcode);
    let link_service = LinkService::new(
        store.clone(),
        Arc::new(RandomCodeGenerator::new()),
        policy,
    )
    .with_click_capture(ClickCapture::from(&config.analytics));

    debug!(
        "Short code policy: length {}, {} attempts per length, max length {}",
        policy.length, policy.max_attempts, policy.max_length
    );
    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        store,
        link_service: Arc::new(link_service),
    })
}
