use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::storage::LinkStore;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C，然后关闭存储
pub async fn listen_for_shutdown(store: Arc<dyn LinkStore>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, closing storage...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    close_store(store.as_ref()).await;
}

/// 在超时内关闭存储连接
pub async fn close_store(store: &dyn LinkStore) {
    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), store.close()).await {
        Ok(Ok(())) => {
            info!("{} storage closed", store.backend_name());
        }
        Ok(Err(e)) => {
            error!("Failed to close storage: {}", e);
        }
        Err(_) => {
            error!(
                "Closing storage timed out after {} seconds",
                SHUTDOWN_TIMEOUT_SECS
            );
        }
    }
}
