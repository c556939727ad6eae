use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStore;
pub use models::{ClickEvent, ClientMeta, NewClickEvent, NewShortLink, ShortLink};

/// Persistence contract consumed by `LinkService`.
///
/// Implementations are the sole arbiter of code uniqueness: `save` must
/// reject a duplicate code atomically with `LinkscopeError::CodeConflict`,
/// because the service's check-then-save sequence is not atomic on its own.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Look up a link by its exact (case-sensitive) code, with click history.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>>;

    /// Persist a new link and return it with its assigned id.
    async fn save(&self, link: NewShortLink) -> Result<ShortLink>;

    /// Every stored link with its click history, in insertion order.
    async fn find_all(&self) -> Result<Vec<ShortLink>>;

    /// Append a click to an existing link.
    async fn save_click(&self, click: NewClickEvent) -> Result<ClickEvent>;

    /// Number of stored links.
    async fn count(&self) -> Result<u64>;

    fn backend_name(&self) -> &str;

    /// Release underlying resources on shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn LinkStore>> {
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;

        if backend_type == "memory" {
            return Ok(Arc::new(MemoryStore::new()));
        }

        let storage = SeaOrmStorage::new(config, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
