//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::warn;

use super::LinkStore;
use super::models::{ClickEvent, NewClickEvent, NewShortLink, ShortLink};
use crate::config::DatabaseConfig;
use crate::errors::{LinkscopeError, Result};

pub use connection::{connect_generic, connect_sqlite, is_sqlite_memory_url, run_migrations};
pub use converters::{model_to_click, model_to_shortlink};
pub use retry::RetryPolicy;

/// 从数据库 URL 推断后端类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("memory://") || database_url == "memory" {
        Ok("memory".to_string())
    } else if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkscopeError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: memory://, sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 裸文件路径补全为 sqlite URL
fn normalize_sqlite_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}?mode=rwc", database_url)
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry: RetryPolicy,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig, backend_name: &str) -> Result<Self> {
        let database_url = config.database_url.as_str();
        if database_url.is_empty() {
            return Err(LinkscopeError::database_config("database_url is not set"));
        }

        let db = match backend_name {
            "sqlite" => connect_sqlite(&normalize_sqlite_url(database_url)).await?,
            "mysql" | "postgres" => {
                connect_generic(database_url, backend_name, config.pool_size).await?
            }
            other => {
                return Err(LinkscopeError::database_config(format!(
                    "Unsupported SeaORM backend: {}",
                    other
                )));
            }
        };

        Self::from_connection(db, backend_name, RetryPolicy::from(config)).await
    }

    /// 基于已有连接构建（会执行迁移）
    pub async fn from_connection(
        db: DatabaseConnection,
        backend_name: &str,
        retry: RetryPolicy,
    ) -> Result<Self> {
        run_migrations(&db).await?;

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry,
        };

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        self.query_by_code(code).await
    }

    async fn save(&self, link: NewShortLink) -> Result<ShortLink> {
        self.insert_link(link).await
    }

    async fn find_all(&self) -> Result<Vec<ShortLink>> {
        self.query_all().await
    }

    async fn save_click(&self, click: NewClickEvent) -> Result<ClickEvent> {
        self.insert_click(click).await
    }

    async fn count(&self) -> Result<u64> {
        self.query_count().await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| {
                LinkscopeError::database_connection(format!("Failed to close pool: {}", e))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("memory://").unwrap(), "memory");
        assert_eq!(infer_backend_from_url("sqlite://links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("data/links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mysql://u:p@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("mariadb://u:p@h/db").unwrap(), "mysql");
        assert_eq!(
            infer_backend_from_url("postgresql://u:p@h/db").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("redis://localhost").is_err());
    }

    #[test]
    fn test_is_sqlite_memory_url() {
        assert!(is_sqlite_memory_url("sqlite::memory:"));
        assert!(is_sqlite_memory_url("sqlite://file:links?mode=memory"));
        assert!(!is_sqlite_memory_url("sqlite://links.db?mode=rwc"));
    }

    #[test]
    fn test_normalize_sqlite_url() {
        assert_eq!(normalize_sqlite_url("sqlite://a.db"), "sqlite://a.db");
        assert_eq!(normalize_sqlite_url("a.db"), "sqlite://a.db?mode=rwc");
    }
}
