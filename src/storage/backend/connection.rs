use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{LinkscopeError, Result};
use migration::{Migrator, MigratorTrait};

/// 是否为 SQLite 内存数据库（每个连接各自独立）
pub fn is_sqlite_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// 连接 SQLite 数据库（自动创建文件，开启外键与 WAL）
///
/// 内存数据库只使用一个常驻连接，否则迁移建的表对池中其他连接不可见。
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
    };
    use std::str::FromStr;

    let in_memory = is_sqlite_memory_url(database_url);

    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| LinkscopeError::database_config(format!("Invalid SQLite URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));
    let opt = if in_memory {
        opt.journal_mode(SqliteJournalMode::Memory)
    } else {
        opt.journal_mode(SqliteJournalMode::Wal)
    };

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    let pool = pool_options.connect_with(opt).await.map_err(|e| {
        LinkscopeError::database_connection(format!("Failed to connect to SQLite: {}", e))
    })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接 MySQL / PostgreSQL
pub async fn connect_generic(
    database_url: &str,
    backend_name: &str,
    pool_size: u32,
) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(5))
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        LinkscopeError::database_connection(format!(
            "Failed to connect to {}: {}",
            backend_name.to_uppercase(),
            e
        ))
    })
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| LinkscopeError::database_operation(format!("Migration failed: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}
