//! 数据库操作重试
//!
//! 对死锁、锁超时、连接池获取失败等瞬时错误做指数退避重试。
//! 唯一约束冲突等确定性错误直接返回，由上层处理。

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    if err.sql_err().is_some() {
        // 约束类错误（唯一键、外键）重试无意义
        return false;
    }

    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                return matches!(
                    code.as_ref(),
                    // MySQL 死锁 / 锁超时, PostgreSQL 序列化失败 / 死锁, SQLite BUSY / LOCKED
                    "1213" | "1205" | "40001" | "40P01" | "5" | "6"
                );
            }
            is_transient_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_transient_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_transient_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("deadlock")
        || msg.contains("lock wait timeout")
        || msg.contains("database is locked")
        || msg.contains("serialization failure")
}

/// 重试策略
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl From<&DatabaseConfig> for RetryPolicy {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次重试前的等待时间（毫秒），带 0-25% 抖动
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.max_delay_ms);
        let jitter = rand::random_range(0..=capped / 4);
        capped.saturating_add(jitter)
    }

    /// 执行操作，遇到可重试错误时按策略退避重试
    pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T, DbErr>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbErr>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("'{}' succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if attempt < self.max_retries && is_retryable_error(&e) => {
                    attempt += 1;
                    let delay = self.backoff_ms(attempt);
                    warn!(
                        "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
                        operation_name,
                        attempt,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
