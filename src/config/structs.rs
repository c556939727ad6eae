use serde::{Deserialize, Serialize};

use crate::errors::{LinkscopeError, Result};
use crate::services::MAX_CODE_LENGTH;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀（`LINKSCOPE__SERVER__PORT=9000`）
pub const ENV_PREFIX: &str = "LINKSCOPE";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、路由前缀、可信代理
/// - database: 数据库连接与重试
/// - shortcode: 短码长度与碰撞重试策略
/// - analytics: 点击记录字段开关
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub shortcode: ShortCodeConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let loaded = builder
            .build()
            .and_then(|settings| settings.try_deserialize::<StaticConfig>());

        match loaded {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// 校验配置项之间的约束
    pub fn validate(&self) -> Result<()> {
        let sc = &self.shortcode;
        if sc.length == 0 {
            return Err(LinkscopeError::validation(
                "shortcode.length must be greater than 0",
            ));
        }
        if sc.max_length < sc.length {
            return Err(LinkscopeError::validation(format!(
                "shortcode.max_length ({}) must be >= shortcode.length ({})",
                sc.max_length, sc.length
            )));
        }
        if sc.max_length > MAX_CODE_LENGTH {
            return Err(LinkscopeError::validation(format!(
                "shortcode.max_length ({}) exceeds the short_code column width ({})",
                sc.max_length, MAX_CODE_LENGTH
            )));
        }
        if sc.max_attempts == 0 {
            return Err(LinkscopeError::validation(
                "shortcode.max_attempts must be greater than 0",
            ));
        }
        if !self.server.path_prefix.starts_with('/') {
            return Err(LinkscopeError::validation(format!(
                "server.path_prefix must start with '/': {}",
                self.server.path_prefix
            )));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LinkscopeError::serialization(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 所有 API 路由的公共前缀
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// 允许携带 X-Forwarded-For 的代理（IP 或 CIDR）
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 短码生成策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortCodeConfig {
    #[serde(default = "default_code_length")]
    pub length: usize,
    /// 每个长度下最多尝试的候选数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 碰撞持续时逐步加长，直到该上限
    #[serde(default = "default_max_code_length")]
    pub max_length: usize,
}

/// 点击记录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_true")]
    pub enable_ip_logging: bool,
    #[serde(default = "default_true")]
    pub enable_referrer_logging: bool,
    #[serde(default = "default_true")]
    pub enable_user_agent_logging: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_path_prefix() -> String {
    "/api".to_string()
}

fn default_database_url() -> String {
    "sqlite://linkscope.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_code_length() -> usize {
    crate::services::DEFAULT_CODE_LENGTH
}

fn default_max_attempts() -> u32 {
    16
}

fn default_max_code_length() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            path_prefix: default_path_prefix(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for ShortCodeConfig {
    fn default() -> Self {
        Self {
            length: default_code_length(),
            max_attempts: default_max_attempts(),
            max_length: default_max_code_length(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enable_ip_logging: true,
            enable_referrer_logging: true,
            enable_user_agent_logging: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}
