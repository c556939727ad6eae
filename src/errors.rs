use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum LinkscopeError {
    Validation(String),
    NotFound(String),
    CodeConflict(String),
    CodeSpaceExhausted(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    FileOperation(String),
}

impl LinkscopeError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkscopeError::Validation(_) => "E001",
            LinkscopeError::NotFound(_) => "E002",
            LinkscopeError::CodeConflict(_) => "E003",
            LinkscopeError::CodeSpaceExhausted(_) => "E004",
            LinkscopeError::DatabaseConfig(_) => "E005",
            LinkscopeError::DatabaseConnection(_) => "E006",
            LinkscopeError::DatabaseOperation(_) => "E007",
            LinkscopeError::Serialization(_) => "E008",
            LinkscopeError::FileOperation(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkscopeError::Validation(_) => "Validation Error",
            LinkscopeError::NotFound(_) => "Resource Not Found",
            LinkscopeError::CodeConflict(_) => "Short Code Conflict",
            LinkscopeError::CodeSpaceExhausted(_) => "Short Code Space Exhausted",
            LinkscopeError::DatabaseConfig(_) => "Database Configuration Error",
            LinkscopeError::DatabaseConnection(_) => "Database Connection Error",
            LinkscopeError::DatabaseOperation(_) => "Database Operation Error",
            LinkscopeError::Serialization(_) => "Serialization Error",
            LinkscopeError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkscopeError::Validation(msg)
            | LinkscopeError::NotFound(msg)
            | LinkscopeError::CodeConflict(msg)
            | LinkscopeError::CodeSpaceExhausted(msg)
            | LinkscopeError::DatabaseConfig(msg)
            | LinkscopeError::DatabaseConnection(msg)
            | LinkscopeError::DatabaseOperation(msg)
            | LinkscopeError::Serialization(msg)
            | LinkscopeError::FileOperation(msg) => msg,
        }
    }

    /// Persistence-layer failures (StorageError family), including code conflicts.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            LinkscopeError::CodeConflict(_)
                | LinkscopeError::CodeSpaceExhausted(_)
                | LinkscopeError::DatabaseConfig(_)
                | LinkscopeError::DatabaseConnection(_)
                | LinkscopeError::DatabaseOperation(_)
        )
    }

    pub fn is_code_conflict(&self) -> bool {
        matches!(self, LinkscopeError::CodeConflict(_))
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkscopeError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkscopeError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkscopeError::CodeConflict(_) => StatusCode::CONFLICT,
            LinkscopeError::CodeSpaceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            LinkscopeError::DatabaseConfig(_)
            | LinkscopeError::DatabaseConnection(_)
            | LinkscopeError::DatabaseOperation(_)
            | LinkscopeError::Serialization(_)
            | LinkscopeError::FileOperation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkscopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkscopeError {}

// 便捷的构造函数
impl LinkscopeError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::NotFound(msg.into())
    }

    pub fn code_conflict<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::CodeConflict(msg.into())
    }

    pub fn code_space_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::CodeSpaceExhausted(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkscopeError::FileOperation(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkscopeError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return LinkscopeError::CodeConflict(detail);
        }
        LinkscopeError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkscopeError {
    fn from(err: std::io::Error) -> Self {
        LinkscopeError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkscopeError {
    fn from(err: serde_json::Error) -> Self {
        LinkscopeError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkscopeError>;
