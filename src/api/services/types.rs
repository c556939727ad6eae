//! Request / response bodies shared by the API handlers

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::LinkscopeError;

/// `POST /shorten` 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct ShortenRequest {
    #[serde(rename = "originalUrl")]
    pub original_url: String,
}

/// 统一的 JSON 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&LinkscopeError> for ErrorBody {
    fn from(err: &LinkscopeError) -> Self {
        Self {
            error: err.error_type().to_string(),
            message: err.message().to_string(),
        }
    }
}

/// 从 LinkscopeError 构建错误响应（自动映射 HTTP 状态码）
pub fn error_response(err: &LinkscopeError) -> HttpResponse {
    HttpResponse::build(err.http_status())
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ErrorBody::from(err))
}

/// `JsonConfig` 错误处理：请求体缺失、格式错误、字段缺失或类型不对都返回 400
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected JSON payload on {}: {}", req.path(), err);
    let validation = LinkscopeError::validation(format!("Invalid request body: {}", err));
    let response = error_response(&validation);
    InternalError::from_response(err, response).into()
}
