use std::borrow::Cow;

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName, LOCATION, REFERER, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, error, trace};

use super::types::error_response;
use crate::config::get_config;
use crate::services::{LinkService, is_valid_code};
use crate::storage::{ClientMeta, ShortLink};
use crate::utils::ip::extract_client_ip;

pub struct RedirectService;

impl RedirectService {
    /// `GET|HEAD /{code}`
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        service: web::Data<LinkService>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !is_valid_code(&code) {
            // 非法短码不可能存在，直接 404，不查库
            trace!("Invalid short code rejected: {}", &code);
            return Self::not_found_response();
        }

        let meta = Self::client_meta(&req);

        match service.resolve(&code, meta).await {
            Ok(Some(link)) => Self::finish_redirect(link),
            Ok(None) => {
                debug!("Redirect code not found: {}", &code);
                Self::not_found_response()
            }
            Err(e) => {
                error!("Storage error during redirect lookup for '{}': {}", code, e);
                error_response(&e)
            }
        }
    }

    /// 从请求中提取点击元数据，各字段均可缺失
    fn client_meta(req: &HttpRequest) -> ClientMeta {
        let config = get_config();
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        };

        ClientMeta {
            address: extract_client_ip(req, &config.server.trusted_proxies),
            referrer: header(REFERER),
            user_agent: header(USER_AGENT),
        }
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND).finish()
    }

    fn finish_redirect(link: ShortLink) -> HttpResponse {
        let target = normalize_redirect_target(&link.original_url);

        HttpResponse::build(StatusCode::FOUND)
            .insert_header((LOCATION, target.as_ref()))
            .finish()
    }
}

/// 缺少 `http://` / `https://` 前缀的目标补上 `http://`，其余原样返回
pub fn normalize_redirect_target(target: &str) -> Cow<'_, str> {
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        target
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });

    if has_scheme {
        Cow::Borrowed(target)
    } else {
        Cow::Owned(format!("http://{}", target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_http_and_https() {
        assert!(matches!(
            normalize_redirect_target("https://example.com"),
            Cow::Borrowed("https://example.com")
        ));
        assert_eq!(
            normalize_redirect_target("http://example.com/a?b=c"),
            "http://example.com/a?b=c"
        );
        assert_eq!(
            normalize_redirect_target("HTTPS://Example.com"),
            "HTTPS://Example.com"
        );
    }

    #[test]
    fn test_normalize_prefixes_schemeless_targets() {
        assert_eq!(
            normalize_redirect_target("example.com"),
            "http://example.com"
        );
        assert_eq!(
            normalize_redirect_target("ftp://files.example.com"),
            "http://ftp://files.example.com"
        );
        assert_eq!(normalize_redirect_target(""), "http://");
        assert_eq!(normalize_redirect_target("http:/x"), "http://http:/x");
    }

    #[test]
    fn test_normalize_handles_multibyte_input() {
        assert_eq!(normalize_redirect_target("例子.中国"), "http://例子.中国");
    }
}
