pub mod health;
pub mod links;
pub mod redirect;
pub mod types;

use actix_web::{Scope, web};

pub use health::{AppStartTime, HealthResponse, HealthService, health_routes};
pub use links::LinkApiService;
pub use redirect::{RedirectService, normalize_redirect_target};
pub use types::{ErrorBody, ShortenRequest, error_response, json_error_handler};

/// 前缀下的全部 API 路由
///
/// `/urls` 与 `/stats/{code}` 必须先于 `/{code}` 注册。
pub fn api_routes(prefix: &str) -> Scope {
    web::scope(prefix.trim_end_matches('/'))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/shorten", web::post().to(LinkApiService::shorten))
        .route("/urls", web::get().to(LinkApiService::list))
        .route("/stats/{code}", web::get().to(LinkApiService::stats))
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect))
}
