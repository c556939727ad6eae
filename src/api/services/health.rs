use std::time::Duration;

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use crate::services::LinkService;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub links: Option<u64>,
    pub uptime_secs: i64,
}

/// Health Service
///
/// 直接调用 store 的 `count`，不走业务逻辑。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<LinkService>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");

        let store = service.store();
        let uptime_secs = (Utc::now() - app_start_time.start_datetime)
            .num_seconds()
            .max(0);

        let links = match tokio::time::timeout(Duration::from_secs(5), store.count()).await {
            Ok(Ok(count)) => Some(count),
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                None
            }
            Err(_) => {
                error!("Storage health check timeout");
                None
            }
        };

        let body = HealthResponse {
            status: if links.is_some() { "healthy" } else { "unhealthy" }.to_string(),
            backend: store.backend_name().to_string(),
            links,
            uptime_secs,
        };

        if links.is_some() {
            HttpResponse::Ok().json(body)
        } else {
            HttpResponse::ServiceUnavailable().json(body)
        }
    }
}

/// Health 路由配置（不在 path_prefix 下）
pub fn health_routes() -> actix_web::Resource {
    web::resource("/health")
        .route(web::get().to(HealthService::health_check))
        .route(web::head().to(HealthService::health_check))
}
