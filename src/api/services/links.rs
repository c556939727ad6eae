//! Link management endpoints: create, list, stats

use actix_web::{HttpResponse, Responder, web};
use tracing::{error, trace};

use super::types::{ShortenRequest, error_response};
use crate::services::LinkService;

pub struct LinkApiService;

impl LinkApiService {
    /// `POST /shorten`
    pub async fn shorten(
        service: web::Data<LinkService>,
        body: web::Json<ShortenRequest>,
    ) -> impl Responder {
        let ShortenRequest { original_url } = body.into_inner();
        trace!("Shorten request for '{}'", original_url);

        match service.create(&original_url).await {
            Ok(link) => HttpResponse::Ok().json(link),
            Err(e) => {
                error!("Failed to create short link: {}", e);
                error_response(&e)
            }
        }
    }

    /// `GET /urls`
    pub async fn list(service: web::Data<LinkService>) -> impl Responder {
        match service.get_all().await {
            Ok(links) => HttpResponse::Ok().json(links),
            Err(e) => {
                error!("Failed to list short links: {}", e);
                error_response(&e)
            }
        }
    }

    /// `GET /stats/{code}`，只读，不计点击
    pub async fn stats(service: web::Data<LinkService>, path: web::Path<String>) -> impl Responder {
        let code = path.into_inner();

        match service.get_stats(&code).await {
            Ok(Some(link)) => HttpResponse::Ok().json(link),
            Ok(None) => HttpResponse::NotFound().finish(),
            Err(e) => {
                error!("Failed to load stats for '{}': {}", code, e);
                error_response(&e)
            }
        }
    }
}
