//! Server mode
//!
//! Configures and starts the HTTP server with all routes.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{error, warn};

use crate::api::middleware::RequestLogger;
use crate::api::services::{AppStartTime, api_routes, health_routes};
use crate::config::get_config;
use crate::runtime::{shutdown, startup};

/// Run the HTTP server
///
/// Builds the store and link service, binds `server.host:server.port` and
/// serves until the server stops or Ctrl+C is received.
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = startup::prepare_server_startup().await.map_err(|e| {
        error!("Server startup failed: {:#}", e);
        e
    })?;

    let store = startup.store.clone();
    let link_service = web::Data::from(startup.link_service.clone());

    let config = get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    let path_prefix = config.server.path_prefix.clone();
    warn!("Using {} CPU cores for the server", cpu_count);

    if config.server.trusted_proxies.is_empty() {
        warn!("No trusted proxies configured, client IP is always the peer address");
    } else {
        warn!(
            "Trusted proxies configured: {:?}",
            config.server.trusted_proxies
        );
    }

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(link_service.clone())
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .service(health_routes())
            .service(api_routes(&path_prefix))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
            shutdown::close_store(store.as_ref()).await;
        }
        _ = shutdown::listen_for_shutdown(store.clone()) => {
            warn!("Graceful shutdown: storage closed");
        }
    }

    Ok(())
}
