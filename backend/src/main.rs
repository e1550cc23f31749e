mod analysis;
mod config;
mod routes;
mod stream;
mod upload;
mod vision;

#[cfg(test)]
mod test_utils;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use config::app_config::AppConfig;
use routes::configure_routes;
use std::sync::Arc;
use vision::anthropic_service::AnthropicService;
use vision::model::VisionModel;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    let anthropic = match AnthropicService::new(&config.model) {
        Ok(service) => service,
        Err(e) => {
            log::error!("Failed to create model client: {}", e);
            return Err(std::io::Error::other(format!("Model client error: {}", e)));
        }
    };
    log::info!(
        "Using model {} via {} (max {} tokens)",
        config.model.model,
        anthropic.endpoint(),
        config.model.max_tokens
    );

    let model: Arc<dyn VisionModel> = Arc::new(anthropic);
    let model = web::Data::from(model);
    let limits = web::Data::new(config.upload);
    let static_dir = config.static_dir.clone();
    let bind_address = config.bind_address();

    log::info!("ScreenTask server running on http://{}", bind_address);
    log::info!("API endpoints:");
    log::info!("   - GET  /");
    log::info!("   - GET  /api/health");
    log::info!("   - POST /api/analyze");
    log::info!("   - POST /api/analyze-batch");

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(model.clone())
            .app_data(limits.clone())
            .configure(|cfg| configure_routes(cfg, Some(static_dir.clone())))
    })
    .bind(&bind_address)?
    .run()
    .await
}
