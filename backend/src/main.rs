mod classifier;
mod error;
mod fetch;
mod normalize;
mod retry;
mod routes;
mod verdict;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use classifier::{ClassifierClient, ClassifierConfig};
use normalize::NormalizeConfig;
use routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let frontend_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../frontend/dist", manifest_dir)
    } else {
        "/usr/src/app/frontend/dist".to_string()
    };

    let classifier_config = ClassifierConfig::from_env();
    if classifier_config.api_token.is_none() {
        log::warn!("HUGGINGFACE_API_KEY is not set; analysis requests will fail with CONFIG_ERROR");
    }
    log::info!("Classifier endpoint: {}", classifier_config.api_url);

    let http = reqwest::Client::builder().build().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("HTTP client init failed: {e}"),
        )
    })?;
    let classifier = ClassifierClient::new(http.clone(), classifier_config);
    let normalize_config = NormalizeConfig::from_env();

    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("0.0.0.0:{}", port);
    log::info!("Starting server on {}", bind_address);

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
            .app_data(web::Data::new(classifier.clone()))
            .app_data(web::Data::new(http.clone()))
            .app_data(web::Data::new(normalize_config.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
