mod inference;
mod routes;

use std::env;
use std::path::Path;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use inference::InferenceService;
use routes::configure_routes;

const PREPROCESSOR_FILE: &str = "preprocessor.json";
const MODEL_FILE: &str = "chemato-weather-model.json";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "trained-model".to_string());
    let preprocessor_path = Path::new(&model_dir).join(PREPROCESSOR_FILE);
    let model_path = Path::new(&model_dir).join(MODEL_FILE);

    log::debug!("Loading preprocessor from {}", preprocessor_path.display());
    log::debug!("Loading model from {}", model_path.display());

    let service = InferenceService::load(&preprocessor_path, &model_path).map_err(|e| {
        log::error!("Failed to load artifacts at startup: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Artifact loading failed: {}", e),
        )
    })?;
    let service = web::Data::new(service);

    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(service.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
