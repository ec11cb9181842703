// src/main.rs

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::{error, info, warn};

use rate_forecast::api::{self, AppStateStruct};
use rate_forecast::config::ServerConfig;
use rate_forecast::service::PredictionService;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    // Initialize environment variables
    dotenv::dotenv().ok();

    // Initialize the logger
    env_logger::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    // Models are loaded once; a failure leaves the API up but unable to predict
    let service = PredictionService::load(&config.models);
    if let Some(reason) = service.unavailable_reason() {
        warn!("Serving without models: {}", reason);
    }

    let app_state = web::Data::new(AppStateStruct { service });

    info!("Starting API server on {}:{}", config.host, config.port);
    let mut server = HttpServer::new(move || {
        // The frontend is served from a different origin
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(api::configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind((config.host.as_str(), config.port))?.run().await
}
