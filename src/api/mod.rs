// src/api/mod.rs

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::ErrorBody;
use crate::service::PredictionService;

/// Application state shared by every worker; read-only after startup.
pub struct AppStateStruct {
    pub service: PredictionService,
}

/// Re-export handlers
pub mod handlers;

pub use handlers::{index, predict_point, predict_range};

/// Registers the API routes and JSON body handling.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/", web::get().to(index))
        .route("/predict_point", web::post().to(predict_point))
        .route("/predict_range", web::post().to(predict_range));
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorBody {
        error: format!("Invalid JSON request body: {}", err),
    });
    InternalError::from_response(err, response).into()
}
