// src/api/handlers.rs

use actix_web::{web, HttpResponse, Responder};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::api::AppStateStruct;
use crate::error::ForecastError;

#[derive(Debug, Deserialize)]
pub struct PointRequest {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct RangeResponse {
    pub plot_image: String,
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        message: "API server is running. Use /predict_point or /predict_range endpoints.",
    })
}

pub async fn predict_point(
    data: web::Data<AppStateStruct>,
    body: web::Json<PointRequest>,
) -> Result<HttpResponse, ForecastError> {
    debug!("predict_point request: {:?}", body);

    let prediction = data
        .service
        .predict_point(body.date.as_deref())
        .map_err(log_failure("predict_point"))?;

    Ok(HttpResponse::Ok().json(prediction))
}

pub async fn predict_range(
    data: web::Data<AppStateStruct>,
    body: web::Json<RangeRequest>,
) -> Result<HttpResponse, ForecastError> {
    debug!("predict_range request: {:?}", body);

    // Rendering is CPU-bound, keep it off the async workers
    let request = body.into_inner();
    let result = task::spawn_blocking(move || {
        data.service
            .predict_range(request.start_date.as_deref(), request.end_date.as_deref())
    })
    .await
    .map_err(|e| ForecastError::Prediction(e.to_string()))
    .and_then(|inner| inner)
    .map_err(log_failure("predict_range"))?;

    debug!("predict_range rendered {} days", result.forecast.len());
    Ok(HttpResponse::Ok().json(RangeResponse {
        plot_image: result.plot_image_base64(),
    }))
}

fn log_failure(route: &'static str) -> impl Fn(ForecastError) -> ForecastError {
    move |err| {
        match &err {
            ForecastError::InvalidDate { .. } | ForecastError::InvalidRange { .. } => {
                debug!("{} rejected: {}", route, err)
            }
            _ => warn!("{} failed: {}", route, err),
        }
        err
    }
}
