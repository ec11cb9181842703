//! HTTP-level tests for the prediction API

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

use rate_forecast::api::{self, AppStateStruct};
use rate_forecast::models::{Observation, Series};
use rate_forecast::service::PredictionService;
use rate_forecast::training::{fit_observations, TrainingOptions};

/// Two years of daily targets rising linearly from `base`.
fn synthetic(base: f64, step: f64) -> Vec<Observation> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    (0..730)
        .map(|i| Observation {
            date: start + Duration::days(i),
            target: base + step * i as f64,
        })
        .collect()
}

fn trained_service() -> PredictionService {
    let options = TrainingOptions::default();
    let gold = fit_observations(Series::Gold, &synthetic(50000.0, 12.5), &options).unwrap();
    let inr_usd = fit_observations(Series::InrUsd, &synthetic(74.0, 0.01), &options).unwrap();
    PredictionService::new(gold, inr_usd)
}

macro_rules! app_with {
    ($service:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppStateStruct { service: $service }))
                .configure(api::configure),
        )
        .await
    };
}

fn decimals(value: &Value) -> usize {
    let text = value.to_string();
    text.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}

#[actix_web::test]
async fn root_reports_running() {
    let app = app_with!(trained_service());

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({"message": "API server is running. Use /predict_point or /predict_range endpoints."})
    );
}

#[actix_web::test]
async fn point_prediction_returns_rounded_rates() {
    let app = app_with!(trained_service());

    let req = test::TestRequest::post()
        .uri("/predict_point")
        .set_json(json!({"date": "2024-01-15"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["date"], "2024-01-15");
    assert!(decimals(&body["gold_rate"]) <= 2);
    assert!(decimals(&body["inr_usd_rate"]) <= 4);

    // 2024-01-15 is 744 days after the synthetic series starts
    let gold = body["gold_rate"].as_f64().unwrap();
    assert!((gold - (50000.0 + 12.5 * 744.0)).abs() < 1.0, "gold {}", gold);
    let inr = body["inr_usd_rate"].as_f64().unwrap();
    assert!((inr - (74.0 + 0.01 * 744.0)).abs() < 0.01, "inr {}", inr);
}

#[actix_web::test]
async fn point_rejects_bad_dates() {
    let app = app_with!(trained_service());

    for payload in [json!({"date": "2024-13-40"}), json!({}), json!({"date": ""})] {
        let req = test::TestRequest::post()
            .uri("/predict_point")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let app = app_with!(trained_service());

    let req = test::TestRequest::post()
        .uri("/predict_point")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[actix_web::test]
async fn range_rejects_reversed_and_missing_dates() {
    let app = app_with!(trained_service());

    let cases = [
        json!({"start_date": "2024-02-01", "end_date": "2024-01-01"}),
        json!({"start_date": "2024-01-01"}),
        json!({"start_date": "2024-01-01", "end_date": "soon"}),
    ];
    for payload in cases {
        let req = test::TestRequest::post()
            .uri("/predict_range")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn reversed_range_message() {
    let app = app_with!(trained_service());

    let req = test::TestRequest::post()
        .uri("/predict_range")
        .set_json(json!({"start_date": "2024-02-01", "end_date": "2024-01-01"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["error"], "Start date cannot be after end date.");
}

#[actix_web::test]
async fn missing_range_date_message() {
    let app = app_with!(trained_service());

    for payload in [
        json!({"start_date": "2024-01-01"}),
        json!({"end_date": "2024-01-03"}),
        json!({"start_date": " ", "end_date": "2024-01-03"}),
    ] {
        let req = test::TestRequest::post()
            .uri("/predict_range")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing 'start_date' or 'end_date' parameter.");
    }
}

#[actix_web::test]
async fn missing_models_fail_predictions_but_not_root() {
    let app = app_with!(PredictionService::unavailable("artifacts missing"));

    let root = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(root.status(), StatusCode::OK);

    let point = test::TestRequest::post()
        .uri("/predict_point")
        .set_json(json!({"date": "2024-01-15"}))
        .to_request();
    let resp = test::call_service(&app, point).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Prediction models not loaded. Please check the server logs."
    );

    let range = test::TestRequest::post()
        .uri("/predict_range")
        .set_json(json!({"start_date": "2024-01-01", "end_date": "2024-01-03"}))
        .to_request();
    let resp = test::call_service(&app, range).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn range_returns_base64_png() {
    use base64::Engine;

    let app = app_with!(trained_service());

    let req = test::TestRequest::post()
        .uri("/predict_range")
        .set_json(json!({"start_date": "2024-01-01", "end_date": "2024-01-03"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let png = base64::engine::general_purpose::STANDARD
        .decode(body["plot_image"].as_str().unwrap())
        .unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    assert_eq!((width, height), (1400, 1000));
}
