use api::{create_router, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use forecast_scheduler::{EngineConfig, ForecastEngine, ManualClock};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use weather_store::{DatabaseConfig, Sample, SqliteRepository};

fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

struct TestApp {
    router: Router,
    state: Arc<AppState>,
}

async fn app() -> TestApp {
    let repository = SqliteRepository::connect(&DatabaseConfig::in_memory())
        .await
        .unwrap();
    let engine = ForecastEngine::new(
        EngineConfig::default(),
        repository.clone(),
        repository.clone(),
    )
    .with_clock(Arc::new(ManualClock::new(now())));

    let state = Arc::new(AppState::new(Arc::new(engine), repository));
    TestApp {
        router: create_router(state.clone()),
        state,
    }
}

async fn seed_rising(app: &TestApp) {
    for i in 0..6 {
        let ts = now() - Duration::minutes(36 * (5 - i));
        let sample = Sample::new(ts, 1008.0 + 0.8 * i as f64, 15.0);
        app.state.repository.insert_sample(&sample).await.unwrap();
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &TestApp, uri: &str, json: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_empty_station() {
    let app = app().await;

    let (status, body) = get(&app, "/api/v1/forecast").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Forecast is not ready yet");

    let (status, _) = get(&app, "/api/v1/conditions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/api/v1/pressure?hours=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert!(body["delta_hpa"].is_null());

    let (status, body) = get(&app, "/api/v1/forecast/now").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_ingest_then_current_conditions() {
    let app = app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/samples",
        r#"{"outdoor": 4.5, "indoor": 21.0, "pressure_mmhg": 722.3, "pressure_hpa": 963.0}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(&app, "/api/v1/conditions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temperature_c"], 4.5);
    assert_eq!(body["indoor_temperature_c"], 21.0);
    assert_eq!(body["pressure_hpa"], 963.0);
    let mmhg = body["pressure_mmhg"].as_f64().unwrap();
    assert!((mmhg - 722.3).abs() < 0.1);
}

#[tokio::test]
async fn test_ingest_rejects_bad_payloads() {
    let app = app().await;

    let (status, body) = post_json(&app, "/api/v1/samples", r#"{"outdoor": 4.5}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing fields");

    let (status, body) = post_json(
        &app,
        "/api/v1/samples",
        r#"{"outdoor": -127.0, "indoor": 21.0, "pressure_hpa": 963.0}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = get(&app, "/api/v1/conditions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_forecast_now_does_not_persist() {
    let app = app().await;
    seed_rising(&app).await;

    let (status, body) = get(&app, "/api/v1/forecast/now").await;
    assert_eq!(status, StatusCode::OK);
    let label = body["label"].as_str().unwrap().to_string();
    assert!(label.starts_with("rising"), "label was {}", label);
    assert_eq!(body["trend"], "rising");
    assert_eq!(body["sample_count"], 6);

    let (status, _) = get(&app, "/api/v1/forecast").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.state.engine.run_periodic_cycle().await.unwrap();

    let (status, body) = get(&app, "/api/v1/forecast").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forecast"], label.as_str());
    assert_eq!(body["stale"], false);
}

#[tokio::test]
async fn test_pressure_series_and_delta() {
    let app = app().await;
    seed_rising(&app).await;

    let (status, body) = get(&app, "/api/v1/pressure").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hours"], 3);
    assert_eq!(body["count"], 6);
    let delta = body["delta_hpa"].as_f64().unwrap();
    assert!((delta - 4.0).abs() < 1e-9);
    assert_eq!(body["latest_hpa"], 1012.0);
}

#[tokio::test]
async fn test_forecast_history_limit() {
    let app = app().await;
    seed_rising(&app).await;

    for _ in 0..3 {
        app.state.engine.run_periodic_cycle().await.unwrap();
    }

    let (status, body) = get(&app, "/api/v1/forecasts?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["id"], 3);
    assert_eq!(body["data"][1]["id"], 2);
}

#[tokio::test]
async fn test_health() {
    let app = app().await;

    let (status, body) = get(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["database"], "ok");
    assert_eq!(body["components"]["forecast"], "pending");
    assert_eq!(body["timestamp"], now().timestamp());
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let app = app().await;

    let (status, _) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
