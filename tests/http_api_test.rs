use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

use josm_api::{
    app_router,
    config::AppConfig,
    events::{Event, EventSender},
    handlers::AppServices,
    migrator::Migrator,
    AppState,
};

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 8080,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        auto_migrate: false,
        db_max_connections: 1,
        db_min_connections: 1,
    }
}

/// Full router over an in-memory database. The event receiver is returned
/// so sends never hit a closed channel.
async fn test_router() -> (Router, mpsc::Receiver<Event>) {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("sqlite connect");
    Migrator::up(&db, None).await.expect("migrations");
    let db = Arc::new(db);

    let (tx, rx) = mpsc::channel(64);
    let event_sender = EventSender::new(tx);
    let services = AppServices::new(db.clone(), event_sender.clone());

    let state = AppState {
        db,
        config: test_config(),
        event_sender,
        services,
    };

    (app_router(state), rx)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_database_up() {
    let (app, _events) = test_router().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn material_endpoints_round_trip() {
    let (app, _events) = test_router().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/materials",
            json!({
                "category": "Breakers",
                "name": "60A breaker",
                "quantity": 5,
                "min_threshold": 2,
                "unit": "pcs"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_i64().expect("material id");

    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/materials/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "60A breaker");
    assert_eq!(body["data"]["quantity"], 5);

    // Issuing more than the shelf holds is a domain rejection, not a
    // server error.
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/materials/{}/issue", id),
            json!({
                "quantity": 9,
                "actor_id": "a1",
                "actor_name": "Sam"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Unprocessable Entity");

    let response = app
        .oneshot(get("/api/v1/materials/9999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn job_card_validation_errors_are_bad_request() {
    let (app, _events) = test_router().await;

    let response = app
        .oneshot(post_json(
            "/api/v1/job-cards",
            json!({
                "job_name": "Mondi warehouse DB",
                "client_name": "Mondi",
                "board_name": "Warehouse DB",
                "board_type": "Mini-Flush",
                "board_color": ""
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn advance_stage_rejections_surface_as_bad_request() {
    let (app, _events) = test_router().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/job-cards",
            json!({
                "job_name": "Mondi warehouse DB",
                "client_name": "Mondi",
                "board_name": "Warehouse DB",
                "board_type": "Mini-Flush",
                "board_color": "Red"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let id = body["data"]["id"].as_i64().expect("job card id");

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/job-cards/{}/advance", id),
            json!({
                "stage": "assembling",
                "target": "in_progress",
                "actor_id": "u1",
                "actor_name": "Thabo"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Bad Request");
}
