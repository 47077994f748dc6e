//! Integration tests for printer registry routes and the stale-printer sweep

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sea_orm::EntityTrait;
use serde_json::json;
use tower::util::ServiceExt;

use printvend::db::entities::{printer::PrinterStatus, Printer};
use printvend::handlers;
use printvend::state::AppState;
use printvend::tasks::printer_sweep;
use printvend::test_utils::*;

fn create_test_router(state: &AppState) -> Router {
    Router::new()
        .nest("/api", handlers::api_routes())
        .with_state(state.clone())
}

async fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: axum::response::Response,
) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn heartbeat_request(id: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/printers/{}/heartbeat", id))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_heartbeat_registers_new_printer() {
    let state = setup_test_app_state().await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(heartbeat_request(
            "printer-001",
            json!({
                "status": "online",
                "current_material": "PLA",
                "material_level": 85.5,
                "temperature": 210.0,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let model = Printer::find_by_id("printer-001".to_string())
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(model.status, PrinterStatus::Online);
    assert_eq!(model.current_material.as_deref(), Some("PLA"));
    assert_eq!(model.material_level, Some(85.5));
}

#[tokio::test]
async fn test_heartbeat_updates_existing_printer() {
    let state = setup_test_app_state().await;

    let app = create_test_router(&state);
    let response = app
        .oneshot(heartbeat_request("printer-001", json!({ "status": "online" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = create_test_router(&state);
    let response = app
        .oneshot(heartbeat_request(
            "printer-001",
            json!({ "status": "error", "error_message": "thermal runaway" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let printers = Printer::find().all(&state.db).await.unwrap();
    assert_eq!(printers.len(), 1);
    assert_eq!(printers[0].status, PrinterStatus::Error);
    assert_eq!(printers[0].error_message.as_deref(), Some("thermal runaway"));
}

#[tokio::test]
async fn test_list_printers() {
    let state = setup_test_app_state().await;

    insert_test_printer(&state.db, "printer-001", PrinterStatus::Online, 0).await;
    insert_test_printer(&state.db, "printer-002", PrinterStatus::Printing, 0).await;

    let app = create_test_router(&state);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/printers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = parse_json_response(response).await;
    let printers = body.as_array().unwrap();
    assert_eq!(printers.len(), 2);
    assert_eq!(printers[0]["id"], "printer-001");
    assert_eq!(printers[1]["id"], "printer-002");
    assert_eq!(printers[1]["status"], "printing");
}

#[tokio::test]
async fn test_get_printer_not_found() {
    let state = setup_test_app_state().await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/printers/printer-404")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sweep_marks_stale_printers_offline() {
    let state = setup_test_app_state().await;

    // Config threshold is 5 minutes.
    insert_test_printer(&state.db, "stale", PrinterStatus::Online, 10).await;
    insert_test_printer(&state.db, "fresh", PrinterStatus::Printing, 0).await;
    insert_test_printer(&state.db, "already-offline", PrinterStatus::Offline, 60).await;

    let swept = printer_sweep::mark_stale_printers_offline(&state).await.unwrap();
    assert_eq!(swept, 1);

    let stale = Printer::find_by_id("stale".to_string())
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stale.status, PrinterStatus::Offline);

    let fresh = Printer::find_by_id("fresh".to_string())
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh.status, PrinterStatus::Printing);
}
