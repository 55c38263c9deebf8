mod common;

use common::TestApp;
use josm_api::{
    entities::{material_request::RequestStatus, material_transaction::MaterialTxnKind},
    errors::ServiceError,
    events::Event,
    services::materials::CreateMaterial,
};

async fn seed_material(app: &TestApp, quantity: i32) -> i64 {
    app.services
        .materials
        .create_material(CreateMaterial {
            category: "Cabling".to_string(),
            name: "2.5mm twin+earth".to_string(),
            variant: Some("white".to_string()),
            quantity,
            min_threshold: 3,
            unit: "m".to_string(),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn approval_deducts_stock_and_stamps_approver() {
    let mut app = TestApp::new().await;
    let material_id = seed_material(&app, 10).await;

    let request = app
        .services
        .material_requests
        .submit(material_id, 4, "w1", "Thabo", None)
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);

    let approved = app
        .services
        .material_requests
        .approve(request.id, "a1", "Sam")
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.decided_by_name.as_deref(), Some("Sam"));
    assert!(approved.decided_at.is_some());

    let material = app
        .services
        .materials
        .get_material(material_id)
        .await
        .unwrap();
    assert_eq!(material.quantity, 6);

    // Deduction is visible in the ledger, tied back to the request.
    let txns = app
        .services
        .materials
        .list_transactions(material_id)
        .await
        .unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].kind, MaterialTxnKind::Issued);
    assert_eq!(txns[0].quantity, 4);
    assert_eq!(
        txns[0].reference.as_deref(),
        Some(format!("request #{}", request.id).as_str())
    );

    let events = app.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::MaterialRequestApproved { .. })));
}

#[tokio::test]
async fn approval_rejects_insufficient_stock_without_side_effects() {
    let app = TestApp::new().await;
    let material_id = seed_material(&app, 10).await;

    let request = app
        .services
        .material_requests
        .submit(material_id, 12, "w1", "Thabo", None)
        .await
        .unwrap();

    let err = app
        .services
        .material_requests
        .approve(request.id, "a1", "Sam")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));
    assert_eq!(
        err.status_code(),
        axum::http::StatusCode::UNPROCESSABLE_ENTITY
    );

    // Stock, ledger and request status are all untouched.
    let material = app
        .services
        .materials
        .get_material(material_id)
        .await
        .unwrap();
    assert_eq!(material.quantity, 10);

    let txns = app
        .services
        .materials
        .list_transactions(material_id)
        .await
        .unwrap();
    assert!(txns.is_empty());

    let request = app
        .services
        .material_requests
        .get_request(request.id)
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
}

#[tokio::test]
async fn rejection_stamps_decision_but_not_stock() {
    let app = TestApp::new().await;
    let material_id = seed_material(&app, 10).await;

    let request = app
        .services
        .material_requests
        .submit(material_id, 4, "w1", "Thabo", Some("panel JC-0007".to_string()))
        .await
        .unwrap();

    let rejected = app
        .services
        .material_requests
        .reject(request.id, "a1", "Sam")
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.decided_by_id.as_deref(), Some("a1"));

    let material = app
        .services
        .materials
        .get_material(material_id)
        .await
        .unwrap();
    assert_eq!(material.quantity, 10);
}

#[tokio::test]
async fn decided_requests_cannot_be_decided_again() {
    let app = TestApp::new().await;
    let material_id = seed_material(&app, 10).await;

    let request = app
        .services
        .material_requests
        .submit(material_id, 2, "w1", "Thabo", None)
        .await
        .unwrap();
    app.services
        .material_requests
        .approve(request.id, "a1", "Sam")
        .await
        .unwrap();

    let err = app
        .services
        .material_requests
        .approve(request.id, "a1", "Sam")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let err = app
        .services
        .material_requests
        .reject(request.id, "a1", "Sam")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    // Stock was deducted exactly once.
    let material = app
        .services
        .materials
        .get_material(material_id)
        .await
        .unwrap();
    assert_eq!(material.quantity, 8);
}

#[tokio::test]
async fn submit_requires_existing_material_and_positive_quantity() {
    let app = TestApp::new().await;
    let material_id = seed_material(&app, 10).await;

    let err = app
        .services
        .material_requests
        .submit(999, 4, "w1", "Thabo", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = app
        .services
        .material_requests
        .submit(material_id, 0, "w1", "Thabo", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn list_requests_filters_by_status() {
    let app = TestApp::new().await;
    let material_id = seed_material(&app, 10).await;

    let first = app
        .services
        .material_requests
        .submit(material_id, 2, "w1", "Thabo", None)
        .await
        .unwrap();
    app.services
        .material_requests
        .submit(material_id, 3, "w2", "Lindiwe", None)
        .await
        .unwrap();
    app.services
        .material_requests
        .approve(first.id, "a1", "Sam")
        .await
        .unwrap();

    let (pending, total) = app
        .services
        .material_requests
        .list_requests(Some(RequestStatus::Pending), 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(pending[0].requested_by_name, "Lindiwe");

    let (_, all) = app
        .services
        .material_requests
        .list_requests(None, 1, 20)
        .await
        .unwrap();
    assert_eq!(all, 2);
}

#[tokio::test]
async fn approval_emits_low_stock_alert_at_threshold() {
    let mut app = TestApp::new().await;
    let material_id = seed_material(&app, 5).await;

    let request = app
        .services
        .material_requests
        .submit(material_id, 2, "w1", "Thabo", None)
        .await
        .unwrap();
    app.services
        .material_requests
        .approve(request.id, "a1", "Sam")
        .await
        .unwrap();

    // 5 - 2 = 3, exactly at the threshold.
    let events = app.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        Event::LowStockDetected {
            quantity: 3,
            min_threshold: 3,
            ..
        }
    )));
}
