mod common;

use common::TestApp;
use josm_api::{
    entities::{
        board_transaction::BoardTxnKind, customer_good::CustomerGoodStatus,
        material_transaction::MaterialTxnKind, tool_transaction::ToolTxnKind,
    },
    errors::ServiceError,
    events::Event,
    services::{
        boards::CreateBoard, customer_goods::ReceiveCustomerGoods, materials::CreateMaterial,
        tools::CreateTool,
    },
};

fn breaker() -> CreateMaterial {
    CreateMaterial {
        category: "Breakers".to_string(),
        name: "60A breaker".to_string(),
        variant: None,
        quantity: 0,
        min_threshold: 2,
        unit: "pcs".to_string(),
    }
}

#[tokio::test]
async fn material_stock_matches_its_ledger() {
    let app = TestApp::new().await;

    let material = app.services.materials.create_material(breaker()).await.unwrap();

    app.services
        .materials
        .receive(material.id, 8, "a1", "Sam", None)
        .await
        .unwrap();
    app.services
        .materials
        .receive(material.id, 4, "a1", "Sam", Some("restock".to_string()))
        .await
        .unwrap();
    app.services
        .materials
        .issue(material.id, 5, "a1", "Sam", None, None)
        .await
        .unwrap();

    let material = app
        .services
        .materials
        .get_material(material.id)
        .await
        .unwrap();
    assert_eq!(material.quantity, 7);

    // Stock equals received minus issued across the ledger.
    let txns = app
        .services
        .materials
        .list_transactions(material.id)
        .await
        .unwrap();
    assert_eq!(txns.len(), 3);
    let balance: i32 = txns
        .iter()
        .map(|t| match t.kind {
            MaterialTxnKind::Received => t.quantity,
            MaterialTxnKind::Issued => -t.quantity,
        })
        .sum();
    assert_eq!(balance, material.quantity);
}

#[tokio::test]
async fn material_issue_cannot_go_negative() {
    let app = TestApp::new().await;

    let material = app.services.materials.create_material(breaker()).await.unwrap();
    app.services
        .materials
        .receive(material.id, 3, "a1", "Sam", None)
        .await
        .unwrap();

    let err = app
        .services
        .materials
        .issue(material.id, 4, "a1", "Sam", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let material = app
        .services
        .materials
        .get_material(material.id)
        .await
        .unwrap();
    assert_eq!(material.quantity, 3);
}

#[tokio::test]
async fn duplicate_material_natural_key_is_rejected() {
    let app = TestApp::new().await;

    app.services.materials.create_material(breaker()).await.unwrap();
    let err = app
        .services
        .materials
        .create_material(breaker())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);

    // A different variant of the same name is a different material.
    let mut variant = breaker();
    variant.variant = Some("DIN rail".to_string());
    app.services.materials.create_material(variant).await.unwrap();
}

#[tokio::test]
async fn low_stock_report_uses_thresholds() {
    let app = TestApp::new().await;

    let low = app.services.materials.create_material(breaker()).await.unwrap();
    let mut ok = breaker();
    ok.name = "30A breaker".to_string();
    ok.quantity = 9;
    app.services.materials.create_material(ok).await.unwrap();

    let report = app.services.materials.low_stock().await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].id, low.id);
}

#[tokio::test]
async fn board_sell_rejects_oversell_and_alerts_when_low() {
    let mut app = TestApp::new().await;

    let board = app
        .services
        .boards
        .create_board(CreateBoard {
            board_type: "Enclosure".to_string(),
            color: "Grey".to_string(),
            quantity: 6,
            min_threshold: None,
        })
        .await
        .unwrap();
    // Enclosures default to a threshold of 5.
    assert_eq!(board.min_threshold, 5);

    let err = app
        .services
        .boards
        .sell(board.id, 7, "a1", "Sam")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let sold = app.services.boards.sell(board.id, 2, "a1", "Sam").await.unwrap();
    assert_eq!(sold.quantity, 4);

    let txns = app.services.boards.list_transactions(board.id).await.unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].kind, BoardTxnKind::Sold);

    let events = app.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::LowStockDetected { quantity: 4, .. })));
}

#[tokio::test]
async fn board_manufacture_adds_stock_with_ledger_row() {
    let app = TestApp::new().await;

    let board = app
        .services
        .boards
        .create_board(CreateBoard {
            board_type: "Mini-Flush".to_string(),
            color: "White".to_string(),
            quantity: 0,
            min_threshold: Some(2),
        })
        .await
        .unwrap();

    let updated = app
        .services
        .boards
        .manufacture(board.id, 3, "a1", "Sam", Some("batch 12".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.quantity, 3);

    let txns = app.services.boards.list_transactions(board.id).await.unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].kind, BoardTxnKind::Manufactured);
    assert_eq!(txns[0].reference.as_deref(), Some("batch 12"));
}

#[tokio::test]
async fn duplicate_board_type_and_color_is_rejected_case_insensitively() {
    let app = TestApp::new().await;

    app.services
        .boards
        .create_board(CreateBoard {
            board_type: "Mini-Flush".to_string(),
            color: "Red".to_string(),
            quantity: 1,
            min_threshold: None,
        })
        .await
        .unwrap();

    let err = app
        .services
        .boards
        .create_board(CreateBoard {
            board_type: "Mini-Flush".to_string(),
            color: "red".to_string(),
            quantity: 0,
            min_threshold: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn tool_issue_and_return_round_trip() {
    let app = TestApp::new().await;

    let tool = app
        .services
        .tools
        .create_tool(CreateTool {
            name: "Crimping tool".to_string(),
            quantity: 4,
            location: Some("Shelf B".to_string()),
            condition: Some("good".to_string()),
        })
        .await
        .unwrap();

    let err = app
        .services
        .tools
        .issue(tool.id, 5, "w1", "Thabo", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let issued = app
        .services
        .tools
        .issue(tool.id, 3, "w1", "Thabo", None)
        .await
        .unwrap();
    assert_eq!(issued.quantity, 1);

    let returned = app
        .services
        .tools
        .return_tool(tool.id, 2, "w1", "Thabo", Some("one still in use".to_string()))
        .await
        .unwrap();
    assert_eq!(returned.quantity, 3);

    let txns = app.services.tools.list_transactions(tool.id).await.unwrap();
    assert_eq!(txns.len(), 2);
    // Newest first.
    assert_eq!(txns[0].kind, ToolTxnKind::Returned);
    assert_eq!(txns[1].kind, ToolTxnKind::Issued);
}

#[tokio::test]
async fn customer_goods_return_is_one_way() {
    let app = TestApp::new().await;

    let goods = app
        .services
        .customer_goods
        .receive(ReceiveCustomerGoods {
            customer_name: "Mondi".to_string(),
            description: "Old DB for refurbishment".to_string(),
            quantity: 1,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(goods.status, CustomerGoodStatus::Held);
    assert!(goods.returned_at.is_none());

    let returned = app
        .services
        .customer_goods
        .mark_returned(goods.id)
        .await
        .unwrap();
    assert_eq!(returned.status, CustomerGoodStatus::Returned);
    assert!(returned.returned_at.is_some());

    let err = app
        .services
        .customer_goods
        .mark_returned(goods.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}
