mod common;

use common::TestApp;
use josm_api::{
    entities::{
        board_transaction::BoardTxnKind,
        job_card::{JobPhase, JobStage, StageStatus},
    },
    errors::ServiceError,
    events::Event,
    services::job_cards::{CreateJobCard, MaterialUsage},
};

fn sample_card() -> CreateJobCard {
    CreateJobCard {
        job_name: "Mondi warehouse DB".to_string(),
        client_name: "Mondi".to_string(),
        board_name: "Warehouse DB".to_string(),
        board_type: "Mini-Flush".to_string(),
        board_color: "Red".to_string(),
        recipient: None,
        supervisor: Some("Sam".to_string()),
        priority: Some("high".to_string()),
        notes: None,
    }
}

/// Drives a card from (Pending, Pending) through both stages.
async fn complete_card(app: &TestApp, job_id: i64) {
    for (stage, target) in [
        (JobStage::Fabrication, StageStatus::InProgress),
        (JobStage::Fabrication, StageStatus::Completed),
        (JobStage::Assembling, StageStatus::InProgress),
        (JobStage::Assembling, StageStatus::Completed),
    ] {
        app.services
            .job_cards
            .advance_stage(job_id, stage, target, "u1", "Thabo")
            .await
            .expect("stage advance");
    }
}

#[tokio::test]
async fn job_card_numbers_are_sequential() {
    let app = TestApp::new().await;

    let first = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();
    let second = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();

    assert_eq!(first.job_card_number, "JC-0001");
    assert_eq!(second.job_card_number, "JC-0002");
    assert_eq!(first.phase, JobPhase::Fabrication);
    assert_eq!(first.fabrication_status, StageStatus::Pending);
    assert_eq!(first.assembling_status, StageStatus::Pending);
}

#[tokio::test]
async fn job_card_numbers_keep_advancing_after_delete() {
    let app = TestApp::new().await;

    let first = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();
    let second = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();
    assert_eq!(second.job_card_number, "JC-0002");

    app.services
        .job_cards
        .delete_job_card(first.id)
        .await
        .unwrap();

    // The next number must not collide with JC-0002, which still exists.
    let third = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();
    assert_eq!(third.job_card_number, "JC-0003");
}

#[tokio::test]
async fn create_job_card_requires_core_fields() {
    let app = TestApp::new().await;

    let mut input = sample_card();
    input.board_color = "  ".to_string();

    let err = app
        .services
        .job_cards
        .create_job_card(input)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn completing_a_job_materializes_one_board() {
    let mut app = TestApp::new().await;

    let card = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();
    complete_card(&app, card.id).await;

    let card = app.services.job_cards.get_job_card(card.id).await.unwrap();
    assert_eq!(card.phase, JobPhase::Completed);
    assert_eq!(card.fabrication_status, StageStatus::Completed);
    assert_eq!(card.assembling_status, StageStatus::Completed);
    assert!(card.completed_at.is_some());
    assert_eq!(card.assembling_by_name.as_deref(), Some("Thabo"));

    // A Mini-Flush / Red board row was created with one unit in stock and
    // the non-default threshold for that type.
    let board = app
        .services
        .boards
        .find_by_type_and_color("Mini-Flush", "Red")
        .await
        .unwrap()
        .expect("board row");
    assert_eq!(board.quantity, 1);
    assert_eq!(board.min_threshold, 2);

    // Exactly one Manufactured ledger row, quantity 1, tied to the card.
    let txns = app
        .services
        .boards
        .list_transactions(board.id)
        .await
        .unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].kind, BoardTxnKind::Manufactured);
    assert_eq!(txns[0].quantity, 1);
    assert_eq!(txns[0].reference.as_deref(), Some("JC-0001"));

    let events = app.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::JobCardCompleted { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BoardManufactured { .. })));
}

#[tokio::test]
async fn completion_increments_existing_board_ignoring_color_case() {
    let app = TestApp::new().await;

    let board = app
        .services
        .boards
        .create_board(josm_api::services::boards::CreateBoard {
            board_type: "Mini-Flush".to_string(),
            color: "RED".to_string(),
            quantity: 3,
            min_threshold: Some(2),
        })
        .await
        .unwrap();

    let card = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();
    complete_card(&app, card.id).await;

    let board = app.services.boards.get_board(board.id).await.unwrap();
    assert_eq!(board.quantity, 4);

    // No duplicate row for the lowercase-colored card.
    let (boards, total) = app.services.boards.list_boards(1, 50).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(boards.len(), 1);
}

#[tokio::test]
async fn surface_mounted_boards_default_to_higher_threshold() {
    let app = TestApp::new().await;

    let mut input = sample_card();
    input.board_type = "Surface Mounted".to_string();

    let card = app
        .services
        .job_cards
        .create_job_card(input)
        .await
        .unwrap();
    complete_card(&app, card.id).await;

    let board = app
        .services
        .boards
        .find_by_type_and_color("Surface Mounted", "Red")
        .await
        .unwrap()
        .expect("board row");
    assert_eq!(board.min_threshold, 5);
}

#[tokio::test]
async fn assembling_cannot_start_before_fabrication_completes() {
    let app = TestApp::new().await;

    let card = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();

    let err = app
        .services
        .job_cards
        .advance_stage(
            card.id,
            JobStage::Assembling,
            StageStatus::InProgress,
            "u1",
            "Thabo",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    // Even with fabrication merely in progress.
    app.services
        .job_cards
        .advance_stage(
            card.id,
            JobStage::Fabrication,
            StageStatus::InProgress,
            "u1",
            "Thabo",
        )
        .await
        .unwrap();
    let err = app
        .services
        .job_cards
        .advance_stage(
            card.id,
            JobStage::Assembling,
            StageStatus::InProgress,
            "u1",
            "Thabo",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn stage_cannot_skip_in_progress() {
    let app = TestApp::new().await;

    let card = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();

    let err = app
        .services
        .job_cards
        .advance_stage(
            card.id,
            JobStage::Fabrication,
            StageStatus::Completed,
            "u1",
            "Thabo",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    // The rejected jump left the card untouched.
    let card = app.services.job_cards.get_job_card(card.id).await.unwrap();
    assert_eq!(card.fabrication_status, StageStatus::Pending);
}

#[tokio::test]
async fn completed_card_accepts_photos_but_nothing_else() {
    let app = TestApp::new().await;

    let card = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();
    complete_card(&app, card.id).await;

    let err = app
        .services
        .job_cards
        .advance_stage(
            card.id,
            JobStage::Fabrication,
            StageStatus::InProgress,
            "u1",
            "Thabo",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let err = app
        .services
        .job_cards
        .add_materials(
            card.id,
            vec![MaterialUsage {
                material_id: 1,
                material_name: "60A breaker".to_string(),
                quantity: 2,
                process: JobStage::Assembling,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let updated = app
        .services
        .job_cards
        .add_photos(card.id, vec!["https://cdn.example/jc-0001-front.jpg".to_string()])
        .await
        .unwrap();
    assert_eq!(updated.photo_urls().len(), 1);
}

#[tokio::test]
async fn recording_material_usage_does_not_touch_stock() {
    let app = TestApp::new().await;

    let material = app
        .services
        .materials
        .create_material(josm_api::services::materials::CreateMaterial {
            category: "Breakers".to_string(),
            name: "60A breaker".to_string(),
            variant: None,
            quantity: 10,
            min_threshold: 3,
            unit: "pcs".to_string(),
        })
        .await
        .unwrap();

    let card = app
        .services
        .job_cards
        .create_job_card(sample_card())
        .await
        .unwrap();

    let rows = app
        .services
        .job_cards
        .add_materials(
            card.id,
            vec![MaterialUsage {
                material_id: material.id,
                material_name: material.name.clone(),
                quantity: 4,
                process: JobStage::Fabrication,
            }],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    // Usage entries are bookkeeping; stock only moves through the
    // request-approval flow.
    let material = app
        .services
        .materials
        .get_material(material.id)
        .await
        .unwrap();
    assert_eq!(material.quantity, 10);

    let used = app
        .services
        .job_cards
        .get_materials_used(card.id)
        .await
        .unwrap();
    assert_eq!(used.len(), 1);
    assert_eq!(used[0].quantity, 4);
    assert_eq!(used[0].process, JobStage::Fabrication);
}

#[tokio::test]
async fn unknown_job_card_is_not_found() {
    let app = TestApp::new().await;

    let err = app
        .services
        .job_cards
        .advance_stage(
            999,
            JobStage::Fabrication,
            StageStatus::InProgress,
            "u1",
            "Thabo",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn job_cards_list_newest_first() {
    let app = TestApp::new().await;

    for _ in 0..3 {
        app.services
            .job_cards
            .create_job_card(sample_card())
            .await
            .unwrap();
    }

    let (cards, total) = app.services.job_cards.list_job_cards(1, 2).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(cards.len(), 2);
}
