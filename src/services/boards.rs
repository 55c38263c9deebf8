use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::{
        board::{self, Entity as BoardEntity},
        board_transaction::{self, Entity as BoardTransactionEntity, BoardTxnKind},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone)]
pub struct CreateBoard {
    pub board_type: String,
    pub color: String,
    pub quantity: i32,
    pub min_threshold: Option<i32>,
}

/// Service for finished-board stock. Boards also enter stock through the
/// job workflow coordinator when a job card completes.
#[derive(Clone)]
pub struct BoardService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl BoardService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create_board(&self, input: CreateBoard) -> Result<board::Model, ServiceError> {
        if input.board_type.trim().is_empty() || input.color.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "board_type and color are required".to_string(),
            ));
        }
        if input.quantity < 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must not be negative".to_string(),
            ));
        }

        let db = &*self.db;
        let duplicate = BoardEntity::find()
            .filter(board::Column::BoardType.eq(input.board_type.clone()))
            .all(db)
            .await?
            .into_iter()
            .any(|b| b.color.eq_ignore_ascii_case(&input.color));
        if duplicate {
            return Err(ServiceError::Conflict(format!(
                "Board {} {} already exists",
                input.board_type, input.color
            )));
        }

        let now = Utc::now();
        let min_threshold = input
            .min_threshold
            .unwrap_or_else(|| board::default_min_threshold(&input.board_type));
        let created = board::ActiveModel {
            board_type: Set(input.board_type),
            color: Set(input.color),
            quantity: Set(input.quantity),
            min_threshold: Set(min_threshold),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.event_sender
            .send_or_log(Event::BoardCreated {
                board_id: created.id,
                board_type: created.board_type.clone(),
                color: created.color.clone(),
            })
            .await;

        Ok(created)
    }

    /// Adds manufactured boards to stock with a Manufactured ledger row.
    /// Manual counterpart of the job-completion side effect, used when
    /// boards are produced outside a tracked job.
    #[instrument(skip(self))]
    pub async fn manufacture(
        &self,
        board_id: i64,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
        reference: Option<String>,
    ) -> Result<board::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "Manufacture quantity must be positive, got: {}",
                quantity
            )));
        }

        let db = &*self.db;
        let txn = db.begin().await?;

        let board_row = BoardEntity::find_by_id(board_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Board {} not found", board_id)))?;

        let new_quantity = board_row.quantity + quantity;
        let mut active: board::ActiveModel = board_row.into();
        active.quantity = Set(new_quantity);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        self.append_transaction(
            &txn,
            board_id,
            BoardTxnKind::Manufactured,
            quantity,
            actor_id,
            actor_name,
            reference.clone(),
        )
        .await?;

        txn.commit().await?;

        counter!("josm.boards.manufactured", 1);
        self.event_sender
            .send_or_log(Event::BoardManufactured {
                board_id,
                quantity,
                reference,
            })
            .await;

        Ok(updated)
    }

    /// Deducts sold boards, rejecting oversell, with a Sold ledger row.
    #[instrument(skip(self))]
    pub async fn sell(
        &self,
        board_id: i64,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<board::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "Sell quantity must be positive, got: {}",
                quantity
            )));
        }

        let db = &*self.db;
        let txn = db.begin().await?;

        let board_row = BoardEntity::find_by_id(board_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Board {} not found", board_id)))?;

        if board_row.quantity < quantity {
            return Err(ServiceError::InsufficientStock(format!(
                "{}: requested {}, only {} in stock",
                board_row.label(),
                quantity,
                board_row.quantity
            )));
        }

        let new_quantity = board_row.quantity - quantity;
        let label = board_row.label();
        let min_threshold = board_row.min_threshold;
        let mut active: board::ActiveModel = board_row.into();
        active.quantity = Set(new_quantity);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        self.append_transaction(
            &txn,
            board_id,
            BoardTxnKind::Sold,
            quantity,
            actor_id,
            actor_name,
            None,
        )
        .await?;

        txn.commit().await?;

        counter!("josm.boards.sold", 1);
        self.event_sender
            .send_or_log(Event::BoardSold { board_id, quantity })
            .await;
        if new_quantity <= min_threshold {
            self.event_sender
                .send_or_log(Event::LowStockDetected {
                    item: label.clone(),
                    quantity: new_quantity,
                    min_threshold,
                })
                .await;
        }

        info!("Sold {} x {} (stock now {})", quantity, label, new_quantity);

        Ok(updated)
    }

    async fn append_transaction<C: sea_orm::ConnectionTrait>(
        &self,
        txn: &C,
        board_id: i64,
        kind: BoardTxnKind,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
        reference: Option<String>,
    ) -> Result<board_transaction::Model, ServiceError> {
        let row = board_transaction::ActiveModel {
            board_id: Set(board_id),
            kind: Set(kind),
            quantity: Set(quantity),
            actor_id: Set(actor_id.to_string()),
            actor_name: Set(actor_name.to_string()),
            reference: Set(reference),
            notes: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn get_board(&self, board_id: i64) -> Result<board::Model, ServiceError> {
        BoardEntity::find_by_id(board_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Board {} not found", board_id)))
    }

    /// Finds a board by its natural key; color is compared
    /// case-insensitively.
    #[instrument(skip(self))]
    pub async fn find_by_type_and_color(
        &self,
        board_type: &str,
        color: &str,
    ) -> Result<Option<board::Model>, ServiceError> {
        let found = BoardEntity::find()
            .filter(board::Column::BoardType.eq(board_type))
            .all(&*self.db)
            .await?
            .into_iter()
            .find(|b| b.color.eq_ignore_ascii_case(color));
        Ok(found)
    }

    #[instrument(skip(self))]
    pub async fn list_boards(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<board::Model>, u64), ServiceError> {
        let paginator = BoardEntity::find()
            .order_by_asc(board::Column::BoardType)
            .order_by_asc(board::Column::Color)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Boards at or below their minimum threshold.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<board::Model>, ServiceError> {
        let all = BoardEntity::find().all(&*self.db).await?;
        Ok(all
            .into_iter()
            .filter(|b| b.quantity <= b.min_threshold)
            .collect())
    }

    /// Ledger rows for one board, newest first.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        board_id: i64,
    ) -> Result<Vec<board_transaction::Model>, ServiceError> {
        let rows = BoardTransactionEntity::find()
            .filter(board_transaction::Column::BoardId.eq(board_id))
            .order_by_desc(board_transaction::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }
}
