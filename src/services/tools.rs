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
        tool::{self, Entity as ToolEntity},
        tool_transaction::{self, Entity as ToolTransactionEntity, ToolTxnKind},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone)]
pub struct CreateTool {
    pub name: String,
    pub quantity: i32,
    pub location: Option<String>,
    pub condition: Option<String>,
}

/// Service for workshop tools. Tools move by checkout (issue) and return;
/// each move appends a ledger row.
#[derive(Clone)]
pub struct ToolService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ToolService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create_tool(&self, input: CreateTool) -> Result<tool::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError("name is required".to_string()));
        }
        if input.quantity < 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let created = tool::ActiveModel {
            name: Set(input.name),
            quantity: Set(input.quantity),
            location: Set(input.location),
            condition: Set(input.condition),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(created)
    }

    /// Checks tools out to a worker, rejecting when not enough are on the
    /// shelf.
    #[instrument(skip(self))]
    pub async fn issue(
        &self,
        tool_id: i64,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
        notes: Option<String>,
    ) -> Result<tool::Model, ServiceError> {
        self.move_stock(tool_id, quantity, ToolTxnKind::Issued, actor_id, actor_name, notes)
            .await
    }

    /// Returns previously issued tools to the shelf.
    #[instrument(skip(self))]
    pub async fn return_tool(
        &self,
        tool_id: i64,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
        notes: Option<String>,
    ) -> Result<tool::Model, ServiceError> {
        self.move_stock(
            tool_id,
            quantity,
            ToolTxnKind::Returned,
            actor_id,
            actor_name,
            notes,
        )
        .await
    }

    async fn move_stock(
        &self,
        tool_id: i64,
        quantity: i32,
        kind: ToolTxnKind,
        actor_id: &str,
        actor_name: &str,
        notes: Option<String>,
    ) -> Result<tool::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "Quantity must be positive, got: {}",
                quantity
            )));
        }

        let db = &*self.db;
        let txn = db.begin().await?;

        let tool_row = ToolEntity::find_by_id(tool_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Tool {} not found", tool_id)))?;

        let new_quantity = match kind {
            ToolTxnKind::Issued => {
                if tool_row.quantity < quantity {
                    return Err(ServiceError::InsufficientStock(format!(
                        "{}: requested {}, only {} available",
                        tool_row.name, quantity, tool_row.quantity
                    )));
                }
                tool_row.quantity - quantity
            }
            ToolTxnKind::Returned => tool_row.quantity + quantity,
        };

        let name = tool_row.name.clone();
        let mut active: tool::ActiveModel = tool_row.into();
        active.quantity = Set(new_quantity);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        tool_transaction::ActiveModel {
            tool_id: Set(tool_id),
            kind: Set(kind),
            quantity: Set(quantity),
            actor_id: Set(actor_id.to_string()),
            actor_name: Set(actor_name.to_string()),
            notes: Set(notes),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        let event = match kind {
            ToolTxnKind::Issued => {
                counter!("josm.tools.issued", 1);
                Event::ToolIssued { tool_id, quantity }
            }
            ToolTxnKind::Returned => {
                counter!("josm.tools.returned", 1);
                Event::ToolReturned { tool_id, quantity }
            }
        };
        self.event_sender.send_or_log(event).await;

        info!(
            "Tool {} {:?} x{} (on shelf: {})",
            name, kind, quantity, new_quantity
        );

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_tool(&self, tool_id: i64) -> Result<tool::Model, ServiceError> {
        ToolEntity::find_by_id(tool_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Tool {} not found", tool_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_tools(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<tool::Model>, u64), ServiceError> {
        let paginator = ToolEntity::find()
            .order_by_asc(tool::Column::Name)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Ledger rows for one tool, newest first.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        tool_id: i64,
    ) -> Result<Vec<tool_transaction::Model>, ServiceError> {
        let rows = ToolTransactionEntity::find()
            .filter(tool_transaction::Column::ToolId.eq(tool_id))
            .order_by_desc(tool_transaction::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }
}
