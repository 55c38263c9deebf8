use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryOrder,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    entities::customer_good::{self, CustomerGoodStatus, Entity as CustomerGoodEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone)]
pub struct ReceiveCustomerGoods {
    pub customer_name: String,
    pub description: String,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Service for customer-owned goods held on site.
#[derive(Clone)]
pub struct CustomerGoodsService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CustomerGoodsService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn receive(
        &self,
        input: ReceiveCustomerGoods,
    ) -> Result<customer_good::Model, ServiceError> {
        if input.customer_name.trim().is_empty() || input.description.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "customer_name and description are required".to_string(),
            ));
        }
        if input.quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let created = customer_good::ActiveModel {
            customer_name: Set(input.customer_name),
            description: Set(input.description),
            quantity: Set(input.quantity),
            status: Set(CustomerGoodStatus::Held),
            received_at: Set(now),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::CustomerGoodsReceived {
                customer_good_id: created.id,
            })
            .await;

        info!(
            "Received {} x {} from {}",
            created.quantity, created.description, created.customer_name
        );

        Ok(created)
    }

    /// Marks held goods as returned to the customer. One-way transition.
    #[instrument(skip(self))]
    pub async fn mark_returned(&self, id: i64) -> Result<customer_good::Model, ServiceError> {
        let db = &*self.db;
        let row = CustomerGoodEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer goods {} not found", id)))?;

        if row.status == CustomerGoodStatus::Returned {
            return Err(ServiceError::InvalidOperation(format!(
                "Customer goods {} already returned",
                id
            )));
        }

        let now = Utc::now();
        let mut active: customer_good::ActiveModel = row.into();
        active.status = Set(CustomerGoodStatus::Returned);
        active.returned_at = Set(Some(now));
        active.updated_at = Set(now);
        let updated = active.update(db).await?;

        self.event_sender
            .send_or_log(Event::CustomerGoodsReturned {
                customer_good_id: id,
            })
            .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<customer_good::Model, ServiceError> {
        CustomerGoodEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer goods {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<customer_good::Model>, u64), ServiceError> {
        let paginator = CustomerGoodEntity::find()
            .order_by_desc(customer_good::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }
}
