use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::{
    entities::{
        material::{self, Entity as MaterialEntity},
        material_transaction::{self, Entity as MaterialTransactionEntity, MaterialTxnKind},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone)]
pub struct CreateMaterial {
    pub category: String,
    pub name: String,
    pub variant: Option<String>,
    pub quantity: i32,
    pub min_threshold: i32,
    pub unit: String,
}

/// Service for managing raw-material stock. Every quantity change appends
/// an immutable ledger row; quantity never goes negative.
#[derive(Clone)]
pub struct MaterialService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl MaterialService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Registers a new material. The (category, name, variant) triple is
    /// the natural key; duplicates are rejected.
    #[instrument(skip(self, input))]
    pub async fn create_material(
        &self,
        input: CreateMaterial,
    ) -> Result<material::Model, ServiceError> {
        if input.category.trim().is_empty() || input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "category and name are required".to_string(),
            ));
        }
        if input.quantity < 0 || input.min_threshold < 0 {
            return Err(ServiceError::InvalidInput(
                "quantity and min_threshold must not be negative".to_string(),
            ));
        }

        let db = &*self.db;
        let mut cond = Condition::all()
            .add(material::Column::Category.eq(input.category.clone()))
            .add(material::Column::Name.eq(input.name.clone()));
        cond = match &input.variant {
            Some(v) => cond.add(material::Column::Variant.eq(v.clone())),
            None => cond.add(material::Column::Variant.is_null()),
        };

        if MaterialEntity::find().filter(cond).one(db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Material {} / {} already exists",
                input.category, input.name
            )));
        }

        let now = Utc::now();
        let created = material::ActiveModel {
            category: Set(input.category),
            name: Set(input.name),
            variant: Set(input.variant),
            quantity: Set(input.quantity),
            min_threshold: Set(input.min_threshold),
            unit: Set(input.unit),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        counter!("josm.materials.created", 1);
        self.event_sender
            .send_or_log(Event::MaterialCreated {
                material_id: created.id,
            })
            .await;

        Ok(created)
    }

    /// Adds stock and appends a Received ledger row.
    #[instrument(skip(self))]
    pub async fn receive(
        &self,
        material_id: i64,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
        notes: Option<String>,
    ) -> Result<material::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "Receive quantity must be positive, got: {}",
                quantity
            )));
        }

        let db = &*self.db;
        let txn = db.begin().await?;

        let mat = MaterialEntity::find_by_id(material_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material {} not found", material_id))
            })?;

        let new_quantity = mat.quantity + quantity;
        let mut active: material::ActiveModel = mat.into();
        active.quantity = Set(new_quantity);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(|e| {
            error!("Failed to receive material {}: {}", material_id, e);
            ServiceError::DatabaseError(e)
        })?;

        self.append_transaction(
            &txn,
            material_id,
            MaterialTxnKind::Received,
            quantity,
            actor_id,
            actor_name,
            None,
            notes,
        )
        .await?;

        txn.commit().await?;

        counter!("josm.materials.received", 1);
        self.event_sender
            .send_or_log(Event::MaterialReceived {
                material_id,
                quantity,
            })
            .await;

        info!(
            "Received {} x {} (stock now {})",
            quantity,
            updated.label(),
            updated.quantity
        );

        Ok(updated)
    }

    /// Deducts stock, rejecting the operation when it would go negative,
    /// and appends an Issued ledger row.
    #[instrument(skip(self))]
    pub async fn issue(
        &self,
        material_id: i64,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
        reference: Option<String>,
        notes: Option<String>,
    ) -> Result<material::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "Issue quantity must be positive, got: {}",
                quantity
            )));
        }

        let db = &*self.db;
        let txn = db.begin().await?;

        let updated = self
            .deduct_in_txn(
                &txn,
                material_id,
                quantity,
                actor_id,
                actor_name,
                reference.clone(),
                notes,
            )
            .await?;

        txn.commit().await?;

        counter!("josm.materials.issued", 1);
        self.event_sender
            .send_or_log(Event::MaterialIssued {
                material_id,
                quantity,
                reference,
            })
            .await;
        self.alert_if_low(&updated).await;

        Ok(updated)
    }

    /// Deduction body shared with material-request approval, which runs
    /// inside the approval's own transaction.
    pub(crate) async fn deduct_in_txn<C: sea_orm::ConnectionTrait>(
        &self,
        txn: &C,
        material_id: i64,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
        reference: Option<String>,
        notes: Option<String>,
    ) -> Result<material::Model, ServiceError> {
        let mat = MaterialEntity::find_by_id(material_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material {} not found", material_id))
            })?;

        if mat.quantity < quantity {
            return Err(ServiceError::InsufficientStock(format!(
                "{}: requested {}, only {} in stock",
                mat.label(),
                quantity,
                mat.quantity
            )));
        }

        let new_quantity = mat.quantity - quantity;
        let mut active: material::ActiveModel = mat.into();
        active.quantity = Set(new_quantity);
        active.updated_at = Set(Utc::now());
        let updated = active.update(txn).await?;

        self.append_transaction(
            txn,
            material_id,
            MaterialTxnKind::Issued,
            quantity,
            actor_id,
            actor_name,
            reference,
            notes,
        )
        .await?;

        Ok(updated)
    }

    #[allow(clippy::too_many_arguments)]
    async fn append_transaction<C: sea_orm::ConnectionTrait>(
        &self,
        txn: &C,
        material_id: i64,
        kind: MaterialTxnKind,
        quantity: i32,
        actor_id: &str,
        actor_name: &str,
        reference: Option<String>,
        notes: Option<String>,
    ) -> Result<material_transaction::Model, ServiceError> {
        let row = material_transaction::ActiveModel {
            material_id: Set(material_id),
            kind: Set(kind),
            quantity: Set(quantity),
            actor_id: Set(actor_id.to_string()),
            actor_name: Set(actor_name.to_string()),
            reference: Set(reference),
            notes: Set(notes),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        Ok(row)
    }

    pub(crate) async fn alert_if_low(&self, mat: &material::Model) {
        if mat.quantity <= mat.min_threshold {
            self.event_sender
                .send_or_log(Event::LowStockDetected {
                    item: mat.label(),
                    quantity: mat.quantity,
                    min_threshold: mat.min_threshold,
                })
                .await;
        }
    }

    #[instrument(skip(self))]
    pub async fn get_material(&self, material_id: i64) -> Result<material::Model, ServiceError> {
        MaterialEntity::find_by_id(material_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Material {} not found", material_id)))
    }

    /// Lists materials with pagination, ordered by category then name.
    #[instrument(skip(self))]
    pub async fn list_materials(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<material::Model>, u64), ServiceError> {
        let paginator = MaterialEntity::find()
            .order_by_asc(material::Column::Category)
            .order_by_asc(material::Column::Name)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Materials at or below their minimum threshold.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<material::Model>, ServiceError> {
        let all = MaterialEntity::find().all(&*self.db).await?;
        Ok(all
            .into_iter()
            .filter(|m| m.quantity <= m.min_threshold)
            .collect())
    }

    /// Ledger rows for one material, newest first.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        material_id: i64,
    ) -> Result<Vec<material_transaction::Model>, ServiceError> {
        let rows = MaterialTransactionEntity::find()
            .filter(material_transaction::Column::MaterialId.eq(material_id))
            .order_by_desc(material_transaction::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }
}
