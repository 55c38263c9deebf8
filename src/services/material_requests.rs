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
        material::Entity as MaterialEntity,
        material_request::{self, Entity as MaterialRequestEntity, RequestStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::materials::MaterialService,
};

/// Service for the worker material-request flow: pending -> approved or
/// rejected, one transition, no reversal. Approval deducts material stock
/// and stamps the ledger inside a single database transaction, so two
/// approvals racing over the same stock cannot both pass the check.
#[derive(Clone)]
pub struct MaterialRequestService {
    db: Arc<DatabaseConnection>,
    materials: Arc<MaterialService>,
    event_sender: EventSender,
}

impl MaterialRequestService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        materials: Arc<MaterialService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            materials,
            event_sender,
        }
    }

    /// Submits a request for materials on behalf of a worker.
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        material_id: i64,
        quantity: i32,
        requested_by_id: &str,
        requested_by_name: &str,
        notes: Option<String>,
    ) -> Result<material_request::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "Request quantity must be positive, got: {}",
                quantity
            )));
        }

        let db = &*self.db;
        // The material must exist up front; stock is only checked at
        // approval time.
        MaterialEntity::find_by_id(material_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material {} not found", material_id))
            })?;

        let now = Utc::now();
        let created = material_request::ActiveModel {
            material_id: Set(material_id),
            quantity: Set(quantity),
            requested_by_id: Set(requested_by_id.to_string()),
            requested_by_name: Set(requested_by_name.to_string()),
            status: Set(RequestStatus::Pending),
            notes: Set(notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        counter!("josm.material_requests.submitted", 1);
        self.event_sender
            .send_or_log(Event::MaterialRequestSubmitted {
                request_id: created.id,
                material_id,
                quantity,
            })
            .await;

        Ok(created)
    }

    /// Approves a pending request: re-checks stock, deducts it, appends
    /// the Issued ledger row and stamps the approver. All writes commit
    /// in one transaction; an insufficient-stock rejection leaves both the
    /// request and the material untouched.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        request_id: i64,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<material_request::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await?;

        let request = MaterialRequestEntity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material request {} not found", request_id))
            })?;

        if request.status != RequestStatus::Pending {
            return Err(ServiceError::InvalidOperation(format!(
                "Material request {} is not pending",
                request_id
            )));
        }

        let material_id = request.material_id;
        let quantity = request.quantity;

        let material = self
            .materials
            .deduct_in_txn(
                &txn,
                material_id,
                quantity,
                actor_id,
                actor_name,
                Some(format!("request #{}", request_id)),
                Some(format!(
                    "Issued to {} on request approval",
                    request.requested_by_name
                )),
            )
            .await?;

        let now = Utc::now();
        let mut active: material_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Approved);
        active.decided_by_id = Set(Some(actor_id.to_string()));
        active.decided_by_name = Set(Some(actor_name.to_string()));
        active.decided_at = Set(Some(now));
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        counter!("josm.material_requests.approved", 1);
        self.event_sender
            .send_or_log(Event::MaterialRequestApproved {
                request_id,
                material_id,
                quantity,
            })
            .await;
        self.materials.alert_if_low(&material).await;

        info!(
            "Material request {} approved; {} stock now {}",
            request_id,
            material.label(),
            material.quantity
        );

        Ok(updated)
    }

    /// Rejects a pending request. Only the approver identity and time are
    /// stamped; stock is untouched.
    #[instrument(skip(self))]
    pub async fn reject(
        &self,
        request_id: i64,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<material_request::Model, ServiceError> {
        let db = &*self.db;

        let request = MaterialRequestEntity::find_by_id(request_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material request {} not found", request_id))
            })?;

        if request.status != RequestStatus::Pending {
            return Err(ServiceError::InvalidOperation(format!(
                "Material request {} is not pending",
                request_id
            )));
        }

        let now = Utc::now();
        let mut active: material_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Rejected);
        active.decided_by_id = Set(Some(actor_id.to_string()));
        active.decided_by_name = Set(Some(actor_name.to_string()));
        active.decided_at = Set(Some(now));
        active.updated_at = Set(now);
        let updated = active.update(db).await?;

        counter!("josm.material_requests.rejected", 1);
        self.event_sender
            .send_or_log(Event::MaterialRequestRejected { request_id })
            .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_request(
        &self,
        request_id: i64,
    ) -> Result<material_request::Model, ServiceError> {
        MaterialRequestEntity::find_by_id(request_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material request {} not found", request_id))
            })
    }

    /// Lists requests, newest first, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<material_request::Model>, u64), ServiceError> {
        let mut query = MaterialRequestEntity::find();
        if let Some(status) = status {
            query = query.filter(material_request::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(material_request::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }
}
