use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::{
    entities::{
        board::{self, Entity as BoardEntity},
        board_transaction::{self, BoardTxnKind},
        job_card::{self, derive_phase, Entity as JobCardEntity, JobPhase, JobStage, StageStatus},
        job_card_material::{self, Entity as JobCardMaterialEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Input for creating a job card.
#[derive(Debug, Clone)]
pub struct CreateJobCard {
    pub job_name: String,
    pub client_name: String,
    pub board_name: String,
    pub board_type: String,
    pub board_color: String,
    pub recipient: Option<String>,
    pub supervisor: Option<String>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

/// One material-usage entry appended to a job card.
#[derive(Debug, Clone)]
pub struct MaterialUsage {
    pub material_id: i64,
    pub material_name: String,
    pub quantity: i32,
    pub process: JobStage,
}

/// Coordinates the two-stage production workflow of a job card and the
/// finished-board side effect of completion.
///
/// Stage transitions are guarded here, not in the UI: within a stage only
/// Pending -> InProgress -> Completed, one step at a time, and assembling
/// may not leave Pending before fabrication is Completed. Completing
/// assembling and materializing the finished board commit in one database
/// transaction, so a completed job always has its matching board unit and
/// ledger row.
#[derive(Clone)]
pub struct JobCardService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl JobCardService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a job card in the initial (Pending, Pending) state and
    /// assigns the next sequential JC number.
    #[instrument(skip(self, input))]
    pub async fn create_job_card(
        &self,
        input: CreateJobCard,
    ) -> Result<job_card::Model, ServiceError> {
        for (field, value) in [
            ("job_name", &input.job_name),
            ("client_name", &input.client_name),
            ("board_name", &input.board_name),
            ("board_type", &input.board_type),
            ("board_color", &input.board_color),
        ] {
            if value.trim().is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "{} is required",
                    field
                )));
            }
        }

        let db = &*self.db;
        let job_card_number = Self::next_job_card_number(db).await?;

        let now = Utc::now();
        let card = job_card::ActiveModel {
            job_card_number: Set(job_card_number.clone()),
            job_name: Set(input.job_name),
            client_name: Set(input.client_name),
            board_name: Set(input.board_name),
            board_type: Set(input.board_type),
            board_color: Set(input.board_color),
            recipient: Set(input.recipient),
            supervisor: Set(input.supervisor),
            priority: Set(input.priority),
            notes: Set(input.notes),
            photo_urls: Set(serde_json::json!([])),
            fabrication_status: Set(StageStatus::Pending),
            assembling_status: Set(StageStatus::Pending),
            phase: Set(JobPhase::Fabrication),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = card.insert(db).await.map_err(|e| {
            error!("Failed to create job card: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        counter!("josm.job_cards.created", 1);

        self.event_sender
            .send_or_log(Event::JobCardCreated {
                job_card_id: created.id,
                job_card_number: created.job_card_number.clone(),
            })
            .await;

        info!(
            "Job card {} created for client {}",
            created.job_card_number, created.client_name
        );

        Ok(created)
    }

    /// Next sequential JC number, derived from the most recently issued
    /// card. A row count would fall behind the highest issued number once
    /// a card is deleted and the insert would then trip the unique
    /// constraint on the number column.
    async fn next_job_card_number(db: &DatabaseConnection) -> Result<String, ServiceError> {
        let last = JobCardEntity::find()
            .order_by_desc(job_card::Column::Id)
            .one(db)
            .await?;

        let next = last
            .as_ref()
            .and_then(|card| card.job_card_number.strip_prefix("JC-"))
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;

        Ok(format!("JC-{:04}", next))
    }

    /// Advances one stage of a job card to the requested status.
    ///
    /// When the assembling stage reaches Completed, the job update and the
    /// finished-board materialization commit in the same transaction.
    #[instrument(skip(self))]
    pub async fn advance_stage(
        &self,
        job_id: i64,
        stage: JobStage,
        target: StageStatus,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<job_card::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await?;

        let card = JobCardEntity::find_by_id(job_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", job_id)))?;

        if card.phase == JobPhase::Completed {
            return Err(ServiceError::InvalidOperation(format!(
                "Job card {} is completed and no longer accepts stage changes",
                card.job_card_number
            )));
        }

        let current = match stage {
            JobStage::Fabrication => card.fabrication_status,
            JobStage::Assembling => card.assembling_status,
        };

        Self::check_transition(&card, stage, current, target)?;

        let now = Utc::now();
        let job_card_number = card.job_card_number.clone();
        let board_type = card.board_type.clone();
        let board_color = card.board_color.clone();

        let new_fabrication = if stage == JobStage::Fabrication {
            target
        } else {
            card.fabrication_status
        };
        let new_assembling = if stage == JobStage::Assembling {
            target
        } else {
            card.assembling_status
        };
        let new_phase = derive_phase(new_fabrication, new_assembling);

        let mut active: job_card::ActiveModel = card.into();
        match stage {
            JobStage::Fabrication => {
                active.fabrication_status = Set(target);
                active.fabrication_by_id = Set(Some(actor_id.to_string()));
                active.fabrication_by_name = Set(Some(actor_name.to_string()));
                if target == StageStatus::Completed {
                    active.fabrication_completed_at = Set(Some(now));
                }
            }
            JobStage::Assembling => {
                active.assembling_status = Set(target);
                active.assembling_by_id = Set(Some(actor_id.to_string()));
                active.assembling_by_name = Set(Some(actor_name.to_string()));
                if target == StageStatus::Completed {
                    active.assembling_completed_at = Set(Some(now));
                }
            }
        }
        active.phase = Set(new_phase);
        if new_phase == JobPhase::Completed {
            active.completed_at = Set(Some(now));
        }
        active.updated_at = Set(now);

        let updated = active.update(&txn).await.map_err(|e| {
            error!("Failed to update job card {}: {}", job_id, e);
            ServiceError::DatabaseError(e)
        })?;

        // Materialize exactly one finished board per completed job, inside
        // the same transaction as the stage update.
        let materialized = if new_phase == JobPhase::Completed {
            Some(
                self.materialize_board(
                    &txn,
                    &board_type,
                    &board_color,
                    &job_card_number,
                    actor_id,
                    actor_name,
                )
                .await?,
            )
        } else {
            None
        };

        txn.commit().await?;

        counter!("josm.job_cards.stage_advanced", 1);

        self.event_sender
            .send_or_log(Event::JobStageAdvanced {
                job_card_id: job_id,
                stage,
                status: target,
            })
            .await;

        if let Some(board) = materialized {
            counter!("josm.job_cards.completed", 1);
            counter!("josm.boards.manufactured", 1);

            self.event_sender
                .send_or_log(Event::JobCardCompleted {
                    job_card_id: job_id,
                    job_card_number: job_card_number.clone(),
                })
                .await;
            self.event_sender
                .send_or_log(Event::BoardManufactured {
                    board_id: board.id,
                    quantity: 1,
                    reference: Some(job_card_number.clone()),
                })
                .await;

            info!(
                "Job card {} completed; board {} stock now {}",
                job_card_number,
                board.label(),
                board.quantity
            );
        } else {
            info!(
                "Job card {} {} stage moved to {:?}",
                job_card_number, stage, target
            );
        }

        Ok(updated)
    }

    /// Rejects illegal stage transitions. The workflow moves strictly
    /// forward one step at a time, and assembling waits for fabrication.
    fn check_transition(
        card: &job_card::Model,
        stage: JobStage,
        current: StageStatus,
        target: StageStatus,
    ) -> Result<(), ServiceError> {
        if stage == JobStage::Assembling && card.fabrication_status != StageStatus::Completed {
            return Err(ServiceError::InvalidOperation(format!(
                "Job card {}: assembling cannot start until fabrication is completed",
                card.job_card_number
            )));
        }

        let expected = match current {
            StageStatus::Pending => StageStatus::InProgress,
            StageStatus::InProgress => StageStatus::Completed,
            StageStatus::Completed => {
                return Err(ServiceError::InvalidOperation(format!(
                    "Job card {}: {} stage is already completed",
                    card.job_card_number, stage
                )));
            }
        };

        if target != expected {
            return Err(ServiceError::InvalidOperation(format!(
                "Job card {}: {} stage cannot move from {:?} to {:?}",
                card.job_card_number, stage, current, target
            )));
        }

        Ok(())
    }

    /// Looks up the finished-board row for (type, color), comparing color
    /// case-insensitively, and creates it with a type-dependent threshold
    /// when absent. Then adds exactly one unit and its ledger row.
    async fn materialize_board(
        &self,
        txn: &DatabaseTransaction,
        board_type: &str,
        board_color: &str,
        job_card_number: &str,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<board::Model, ServiceError> {
        let now = Utc::now();

        let existing = BoardEntity::find()
            .filter(board::Column::BoardType.eq(board_type))
            .all(txn)
            .await?
            .into_iter()
            .find(|b| b.color.eq_ignore_ascii_case(board_color));

        let board_row = match existing {
            Some(b) => b,
            None => {
                let created = board::ActiveModel {
                    board_type: Set(board_type.to_string()),
                    color: Set(board_color.to_string()),
                    quantity: Set(0),
                    min_threshold: Set(board::default_min_threshold(board_type)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                self.event_sender
                    .send_or_log(Event::BoardCreated {
                        board_id: created.id,
                        board_type: created.board_type.clone(),
                        color: created.color.clone(),
                    })
                    .await;

                created
            }
        };

        let new_quantity = board_row.quantity + 1;
        let board_id = board_row.id;
        let mut active: board::ActiveModel = board_row.into();
        active.quantity = Set(new_quantity);
        active.updated_at = Set(now);
        let updated = active.update(txn).await?;

        board_transaction::ActiveModel {
            board_id: Set(board_id),
            kind: Set(BoardTxnKind::Manufactured),
            quantity: Set(1),
            actor_id: Set(actor_id.to_string()),
            actor_name: Set(actor_name.to_string()),
            reference: Set(Some(job_card_number.to_string())),
            notes: Set(Some(format!(
                "Manufactured via job card {}",
                job_card_number
            ))),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(updated)
    }

    /// Appends material-usage entries to a job card. Bookkeeping only:
    /// material stock moves through request approval, not here.
    #[instrument(skip(self, entries))]
    pub async fn add_materials(
        &self,
        job_id: i64,
        entries: Vec<MaterialUsage>,
    ) -> Result<Vec<job_card_material::Model>, ServiceError> {
        if entries.is_empty() {
            return Err(ServiceError::InvalidInput(
                "At least one material entry is required".to_string(),
            ));
        }
        for entry in &entries {
            if entry.quantity <= 0 {
                return Err(ServiceError::InvalidInput(format!(
                    "Material quantity must be positive, got: {}",
                    entry.quantity
                )));
            }
        }

        let db = &*self.db;
        let card = JobCardEntity::find_by_id(job_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", job_id)))?;

        if card.phase == JobPhase::Completed {
            return Err(ServiceError::InvalidOperation(format!(
                "Job card {} is completed; material usage can no longer be recorded",
                card.job_card_number
            )));
        }

        let now = Utc::now();
        let mut inserted = Vec::with_capacity(entries.len());
        for entry in entries {
            let row = job_card_material::ActiveModel {
                job_card_id: Set(job_id),
                material_id: Set(entry.material_id),
                material_name: Set(entry.material_name),
                quantity: Set(entry.quantity),
                process: Set(entry.process),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
            inserted.push(row);
        }

        info!(
            "Recorded {} material usage entries on job card {}",
            inserted.len(),
            card.job_card_number
        );

        Ok(inserted)
    }

    /// Appends photo URLs to a job card. The one mutation a completed
    /// card still accepts.
    #[instrument(skip(self, urls))]
    pub async fn add_photos(
        &self,
        job_id: i64,
        urls: Vec<String>,
    ) -> Result<job_card::Model, ServiceError> {
        if urls.is_empty() {
            return Err(ServiceError::InvalidInput(
                "At least one photo URL is required".to_string(),
            ));
        }

        let db = &*self.db;
        let card = JobCardEntity::find_by_id(job_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", job_id)))?;

        let mut photos = card.photo_urls();
        photos.extend(urls);

        let mut active: job_card::ActiveModel = card.into();
        active.photo_urls = Set(serde_json::json!(photos));
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_job_card(&self, job_id: i64) -> Result<job_card::Model, ServiceError> {
        JobCardEntity::find_by_id(job_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Job card {} not found", job_id)))
    }

    /// Returns the usage entries recorded on a job card, oldest first.
    #[instrument(skip(self))]
    pub async fn get_materials_used(
        &self,
        job_id: i64,
    ) -> Result<Vec<job_card_material::Model>, ServiceError> {
        let rows = JobCardMaterialEntity::find()
            .filter(job_card_material::Column::JobCardId.eq(job_id))
            .order_by_asc(job_card_material::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }

    /// Lists job cards, newest first, with pagination.
    #[instrument(skip(self))]
    pub async fn list_job_cards(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<job_card::Model>, u64), ServiceError> {
        let paginator = JobCardEntity::find()
            .order_by_desc(job_card::Column::CreatedAt)
            .paginate(&*self.db, limit.max(1));

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Deletes a job card. Exists for housekeeping; not part of the
    /// production workflow.
    #[instrument(skip(self))]
    pub async fn delete_job_card(&self, job_id: i64) -> Result<(), ServiceError> {
        let res = JobCardEntity::delete_by_id(job_id).exec(&*self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Job card {} not found",
                job_id
            )));
        }
        info!("Job card {} deleted", job_id);
        Ok(())
    }
}
