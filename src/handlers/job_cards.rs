use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::{
        job_card::{self, JobStage, StageStatus},
        job_card_material,
    },
    services::job_cards::{CreateJobCard, MaterialUsage},
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobCardRequest {
    #[validate(length(min = 1))]
    pub job_name: String,
    #[validate(length(min = 1))]
    pub client_name: String,
    #[validate(length(min = 1))]
    pub board_name: String,
    #[validate(length(min = 1))]
    pub board_type: String,
    #[validate(length(min = 1))]
    pub board_color: String,
    pub recipient: Option<String>,
    pub supervisor: Option<String>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdvanceStageRequest {
    pub stage: JobStage,
    pub target: StageStatus,
    #[validate(length(min = 1))]
    pub actor_id: String,
    #[validate(length(min = 1))]
    pub actor_name: String,
}

#[derive(Debug, Deserialize)]
pub struct MaterialUsageEntry {
    pub material_id: i64,
    pub material_name: String,
    pub quantity: i32,
    pub process: JobStage,
}

#[derive(Debug, Deserialize)]
pub struct AddMaterialsRequest {
    pub entries: Vec<MaterialUsageEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AddPhotosRequest {
    pub urls: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_job_cards).post(create_job_card))
        .route("/{id}", get(get_job_card).delete(delete_job_card))
        .route("/{id}/advance", post(advance_stage))
        .route("/{id}/materials", get(get_materials).post(add_materials))
        .route("/{id}/photos", post(add_photos))
}

async fn create_job_card(
    State(state): State<AppState>,
    Json(payload): Json<CreateJobCardRequest>,
) -> ApiResult<job_card::Model> {
    payload.validate()?;
    let created = state
        .services
        .job_cards
        .create_job_card(CreateJobCard {
            job_name: payload.job_name,
            client_name: payload.client_name,
            board_name: payload.board_name,
            board_type: payload.board_type,
            board_color: payload.board_color,
            recipient: payload.recipient,
            supervisor: payload.supervisor,
            priority: payload.priority,
            notes: payload.notes,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

async fn get_job_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<job_card::Model> {
    let found = state.services.job_cards.get_job_card(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

async fn list_job_cards(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<job_card::Model>> {
    let (items, total) = state
        .services
        .job_cards
        .list_job_cards(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, &query,
    ))))
}

async fn advance_stage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdvanceStageRequest>,
) -> ApiResult<job_card::Model> {
    payload.validate()?;
    let updated = state
        .services
        .job_cards
        .advance_stage(
            id,
            payload.stage,
            payload.target,
            &payload.actor_id,
            &payload.actor_name,
        )
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn get_materials(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<job_card_material::Model>> {
    let rows = state.services.job_cards.get_materials_used(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

async fn add_materials(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddMaterialsRequest>,
) -> ApiResult<Vec<job_card_material::Model>> {
    let entries = payload
        .entries
        .into_iter()
        .map(|e| MaterialUsage {
            material_id: e.material_id,
            material_name: e.material_name,
            quantity: e.quantity,
            process: e.process,
        })
        .collect();
    let rows = state.services.job_cards.add_materials(id, entries).await?;
    Ok(Json(ApiResponse::success(rows)))
}

async fn add_photos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddPhotosRequest>,
) -> ApiResult<job_card::Model> {
    let updated = state.services.job_cards.add_photos(id, payload.urls).await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn delete_job_card(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.services.job_cards.delete_job_card(id).await?;
    Ok(Json(ApiResponse::success(())))
}
