use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::{material, material_transaction},
    services::materials::CreateMaterial,
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaterialRequest {
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub variant: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub min_threshold: i32,
    #[validate(length(min = 1))]
    pub unit: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockMoveRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(min = 1))]
    pub actor_id: String,
    #[validate(length(min = 1))]
    pub actor_name: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_materials).post(create_material))
        .route("/low-stock", get(low_stock))
        .route("/{id}", get(get_material))
        .route("/{id}/receive", post(receive_material))
        .route("/{id}/issue", post(issue_material))
        .route("/{id}/transactions", get(list_transactions))
}

async fn create_material(
    State(state): State<AppState>,
    Json(payload): Json<CreateMaterialRequest>,
) -> ApiResult<material::Model> {
    payload.validate()?;
    let created = state
        .services
        .materials
        .create_material(CreateMaterial {
            category: payload.category,
            name: payload.name,
            variant: payload.variant,
            quantity: payload.quantity,
            min_threshold: payload.min_threshold,
            unit: payload.unit,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<material::Model> {
    let found = state.services.materials.get_material(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<material::Model>> {
    let (items, total) = state
        .services
        .materials
        .list_materials(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, &query,
    ))))
}

async fn low_stock(State(state): State<AppState>) -> ApiResult<Vec<material::Model>> {
    let items = state.services.materials.low_stock().await?;
    Ok(Json(ApiResponse::success(items)))
}

async fn receive_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockMoveRequest>,
) -> ApiResult<material::Model> {
    payload.validate()?;
    let updated = state
        .services
        .materials
        .receive(
            id,
            payload.quantity,
            &payload.actor_id,
            &payload.actor_name,
            payload.notes,
        )
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn issue_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockMoveRequest>,
) -> ApiResult<material::Model> {
    payload.validate()?;
    let updated = state
        .services
        .materials
        .issue(
            id,
            payload.quantity,
            &payload.actor_id,
            &payload.actor_name,
            payload.reference,
            payload.notes,
        )
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<material_transaction::Model>> {
    let rows = state.services.materials.list_transactions(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
