use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::material_request::{self, RequestStatus},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequestBody {
    pub material_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(min = 1))]
    pub requested_by_id: String,
    #[validate(length(min = 1))]
    pub requested_by_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecisionBody {
    #[validate(length(min = 1))]
    pub actor_id: String,
    #[validate(length(min = 1))]
    pub actor_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub status: Option<RequestStatus>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(submit_request))
        .route("/{id}", get(get_request))
        .route("/{id}/approve", post(approve_request))
        .route("/{id}/reject", post(reject_request))
}

async fn submit_request(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequestBody>,
) -> ApiResult<material_request::Model> {
    payload.validate()?;
    let created = state
        .services
        .material_requests
        .submit(
            payload.material_id,
            payload.quantity,
            &payload.requested_by_id,
            &payload.requested_by_name,
            payload.notes,
        )
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<material_request::Model> {
    let found = state.services.material_requests.get_request(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> ApiResult<PaginatedResponse<material_request::Model>> {
    let (items, total) = state
        .services
        .material_requests
        .list_requests(query.status, query.page, query.limit)
        .await?;
    let limit = query.limit.max(1);
    Ok(Json(ApiResponse::success(PaginatedResponse {
        total_pages: total.div_ceil(limit),
        items,
        total,
        page: query.page,
        limit,
    })))
}

async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DecisionBody>,
) -> ApiResult<material_request::Model> {
    payload.validate()?;
    let updated = state
        .services
        .material_requests
        .approve(id, &payload.actor_id, &payload.actor_name)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DecisionBody>,
) -> ApiResult<material_request::Model> {
    payload.validate()?;
    let updated = state
        .services
        .material_requests
        .reject(id, &payload.actor_id, &payload.actor_name)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
