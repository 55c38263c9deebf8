use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::{tool, tool_transaction},
    services::tools::CreateTool,
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateToolRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
    pub location: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ToolMoveRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(min = 1))]
    pub actor_id: String,
    #[validate(length(min = 1))]
    pub actor_name: String,
    pub notes: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tools).post(create_tool))
        .route("/{id}", get(get_tool))
        .route("/{id}/issue", post(issue_tool))
        .route("/{id}/return", post(return_tool))
        .route("/{id}/transactions", get(list_transactions))
}

async fn create_tool(
    State(state): State<AppState>,
    Json(payload): Json<CreateToolRequest>,
) -> ApiResult<tool::Model> {
    payload.validate()?;
    let created = state
        .services
        .tools
        .create_tool(CreateTool {
            name: payload.name,
            quantity: payload.quantity,
            location: payload.location,
            condition: payload.condition,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

async fn get_tool(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<tool::Model> {
    let found = state.services.tools.get_tool(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

async fn list_tools(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<tool::Model>> {
    let (items, total) = state
        .services
        .tools
        .list_tools(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, &query,
    ))))
}

async fn issue_tool(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ToolMoveRequest>,
) -> ApiResult<tool::Model> {
    payload.validate()?;
    let updated = state
        .services
        .tools
        .issue(
            id,
            payload.quantity,
            &payload.actor_id,
            &payload.actor_name,
            payload.notes,
        )
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn return_tool(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ToolMoveRequest>,
) -> ApiResult<tool::Model> {
    payload.validate()?;
    let updated = state
        .services
        .tools
        .return_tool(
            id,
            payload.quantity,
            &payload.actor_id,
            &payload.actor_name,
            payload.notes,
        )
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<tool_transaction::Model>> {
    let rows = state.services.tools.list_transactions(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
