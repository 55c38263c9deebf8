use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::{board, board_transaction},
    services::boards::CreateBoard,
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1))]
    pub board_type: String,
    #[validate(length(min = 1))]
    pub color: String,
    #[serde(default)]
    pub quantity: i32,
    pub min_threshold: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BoardMoveRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(min = 1))]
    pub actor_id: String,
    #[validate(length(min = 1))]
    pub actor_name: String,
    pub reference: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_boards).post(create_board))
        .route("/low-stock", get(low_stock))
        .route("/{id}", get(get_board))
        .route("/{id}/manufacture", post(manufacture_board))
        .route("/{id}/sell", post(sell_board))
        .route("/{id}/transactions", get(list_transactions))
}

async fn create_board(
    State(state): State<AppState>,
    Json(payload): Json<CreateBoardRequest>,
) -> ApiResult<board::Model> {
    payload.validate()?;
    let created = state
        .services
        .boards
        .create_board(CreateBoard {
            board_type: payload.board_type,
            color: payload.color,
            quantity: payload.quantity,
            min_threshold: payload.min_threshold,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

async fn get_board(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<board::Model> {
    let found = state.services.boards.get_board(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

async fn list_boards(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<board::Model>> {
    let (items, total) = state
        .services
        .boards
        .list_boards(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, &query,
    ))))
}

async fn low_stock(State(state): State<AppState>) -> ApiResult<Vec<board::Model>> {
    let items = state.services.boards.low_stock().await?;
    Ok(Json(ApiResponse::success(items)))
}

async fn manufacture_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BoardMoveRequest>,
) -> ApiResult<board::Model> {
    payload.validate()?;
    let updated = state
        .services
        .boards
        .manufacture(
            id,
            payload.quantity,
            &payload.actor_id,
            &payload.actor_name,
            payload.reference,
        )
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn sell_board(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BoardMoveRequest>,
) -> ApiResult<board::Model> {
    payload.validate()?;
    let updated = state
        .services
        .boards
        .sell(id, payload.quantity, &payload.actor_id, &payload.actor_name)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<board_transaction::Model>> {
    let rows = state.services.boards.list_transactions(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
