use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    entities::customer_good,
    services::customer_goods::ReceiveCustomerGoods,
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ReceiveGoodsRequest {
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub notes: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_goods).post(receive_goods))
        .route("/{id}", get(get_goods))
        .route("/{id}/return", post(return_goods))
}

async fn receive_goods(
    State(state): State<AppState>,
    Json(payload): Json<ReceiveGoodsRequest>,
) -> ApiResult<customer_good::Model> {
    payload.validate()?;
    let created = state
        .services
        .customer_goods
        .receive(ReceiveCustomerGoods {
            customer_name: payload.customer_name,
            description: payload.description,
            quantity: payload.quantity,
            notes: payload.notes,
        })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

async fn get_goods(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<customer_good::Model> {
    let found = state.services.customer_goods.get(id).await?;
    Ok(Json(ApiResponse::success(found)))
}

async fn list_goods(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<customer_good::Model>> {
    let (items, total) = state
        .services
        .customer_goods
        .list(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, &query,
    ))))
}

async fn return_goods(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<customer_good::Model> {
    let updated = state.services.customer_goods.mark_returned(id).await?;
    Ok(Json(ApiResponse::success(updated)))
}
