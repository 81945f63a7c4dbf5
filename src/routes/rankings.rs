use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::rankings::{BestRatedList, MostPurchasedList, TopBuyerList},
    error::AppResult,
    response::ApiResponse,
    routes::params::PageQuery,
    services::ranking_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/most-purchased", get(most_purchased))
        .route("/top-buyers", get(top_buyers))
        .route("/best-rated", get(best_rated))
}

#[utoipa::path(
    get,
    path = "/api/rankings/most-purchased",
    params(PageQuery),
    responses((status = 200, description = "Products by purchase count", body = ApiResponse<MostPurchasedList>)),
    tag = "Rankings"
)]
pub async fn most_purchased(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<MostPurchasedList>>> {
    let resp = ranking_service::most_purchased(&state, query.pagination()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/rankings/top-buyers",
    params(PageQuery),
    responses((status = 200, description = "Customers by purchase count", body = ApiResponse<TopBuyerList>)),
    tag = "Rankings"
)]
pub async fn top_buyers(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<TopBuyerList>>> {
    let resp = ranking_service::top_buyers(&state, query.pagination()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/rankings/best-rated",
    params(PageQuery),
    responses((status = 200, description = "Products by rating count then average", body = ApiResponse<BestRatedList>)),
    tag = "Rankings"
)]
pub async fn best_rated(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<BestRatedList>>> {
    let resp = ranking_service::best_rated(&state, query.pagination()).await?;
    Ok(Json(resp))
}
