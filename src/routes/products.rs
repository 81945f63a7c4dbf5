use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::storefront::{
        CommentCreated, CommentRequest, ProductView, PurchaseReceipt, RateRequest, RatingView,
    },
    error::AppResult,
    media::Attachment,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{purchase_service, storefront_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_product))
        .route("/{id}/purchase", post(purchase_product))
        .route("/{id}/download", get(download_product))
        .route("/{id}/rating", post(rate_product))
        .route("/{id}/comments", post(comment_product))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product page; balance and purchase flag need a customer token", body = ApiResponse<ProductView>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    let resp = storefront_service::product_detail(&state, user.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/purchase",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Purchase completed", body = ApiResponse<PurchaseReceipt>),
        (status = 400, description = "Already purchased or insufficient balance"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn purchase_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<PurchaseReceipt>>> {
    let resp = purchase_service::purchase(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/download",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Purchased file as an attachment", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 403, description = "Not purchased"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn download_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Attachment> {
    storefront_service::download(&state, &user, id).await
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/rating",
    params(("id" = i64, Path, description = "Product ID")),
    request_body = RateRequest,
    responses(
        (status = 200, description = "Rating stored or replaced", body = ApiResponse<RatingView>),
        (status = 400, description = "Rating outside 1..5"),
        (status = 403, description = "Not purchased"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn rate_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<RateRequest>,
) -> AppResult<Json<ApiResponse<RatingView>>> {
    let resp = storefront_service::rate(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/comments",
    params(("id" = i64, Path, description = "Product ID")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment added", body = ApiResponse<CommentCreated>),
        (status = 400, description = "Empty or too long"),
        (status = 403, description = "Not purchased"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn comment_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<CommentRequest>,
) -> AppResult<Json<ApiResponse<CommentCreated>>> {
    let resp = storefront_service::comment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
