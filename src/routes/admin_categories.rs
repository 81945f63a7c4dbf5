use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::{
        categories::{CategoryList, SaveCategoryRequest},
        products::SavedId,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::CategoryQuery,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(save_category))
        .route("/categories/{id}", get(get_category).delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Categories", body = ApiResponse<CategoryList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = SaveCategoryRequest,
    responses(
        (status = 200, description = "Create, or update when `id` is given", body = ApiResponse<SavedId>),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Unknown category id"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn save_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveCategoryRequest>,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let resp = category_service::save_category(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<Category>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::get_category(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<SavedId>),
        (status = 400, description = "Category still has products"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let resp = category_service::delete_category(&state, &user, id).await?;
    Ok(Json(resp))
}
