use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::catalog::CatalogList,
    error::AppResult,
    media::Blob,
    response::ApiResponse,
    routes::params::CatalogQuery,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_catalog))
        .route("/images/{id}", get(get_image))
}

#[utoipa::path(
    get,
    path = "/api/catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Active products, 6 per page by default", body = ApiResponse<CatalogList>),
        (status = 400, description = "Malformed query"),
    ),
    tag = "Catalog"
)]
pub async fn list_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<CatalogList>>> {
    let resp = catalog_service::list_catalog(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/images/{id}",
    params(("id" = i64, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image bytes with a sniffed content type", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Catalog"
)]
pub async fn get_image(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Blob> {
    catalog_service::image(&state, id).await
}
