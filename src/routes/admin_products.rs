use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    dto::products::{
        AdminProductDetail, AdminProductList, FileStored, ReorderImageRequest, SaveProductRequest,
        SavedId,
    },
    error::AppResult,
    media::Blob,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::{
        params::AdminProductQuery,
        upload::{FileUpload, ImageUpload},
    },
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(save_product))
        .route("/products/{id}", get(get_product).delete(delete_product))
        .route("/products/{id}/file", put(upload_file))
        .route("/products/{id}/images", post(add_image))
        .route(
            "/images/{id}",
            get(get_image).patch(reorder_image).delete(delete_image),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(AdminProductQuery),
    responses(
        (status = 200, description = "All products, active or not", body = ApiResponse<AdminProductList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminProductQuery>,
) -> AppResult<Json<ApiResponse<AdminProductList>>> {
    let resp = product_service::list_products(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = SaveProductRequest,
    responses(
        (status = 200, description = "Create, or update when `id` is given", body = ApiResponse<SavedId>),
        (status = 400, description = "Invalid data or unknown author/category"),
        (status = 404, description = "Unknown product id"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn save_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveProductRequest>,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let resp = product_service::save_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product with details and images", body = ApiResponse<AdminProductDetail>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<AdminProductDetail>>> {
    let resp = product_service::get_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted with details and images", body = ApiResponse<SavedId>),
        (status = 400, description = "Product has purchases, ratings or comments"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}/file",
    params(("id" = i64, Path, description = "Product ID")),
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Downloadable file replaced", body = ApiResponse<FileStored>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<FileStored>>> {
    let upload = FileUpload::from_multipart(multipart).await?;
    let resp = product_service::upload_file(&state, &user, id, upload.file).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/images",
    params(("id" = i64, Path, description = "Product ID")),
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image added", body = ApiResponse<SavedId>),
        (status = 400, description = "Not an image"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let upload = ImageUpload::from_multipart(multipart).await?;
    let resp = product_service::add_image(&state, &user, id, upload.order, upload.file).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/images/{id}",
    params(("id" = i64, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Blob> {
    product_service::image(&state, &user, id).await
}

#[utoipa::path(
    patch,
    path = "/api/admin/images/{id}",
    params(("id" = i64, Path, description = "Image ID")),
    request_body = ReorderImageRequest,
    responses(
        (status = 200, description = "Image moved", body = ApiResponse<SavedId>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn reorder_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReorderImageRequest>,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let resp = product_service::reorder_image(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/images/{id}",
    params(("id" = i64, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image deleted", body = ApiResponse<SavedId>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let resp = product_service::delete_image(&state, &user, id).await?;
    Ok(Json(resp))
}
