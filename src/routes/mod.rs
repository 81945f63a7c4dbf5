use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    routing::get,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
    web,
};

pub mod admin;
pub mod admin_authors;
pub mod admin_categories;
pub mod admin_products;
pub mod admin_users;
pub mod auth;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod profile;
pub mod rankings;
pub mod upload;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/catalog", catalog::router())
        .nest("/products", products::router())
        .nest("/profile", profile::router())
        .nest("/rankings", rankings::router())
        .nest("/admin", admin::router())
}

/// Every route the server exposes, with body limits and CORS applied.
pub fn create_app(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(web::router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
