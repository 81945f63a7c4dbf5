use axum::{Json, Router, extract::State, routing::put};

use crate::{
    dto::auth::UpdateAccountRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::UserProfile,
    response::ApiResponse,
    routes::{admin_authors, admin_categories, admin_products, admin_users},
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(admin_products::router())
        .merge(admin_categories::router())
        .merge(admin_authors::router())
        .merge(admin_users::router())
        .route("/profile", put(update_profile))
}

#[utoipa::path(
    put,
    path = "/api/admin/profile",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Administrator credentials updated", body = ApiResponse<UserProfile>),
        (status = 400, description = "Invalid data or name/email in use"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateAccountRequest>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = customer_service::update_admin_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}
