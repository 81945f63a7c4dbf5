use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::{
        auth::UpdateAccountRequest,
        profile::{ProfileView, PurchaseHistory},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::PageQuery,
    services::profile_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/purchases", get(list_purchases))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Signed-in customer", body = ApiResponse<ProfileView>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not a customer"),
        (status = 403, description = "Customer removed by an administrator"),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let resp = profile_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<ProfileView>),
        (status = 400, description = "Invalid data or name/email in use"),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateAccountRequest>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let resp = profile_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile/purchases",
    params(PageQuery),
    responses(
        (status = 200, description = "Purchases, newest first", body = ApiResponse<PurchaseHistory>),
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PurchaseHistory>>> {
    let resp = profile_service::purchase_history(&state, &user, query).await?;
    Ok(Json(resp))
}
