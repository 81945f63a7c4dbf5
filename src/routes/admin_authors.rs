use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::{
        authors::{AuthorList, SaveAuthorRequest},
        products::SavedId,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::AuthorQuery,
    services::author_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/authors", get(list_authors).post(save_author))
}

#[utoipa::path(
    get,
    path = "/api/admin/authors",
    params(AuthorQuery),
    responses(
        (status = 200, description = "Authors", body = ApiResponse<AuthorList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_authors(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<ApiResponse<AuthorList>>> {
    let resp = author_service::list_authors(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/authors",
    request_body = SaveAuthorRequest,
    responses(
        (status = 200, description = "Create, or rename when `id` is given", body = ApiResponse<SavedId>),
        (status = 400, description = "Invalid or duplicate name"),
        (status = 404, description = "Unknown author id"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn save_author(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveAuthorRequest>,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let resp = author_service::save_author(&state, &user, payload).await?;
    Ok(Json(resp))
}
