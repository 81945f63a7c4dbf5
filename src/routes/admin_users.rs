use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::{
        customers::{BalanceView, CustomerList, SaveBalanceRequest},
        products::SavedId,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::CustomerDetail,
    response::ApiResponse,
    routes::params::CustomerQuery,
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers))
        .route(
            "/customers/{id}",
            get(get_customer).put(save_balance).delete(delete_customer),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/customers",
    params(CustomerQuery),
    responses(
        (status = 200, description = "Current customers", body = ApiResponse<CustomerList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CustomerQuery>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = customer_service::list_customers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/customers/{id}",
    params(("id" = i64, Path, description = "Customer user ID")),
    responses(
        (status = 200, description = "Customer", body = ApiResponse<CustomerDetail>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<CustomerDetail>>> {
    let resp = customer_service::get_customer(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/customers/{id}",
    params(("id" = i64, Path, description = "Customer user ID")),
    request_body = SaveBalanceRequest,
    responses(
        (status = 200, description = "Balance set", body = ApiResponse<BalanceView>),
        (status = 400, description = "Negative balance"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn save_balance(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<SaveBalanceRequest>,
) -> AppResult<Json<ApiResponse<BalanceView>>> {
    let resp = customer_service::save_balance(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/customers/{id}",
    params(("id" = i64, Path, description = "Customer user ID")),
    responses(
        (status = 200, description = "Customer marked as former", body = ApiResponse<SavedId>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<SavedId>>> {
    let resp = customer_service::delete_customer(&state, &user, id).await?;
    Ok(Json(resp))
}
