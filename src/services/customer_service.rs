use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};

use crate::{
    audit::record_action,
    dto::{
        auth::UpdateAccountRequest,
        customers::{BalanceView, CustomerList, SaveBalanceRequest},
        products::SavedId,
    },
    entity::customers::{ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{CustomerDetail, CustomerSummary, Role, UserProfile},
    response::{ApiResponse, Meta},
    routes::params::{CustomerQuery, clamp_page, filter_text, like_pattern},
    services::{auth_service, validation},
    state::AppState,
};

const CUSTOMER_FILTER: &str = r#"
    FROM customers c
    JOIN users u ON u.id = c.user_id
    WHERE NOT c.former
      AND ($1::bigint IS NULL OR u.id = $1)
      AND ($2::text IS NULL OR u.username ILIKE $2)
      AND ($3::numeric IS NULL OR c.balance = $3)
"#;

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    query: CustomerQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_admin(user)?;
    let (page, per_page, _) = query.pagination().normalize();
    let name = filter_text(&query.name).map(like_pattern);

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {CUSTOMER_FILTER}"))
        .bind(query.id)
        .bind(name.as_deref())
        .bind(query.balance)
        .fetch_one(&state.pool)
        .await?;
    let (page, offset) = clamp_page(page, per_page, total);

    let items = sqlx::query_as::<_, CustomerSummary>(&format!(
        "SELECT u.id, u.username, c.balance {CUSTOMER_FILTER} ORDER BY u.id LIMIT $4 OFFSET $5"
    ))
    .bind(query.id)
    .bind(name.as_deref())
    .bind(query.balance)
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn get_customer(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<CustomerDetail>> {
    ensure_admin(user)?;
    let customer = sqlx::query_as::<_, CustomerDetail>(
        r#"
        SELECT u.id, u.username, u.email, c.created_at, c.balance
        FROM customers c
        JOIN users u ON u.id = c.user_id
        WHERE u.id = $1 AND NOT c.former
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success("Customer found", customer, Some(Meta::empty())))
}

/// Sets a customer's balance while holding the row lock purchases use.
pub async fn save_balance(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: SaveBalanceRequest,
) -> AppResult<ApiResponse<BalanceView>> {
    ensure_admin(user)?;
    let balance = validation::money("balance", payload.balance)?;

    let txn = state.orm.begin().await?;
    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(id))
        .filter(CustomerCol::Former.eq(false))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let previous = customer.balance;
    let mut active: CustomerActive = customer.into();
    active.balance = Set(balance);
    active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(user_id = id, previous = %previous, balance = %balance, "balance updated");

    record_action(
        &state.pool,
        Some(user.user_id),
        "customer_balance",
        Some("customers"),
        Some(serde_json::json!({
            "customer_id": id,
            "previous": previous.to_string(),
            "balance": balance.to_string(),
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Balance updated",
        BalanceView { id, balance },
        Some(Meta::empty()),
    ))
}

/// Soft delete: the customer keeps their purchases but can no longer sign in.
pub async fn delete_customer(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    let result = Customers::update_many()
        .col_expr(CustomerCol::Former, sea_orm::sea_query::Expr::value(true))
        .filter(CustomerCol::UserId.eq(id))
        .filter(CustomerCol::Former.eq(false))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(user_id = id, "customer deactivated");

    record_action(
        &state.pool,
        Some(user.user_id),
        "customer_delete",
        Some("customers"),
        Some(serde_json::json!({ "customer_id": id })),
    )
    .await;

    Ok(ApiResponse::success("Customer deleted", SavedId { id }, Some(Meta::empty())))
}

pub async fn update_admin_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateAccountRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    ensure_admin(user)?;
    let updated = auth_service::update_account(state, user.user_id, payload).await?;
    tracing::info!(user_id = user.user_id, "administrator profile updated");
    Ok(ApiResponse::success(
        "Profile updated",
        auth_service::profile_from_entity(updated, Role::Admin, None),
        Some(Meta::empty()),
    ))
}
