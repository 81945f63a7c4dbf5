use crate::{
    dto::{
        auth::UpdateAccountRequest,
        profile::{ProfileView, PurchaseHistory},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::PurchaseRecord,
    response::{ApiResponse, Meta},
    routes::params::{MOBILE_PER_PAGE, PageQuery},
    services::{
        auth_service, catalog_service::image_path, storefront_service::ensure_active_customer,
    },
    state::AppState,
};

async fn load_profile(state: &AppState, user_id: i64) -> AppResult<ProfileView> {
    sqlx::query_as::<_, ProfileView>(
        r#"
        SELECT
            u.id,
            u.username,
            u.email,
            c.balance,
            (SELECT COUNT(*) FROM purchases pu WHERE pu.user_id = u.id) AS purchases
        FROM users u
        JOIN customers c ON c.user_id = u.id
        WHERE u.id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub async fn get_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProfileView>> {
    ensure_active_customer(state, user).await?;
    let profile = load_profile(state, user.user_id).await?;
    Ok(ApiResponse::success("Profile", profile, Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateAccountRequest,
) -> AppResult<ApiResponse<ProfileView>> {
    ensure_active_customer(state, user).await?;
    auth_service::update_account(state, user.user_id, payload).await?;
    let profile = load_profile(state, user.user_id).await?;
    tracing::info!(user_id = user.user_id, "customer profile updated");

    Ok(ApiResponse::success("Profile updated", profile, Some(Meta::empty())))
}

pub async fn purchase_history(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
) -> AppResult<ApiResponse<PurchaseHistory>> {
    ensure_active_customer(state, user).await?;
    let (page, per_page, offset) = query.pagination().normalize_with(MOBILE_PER_PAGE);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    let mut items = sqlx::query_as::<_, PurchaseRecord>(
        r#"
        SELECT
            p.id,
            p.name,
            COALESCE(a.name, '') AS author,
            pu.price,
            (SELECT i.id FROM product_images i
              WHERE i.product_id = p.id
              ORDER BY i.sort_order, i.id LIMIT 1) AS image_id,
            (SELECT ROUND(AVG(r.rating)::numeric, 2) FROM product_ratings r
              WHERE r.product_id = p.id) AS average_rating,
            (SELECT COUNT(*) FROM purchases x WHERE x.product_id = p.id) AS purchases,
            pu.created_at AS purchased_at
        FROM purchases pu
        JOIN products p ON p.id = pu.product_id
        LEFT JOIN authors a ON a.id = p.author_id
        WHERE pu.user_id = $1
        ORDER BY pu.created_at DESC, p.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    for item in &mut items {
        item.image_url = item.image_id.map(|id| state.config.link(&image_path(id)));
    }

    Ok(ApiResponse::success(
        "Purchases",
        PurchaseHistory { items },
        Some(Meta::new(page, per_page, total)),
    ))
}
