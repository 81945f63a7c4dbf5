use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, EntityTrait, Set, sea_query::OnConflict,
};

use crate::{
    audit::record_action,
    dto::storefront::{CommentCreated, CommentRequest, ProductView, RateRequest, RatingView},
    entity::{
        product_comments::ActiveModel as CommentActive,
        product_ratings::{ActiveModel as RatingActive, Column as RatingCol, Entity as Ratings},
    },
    error::{AppError, AppResult},
    media::Attachment,
    middleware::auth::{AuthUser, ensure_customer},
    models::{Comment, Role},
    response::{ApiResponse, Meta},
    services::{catalog_service::image_path, validation},
    state::AppState,
};

pub fn download_path(product_id: i64) -> String {
    format!("/api/products/{product_id}/download")
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    description: Option<String>,
    price: Option<Decimal>,
    version: Option<String>,
    author: Option<String>,
    category: Option<String>,
    purchases: i64,
    average_rating: Option<Decimal>,
}

fn or_dash(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "-".to_string())
}

/// Fails with 404 unless the product exists and is listed.
pub async fn ensure_active_product(state: &AppState, product_id: i64) -> AppResult<()> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM products WHERE id = $1 AND active")
            .bind(product_id)
            .fetch_optional(&state.pool)
            .await?;
    found.map(|_| ()).ok_or(AppError::NotFound)
}

pub async fn has_purchased(state: &AppState, user_id: i64, product_id: i64) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM purchases WHERE product_id = $1 AND user_id = $2)",
    )
    .bind(product_id)
    .bind(user_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(exists)
}

/// 404 without a customer row, 403 once an administrator has removed the customer.
pub async fn ensure_active_customer(state: &AppState, user: &AuthUser) -> AppResult<()> {
    ensure_customer(user)?;
    let former: Option<bool> =
        sqlx::query_scalar("SELECT former FROM customers WHERE user_id = $1")
            .bind(user.user_id)
            .fetch_optional(&state.pool)
            .await?;
    match former {
        None => Err(AppError::NotFound),
        Some(true) => Err(AppError::Forbidden),
        Some(false) => Ok(()),
    }
}

/// Download, rating and comments are reserved for buyers.
async fn ensure_purchased(state: &AppState, user: &AuthUser, product_id: i64) -> AppResult<()> {
    ensure_active_customer(state, user).await?;
    ensure_active_product(state, product_id).await?;
    if !has_purchased(state, user.user_id, product_id).await? {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub async fn product_view(
    state: &AppState,
    viewer: Option<&AuthUser>,
    product_id: i64,
) -> AppResult<ProductView> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT
            p.id,
            p.name,
            p.created_at,
            d.description,
            d.price,
            d.version,
            a.name AS author,
            c.name AS category,
            (SELECT COUNT(*) FROM purchases pu WHERE pu.product_id = p.id) AS purchases,
            (SELECT ROUND(AVG(r.rating)::numeric, 1) FROM product_ratings r
              WHERE r.product_id = p.id) AS average_rating
        FROM products p
        LEFT JOIN product_details d ON d.product_id = p.id
        LEFT JOIN authors a ON a.id = p.author_id
        LEFT JOIN categories c ON c.id = p.category_id
        WHERE p.id = $1 AND p.active
        "#,
    )
    .bind(product_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound)?;

    let image_ids: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM product_images WHERE product_id = $1 ORDER BY sort_order, id",
    )
    .bind(product_id)
    .fetch_all(&state.pool)
    .await?;

    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT u.username, COALESCE(r.rating, 0) AS rating, pc.created_at, pc.body
        FROM product_comments pc
        JOIN users u ON u.id = pc.user_id
        LEFT JOIN product_ratings r
               ON r.product_id = pc.product_id AND r.user_id = pc.user_id
        WHERE pc.product_id = $1
        ORDER BY pc.created_at DESC, pc.id DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(&state.pool)
    .await?;

    let (balance, purchased) = match viewer {
        Some(user) if user.role == Role::Customer => {
            let balance: Option<Decimal> = sqlx::query_scalar(
                "SELECT balance FROM customers WHERE user_id = $1 AND NOT former",
            )
            .bind(user.user_id)
            .fetch_optional(&state.pool)
            .await?;
            let purchased = has_purchased(state, user.user_id, product_id).await?;
            (balance, purchased)
        }
        _ => (None, false),
    };

    Ok(ProductView {
        id: row.id,
        name: row.name,
        description: row.description.unwrap_or_default(),
        price: row.price.unwrap_or(Decimal::ZERO),
        version: or_dash(row.version),
        author: or_dash(row.author),
        category: or_dash(row.category),
        published_at: row.created_at,
        image_urls: image_ids
            .into_iter()
            .map(|id| state.config.link(&image_path(id)))
            .collect(),
        purchases: row.purchases,
        average_rating: row.average_rating.unwrap_or(Decimal::ZERO),
        balance,
        purchased,
        download_url: state.config.link(&download_path(row.id)),
        comments,
    })
}

pub async fn product_detail(
    state: &AppState,
    viewer: Option<&AuthUser>,
    product_id: i64,
) -> AppResult<ApiResponse<ProductView>> {
    let view = product_view(state, viewer, product_id).await?;
    Ok(ApiResponse::success("Product", view, Some(Meta::empty())))
}

pub async fn download(state: &AppState, user: &AuthUser, product_id: i64) -> AppResult<Attachment> {
    ensure_purchased(state, user, product_id).await?;

    let (name, bytes): (String, Vec<u8>) =
        sqlx::query_as("SELECT name, file FROM products WHERE id = $1 AND active")
            .bind(product_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(AppError::NotFound)?;

    if bytes.is_empty() {
        return Err(AppError::NotFound);
    }

    tracing::info!(user_id = user.user_id, product_id, size = bytes.len(), "product downloaded");
    Ok(Attachment { name, bytes })
}

pub async fn rate(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
    payload: RateRequest,
) -> AppResult<ApiResponse<RatingView>> {
    let rating = validation::rating(payload.rating)?;
    ensure_purchased(state, user, product_id).await?;

    let active = RatingActive {
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        rating: Set(rating),
        created_at: Set(Utc::now().into()),
    };
    Ratings::insert(active)
        .on_conflict(
            OnConflict::columns([RatingCol::ProductId, RatingCol::UserId])
                .update_columns([RatingCol::Rating, RatingCol::CreatedAt])
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    tracing::debug!(user_id = user.user_id, product_id, rating, "rating stored");

    record_action(
        &state.pool,
        Some(user.user_id),
        "product_rate",
        Some("product_ratings"),
        Some(serde_json::json!({ "product_id": product_id, "rating": rating })),
    )
    .await;

    Ok(ApiResponse::success(
        "Rating saved",
        RatingView { product_id, rating },
        Some(Meta::empty()),
    ))
}

pub async fn comment(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
    payload: CommentRequest,
) -> AppResult<ApiResponse<CommentCreated>> {
    let body = validation::comment(&payload.text)?;
    ensure_purchased(state, user, product_id).await?;

    let created = CommentActive {
        id: NotSet,
        body: Set(body),
        created_at: Set(Utc::now().into()),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
    }
    .insert(&state.orm)
    .await?;

    record_action(
        &state.pool,
        Some(user.user_id),
        "product_comment",
        Some("product_comments"),
        Some(serde_json::json!({ "product_id": product_id, "comment_id": created.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Comment added",
        CommentCreated {
            id: created.id,
            product_id,
            created_at: created.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_labels_render_as_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("  ".into())), "-");
        assert_eq!(or_dash(Some("1.2".into())), "1.2");
    }
}
