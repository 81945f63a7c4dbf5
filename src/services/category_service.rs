use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, Set};

use crate::{
    audit::record_action,
    dto::{
        categories::{CategoryList, SaveCategoryRequest},
        products::SavedId,
    },
    entity::categories::{ActiveModel as CategoryActive, Entity as Categories},
    error::{AppError, AppResult, is_foreign_key_violation},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::{CategoryQuery, clamp_page, filter_text, like_pattern},
    services::validation,
    state::AppState,
};

const CATEGORY_FILTER: &str = r#"
    FROM categories
    WHERE ($1::bigint IS NULL OR id = $1)
      AND ($2::text IS NULL OR name ILIKE $2)
      AND ($3::text IS NULL OR description ILIKE $3)
"#;

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
    query: CategoryQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    ensure_admin(user)?;
    let (page, per_page, _) = query.pagination().normalize();
    let name = filter_text(&query.name).map(like_pattern);
    let description = filter_text(&query.description).map(like_pattern);

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {CATEGORY_FILTER}"))
        .bind(query.id)
        .bind(name.as_deref())
        .bind(description.as_deref())
        .fetch_one(&state.pool)
        .await?;
    let (page, offset) = clamp_page(page, per_page, total);

    let items = sqlx::query_as::<_, Category>(&format!(
        "SELECT id, name, created_at, description {CATEGORY_FILTER} ORDER BY id LIMIT $4 OFFSET $5"
    ))
    .bind(query.id)
    .bind(name.as_deref())
    .bind(description.as_deref())
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn get_category(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(category_from_entity)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Category found", category, Some(Meta::empty())))
}

pub async fn save_category(
    state: &AppState,
    user: &AuthUser,
    payload: SaveCategoryRequest,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    let name = validation::name("name", &payload.name)?;
    let description = validation::optional_text(payload.description);

    let saved = match payload.id {
        Some(id) => {
            let existing = Categories::find_by_id(id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?;
            let mut active: CategoryActive = existing.into();
            active.name = Set(name);
            active.description = Set(description);
            active.update(&state.orm).await?
        }
        None => {
            CategoryActive {
                id: NotSet,
                created_at: Set(Utc::now().into()),
                name: Set(name),
                description: Set(description),
            }
            .insert(&state.orm)
            .await?
        }
    };

    record_action(
        &state.pool,
        Some(user.user_id),
        "category_save",
        Some("categories"),
        Some(serde_json::json!({ "category_id": saved.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Category saved",
        SavedId { id: saved.id },
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    let result = Categories::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                AppError::bad_request("category is used by products")
            } else {
                err.into()
            }
        })?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    record_action(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await;

    Ok(ApiResponse::success("Category deleted", SavedId { id }, Some(Meta::empty())))
}

pub fn category_from_entity(model: crate::entity::categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
        description: model.description,
    }
}
