use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, Set};

use crate::{
    audit::record_action,
    dto::{
        authors::{AuthorList, SaveAuthorRequest},
        products::SavedId,
    },
    entity::authors::{ActiveModel as AuthorActive, Entity as Authors},
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::{AuthUser, ensure_admin},
    models::Author,
    response::{ApiResponse, Meta},
    routes::params::{AuthorQuery, clamp_page, filter_text, like_pattern},
    services::validation,
    state::AppState,
};

pub async fn list_authors(
    state: &AppState,
    user: &AuthUser,
    query: AuthorQuery,
) -> AppResult<ApiResponse<AuthorList>> {
    ensure_admin(user)?;
    let (page, per_page, _) = query.pagination().normalize();
    let name = filter_text(&query.name).map(like_pattern);

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM authors WHERE ($1::text IS NULL OR name ILIKE $1)")
            .bind(name.as_deref())
            .fetch_one(&state.pool)
            .await?;
    let (page, offset) = clamp_page(page, per_page, total);

    let items = sqlx::query_as::<_, Author>(
        r#"
        SELECT id, name FROM authors
        WHERE ($1::text IS NULL OR name ILIKE $1)
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(name.as_deref())
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Authors",
        AuthorList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

pub async fn save_author(
    state: &AppState,
    user: &AuthUser,
    payload: SaveAuthorRequest,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    let name = validation::name("name", &payload.name)?;

    let result = match payload.id {
        Some(id) => {
            let existing = Authors::find_by_id(id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?;
            let mut active: AuthorActive = existing.into();
            active.name = Set(name);
            active.update(&state.orm).await
        }
        None => {
            AuthorActive {
                id: NotSet,
                name: Set(name),
            }
            .insert(&state.orm)
            .await
        }
    };
    let saved = result.map_err(|err| {
        if is_unique_violation(&err) {
            AppError::bad_request("author already exists")
        } else {
            err.into()
        }
    })?;

    record_action(
        &state.pool,
        Some(user.user_id),
        "author_save",
        Some("authors"),
        Some(serde_json::json!({ "author_id": saved.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Author saved",
        SavedId { id: saved.id },
        Some(Meta::empty()),
    ))
}
