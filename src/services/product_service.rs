use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait,
    sea_query::{Expr, LockType, OnConflict},
};

use crate::{
    audit::record_action,
    dto::products::{
        AdminProductDetail, AdminProductList, FileStored, ReorderImageRequest, SaveProductRequest,
        SavedId,
    },
    entity::{
        authors::Entity as Authors,
        categories::Entity as Categories,
        product_details::{ActiveModel as DetailsActive, Column as DetailsCol, Entity as ProductDetails},
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult, is_foreign_key_violation},
    media::{Blob, sniff_content_type},
    middleware::auth::{AuthUser, ensure_admin},
    models::{AdminProduct, ProductImage},
    response::{ApiResponse, Meta},
    routes::params::{AdminProductQuery, clamp_page, filter_text, like_pattern},
    services::{catalog_service::image_path, validation},
    state::AppState,
};

const ADMIN_FILTER: &str = r#"
    FROM products p
    LEFT JOIN authors a ON a.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    WHERE ($1::bigint IS NULL OR p.id = $1)
      AND ($2::text IS NULL OR p.name ILIKE $2)
      AND ($3::text IS NULL OR a.name ILIKE $3)
      AND ($4::text IS NULL OR c.name ILIKE $4)
"#;

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: AdminProductQuery,
) -> AppResult<ApiResponse<AdminProductList>> {
    ensure_admin(user)?;
    let (page, per_page, _) = query.pagination().normalize();
    let name = filter_text(&query.name).map(like_pattern);
    let author = filter_text(&query.author).map(like_pattern);
    let category = filter_text(&query.category).map(like_pattern);

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {ADMIN_FILTER}"))
        .bind(query.id)
        .bind(name.as_deref())
        .bind(author.as_deref())
        .bind(category.as_deref())
        .fetch_one(&state.pool)
        .await?;
    let (page, offset) = clamp_page(page, per_page, total);

    let sql = format!(
        r#"
        SELECT
            p.id,
            p.name,
            COALESCE(a.name, '') AS author,
            COALESCE(c.name, '') AS category,
            p.active,
            (SELECT ROUND(AVG(r.rating)::numeric, 1) FROM product_ratings r
              WHERE r.product_id = p.id) AS average_rating
        {ADMIN_FILTER}
        ORDER BY p.id
        LIMIT $5 OFFSET $6
        "#
    );
    let items = sqlx::query_as::<_, AdminProduct>(&sql)
        .bind(query.id)
        .bind(name.as_deref())
        .bind(author.as_deref())
        .bind(category.as_deref())
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Products",
        AdminProductList { items },
        Some(Meta::new(page, per_page, total)),
    ))
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    active: bool,
    file_size: i64,
    description: Option<String>,
    version: Option<String>,
    price: Option<Decimal>,
    category_id: Option<i64>,
    category: Option<String>,
    author_id: Option<i64>,
    author: Option<String>,
    average_rating: Option<Decimal>,
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<AdminProductDetail>> {
    ensure_admin(user)?;

    let row = sqlx::query_as::<_, DetailRow>(
        r#"
        SELECT
            p.id,
            p.name,
            p.created_at,
            p.active,
            octet_length(p.file)::bigint AS file_size,
            d.description,
            d.version,
            d.price,
            p.category_id,
            c.name AS category,
            p.author_id,
            a.name AS author,
            (SELECT ROUND(AVG(r.rating)::numeric, 1) FROM product_ratings r
              WHERE r.product_id = p.id) AS average_rating
        FROM products p
        LEFT JOIN product_details d ON d.product_id = p.id
        LEFT JOIN authors a ON a.id = p.author_id
        LEFT JOIN categories c ON c.id = p.category_id
        WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound)?;

    let mut images = sqlx::query_as::<_, ProductImage>(
        "SELECT id, sort_order FROM product_images WHERE product_id = $1 ORDER BY sort_order, id",
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;
    for image in &mut images {
        image.url = state.config.link(&image_path(image.id));
    }

    let detail = AdminProductDetail {
        id: row.id,
        name: row.name,
        created_at: row.created_at,
        average_rating: row.average_rating,
        description: row.description,
        version: row.version,
        price: row.price.unwrap_or(Decimal::ZERO).round_dp(2),
        category_id: row.category_id,
        category: row.category,
        author_id: row.author_id,
        author: row.author,
        images,
        active: row.active,
        file_size: row.file_size,
    };

    Ok(ApiResponse::success("Product found", detail, Some(Meta::empty())))
}

async fn ensure_references(
    txn: &DatabaseTransaction,
    author_id: Option<i64>,
    category_id: Option<i64>,
) -> AppResult<()> {
    if let Some(author_id) = author_id {
        if Authors::find_by_id(author_id).one(txn).await?.is_none() {
            return Err(AppError::bad_request(format!("author {author_id} does not exist")));
        }
    }
    if let Some(category_id) = category_id {
        if Categories::find_by_id(category_id).one(txn).await?.is_none() {
            return Err(AppError::bad_request(format!(
                "category {category_id} does not exist"
            )));
        }
    }
    Ok(())
}

/// Creates or updates a product and its details in one transaction.
pub async fn save_product(
    state: &AppState,
    user: &AuthUser,
    payload: SaveProductRequest,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    let name = validation::name("name", &payload.name)?;
    let version = validation::version(payload.version)?;
    let description = validation::optional_text(payload.description);
    let price = validation::money("price", payload.price)?;

    let txn = state.orm.begin().await?;
    ensure_references(&txn, payload.author_id, payload.category_id).await?;

    let id = match payload.id {
        Some(id) => {
            let locked: Option<i64> = Products::find()
                .select_only()
                .column(ProdCol::Id)
                .filter(ProdCol::Id.eq(id))
                .lock(LockType::Update)
                .into_tuple()
                .one(&txn)
                .await?;
            if locked.is_none() {
                return Err(AppError::NotFound);
            }

            Products::update_many()
                .col_expr(ProdCol::Name, Expr::value(name))
                .col_expr(ProdCol::Active, Expr::value(payload.active))
                .col_expr(ProdCol::AuthorId, Expr::value(payload.author_id))
                .col_expr(ProdCol::CategoryId, Expr::value(payload.category_id))
                .filter(ProdCol::Id.eq(id))
                .exec(&txn)
                .await?;
            id
        }
        None => {
            let product = ProductActive {
                id: NotSet,
                name: Set(name),
                created_at: Set(Utc::now().into()),
                file: Set(Vec::new()),
                active: Set(payload.active),
                category_id: Set(payload.category_id),
                author_id: Set(payload.author_id),
            };
            Products::insert(product).exec(&txn).await?.last_insert_id
        }
    };

    ProductDetails::insert(DetailsActive {
        product_id: Set(id),
        price: Set(price),
        version: Set(version),
        description: Set(description),
    })
    .on_conflict(
        OnConflict::column(DetailsCol::ProductId)
            .update_columns([DetailsCol::Price, DetailsCol::Version, DetailsCol::Description])
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    txn.commit().await?;

    let action = if payload.id.is_some() {
        "product_update"
    } else {
        "product_create"
    };
    tracing::info!(product_id = id, action, "product saved");

    record_action(
        &state.pool,
        Some(user.user_id),
        action,
        Some("products"),
        Some(serde_json::json!({ "product_id": id, "price": price.to_string() })),
    )
    .await;

    Ok(ApiResponse::success("Product saved", SavedId { id }, Some(Meta::empty())))
}

/// Replaces the downloadable file of a product.
pub async fn upload_file(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    bytes: Vec<u8>,
) -> AppResult<ApiResponse<FileStored>> {
    ensure_admin(user)?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("file is empty"));
    }
    let size = bytes.len() as i64;
    let content_type = sniff_content_type(&bytes).to_string();

    let result = Products::update_many()
        .col_expr(ProdCol::File, Expr::value(bytes))
        .filter(ProdCol::Id.eq(id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    record_action(
        &state.pool,
        Some(user.user_id),
        "product_file_upload",
        Some("products"),
        Some(serde_json::json!({ "product_id": id, "size": size })),
    )
    .await;

    Ok(ApiResponse::success(
        "File stored",
        FileStored {
            product_id: id,
            size,
            content_type,
        },
        Some(Meta::empty()),
    ))
}

/// Appends an image; without an explicit order it goes after the last one.
pub async fn add_image(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
    order: Option<i32>,
    bytes: Vec<u8>,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("image is empty"));
    }
    if !sniff_content_type(&bytes).starts_with("image/") {
        return Err(AppError::bad_request("file is not a supported image"));
    }

    let txn = state.orm.begin().await?;
    let exists: Option<i64> = Products::find()
        .select_only()
        .column(ProdCol::Id)
        .filter(ProdCol::Id.eq(product_id))
        .lock(LockType::Update)
        .into_tuple()
        .one(&txn)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound);
    }

    let sort_order = match order {
        Some(order) => order,
        None => next_image_order(&txn, product_id).await?,
    };

    let inserted = ProductImages::insert(ImageActive {
        id: NotSet,
        sort_order: Set(sort_order),
        file: Set(bytes),
        product_id: Set(product_id),
    })
    .exec(&txn)
    .await?;
    txn.commit().await?;

    let id = inserted.last_insert_id;
    tracing::debug!(product_id, image_id = id, sort_order, "image added");

    record_action(
        &state.pool,
        Some(user.user_id),
        "product_image_add",
        Some("product_images"),
        Some(serde_json::json!({ "product_id": product_id, "image_id": id })),
    )
    .await;

    Ok(ApiResponse::success("Image added", SavedId { id }, Some(Meta::empty())))
}

async fn next_image_order(txn: &DatabaseTransaction, product_id: i64) -> AppResult<i32> {
    let max: Option<Option<i32>> = ProductImages::find()
        .select_only()
        .column_as(ImageCol::SortOrder.max(), "max_order")
        .filter(ImageCol::ProductId.eq(product_id))
        .into_tuple()
        .one(txn)
        .await?;
    Ok(max.flatten().map_or(1, |m| m + 1))
}

pub async fn reorder_image(
    state: &AppState,
    user: &AuthUser,
    image_id: i64,
    payload: ReorderImageRequest,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    let result = ProductImages::update_many()
        .col_expr(ImageCol::SortOrder, Expr::value(payload.order))
        .filter(ImageCol::Id.eq(image_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success(
        "Image reordered",
        SavedId { id: image_id },
        Some(Meta::empty()),
    ))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    image_id: i64,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    let result = ProductImages::delete_by_id(image_id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    record_action(
        &state.pool,
        Some(user.user_id),
        "product_image_delete",
        Some("product_images"),
        Some(serde_json::json!({ "image_id": image_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Image deleted",
        SavedId { id: image_id },
        Some(Meta::empty()),
    ))
}

pub async fn image(state: &AppState, user: &AuthUser, image_id: i64) -> AppResult<Blob> {
    ensure_admin(user)?;
    crate::services::catalog_service::image(state, image_id).await
}

/// Details and images cascade; purchases, ratings and comments block the delete.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<SavedId>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                AppError::bad_request("product has purchases, ratings or comments")
            } else {
                err.into()
            }
        })?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(product_id = id, "product deleted");

    record_action(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await;

    Ok(ApiResponse::success("Product deleted", SavedId { id }, Some(Meta::empty())))
}
