use crate::{
    dto::catalog::CatalogList,
    error::{AppError, AppResult},
    media::Blob,
    models::CatalogItem,
    response::{ApiResponse, Meta},
    routes::params::{CatalogQuery, MOBILE_PER_PAGE, filter_text, like_pattern},
    state::AppState,
};

pub fn image_path(image_id: i64) -> String {
    format!("/api/catalog/images/{image_id}")
}

const CATALOG_FILTER: &str = r#"
    FROM products p
    LEFT JOIN authors a ON a.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    WHERE p.active
      AND ($1::text IS NULL OR p.name ILIKE $1)
      AND ($2::text IS NULL OR a.name ILIKE $2)
      AND ($3::text IS NULL OR c.name ILIKE $3)
"#;

/// One page of the public catalog together with its paging metadata.
pub async fn catalog_page(
    state: &AppState,
    query: &CatalogQuery,
) -> AppResult<(CatalogList, Meta)> {
    let (page, per_page, offset) = query.pagination().normalize_with(MOBILE_PER_PAGE);
    let name = filter_text(&query.name).map(like_pattern);
    let author = filter_text(&query.author).map(like_pattern);
    let category = filter_text(&query.category).map(like_pattern);

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {CATALOG_FILTER}"))
        .bind(name.as_deref())
        .bind(author.as_deref())
        .bind(category.as_deref())
        .fetch_one(&state.pool)
        .await?;

    let sql = format!(
        r#"
        SELECT
            p.id,
            p.name,
            COALESCE(a.name, '') AS author,
            (SELECT i.id FROM product_images i
              WHERE i.product_id = p.id
              ORDER BY i.sort_order, i.id LIMIT 1) AS image_id,
            (SELECT ROUND(AVG(r.rating)::numeric, 1) FROM product_ratings r
              WHERE r.product_id = p.id) AS average_rating,
            (SELECT COUNT(*) FROM purchases pu WHERE pu.product_id = p.id) AS purchases
        {CATALOG_FILTER}
        ORDER BY p.id
        LIMIT $4 OFFSET $5
        "#
    );

    let mut items = sqlx::query_as::<_, CatalogItem>(&sql)
        .bind(name.as_deref())
        .bind(author.as_deref())
        .bind(category.as_deref())
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    for item in &mut items {
        item.image_url = item.image_id.map(|id| state.config.link(&image_path(id)));
    }

    Ok((CatalogList { items }, Meta::new(page, per_page, total)))
}

pub async fn list_catalog(
    state: &AppState,
    query: CatalogQuery,
) -> AppResult<ApiResponse<CatalogList>> {
    let (list, meta) = catalog_page(state, &query).await?;
    Ok(ApiResponse::success("Catalog", list, Some(meta)))
}

/// Stored bytes of a product image. Empty blobs count as missing.
pub async fn image(state: &AppState, image_id: i64) -> AppResult<Blob> {
    let bytes: Option<Vec<u8>> =
        sqlx::query_scalar("SELECT file FROM product_images WHERE id = $1")
            .bind(image_id)
            .fetch_optional(&state.pool)
            .await?;

    match bytes {
        Some(bytes) if !bytes.is_empty() => Ok(Blob(bytes)),
        _ => Err(AppError::NotFound),
    }
}
