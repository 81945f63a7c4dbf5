use crate::{
    dto::rankings::{BestRatedList, MostPurchasedList, TopBuyerList},
    error::AppResult,
    models::{BestRated, MostPurchased, TopBuyer},
    response::{ApiResponse, Meta},
    routes::params::{MOBILE_PER_PAGE, Pagination},
    state::AppState,
};

/// Absolute position of the `index`-th row of a page starting at `offset`.
fn rank_at(offset: i64, index: usize) -> i64 {
    offset + index as i64 + 1
}

pub async fn most_purchased_page(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<(MostPurchasedList, Meta)> {
    let (page, per_page, offset) = pagination.normalize_with(MOBILE_PER_PAGE);

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT pu.product_id)
        FROM purchases pu
        JOIN products p ON p.id = pu.product_id
        WHERE p.active
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let mut items = sqlx::query_as::<_, MostPurchased>(
        r#"
        SELECT
            p.id,
            p.name,
            COALESCE(a.name, '') AS author,
            COALESCE(c.name, '') AS category,
            COALESCE(d.price, 0) AS price,
            COUNT(*) AS purchases
        FROM purchases pu
        JOIN products p ON p.id = pu.product_id
        LEFT JOIN authors a ON a.id = p.author_id
        LEFT JOIN categories c ON c.id = p.category_id
        LEFT JOIN product_details d ON d.product_id = p.id
        WHERE p.active
        GROUP BY p.id, p.name, a.name, c.name, d.price
        ORDER BY purchases DESC, p.id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    for (index, item) in items.iter_mut().enumerate() {
        item.rank = rank_at(offset, index);
    }

    Ok((MostPurchasedList { items }, Meta::new(page, per_page, total)))
}

pub async fn top_buyers_page(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<(TopBuyerList, Meta)> {
    let (page, per_page, offset) = pagination.normalize_with(MOBILE_PER_PAGE);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM purchases")
        .fetch_one(&state.pool)
        .await?;

    let mut items = sqlx::query_as::<_, TopBuyer>(
        r#"
        SELECT u.id AS user_id, u.username, COUNT(*) AS purchases
        FROM purchases pu
        JOIN users u ON u.id = pu.user_id
        GROUP BY u.id, u.username
        ORDER BY purchases DESC, u.id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    for (index, item) in items.iter_mut().enumerate() {
        item.rank = rank_at(offset, index);
    }

    Ok((TopBuyerList { items }, Meta::new(page, per_page, total)))
}

pub async fn best_rated_page(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<(BestRatedList, Meta)> {
    let (page, per_page, offset) = pagination.normalize_with(MOBILE_PER_PAGE);

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT r.product_id)
        FROM product_ratings r
        JOIN products p ON p.id = r.product_id
        WHERE p.active
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let mut items = sqlx::query_as::<_, BestRated>(
        r#"
        SELECT
            p.id,
            p.name,
            COALESCE(a.name, '') AS author,
            COALESCE(c.name, '') AS category,
            COALESCE(d.price, 0) AS price,
            COUNT(*) AS ratings,
            ROUND(AVG(r.rating)::numeric, 1) AS average_rating
        FROM product_ratings r
        JOIN products p ON p.id = r.product_id
        LEFT JOIN authors a ON a.id = p.author_id
        LEFT JOIN categories c ON c.id = p.category_id
        LEFT JOIN product_details d ON d.product_id = p.id
        WHERE p.active
        GROUP BY p.id, p.name, a.name, c.name, d.price
        ORDER BY ratings DESC, average_rating DESC, p.id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    for (index, item) in items.iter_mut().enumerate() {
        item.rank = rank_at(offset, index);
    }

    Ok((BestRatedList { items }, Meta::new(page, per_page, total)))
}

pub async fn most_purchased(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<MostPurchasedList>> {
    let (list, meta) = most_purchased_page(state, pagination).await?;
    Ok(ApiResponse::success("Most purchased products", list, Some(meta)))
}

pub async fn top_buyers(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<TopBuyerList>> {
    let (list, meta) = top_buyers_page(state, pagination).await?;
    Ok(ApiResponse::success("Top buyers", list, Some(meta)))
}

pub async fn best_rated(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<BestRatedList>> {
    let (list, meta) = best_rated_page(state, pagination).await?;
    Ok(ApiResponse::success("Best rated products", list, Some(meta)))
}
