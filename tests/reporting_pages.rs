mod common;

use common::{
    create_admin, create_author, create_category, create_product, database_url, money,
    register_customer, set_balance, setup_state,
};
use digital_catalog_api::{
    dto::products::SaveProductRequest,
    middleware::auth::AuthUser,
    routes::params::{CatalogQuery, PageQuery, Pagination},
    services::{
        catalog_service, product_service, profile_service, purchase_service, ranking_service,
    },
    state::AppState,
};

async fn catalog_ids(state: &AppState, query: CatalogQuery) -> anyhow::Result<Vec<i64>> {
    let list = catalog_service::list_catalog(state, query)
        .await?
        .data
        .expect("catalog");
    Ok(list.items.iter().map(|item| item.id).collect())
}

async fn deactivate(
    state: &AppState,
    admin: &AuthUser,
    id: i64,
    name: &str,
    author_id: i64,
    category_id: i64,
) -> anyhow::Result<()> {
    product_service::save_product(
        state,
        admin,
        SaveProductRequest {
            id: Some(id),
            name: name.into(),
            description: None,
            version: None,
            price: money("1.00"),
            author_id: Some(author_id),
            category_id: Some(category_id),
            active: false,
        },
    )
    .await?;
    Ok(())
}

// Catalog filters, ranking pages and purchase history across several pages.
#[tokio::test]
async fn reporting_lists_filter_and_page_through_results() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url).await?;

    let admin = create_admin(&state, "boss").await?;
    let ink = create_author(&state, &admin, "Ink House").await?;
    let pixel = create_author(&state, &admin, "Pixel Lab").await?;
    let books = create_category(&state, &admin, "Books").await?;
    let art = create_category(&state, &admin, "Art").await?;

    let alpha = create_product(&state, &admin, "Alpha", "1.00", Some(ink), Some(books)).await?;
    let beta = create_product(&state, &admin, "Beta", "1.00", Some(ink), Some(art)).await?;
    let gamma = create_product(&state, &admin, "Gamma", "1.00", Some(pixel), Some(books)).await?;
    let delta = create_product(&state, &admin, "Delta", "1.00", Some(pixel), Some(art)).await?;

    let u1 = register_customer(&state, "uma").await?;
    let u2 = register_customer(&state, "vic").await?;
    let u3 = register_customer(&state, "wes").await?;
    for customer in [&u1, &u2, &u3] {
        set_balance(&state, &admin, customer, "10.00").await?;
    }

    for (customer, products) in [
        (&u1, vec![alpha, beta, gamma, delta]),
        (&u2, vec![alpha, beta]),
        (&u3, vec![alpha]),
    ] {
        for product in products {
            purchase_service::purchase(&state, customer, product).await?;
        }
    }

    deactivate(&state, &admin, delta, "Delta", pixel, art).await?;

    // Catalog: inactive products never show, filters are case-insensitive substrings.
    let all = catalog_ids(&state, CatalogQuery::default()).await?;
    assert_eq!(all, vec![alpha, beta, gamma]);
    let by_author = catalog_ids(
        &state,
        CatalogQuery {
            author: Some("INK".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(by_author, vec![alpha, beta]);
    let by_category = catalog_ids(
        &state,
        CatalogQuery {
            category: Some("ar".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(by_category, vec![beta]);
    let combined = catalog_ids(
        &state,
        CatalogQuery {
            author: Some("pixel".into()),
            category: Some("books".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(combined, vec![gamma]);

    let second = catalog_service::list_catalog(
        &state,
        CatalogQuery {
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        },
    )
    .await?;
    let meta = second.meta.expect("meta");
    assert_eq!(meta.total, Some(3));
    assert_eq!(meta.total_pages, Some(2));
    let items = second.data.expect("catalog").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, gamma);

    let past_end = catalog_service::list_catalog(
        &state,
        CatalogQuery {
            page: Some(9),
            per_page: Some(2),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(past_end.meta.expect("meta").page, Some(9));
    assert!(past_end.data.expect("catalog").items.is_empty());

    // Most purchased: active products only, rank keeps counting on page 2.
    let (first_page, meta) =
        ranking_service::most_purchased_page(&state, Pagination::new(Some(1), Some(2))).await?;
    assert_eq!(meta.total, Some(3));
    assert_eq!(meta.total_pages, Some(2));
    let rows: Vec<(i64, i64, i64)> = first_page
        .items
        .iter()
        .map(|item| (item.id, item.rank, item.purchases))
        .collect();
    assert_eq!(rows, vec![(alpha, 1, 3), (beta, 2, 2)]);

    let (second_page, _) =
        ranking_service::most_purchased_page(&state, Pagination::new(Some(2), Some(2))).await?;
    assert_eq!(second_page.items.len(), 1);
    assert_eq!(second_page.items[0].id, gamma);
    assert_eq!(second_page.items[0].rank, 3);
    assert_eq!(second_page.items[0].category, "Books");

    let (beyond, meta) =
        ranking_service::most_purchased_page(&state, Pagination::new(Some(3), Some(2))).await?;
    assert!(beyond.items.is_empty());
    assert_eq!(meta.page, Some(3));

    // Top buyers: u1 bought four, u2 two, u3 one.
    let (buyers, meta) =
        ranking_service::top_buyers_page(&state, Pagination::new(Some(2), Some(2))).await?;
    assert_eq!(meta.total, Some(3));
    assert_eq!(meta.total_pages, Some(2));
    assert_eq!(buyers.items.len(), 1);
    assert_eq!(buyers.items[0].user_id, u3.user_id);
    assert_eq!(buyers.items[0].rank, 3);
    assert_eq!(buyers.items[0].purchases, 1);

    let (leaders, _) =
        ranking_service::top_buyers_page(&state, Pagination::new(Some(1), Some(2))).await?;
    assert_eq!(leaders.items[0].user_id, u1.user_id);
    assert_eq!(leaders.items[0].purchases, 4);
    assert_eq!(leaders.items[1].user_id, u2.user_id);

    // Purchase history counts every purchase, inactive products included.
    let history = profile_service::purchase_history(
        &state,
        &u1,
        PageQuery {
            page: Some(2),
            per_page: Some(3),
        },
    )
    .await?;
    let meta = history.meta.expect("meta");
    assert_eq!(meta.total, Some(4));
    assert_eq!(meta.total_pages, Some(2));
    assert_eq!(history.data.expect("history").items.len(), 1);

    let history = profile_service::purchase_history(
        &state,
        &u1,
        PageQuery {
            page: Some(3),
            per_page: Some(3),
        },
    )
    .await?;
    assert!(history.data.expect("history").items.is_empty());

    Ok(())
}
