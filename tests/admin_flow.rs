mod common;

use common::{
    create_admin, create_author, create_category, create_product, database_url, money,
    register_customer, set_balance, setup_state,
};
use digital_catalog_api::{
    dto::{
        auth::LoginRequest,
        authors::SaveAuthorRequest,
        categories::SaveCategoryRequest,
        customers::SaveBalanceRequest,
        products::{ReorderImageRequest, SaveProductRequest},
        storefront::{CommentRequest, RateRequest},
    },
    error::AppError,
    models::Role,
    routes::params::{AdminProductQuery, CategoryQuery, CustomerQuery, PageQuery},
    services::{
        auth_service, author_service, category_service, customer_service, product_service,
        profile_service, purchase_service, storefront_service,
    },
};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

// Administrator manages products, images, categories and customers.
#[tokio::test]
async fn admin_manages_catalog_and_customers() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url).await?;

    let admin = create_admin(&state, "boss").await?;
    let cara = register_customer(&state, "cara").await?;

    // Customers cannot reach admin services.
    let denied = product_service::list_products(&state, &cara, AdminProductQuery::default()).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let author = create_author(&state, &admin, "Studio Nine").await?;
    let dup_author = author_service::save_author(
        &state,
        &admin,
        SaveAuthorRequest {
            id: None,
            name: "Studio Nine".into(),
        },
    )
    .await;
    assert!(matches!(dup_author, Err(AppError::BadRequest(_))));

    let category = create_category(&state, &admin, "Graphics").await?;
    let product = create_product(
        &state,
        &admin,
        "Pixel Icons",
        "7.50",
        Some(author),
        Some(category),
    )
    .await?;

    let bad_price = product_service::save_product(
        &state,
        &admin,
        SaveProductRequest {
            id: None,
            name: "Broken".into(),
            description: None,
            version: None,
            price: money("1.005"),
            author_id: None,
            category_id: None,
            active: true,
        },
    )
    .await;
    assert!(matches!(bad_price, Err(AppError::BadRequest(_))));

    let unknown_author = product_service::save_product(
        &state,
        &admin,
        SaveProductRequest {
            id: None,
            name: "Orphan".into(),
            description: None,
            version: None,
            price: money("1.00"),
            author_id: Some(424242),
            category_id: None,
            active: true,
        },
    )
    .await;
    assert!(matches!(unknown_author, Err(AppError::BadRequest(_))));

    // Updating keeps the id and rewrites the details row.
    product_service::save_product(
        &state,
        &admin,
        SaveProductRequest {
            id: Some(product),
            name: "Pixel Icons".into(),
            description: Some("Icon pack".into()),
            version: Some("2.0".into()),
            price: money("9.00"),
            author_id: Some(author),
            category_id: Some(category),
            active: true,
        },
    )
    .await?;

    let first = product_service::add_image(&state, &admin, product, None, PNG.to_vec())
        .await?
        .data
        .expect("image id")
        .id;
    let second = product_service::add_image(&state, &admin, product, None, PNG.to_vec())
        .await?
        .data
        .expect("image id")
        .id;
    let not_image =
        product_service::add_image(&state, &admin, product, None, b"text".to_vec()).await;
    assert!(matches!(not_image, Err(AppError::BadRequest(_))));

    let detail = product_service::get_product(&state, &admin, product)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.price, money("9.00"));
    assert_eq!(detail.version.as_deref(), Some("2.0"));
    assert_eq!(detail.author.as_deref(), Some("Studio Nine"));
    let orders: Vec<(i64, i32)> = detail.images.iter().map(|i| (i.id, i.sort_order)).collect();
    assert_eq!(orders, vec![(first, 1), (second, 2)]);
    assert_eq!(detail.file_size, 0);

    product_service::reorder_image(&state, &admin, second, ReorderImageRequest { order: 0 }).await?;
    let detail = product_service::get_product(&state, &admin, product)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.images[0].id, second);

    product_service::delete_image(&state, &admin, first).await?;
    let gone = product_service::delete_image(&state, &admin, first).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    // Past the last page, admin lists fall back to the last page.
    let listed = product_service::list_products(
        &state,
        &admin,
        AdminProductQuery {
            page: Some(9),
            ..Default::default()
        },
    )
    .await?;
    let meta = listed.meta.expect("meta");
    assert_eq!(meta.page, Some(1));
    assert_eq!(meta.total, Some(1));

    // A category with products cannot be deleted.
    let in_use = category_service::delete_category(&state, &admin, category).await;
    assert!(matches!(in_use, Err(AppError::BadRequest(_))));

    let renamed = category_service::save_category(
        &state,
        &admin,
        SaveCategoryRequest {
            id: Some(category),
            name: "Icons".into(),
            description: None,
        },
    )
    .await?;
    assert_eq!(renamed.data.expect("id").id, category);
    let categories = category_service::list_categories(
        &state,
        &admin,
        CategoryQuery {
            name: Some("ico".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("categories");
    assert_eq!(categories.items.len(), 1);
    assert_eq!(categories.items[0].description, None);

    // Balances: negative rejected, exact filter works.
    let negative = customer_service::save_balance(
        &state,
        &admin,
        cara.user_id,
        SaveBalanceRequest {
            balance: money("-1.00"),
        },
    )
    .await;
    assert!(matches!(negative, Err(AppError::BadRequest(_))));
    set_balance(&state, &admin, &cara, "25.50").await?;
    let customers = customer_service::list_customers(
        &state,
        &admin,
        CustomerQuery {
            balance: Some(money("25.5")),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("customers");
    assert_eq!(customers.items.len(), 1);
    assert_eq!(customers.items[0].username, "cara");

    // Once bought, a product is protected from deletion.
    purchase_service::purchase(&state, &cara, product).await?;
    let protected = product_service::delete_product(&state, &admin, product).await;
    assert!(matches!(protected, Err(AppError::BadRequest(_))));

    let spare = create_product(&state, &admin, "Spare", "1.00", None, None).await?;
    product_service::add_image(&state, &admin, spare, Some(5), PNG.to_vec()).await?;
    product_service::delete_product(&state, &admin, spare).await?;
    let deleted = product_service::get_product(&state, &admin, spare).await;
    assert!(matches!(deleted, Err(AppError::NotFound)));

    // Soft delete hides the customer and blocks sign-in and purchases.
    customer_service::delete_customer(&state, &admin, cara.user_id).await?;
    let customers = customer_service::list_customers(&state, &admin, CustomerQuery::default())
        .await?
        .data
        .expect("customers");
    assert!(customers.items.is_empty());
    let login = auth_service::login_user(
        &state,
        LoginRequest {
            username: "cara".into(),
            password: "secret".into(),
        },
    )
    .await;
    assert!(matches!(login, Err(AppError::BadRequest(_))));
    let other = create_product(&state, &admin, "Other", "0.00", None, None).await?;
    let blocked = purchase_service::purchase(&state, &cara, other).await;
    assert!(matches!(blocked, Err(AppError::Forbidden)));

    // A token issued before the soft delete no longer opens the storefront.
    let download = storefront_service::download(&state, &cara, product).await;
    assert!(matches!(download, Err(AppError::Forbidden)));
    let rate = storefront_service::rate(&state, &cara, product, RateRequest { rating: 4 }).await;
    assert!(matches!(rate, Err(AppError::Forbidden)));
    let comment = storefront_service::comment(
        &state,
        &cara,
        product,
        CommentRequest {
            text: "still here".into(),
        },
    )
    .await;
    assert!(matches!(comment, Err(AppError::Forbidden)));
    let profile = profile_service::get_profile(&state, &cara).await;
    assert!(matches!(profile, Err(AppError::Forbidden)));
    let history = profile_service::purchase_history(&state, &cara, PageQuery::default()).await;
    assert!(matches!(history, Err(AppError::Forbidden)));

    // Two products left; one per page puts the clamped request on page 2.
    let listed = product_service::list_products(
        &state,
        &admin,
        AdminProductQuery {
            page: Some(9),
            per_page: Some(1),
            ..Default::default()
        },
    )
    .await?;
    let meta = listed.meta.expect("meta");
    assert_eq!(meta.page, Some(2));
    assert_eq!(meta.total, Some(2));
    assert_eq!(meta.total_pages, Some(2));
    let items = listed.data.expect("products").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, other);

    let boss = auth_service::login_user(
        &state,
        LoginRequest {
            username: "boss".into(),
            password: "admin123".into(),
        },
    )
    .await?
    .data
    .expect("login data");
    assert_eq!(boss.user.role, Role::Admin);
    assert_eq!(boss.user.balance, None);
    assert_eq!(boss.user.former, None);

    Ok(())
}
