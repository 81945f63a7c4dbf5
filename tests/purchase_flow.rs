mod common;

use common::{
    create_admin, create_author, create_category, create_product, database_url, money,
    register_customer, set_balance, setup_state,
};
use digital_catalog_api::{
    dto::{
        auth::LoginRequest,
        storefront::{CommentRequest, RateRequest},
    },
    error::AppError,
    models::Role,
    routes::params::{CatalogQuery, PageQuery, Pagination},
    services::{
        auth_service, catalog_service, product_service, profile_service, purchase_service,
        ranking_service, storefront_service,
    },
};
use rust_decimal::Decimal;

// Customer registers, gets credit, buys, is refused a second purchase and an
// unaffordable one, then rates, comments and downloads what was bought.
#[tokio::test]
async fn purchase_rate_comment_and_download_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url).await?;

    let admin = create_admin(&state, "boss").await?;
    let ana = register_customer(&state, "ana").await?;

    let duplicate = register_customer(&state, "ana").await;
    assert!(duplicate.is_err(), "username must be unique");

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            username: "ana".into(),
            password: "secret".into(),
        },
    )
    .await?
    .data
    .expect("login data");
    assert!(login.token.starts_with("Bearer "));
    assert_eq!(login.user.role, Role::Customer);
    assert_eq!(login.user.balance, Some(Decimal::ZERO));
    assert_eq!(login.user.former, Some(false));

    let bad_login = auth_service::login_user(
        &state,
        LoginRequest {
            username: "ana".into(),
            password: "wrong".into(),
        },
    )
    .await;
    assert!(matches!(bad_login, Err(AppError::BadRequest(_))));

    let author = create_author(&state, &admin, "Ferris Press").await?;
    let category = create_category(&state, &admin, "Books").await?;
    let guide = create_product(
        &state,
        &admin,
        "Async Guide",
        "30.00",
        Some(author),
        Some(category),
    )
    .await?;
    let atlas = create_product(
        &state,
        &admin,
        "Atlas",
        "80.00",
        Some(author),
        Some(category),
    )
    .await?;

    set_balance(&state, &admin, &ana, "100.00").await?;

    let receipt = purchase_service::purchase(&state, &ana, guide)
        .await?
        .data
        .expect("receipt");
    assert_eq!(receipt.price, money("30.00"));
    assert_eq!(receipt.balance, money("70.00"));

    let again = purchase_service::purchase(&state, &ana, guide).await;
    match again {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "product already purchased"),
        other => panic!("expected duplicate purchase rejection, got {other:?}"),
    }

    let too_expensive = purchase_service::purchase(&state, &ana, atlas).await;
    match too_expensive {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "insufficient balance"),
        other => panic!("expected insufficient balance, got {other:?}"),
    }

    let missing = purchase_service::purchase(&state, &ana, 999_999).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let profile = profile_service::get_profile(&state, &ana).await?.data.expect("profile");
    assert_eq!(profile.balance, money("70.00"));
    assert_eq!(profile.purchases, 1);

    // Rating twice keeps a single row with the latest value.
    storefront_service::rate(&state, &ana, guide, RateRequest { rating: 5 }).await?;
    storefront_service::rate(&state, &ana, guide, RateRequest { rating: 3 }).await?;
    let out_of_range =
        storefront_service::rate(&state, &ana, guide, RateRequest { rating: 6 }).await;
    assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));
    let not_bought = storefront_service::rate(&state, &ana, atlas, RateRequest { rating: 4 }).await;
    assert!(matches!(not_bought, Err(AppError::Forbidden)));

    storefront_service::comment(
        &state,
        &ana,
        guide,
        CommentRequest {
            text: "  Clear and practical.  ".into(),
        },
    )
    .await?;
    let blank =
        storefront_service::comment(&state, &ana, guide, CommentRequest { text: " ".into() })
            .await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let view = storefront_service::product_view(&state, Some(&ana), guide).await?;
    assert!(view.purchased);
    assert_eq!(view.balance, Some(money("70.00")));
    assert_eq!(view.purchases, 1);
    assert_eq!(view.average_rating, money("3.0"));
    assert_eq!(view.author, "Ferris Press");
    assert_eq!(view.comments.len(), 1);
    assert_eq!(view.comments[0].username, "ana");
    assert_eq!(view.comments[0].rating, 3);
    assert_eq!(view.comments[0].body, "Clear and practical.");

    let anonymous = storefront_service::product_view(&state, None, guide).await?;
    assert!(!anonymous.purchased);
    assert_eq!(anonymous.balance, None);

    // Nothing to download until a file is uploaded.
    let empty = storefront_service::download(&state, &ana, guide).await;
    assert!(matches!(empty, Err(AppError::NotFound)));
    product_service::upload_file(&state, &admin, guide, b"%PDF-1.4 guide".to_vec()).await?;
    let attachment = storefront_service::download(&state, &ana, guide).await?;
    assert_eq!(attachment.filename(), "Async Guide.pdf");
    let forbidden = storefront_service::download(&state, &ana, atlas).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    let catalog = catalog_service::list_catalog(
        &state,
        CatalogQuery {
            name: Some("guide".into()),
            ..Default::default()
        },
    )
    .await?;
    let meta = catalog.meta.expect("meta");
    assert_eq!(meta.total, Some(1));
    assert_eq!(meta.total_pages, Some(1));
    let items = catalog.data.expect("catalog").items;
    assert_eq!(items[0].id, guide);
    assert_eq!(items[0].purchases, 1);
    assert_eq!(items[0].average_rating, Some(money("3.0")));

    let most = ranking_service::most_purchased(&state, Pagination::default())
        .await?
        .data
        .expect("ranking");
    assert_eq!(most.items.len(), 1);
    assert_eq!(most.items[0].id, guide);
    assert_eq!(most.items[0].rank, 1);

    let buyers = ranking_service::top_buyers(&state, Pagination::default())
        .await?
        .data
        .expect("ranking");
    assert_eq!(buyers.items[0].username, "ana");

    let history = profile_service::purchase_history(&state, &ana, PageQuery::default()).await?;
    assert_eq!(history.meta.expect("meta").total, Some(1));
    let history = history.data.expect("history").items;
    assert_eq!(history[0].id, guide);
    assert_eq!(history[0].price, money("30.00"));

    Ok(())
}
