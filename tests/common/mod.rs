#![allow(dead_code)]

use digital_catalog_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::{
        auth::RegisterRequest,
        authors::SaveAuthorRequest,
        categories::SaveCategoryRequest,
        customers::SaveBalanceRequest,
        products::SaveProductRequest,
    },
    entity::{administrators::ActiveModel as AdministratorActive, users::ActiveModel as UserActive},
    middleware::auth::AuthUser,
    models::Role,
    services::{auth_service, author_service, category_service, customer_service, product_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};

/// Database URL for integration tests, or `None` to skip them.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = orm_from_pool(pool.clone());
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE audit_logs, product_comments, product_ratings, purchases, \
         product_images, product_details, products, categories, authors, \
         administrators, customers, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        max_upload_bytes: 1024 * 1024,
        public_base_url: None,
    };

    Ok(AppState::new(pool, orm, config))
}

pub fn money(value: &str) -> Decimal {
    value.parse().expect("decimal literal")
}

pub async fn create_admin(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: NotSet,
        email: Set(format!("{username}@example.com")),
        username: Set(username.to_string()),
        password_hash: Set(auth_service::hash_password("admin123")?),
    }
    .insert(&state.orm)
    .await?;

    AdministratorActive {
        user_id: Set(user.id),
        access: Set(true),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: Role::Admin,
    })
}

pub async fn register_customer(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "secret".into(),
        },
    )
    .await?;
    let profile = resp.data.expect("profile");
    Ok(AuthUser {
        user_id: profile.id,
        role: Role::Customer,
    })
}

pub async fn set_balance(
    state: &AppState,
    admin: &AuthUser,
    customer: &AuthUser,
    amount: &str,
) -> anyhow::Result<()> {
    customer_service::save_balance(
        state,
        admin,
        customer.user_id,
        SaveBalanceRequest {
            balance: money(amount),
        },
    )
    .await?;
    Ok(())
}

pub async fn create_author(state: &AppState, admin: &AuthUser, name: &str) -> anyhow::Result<i64> {
    let resp = author_service::save_author(
        state,
        admin,
        SaveAuthorRequest {
            id: None,
            name: name.into(),
        },
    )
    .await?;
    Ok(resp.data.expect("author id").id)
}

pub async fn create_category(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
) -> anyhow::Result<i64> {
    let resp = category_service::save_category(
        state,
        admin,
        SaveCategoryRequest {
            id: None,
            name: name.into(),
            description: Some(format!("{name} products")),
        },
    )
    .await?;
    Ok(resp.data.expect("category id").id)
}

pub async fn create_product(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    price: &str,
    author_id: Option<i64>,
    category_id: Option<i64>,
) -> anyhow::Result<i64> {
    let resp = product_service::save_product(
        state,
        admin,
        SaveProductRequest {
            id: None,
            name: name.into(),
            description: Some(format!("About {name}")),
            version: Some("1.0".into()),
            price: money(price),
            author_id,
            category_id,
            active: true,
        },
    )
    .await?;
    Ok(resp.data.expect("product id").id)
}
