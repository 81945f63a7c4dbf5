use digital_catalog_api::{
    config::AppConfig, db::create_pool, services::auth_service::hash_password,
};
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@example.com", "admin123").await?;
    sqlx::query(
        "INSERT INTO administrators (user_id, access) VALUES ($1, TRUE) ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(admin_id)
    .execute(&pool)
    .await?;

    let customer_id = ensure_user(&pool, "demo", "demo@example.com", "demo123").await?;
    sqlx::query(
        r#"
        INSERT INTO customers (user_id, balance) VALUES ($1, $2)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(customer_id)
    .bind(Decimal::new(10000, 2))
    .execute(&pool)
    .await?;

    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if let Some(id) = existing {
        println!("User {username} already present");
        return Ok(id);
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (email, username, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    println!("Created user {username}");
    Ok(id)
}

async fn upsert_named(pool: &sqlx::PgPool, table: &str, name: &str) -> anyhow::Result<i64> {
    let existing: Option<i64> =
        sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE name = $1 ORDER BY id LIMIT 1"))
            .bind(name)
            .fetch_optional(pool)
            .await?;
    if let Some(id) = existing {
        return Ok(id);
    }
    let id = sqlx::query_scalar(&format!("INSERT INTO {table} (name) VALUES ($1) RETURNING id"))
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        ("Async Rust", "Ferris Press", "Books", "Patterns for async services", "19.90", "2nd"),
        ("Pixel Icons", "Studio Nine", "Graphics", "Icon pack, 400 glyphs", "7.50", "1.3"),
        ("Synth Loops", "Night Audio", "Audio", "Royalty-free loop bundle", "12.00", "1.0"),
        ("Free Sampler", "Night Audio", "Audio", "A taste of the bundle", "0.00", "1.0"),
    ];

    for (name, author, category, description, price, version) in products {
        let author_id = upsert_named(pool, "authors", author).await?;
        let category_id = upsert_named(pool, "categories", category).await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        let product_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, file, category_id, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(format!("{name}\n{description}\n").into_bytes())
        .bind(category_id)
        .bind(author_id)
        .fetch_one(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO product_details (product_id, price, version, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product_id)
        .bind(price.parse::<Decimal>()?)
        .bind(version)
        .bind(description)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
