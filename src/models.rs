use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    /// Customer accounts only.
    pub balance: Option<Decimal>,
    /// Customer accounts only; `true` once an administrator removed the customer.
    pub former: Option<bool>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub image_id: Option<i64>,
    #[sqlx(skip)]
    pub image_url: Option<String>,
    pub average_rating: Option<Decimal>,
    pub purchases: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Comment {
    pub username: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub body: String,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PurchaseRecord {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub price: Decimal,
    pub image_id: Option<i64>,
    #[sqlx(skip)]
    pub image_url: Option<String>,
    pub average_rating: Option<Decimal>,
    pub purchases: i64,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct MostPurchased {
    #[sqlx(skip)]
    pub rank: i64,
    pub id: i64,
    pub name: String,
    pub author: String,
    pub category: String,
    pub price: Decimal,
    pub purchases: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TopBuyer {
    #[sqlx(skip)]
    pub rank: i64,
    pub user_id: i64,
    pub username: String,
    pub purchases: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct BestRated {
    #[sqlx(skip)]
    pub rank: i64,
    pub id: i64,
    pub name: String,
    pub author: String,
    pub category: String,
    pub price: Decimal,
    pub ratings: i64,
    pub average_rating: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct AdminProduct {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub category: String,
    pub active: bool,
    pub average_rating: Option<Decimal>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ProductImage {
    pub id: i64,
    pub sort_order: i32,
    #[sqlx(skip)]
    pub url: String,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct CustomerSummary {
    pub id: i64,
    pub username: String,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct CustomerDetail {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub balance: Decimal,
}
