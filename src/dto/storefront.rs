use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Comment;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub version: String,
    pub author: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
    pub image_urls: Vec<String>,
    pub purchases: i64,
    pub average_rating: Decimal,
    /// Only filled in for a signed-in customer.
    pub balance: Option<Decimal>,
    pub purchased: bool,
    pub download_url: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseReceipt {
    pub product_id: i64,
    pub price: Decimal,
    pub balance: Decimal,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RateRequest {
    pub rating: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingView {
    pub product_id: i64,
    pub rating: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentCreated {
    pub id: i64,
    pub product_id: i64,
    pub created_at: DateTime<Utc>,
}
