use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{AdminProduct, ProductImage};

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProductList {
    pub items: Vec<AdminProduct>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProductDetail {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub average_rating: Option<Decimal>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub price: Decimal,
    pub category_id: Option<i64>,
    pub category: Option<String>,
    pub author_id: Option<i64>,
    pub author: Option<String>,
    pub images: Vec<ProductImage>,
    pub active: bool,
    pub file_size: i64,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveProductRequest {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub price: Decimal,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderImageRequest {
    pub order: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedId {
    pub id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileStored {
    pub product_id: i64,
    pub size: i64,
    pub content_type: String,
}
