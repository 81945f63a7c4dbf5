use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::PurchaseRecord;

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ProfileView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub balance: Decimal,
    pub purchases: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseHistory {
    pub items: Vec<PurchaseRecord>,
}
