use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CustomerSummary;

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<CustomerSummary>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveBalanceRequest {
    pub balance: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceView {
    pub id: i64,
    pub balance: Decimal,
}
