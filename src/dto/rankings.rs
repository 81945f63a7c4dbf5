use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{BestRated, MostPurchased, TopBuyer};

#[derive(Debug, Serialize, ToSchema)]
pub struct MostPurchasedList {
    pub items: Vec<MostPurchased>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopBuyerList {
    pub items: Vec<TopBuyer>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BestRatedList {
    pub items: Vec<BestRated>,
}
