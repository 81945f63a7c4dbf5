use serde::Serialize;
use utoipa::ToSchema;

use crate::models::CatalogItem;

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogList {
    pub items: Vec<CatalogItem>,
}
