use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Author;

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorList {
    pub items: Vec<Author>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveAuthorRequest {
    pub id: Option<i64>,
    pub name: String,
}
