use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Role, UserProfile};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Shared by the profile screens of customers and administrators.
#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateAccountRequest {
    pub username: String,
    pub email: String,
    /// Blank keeps the current password.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}
