use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::{
    audit::record_action,
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateAccountRequest},
    entity::{
        administrators::Entity as Administrators,
        customers::{ActiveModel as CustomerActive, Entity as Customers, Model as CustomerModel},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::issue_token,
    models::{Role, UserProfile},
    response::{ApiResponse, Meta},
    services::validation,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "invalid username or password";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Which of the two names is already taken by another account, if any.
pub(crate) async fn ensure_identity_free(
    state: &AppState,
    username: &str,
    email: &str,
    exclude_id: Option<i64>,
    messages: (&str, &str),
) -> AppResult<()> {
    let (name_taken, email_taken): (bool, bool) = sqlx::query_as(
        r#"
        SELECT
            EXISTS (SELECT 1 FROM users WHERE username = $1 AND ($3::bigint IS NULL OR id <> $3)),
            EXISTS (SELECT 1 FROM users WHERE LOWER(email) = LOWER($2) AND ($3::bigint IS NULL OR id <> $3))
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(exclude_id)
    .fetch_one(&state.pool)
    .await?;

    if name_taken {
        return Err(AppError::bad_request(messages.0));
    }
    if email_taken {
        return Err(AppError::bad_request(messages.1));
    }
    Ok(())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let username = validation::username(&payload.username)?;
    let email = validation::email(&payload.email)?;
    let password = validation::password(&payload.password)?;

    ensure_identity_free(
        state,
        &username,
        &email,
        None,
        ("username already exists", "email already registered"),
    )
    .await?;

    let password_hash = hash_password(password)?;

    let txn = state.orm.begin().await?;
    let user = UserActive {
        id: NotSet,
        email: Set(email),
        username: Set(username),
        password_hash: Set(password_hash),
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::bad_request("username or email already registered")
        } else {
            err.into()
        }
    })?;

    let customer = CustomerActive {
        user_id: Set(user.id),
        former: Set(false),
        created_at: Set(Utc::now().into()),
        balance: Set(Decimal::ZERO),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(user_id = user.id, "customer registered");

    record_action(
        &state.pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        profile_from_entity(user, Role::Customer, Some(&customer)),
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let user = Users::find()
        .filter(UserCol::Username.eq(username.trim()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::bad_request(INVALID_CREDENTIALS)),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::bad_request(INVALID_CREDENTIALS));
    }

    let (role, customer) = resolve_role(state, user.id).await?;

    let token = issue_token(
        user.id,
        role,
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
    )?;

    tracing::info!(user_id = user.id, role = role.as_str(), "user logged in");

    record_action(
        &state.pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "role": role.as_str() })),
    )
    .await;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        user: profile_from_entity(user, role, customer.as_ref()),
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Administrators win over customers; disabled administrators and former
/// customers may not sign in.
async fn resolve_role(
    state: &AppState,
    user_id: i64,
) -> AppResult<(Role, Option<CustomerModel>)> {
    if let Some(admin) = Administrators::find_by_id(user_id).one(&state.orm).await? {
        if !admin.access {
            return Err(AppError::bad_request("administrator access is disabled"));
        }
        return Ok((Role::Admin, None));
    }

    match Customers::find_by_id(user_id).one(&state.orm).await? {
        Some(customer) if customer.former => {
            Err(AppError::bad_request("this account has been deactivated"))
        }
        Some(customer) => Ok((Role::Customer, Some(customer))),
        None => Err(AppError::bad_request("user has no valid role")),
    }
}

/// Applies a validated name/email/password change to a user row.
pub(crate) async fn update_account(
    state: &AppState,
    user_id: i64,
    payload: UpdateAccountRequest,
) -> AppResult<UserModel> {
    let username = validation::username(&payload.username)?;
    let email = validation::email(&payload.email)?;
    let password = validation::optional_password(payload.password.as_deref())?;

    ensure_identity_free(
        state,
        &username,
        &email,
        Some(user_id),
        ("username already in use", "email already in use"),
    )
    .await?;

    let existing = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();
    active.username = Set(username);
    active.email = Set(email);
    if let Some(password) = password {
        active.password_hash = Set(hash_password(password)?);
    }

    let user = active.update(&state.orm).await.map_err(|err| {
        if is_unique_violation(&err) {
            AppError::bad_request("username or email already in use")
        } else {
            err.into()
        }
    })?;

    record_action(
        &state.pool,
        Some(user_id),
        "account_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": user_id, "password_changed": password.is_some() })),
    )
    .await;

    Ok(user)
}

pub fn profile_from_entity(
    user: UserModel,
    role: Role,
    customer: Option<&CustomerModel>,
) -> UserProfile {
    UserProfile {
        id: user.id,
        username: user.username,
        email: user.email,
        role,
        balance: customer.map(|c| c.balance),
        former: customer.map(|c| c.former),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_hashed_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
