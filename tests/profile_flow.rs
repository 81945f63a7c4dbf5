mod common;

use common::{database_url, register_customer, setup_state};
use digital_catalog_api::{
    dto::auth::{LoginRequest, RegisterRequest, UpdateAccountRequest},
    entity::users::ActiveModel as UserActive,
    error::{AppError, is_unique_violation},
    services::{auth_service, profile_service},
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};

// Profile updates check uniqueness against other accounts only.
#[tokio::test]
async fn profile_updates_respect_uniqueness() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url).await?;

    let dana = register_customer(&state, "dana").await?;
    register_customer(&state, "eli").await?;

    let taken = profile_service::update_profile(
        &state,
        &dana,
        UpdateAccountRequest {
            username: "eli".into(),
            email: "dana@example.com".into(),
            password: None,
        },
    )
    .await;
    match taken {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "username already in use"),
        other => panic!("expected username conflict, got {other:?}"),
    }

    // Same name and email as before plus a blank password is a no-op change.
    let same = profile_service::update_profile(
        &state,
        &dana,
        UpdateAccountRequest {
            username: "dana".into(),
            email: "DANA@example.com".into(),
            password: Some("".into()),
        },
    )
    .await?
    .data
    .expect("profile");
    assert_eq!(same.email, "DANA@example.com");

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            username: "dana".into(),
            password: "secret".into(),
        },
    )
    .await;
    assert!(login.is_ok(), "blank password keeps the old one");

    let shouted = auth_service::register_user(
        &state,
        RegisterRequest {
            username: "fay".into(),
            email: "Eli@Example.COM".into(),
            password: "secret".into(),
        },
    )
    .await;
    match shouted {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "email already registered"),
        other => panic!("expected email conflict, got {other:?}"),
    }

    // The database rejects a case-only email variant even past the service check.
    let raced = UserActive {
        id: NotSet,
        email: Set("ELI@example.com".into()),
        username: Set("gus".into()),
        password_hash: Set(auth_service::hash_password("secret")?),
    }
    .insert(&state.orm)
    .await;
    match raced {
        Err(err) => assert!(is_unique_violation(&err), "unexpected error: {err}"),
        Ok(user) => panic!("case-only duplicate email inserted as user {}", user.id),
    }

    Ok(())
}
