mod common;

use common::{
    create_admin, create_product, database_url, money, register_customer, set_balance, setup_state,
};
use digital_catalog_api::services::{profile_service, purchase_service};

// Two simultaneous purchases that together exceed the balance: the row lock
// lets exactly one through and the balance never goes negative.
#[tokio::test]
async fn concurrent_purchases_cannot_overdraw() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url).await?;

    let admin = create_admin(&state, "boss").await?;
    let bob = register_customer(&state, "bob").await?;
    let first = create_product(&state, &admin, "Loop Pack", "30.00", None, None).await?;
    let second = create_product(&state, &admin, "Icon Pack", "30.00", None, None).await?;
    set_balance(&state, &admin, &bob, "50.00").await?;

    let (a, b) = tokio::join!(
        purchase_service::purchase(&state, &bob, first),
        purchase_service::purchase(&state, &bob, second),
    );
    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one purchase fits the balance");

    let profile = profile_service::get_profile(&state, &bob).await?.data.expect("profile");
    assert_eq!(profile.balance, money("20.00"));
    assert_eq!(profile.purchases, 1);

    Ok(())
}
