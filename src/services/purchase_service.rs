use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};

use crate::{
    audit::record_action,
    dto::storefront::PurchaseReceipt,
    entity::{
        customers::{ActiveModel as CustomerActive, Entity as Customers},
        product_details::Entity as ProductDetails,
        products::{Column as ProdCol, Entity as Products},
        purchases::{ActiveModel as PurchaseActive, Entity as Purchases},
    },
    error::{AppError, AppResult, is_unique_violation},
    middleware::auth::{AuthUser, ensure_customer},
    response::{ApiResponse, Meta},
    state::AppState,
};

const ALREADY_PURCHASED: &str = "product already purchased";

/// Buys a product with the customer's balance.
///
/// The customer row stays locked (`SELECT ... FOR UPDATE`) from the balance
/// check until commit, so concurrent purchases by the same customer are
/// serialised. The `(product_id, user_id)` primary key and the
/// `balance >= 0` check back this up at the database level.
pub async fn purchase(
    state: &AppState,
    user: &AuthUser,
    product_id: i64,
) -> AppResult<ApiResponse<PurchaseReceipt>> {
    ensure_customer(user)?;

    let txn = state.orm.begin().await?;

    let product: Option<i64> = Products::find()
        .select_only()
        .column(ProdCol::Id)
        .filter(ProdCol::Id.eq(product_id))
        .filter(ProdCol::Active.eq(true))
        .into_tuple()
        .one(&txn)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let price = ProductDetails::find_by_id(product_id)
        .one(&txn)
        .await?
        .map(|details| details.price)
        .unwrap_or(Decimal::ZERO);

    let customer = Customers::find_by_id(user.user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let customer = match customer {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    if customer.former {
        return Err(AppError::Forbidden);
    }

    if Purchases::find_by_id((product_id, user.user_id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request(ALREADY_PURCHASED));
    }

    if customer.balance < price {
        tracing::info!(
            user_id = user.user_id,
            product_id,
            balance = %customer.balance,
            amount = %price,
            "purchase rejected: insufficient balance"
        );
        return Err(AppError::bad_request("insufficient balance"));
    }

    let new_balance = customer.balance - price;
    let mut active: CustomerActive = customer.into();
    active.balance = Set(new_balance);
    active.update(&txn).await?;

    let purchase = PurchaseActive {
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        price: Set(price),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::bad_request(ALREADY_PURCHASED)
        } else {
            err.into()
        }
    })?;

    txn.commit().await?;

    tracing::info!(
        user_id = user.user_id,
        product_id,
        amount = %price,
        balance = %new_balance,
        "product purchased"
    );

    record_action(
        &state.pool,
        Some(user.user_id),
        "product_purchase",
        Some("purchases"),
        Some(serde_json::json!({
            "product_id": product_id,
            "price": price.to_string(),
            "balance": new_balance.to_string(),
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Purchase completed",
        PurchaseReceipt {
            product_id,
            price,
            balance: new_balance,
            purchased_at: purchase.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}
