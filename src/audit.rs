use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;

/// Appends a row to `audit_logs` after a committed change.
///
/// The change already happened, so a failed insert is only reported as a
/// warning and never reaches the caller.
pub async fn record_action(
    pool: &DbPool,
    user_id: Option<i64>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) {
    let result = sqlx::query(
        "INSERT INTO audit_logs (id, user_id, action, resource, metadata) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await;

    if let Err(err) = result {
        tracing::warn!(error = %err, action, user_id, "audit log failed");
    }
}
