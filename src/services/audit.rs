//! Activity-log writes, performed inside the caller's transaction.

use crate::entities::activity_log;
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use uuid::Uuid;

/// Append one audit row. Callers pass their open transaction so the audit
/// record commits or rolls back with the mutation it describes.
pub async fn log_activity<C: ConnectionTrait>(
    conn: &C,
    actor_id: Uuid,
    action: &str,
    entity_type: &str,
    entity_id: Uuid,
    remarks: Option<String>,
) -> Result<(), ServiceError> {
    activity_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        actor_id: Set(actor_id),
        action: Set(action.to_string()),
        entity_type: Set(entity_type.to_string()),
        entity_id: Set(entity_id),
        remarks: Set(remarks),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    Ok(())
}
