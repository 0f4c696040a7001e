use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit trail row, written in the same transaction as the
/// mutation it records.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub actor_id: Uuid,
    /// CREATE, APPROVE, REJECT, SUBMIT, CONVERT, UPDATE, ESCALATE, ...
    pub action: String,
    /// Entity family, e.g. "enquiry", "invoice_request".
    pub entity_type: String,
    pub entity_id: Uuid,
    pub remarks: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
