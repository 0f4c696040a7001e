use super::status::{ApprovalStatus, PipelineStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stage 1 of the opportunity funnel: a client enquiry awaiting Head
/// approval and officer allocation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "enquiries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub enquiry_number: String,

    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,

    pub client_type: Option<String>,
    pub domain: Option<String>,
    pub sub_domain: Option<String>,
    pub office_code: String,

    /// Allocated officer; None until a Head approves and allocates.
    pub officer_id: Option<Uuid>,

    pub description: Option<String>,
    pub estimated_value: Option<Decimal>,
    pub target_date: Option<NaiveDate>,

    pub status: PipelineStatus,
    pub approval_status: ApprovalStatus,

    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,

    /// Latest progress note from the allocated officer.
    pub current_update: Option<String>,
    pub drop_reason: Option<String>,
    pub remarks: Option<String>,

    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::proposal_request::Entity")]
    ProposalRequests,
}

impl Related<super::proposal_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProposalRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
