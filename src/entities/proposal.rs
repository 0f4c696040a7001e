use super::status::{ApprovalStatus, PipelineStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stage 3 of the opportunity funnel: a priced proposal submitted to the
/// client. Converts to a work order only once WON.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "proposals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub proposal_number: String,

    /// Parent proposal request; None for a direct proposal.
    pub pr_id: Option<Uuid>,
    /// Originating enquiry carried through the chain for traceability.
    pub enquiry_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,

    pub client_type: Option<String>,
    pub domain: Option<String>,
    pub sub_domain: Option<String>,
    pub office_code: String,
    pub officer_id: Option<Uuid>,

    pub description: Option<String>,
    pub estimated_value: Option<Decimal>,
    /// Value quoted to the client.
    pub proposed_value: Option<Decimal>,
    /// Final work-order value when won.
    pub work_order_value: Option<Decimal>,

    pub submission_date: Option<NaiveDate>,
    /// Expected date of work order.
    pub target_date: Option<NaiveDate>,
    pub validity_date: Option<NaiveDate>,

    pub status: PipelineStatus,
    pub approval_status: ApprovalStatus,

    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,
    pub current_update: Option<String>,
    pub drop_reason: Option<String>,
    pub loss_reason: Option<String>,
    pub withdraw_reason: Option<String>,
    pub remarks: Option<String>,

    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::proposal_request::Entity",
        from = "Column::PrId",
        to = "super::proposal_request::Column::Id"
    )]
    ProposalRequest,
    #[sea_orm(has_many = "super::assignment::Entity")]
    Assignments,
}

impl Related<super::proposal_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProposalRequest.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
