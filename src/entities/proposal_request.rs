use super::status::{ApprovalStatus, PipelineStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stage 2 of the opportunity funnel: a request to prepare a proposal,
/// usually converted from an enquiry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "proposal_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub pr_number: String,

    /// Parent enquiry; None for a direct proposal request.
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

    /// Date by which the proposal should be submitted.
    pub target_date: Option<NaiveDate>,

    pub status: PipelineStatus,
    pub approval_status: ApprovalStatus,

    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,
    pub current_update: Option<String>,
    pub drop_reason: Option<String>,
    pub remarks: Option<String>,

    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enquiry::Entity",
        from = "Column::EnquiryId",
        to = "super::enquiry::Column::Id"
    )]
    Enquiry,
    #[sea_orm(has_many = "super::proposal::Entity")]
    Proposals,
}

impl Related<super::enquiry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enquiry.def()
    }
}

impl Related<super::proposal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
