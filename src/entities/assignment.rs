use super::status::{
    ApprovalStatus, AssignmentSection, ExecutionStatus, SectionStatus, WorkflowStage,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stage 4 of the funnel: the contracted, revenue-bearing work order.
///
/// Carries five independent approval axes: the overall registration
/// `approval_status` plus one `SectionStatus` per sign-off gate (cost,
/// team, milestone plan, revenue shares). `workflow_stage` may only reach
/// ACTIVE while registration and all four sections are simultaneously
/// APPROVED.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub assignment_no: String,

    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    pub client_name: String,
    pub client_type: Option<String>,
    pub domain: Option<String>,
    pub sub_domain: Option<String>,
    pub office_code: String,

    /// Winning proposal this work order was converted from.
    pub proposal_id: Option<Uuid>,
    pub enquiry_id: Option<Uuid>,

    pub team_leader_officer_id: Option<Uuid>,

    pub work_order_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,

    /// Contract value in Lakhs, exclusive of GST.
    pub total_value: Decimal,
    /// Cumulative invoice value raised.
    pub invoice_amount: Decimal,
    /// Cumulative payments collected.
    pub amount_received: Decimal,
    /// Estimated total expenditure (cost section content).
    pub total_expenditure: Decimal,
    /// Recognition-adjusted revenue eligible for officer distribution.
    pub shareable_revenue: Decimal,

    pub physical_progress_percent: Decimal,
    pub timeline_progress_percent: Decimal,

    pub status: ExecutionStatus,
    pub workflow_stage: WorkflowStage,
    pub approval_status: ApprovalStatus,

    pub cost_approval_status: SectionStatus,
    pub cost_submitted_by: Option<Uuid>,
    pub cost_submitted_at: Option<DateTimeUtc>,
    pub cost_approved_by: Option<Uuid>,
    pub cost_approved_at: Option<DateTimeUtc>,

    pub team_approval_status: SectionStatus,
    pub team_submitted_by: Option<Uuid>,
    pub team_submitted_at: Option<DateTimeUtc>,
    pub team_approved_by: Option<Uuid>,
    pub team_approved_at: Option<DateTimeUtc>,

    pub milestone_approval_status: SectionStatus,
    pub milestone_submitted_by: Option<Uuid>,
    pub milestone_submitted_at: Option<DateTimeUtc>,
    pub milestone_approved_by: Option<Uuid>,
    pub milestone_approved_at: Option<DateTimeUtc>,

    pub revenue_approval_status: SectionStatus,
    pub revenue_submitted_by: Option<Uuid>,
    pub revenue_submitted_at: Option<DateTimeUtc>,
    pub revenue_approved_by: Option<Uuid>,
    pub revenue_approved_at: Option<DateTimeUtc>,

    pub remarks: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::proposal::Entity",
        from = "Column::ProposalId",
        to = "super::proposal::Column::Id"
    )]
    Proposal,
    #[sea_orm(has_many = "super::milestone::Entity")]
    Milestones,
    #[sea_orm(has_many = "super::invoice_request::Entity")]
    InvoiceRequests,
    #[sea_orm(has_many = "super::revenue_share::Entity")]
    RevenueShares,
    #[sea_orm(has_many = "super::assignment_team::Entity")]
    TeamMembers,
}

impl Related<super::proposal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposal.def()
    }
}

impl Related<super::milestone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Milestones.def()
    }
}

impl Related<super::invoice_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceRequests.def()
    }
}

impl Related<super::revenue_share::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RevenueShares.def()
    }
}

impl Related<super::assignment_team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMembers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Current status of one sign-off section.
    pub fn section_status(&self, section: AssignmentSection) -> SectionStatus {
        match section {
            AssignmentSection::Cost => self.cost_approval_status,
            AssignmentSection::Team => self.team_approval_status,
            AssignmentSection::Milestone => self.milestone_approval_status,
            AssignmentSection::Revenue => self.revenue_approval_status,
        }
    }

    /// True when every activation gate currently holds.
    pub fn activation_gates_hold(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
            && AssignmentSection::ALL
                .iter()
                .all(|s| self.section_status(*s) == SectionStatus::Approved)
    }
}

impl ActiveModel {
    /// Write one section's status field.
    pub fn set_section_status(&mut self, section: AssignmentSection, status: SectionStatus) {
        use sea_orm::Set;
        match section {
            AssignmentSection::Cost => self.cost_approval_status = Set(status),
            AssignmentSection::Team => self.team_approval_status = Set(status),
            AssignmentSection::Milestone => self.milestone_approval_status = Set(status),
            AssignmentSection::Revenue => self.revenue_approval_status = Set(status),
        }
    }

    /// Stamp who submitted a section and when.
    pub fn set_section_submitted(
        &mut self,
        section: AssignmentSection,
        by: Uuid,
        at: DateTimeUtc,
    ) {
        use sea_orm::Set;
        match section {
            AssignmentSection::Cost => {
                self.cost_submitted_by = Set(Some(by));
                self.cost_submitted_at = Set(Some(at));
            }
            AssignmentSection::Team => {
                self.team_submitted_by = Set(Some(by));
                self.team_submitted_at = Set(Some(at));
            }
            AssignmentSection::Milestone => {
                self.milestone_submitted_by = Set(Some(by));
                self.milestone_submitted_at = Set(Some(at));
            }
            AssignmentSection::Revenue => {
                self.revenue_submitted_by = Set(Some(by));
                self.revenue_submitted_at = Set(Some(at));
            }
        }
    }

    /// Stamp who approved a section and when.
    pub fn set_section_approved(&mut self, section: AssignmentSection, by: Uuid, at: DateTimeUtc) {
        use sea_orm::Set;
        match section {
            AssignmentSection::Cost => {
                self.cost_approved_by = Set(Some(by));
                self.cost_approved_at = Set(Some(at));
            }
            AssignmentSection::Team => {
                self.team_approved_by = Set(Some(by));
                self.team_approved_at = Set(Some(at));
            }
            AssignmentSection::Milestone => {
                self.milestone_approved_by = Set(Some(by));
                self.milestone_approved_at = Set(Some(at));
            }
            AssignmentSection::Revenue => {
                self.revenue_approved_by = Set(Some(by));
                self.revenue_approved_at = Set(Some(at));
            }
        }
    }
}
