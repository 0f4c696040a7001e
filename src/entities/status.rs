//! Status vocabularies for every state axis in the engine.
//!
//! Each axis is an enumerated state machine with a single transition table,
//! shared by every mutating operation: whether X may move from A to B is
//! answered here and nowhere else.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Registration / approval axis (independent of funnel status).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl ApprovalStatus {
    pub fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

/// Pipeline stages of the sales funnel. Determines which funnel statuses
/// apply to a record and what a conversion produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Enquiry,
    ProposalRequest,
    Proposal,
}

impl PipelineStage {
    /// Terminal status a record of this stage takes on conversion.
    pub fn converted_status(self) -> PipelineStatus {
        match self {
            PipelineStage::Enquiry => PipelineStatus::ConvertedToProposalRequest,
            PipelineStage::ProposalRequest => PipelineStatus::ConvertedToProposal,
            PipelineStage::Proposal => PipelineStatus::ConvertedToWorkOrder,
        }
    }
}

/// Funnel status axis, shared by all three pipeline stages. The proposal
/// outcome statuses (SUBMITTED .. WITHDRAWN) are only reachable on the
/// Proposal stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    #[sea_orm(string_value = "PENDING_APPROVAL")]
    PendingApproval,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "ON_HOLD")]
    OnHold,
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "UNDER_REVIEW")]
    UnderReview,
    #[sea_orm(string_value = "WON")]
    Won,
    #[sea_orm(string_value = "LOST")]
    Lost,
    #[sea_orm(string_value = "WITHDRAWN")]
    Withdrawn,
    #[sea_orm(string_value = "CONVERTED_TO_PR")]
    ConvertedToProposalRequest,
    #[sea_orm(string_value = "CONVERTED_TO_PROPOSAL")]
    ConvertedToProposal,
    #[sea_orm(string_value = "CONVERTED_TO_WO")]
    ConvertedToWorkOrder,
    #[sea_orm(string_value = "DROPPED")]
    Dropped,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl PipelineStatus {
    /// Terminal statuses admit no further funnel movement (audit remarks
    /// remain editable).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ConvertedToProposalRequest
                | Self::ConvertedToProposal
                | Self::ConvertedToWorkOrder
                | Self::Dropped
                | Self::Rejected
                | Self::Lost
                | Self::Withdrawn
        )
    }

    /// Whether a record in this status may be converted to the next stage.
    pub fn can_convert(self, stage: PipelineStage) -> bool {
        match stage {
            PipelineStage::Enquiry | PipelineStage::ProposalRequest => {
                matches!(self, Self::Approved | Self::InProgress)
            }
            // A proposal becomes a work order only once the client awards it.
            PipelineStage::Proposal => matches!(self, Self::Won),
        }
    }

    pub fn can_transition(stage: PipelineStage, from: Self, to: Self) -> bool {
        if from.is_terminal() {
            return false;
        }
        match (from, to) {
            (Self::PendingApproval, Self::Approved) => true,
            (Self::PendingApproval, Self::Rejected) => true,
            (Self::Approved, Self::InProgress) => true,
            (Self::Approved | Self::InProgress, Self::OnHold) => true,
            (Self::Approved | Self::InProgress, Self::Dropped) => true,
            (Self::OnHold, Self::InProgress) => true,
            (Self::OnHold, Self::Dropped) => true,
            // Proposal-only outcome ladder.
            (Self::InProgress, Self::Submitted)
            | (Self::Submitted, Self::UnderReview)
            | (Self::Submitted | Self::UnderReview, Self::Won)
            | (Self::Submitted | Self::UnderReview, Self::Lost)
            | (Self::Submitted | Self::UnderReview, Self::Withdrawn) => {
                stage == PipelineStage::Proposal
            }
            _ if to == stage.converted_status() => from.can_convert(stage),
            _ => false,
        }
    }
}

/// Coarse lifecycle position of an assignment, distinct from the
/// finer-grained approval statuses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStage {
    #[sea_orm(string_value = "REGISTRATION")]
    Registration,
    #[sea_orm(string_value = "TL_ASSIGNMENT")]
    TlAssignment,
    #[sea_orm(string_value = "DETAIL_ENTRY")]
    DetailEntry,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

impl WorkflowStage {
    pub fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Registration, Self::TlAssignment)
                | (Self::TlAssignment, Self::DetailEntry)
                | (Self::DetailEntry, Self::Active)
                | (Self::Active, Self::Completed)
                // An approved section edited after activation re-opens the
                // detail-entry gate.
                | (Self::Active, Self::DetailEntry)
        )
    }
}

/// One of the four independent sign-off gates on an assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl SectionStatus {
    pub fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Draft, Self::Submitted)
                // Re-submission after changes or rejection.
                | (Self::Submitted, Self::Submitted)
                | (Self::Rejected, Self::Submitted)
                | (Self::Submitted, Self::Approved)
                | (Self::Submitted, Self::Rejected)
                // Editing approved content forces re-approval.
                | (Self::Approved, Self::Submitted)
        )
    }
}

/// Selector for the four assignment sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AssignmentSection {
    Cost,
    Team,
    Milestone,
    Revenue,
}

impl AssignmentSection {
    pub const ALL: [AssignmentSection; 4] = [
        AssignmentSection::Cost,
        AssignmentSection::Team,
        AssignmentSection::Milestone,
        AssignmentSection::Revenue,
    ];
}

/// Execution status of an assignment's delivery work.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ExecutionStatus {
    #[sea_orm(string_value = "Not Started")]
    #[strum(serialize = "Not Started")]
    NotStarted,
    #[sea_orm(string_value = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Delayed")]
    Delayed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

/// Milestone delivery status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum MilestoneStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Delayed")]
    Delayed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl MilestoneStatus {
    pub fn can_transition(from: Self, to: Self) -> bool {
        match (from, to) {
            (Self::Completed | Self::Cancelled, _) => false,
            (_, Self::Cancelled) => true,
            (Self::Pending, Self::InProgress | Self::Completed | Self::Delayed) => true,
            (Self::InProgress, Self::Completed | Self::Delayed) => true,
            (Self::Delayed, Self::InProgress | Self::Completed) => true,
            _ => false,
        }
    }
}

/// Invoice-request lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl InvoiceStatus {
    pub fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

/// Position of an invoice within the contract's billing plan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    #[sea_orm(string_value = "ADVANCE")]
    Advance,
    #[sea_orm(string_value = "SUBSEQUENT")]
    Subsequent,
    #[sea_orm(string_value = "FINAL")]
    Final,
}

/// Payment instrument on a receipt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    #[sea_orm(string_value = "NEFT")]
    Neft,
    #[sea_orm(string_value = "RTGS")]
    Rtgs,
    #[sea_orm(string_value = "CHEQUE")]
    Cheque,
    #[sea_orm(string_value = "DD")]
    Dd,
    #[sea_orm(string_value = "CASH")]
    Cash,
}

/// Recognition event family on the officer revenue ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RevenueType {
    #[sea_orm(string_value = "INVOICE_80")]
    Invoice80,
    #[sea_orm(string_value = "PAYMENT_20")]
    Payment20,
}

/// Grievance ticket lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GrievanceStatus {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "ESCALATED")]
    Escalated,
    #[sea_orm(string_value = "RESOLVED")]
    Resolved,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

impl GrievanceStatus {
    pub fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Open, Self::InProgress)
                | (Self::Open | Self::InProgress | Self::Escalated, Self::Escalated)
                | (Self::Open | Self::InProgress | Self::Escalated, Self::Resolved)
                | (Self::Resolved, Self::Closed)
                // Reopen a resolution the complainant disputes.
                | (Self::Resolved, Self::InProgress)
        )
    }

    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::InProgress | Self::Escalated)
    }
}

/// Grievance handling priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GrievancePriority {
    #[sea_orm(string_value = "LOW")]
    Low,
    #[sea_orm(string_value = "NORMAL")]
    Normal,
    #[sea_orm(string_value = "HIGH")]
    High,
    #[sea_orm(string_value = "URGENT")]
    Urgent,
}

/// Escalation ladder for grievance handling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EscalationLevel {
    #[sea_orm(string_value = "TL")]
    Tl,
    #[sea_orm(string_value = "HEAD")]
    Head,
    #[sea_orm(string_value = "DDG")]
    Ddg,
    #[sea_orm(string_value = "DG")]
    Dg,
}

impl EscalationLevel {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Tl => Some(Self::Head),
            Self::Head => Some(Self::Ddg),
            Self::Ddg => Some(Self::Dg),
            Self::Dg => None,
        }
    }

    /// Days a ticket may sit at this level before auto-escalation.
    pub fn escalation_days(self) -> Option<i64> {
        match self {
            Self::Tl => Some(7),
            Self::Head => Some(14),
            Self::Ddg => Some(7),
            Self::Dg => None,
        }
    }
}

/// Grievance complaint categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintType {
    #[sea_orm(string_value = "ALLOCATION_PERCENT")]
    AllocationPercent,
    #[sea_orm(string_value = "COST_ESTIMATE")]
    CostEstimate,
    #[sea_orm(string_value = "REVENUE_SHARE")]
    RevenueShare,
    #[sea_orm(string_value = "MILESTONE_DATE")]
    MilestoneDate,
    #[sea_orm(string_value = "DATA_INCONSISTENCY")]
    DataInconsistency,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Role of an officer on an assignment team.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamRole {
    #[sea_orm(string_value = "TEAM_LEADER")]
    TeamLeader,
    #[sea_orm(string_value = "MEMBER")]
    Member,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn approval_only_moves_out_of_pending() {
        assert!(ApprovalStatus::can_transition(
            ApprovalStatus::Pending,
            ApprovalStatus::Approved
        ));
        assert!(!ApprovalStatus::can_transition(
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected
        ));
        assert!(!ApprovalStatus::can_transition(
            ApprovalStatus::Rejected,
            ApprovalStatus::Approved
        ));
    }

    #[test_case(PipelineStage::Enquiry, PipelineStatus::ConvertedToProposalRequest)]
    #[test_case(PipelineStage::ProposalRequest, PipelineStatus::ConvertedToProposal)]
    #[test_case(PipelineStage::Proposal, PipelineStatus::ConvertedToWorkOrder)]
    fn converted_status_per_stage(stage: PipelineStage, expect: PipelineStatus) {
        assert_eq!(stage.converted_status(), expect);
    }

    #[test]
    fn converted_records_admit_no_movement() {
        let converted = PipelineStatus::ConvertedToProposalRequest;
        assert!(converted.is_terminal());
        for to in [
            PipelineStatus::Approved,
            PipelineStatus::InProgress,
            PipelineStatus::Dropped,
            PipelineStatus::ConvertedToProposalRequest,
        ] {
            assert!(!PipelineStatus::can_transition(
                PipelineStage::Enquiry,
                converted,
                to
            ));
        }
    }

    #[test]
    fn enquiry_converts_from_approved_or_in_progress_only() {
        assert!(PipelineStatus::Approved.can_convert(PipelineStage::Enquiry));
        assert!(PipelineStatus::InProgress.can_convert(PipelineStage::Enquiry));
        assert!(!PipelineStatus::PendingApproval.can_convert(PipelineStage::Enquiry));
        assert!(!PipelineStatus::OnHold.can_convert(PipelineStage::Enquiry));
    }

    #[test]
    fn proposal_converts_only_once_won() {
        assert!(!PipelineStatus::Approved.can_convert(PipelineStage::Proposal));
        assert!(!PipelineStatus::Submitted.can_convert(PipelineStage::Proposal));
        assert!(PipelineStatus::Won.can_convert(PipelineStage::Proposal));
    }

    #[test]
    fn proposal_outcome_ladder_is_proposal_only() {
        assert!(PipelineStatus::can_transition(
            PipelineStage::Proposal,
            PipelineStatus::InProgress,
            PipelineStatus::Submitted
        ));
        assert!(!PipelineStatus::can_transition(
            PipelineStage::Enquiry,
            PipelineStatus::InProgress,
            PipelineStatus::Submitted
        ));
    }

    #[test]
    fn section_reset_on_edit_is_legal() {
        assert!(SectionStatus::can_transition(
            SectionStatus::Approved,
            SectionStatus::Submitted
        ));
    }

    #[test]
    fn section_approve_requires_submitted() {
        assert!(!SectionStatus::can_transition(
            SectionStatus::Draft,
            SectionStatus::Approved
        ));
        assert!(!SectionStatus::can_transition(
            SectionStatus::Rejected,
            SectionStatus::Approved
        ));
        assert!(SectionStatus::can_transition(
            SectionStatus::Submitted,
            SectionStatus::Approved
        ));
    }

    #[test]
    fn workflow_stage_reverts_from_active_to_detail_entry() {
        assert!(WorkflowStage::can_transition(
            WorkflowStage::Active,
            WorkflowStage::DetailEntry
        ));
        assert!(!WorkflowStage::can_transition(
            WorkflowStage::Completed,
            WorkflowStage::Active
        ));
        assert!(!WorkflowStage::can_transition(
            WorkflowStage::Registration,
            WorkflowStage::Active
        ));
    }

    #[test]
    fn invoice_approval_is_single_shot() {
        assert!(InvoiceStatus::can_transition(
            InvoiceStatus::Pending,
            InvoiceStatus::Approved
        ));
        assert!(!InvoiceStatus::can_transition(
            InvoiceStatus::Approved,
            InvoiceStatus::Approved
        ));
        assert!(!InvoiceStatus::can_transition(
            InvoiceStatus::Rejected,
            InvoiceStatus::Approved
        ));
    }

    #[test]
    fn milestones_never_leave_completed_or_cancelled() {
        assert!(!MilestoneStatus::can_transition(
            MilestoneStatus::Completed,
            MilestoneStatus::InProgress
        ));
        assert!(!MilestoneStatus::can_transition(
            MilestoneStatus::Cancelled,
            MilestoneStatus::Pending
        ));
        assert!(MilestoneStatus::can_transition(
            MilestoneStatus::Delayed,
            MilestoneStatus::Completed
        ));
    }

    #[test]
    fn escalation_ladder_tops_out_at_dg() {
        assert_eq!(EscalationLevel::Tl.next(), Some(EscalationLevel::Head));
        assert_eq!(EscalationLevel::Ddg.next(), Some(EscalationLevel::Dg));
        assert_eq!(EscalationLevel::Dg.next(), None);
        assert_eq!(EscalationLevel::Dg.escalation_days(), None);
        assert_eq!(EscalationLevel::Head.escalation_days(), Some(14));
    }

    #[test]
    fn grievance_close_requires_resolution() {
        assert!(!GrievanceStatus::can_transition(
            GrievanceStatus::Open,
            GrievanceStatus::Closed
        ));
        assert!(GrievanceStatus::can_transition(
            GrievanceStatus::Resolved,
            GrievanceStatus::Closed
        ));
        assert!(GrievanceStatus::Escalated.is_open());
        assert!(!GrievanceStatus::Closed.is_open());
    }
}
