//! Assignment workflow engine.
//!
//! Governs registration approval, team-leader allocation, the four
//! section sign-off gates, and auto-activation. All section transitions
//! for one assignment are serialized through a per-row async mutex so two
//! concurrent approvals can never both observe "all four approved" and
//! race the activation write.

use crate::{
    auth::Principal,
    db::DbPool,
    entities::assignment::{self, Entity as AssignmentEntity},
    entities::assignment_team,
    entities::milestone,
    entities::revenue_share,
    entities::status::{
        ApprovalStatus, AssignmentSection, ExecutionStatus, SectionStatus, TeamRole, WorkflowStage,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    numbering::{month_prefix, serial_number, DocumentKind},
    services::audit::log_activity,
};
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const ENTITY: &str = "assignment";

/// Tolerance on the revenue-share sum around 100%.
pub const SHARE_SUM_TOLERANCE: Decimal = dec!(0.01);

/// Per-assignment mutual exclusion for section-approval read-modify-write
/// cycles.
#[derive(Default)]
pub struct AssignmentLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl AssignmentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterAssignmentRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,
    pub client_type: Option<String>,
    pub domain: Option<String>,
    pub sub_domain: Option<String>,
    #[validate(length(min = 1, message = "Office code is required"))]
    pub office_code: String,
    pub total_value: Decimal,
    pub work_order_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueShareInput {
    pub officer_id: Uuid,
    pub share_percent: Decimal,
}

/// Service for the assignment workflow engine.
#[derive(Clone)]
pub struct AssignmentService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    locks: Arc<AssignmentLocks>,
}

impl AssignmentService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        locks: Arc<AssignmentLocks>,
    ) -> Self {
        Self {
            db,
            event_sender,
            locks,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send assignment event");
            }
        }
    }

    /// Register a work order. Registration starts PENDING with all four
    /// section gates in DRAFT.
    #[instrument(skip(self, request, creator), fields(office_code = %request.office_code))]
    pub async fn register(
        &self,
        request: RegisterAssignmentRequest,
        creator: &Principal,
    ) -> Result<assignment::Model, ServiceError> {
        request.validate()?;
        if request.total_value < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "contract value cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let prefix = month_prefix(DocumentKind::WorkOrder, &request.office_code, now.date_naive());
        let existing = AssignmentEntity::find()
            .filter(assignment::Column::AssignmentNo.starts_with(&prefix))
            .count(&txn)
            .await?;
        let assignment_no = serial_number(&prefix, existing);

        let model = assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            assignment_no: Set(assignment_no.clone()),
            title: Set(request.title),
            client_name: Set(request.client_name),
            client_type: Set(request.client_type),
            domain: Set(request.domain),
            sub_domain: Set(request.sub_domain),
            office_code: Set(request.office_code),
            proposal_id: Set(None),
            enquiry_id: Set(None),
            team_leader_officer_id: Set(None),
            work_order_date: Set(request.work_order_date),
            start_date: Set(request.start_date),
            target_date: Set(request.target_date),
            total_value: Set(request.total_value.round_dp(2)),
            invoice_amount: Set(Decimal::ZERO),
            amount_received: Set(Decimal::ZERO),
            total_expenditure: Set(Decimal::ZERO),
            shareable_revenue: Set(Decimal::ZERO),
            physical_progress_percent: Set(Decimal::ZERO),
            timeline_progress_percent: Set(Decimal::ZERO),
            status: Set(ExecutionStatus::NotStarted),
            workflow_stage: Set(WorkflowStage::Registration),
            approval_status: Set(ApprovalStatus::Pending),
            cost_approval_status: Set(SectionStatus::Draft),
            cost_submitted_by: Set(None),
            cost_submitted_at: Set(None),
            cost_approved_by: Set(None),
            cost_approved_at: Set(None),
            team_approval_status: Set(SectionStatus::Draft),
            team_submitted_by: Set(None),
            team_submitted_at: Set(None),
            team_approved_by: Set(None),
            team_approved_at: Set(None),
            milestone_approval_status: Set(SectionStatus::Draft),
            milestone_submitted_by: Set(None),
            milestone_submitted_at: Set(None),
            milestone_approved_by: Set(None),
            milestone_approved_at: Set(None),
            revenue_approval_status: Set(SectionStatus::Draft),
            revenue_submitted_by: Set(None),
            revenue_submitted_at: Set(None),
            revenue_approved_by: Set(None),
            revenue_approved_at: Set(None),
            remarks: Set(request.remarks),
            created_by: Set(creator.officer_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        }
        .insert(&txn)
        .await?;

        log_activity(
            &txn,
            creator.officer_id,
            "CREATE",
            ENTITY,
            model.id,
            Some(format!("Registered work order {}", assignment_no)),
        )
        .await?;
        txn.commit().await?;

        info!(assignment_id = %model.id, number = %assignment_no, "assignment registered");
        self.emit(Event::AssignmentRegistered(model.id)).await;

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<assignment::Model, ServiceError> {
        AssignmentEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))
    }

    #[instrument(skip(self))]
    pub async fn list_by_office(
        &self,
        office_code: &str,
    ) -> Result<Vec<assignment::Model>, ServiceError> {
        Ok(AssignmentEntity::find()
            .filter(assignment::Column::OfficeCode.eq(office_code))
            .order_by_desc(assignment::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Head approves the registration; the workflow advances to
    /// TL_ASSIGNMENT.
    #[instrument(skip(self, approver))]
    pub async fn approve_registration(
        &self,
        id: Uuid,
        approver: &Principal,
    ) -> Result<assignment::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(format!(
                "approval of assignments for office {} requires Head authority",
                record.office_code
            )));
        }
        if !ApprovalStatus::can_transition(record.approval_status, ApprovalStatus::Approved) {
            return Err(ServiceError::bad_transition(
                "registration approval",
                record.approval_status,
                ApprovalStatus::Approved,
            ));
        }
        if !WorkflowStage::can_transition(record.workflow_stage, WorkflowStage::TlAssignment) {
            return Err(ServiceError::bad_transition(
                "workflow stage",
                record.workflow_stage,
                WorkflowStage::TlAssignment,
            ));
        }

        let version = record.version;
        let mut active: assignment::ActiveModel = record.into();
        active.approval_status = Set(ApprovalStatus::Approved);
        active.workflow_stage = Set(WorkflowStage::TlAssignment);
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            approver.officer_id,
            "APPROVE",
            ENTITY,
            id,
            Some("Registration approved".to_string()),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::AssignmentRegistrationApproved(id)).await;

        Ok(updated)
    }

    /// Head rejects the registration.
    #[instrument(skip(self, approver, reason))]
    pub async fn reject_registration(
        &self,
        id: Uuid,
        approver: &Principal,
        reason: String,
    ) -> Result<assignment::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(format!(
                "rejection of assignments for office {} requires Head authority",
                record.office_code
            )));
        }
        if !ApprovalStatus::can_transition(record.approval_status, ApprovalStatus::Rejected) {
            return Err(ServiceError::bad_transition(
                "registration approval",
                record.approval_status,
                ApprovalStatus::Rejected,
            ));
        }

        let version = record.version;
        let mut active: assignment::ActiveModel = record.into();
        active.approval_status = Set(ApprovalStatus::Rejected);
        active.remarks = Set(Some(reason.clone()));
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        log_activity(&txn, approver.officer_id, "REJECT", ENTITY, id, Some(reason)).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Head allocates the Team Leader; the workflow advances to
    /// DETAIL_ENTRY and the TL joins the team roster.
    #[instrument(skip(self, approver))]
    pub async fn allocate_team_leader(
        &self,
        id: Uuid,
        approver: &Principal,
        officer_id: Uuid,
    ) -> Result<assignment::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(
                "team-leader allocation requires Head authority".to_string(),
            ));
        }
        if !WorkflowStage::can_transition(record.workflow_stage, WorkflowStage::DetailEntry) {
            return Err(ServiceError::bad_transition(
                "workflow stage",
                record.workflow_stage,
                WorkflowStage::DetailEntry,
            ));
        }

        assignment_team::ActiveModel {
            id: Set(Uuid::new_v4()),
            assignment_id: Set(id),
            officer_id: Set(officer_id),
            role: Set(TeamRole::TeamLeader),
            is_active: Set(true),
            assigned_by: Set(approver.officer_id),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let version = record.version;
        let mut active: assignment::ActiveModel = record.into();
        active.team_leader_officer_id = Set(Some(officer_id));
        active.workflow_stage = Set(WorkflowStage::DetailEntry);
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            approver.officer_id,
            "UPDATE",
            ENTITY,
            id,
            Some(format!("Team leader allocated: {}", officer_id)),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::TeamLeaderAllocated {
            assignment_id: id,
            officer_id,
        })
        .await;

        Ok(updated)
    }

    /// Team Leader submits one section for Head approval. Submitting an
    /// already-SUBMITTED section is an idempotent no-op.
    #[instrument(skip(self, submitter))]
    pub async fn submit_section(
        &self,
        id: Uuid,
        section: AssignmentSection,
        submitter: &Principal,
    ) -> Result<assignment::Model, ServiceError> {
        let lock = self.locks.lock_for(id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        ensure_team_leader(submitter, &record)?;

        let current = record.section_status(section);
        if current == SectionStatus::Submitted {
            txn.commit().await?;
            return Ok(record);
        }
        if !SectionStatus::can_transition(current, SectionStatus::Submitted) {
            return Err(ServiceError::bad_transition(
                &format!("{section} section"),
                current,
                SectionStatus::Submitted,
            ));
        }

        self.check_section_content(&txn, &record, section).await?;

        let version = record.version;
        let mut active: assignment::ActiveModel = record.into();
        active.set_section_status(section, SectionStatus::Submitted);
        active.set_section_submitted(section, submitter.officer_id, now);
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            submitter.officer_id,
            "SUBMIT",
            ENTITY,
            id,
            Some(format!("{section} section submitted for approval")),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::SectionSubmitted {
            assignment_id: id,
            section,
        })
        .await;

        Ok(updated)
    }

    /// Head approves one section. If this approval closes the last open
    /// gate while the workflow sits at DETAIL_ENTRY, the assignment goes
    /// ACTIVE in the same transaction.
    #[instrument(skip(self, approver))]
    pub async fn approve_section(
        &self,
        id: Uuid,
        section: AssignmentSection,
        approver: &Principal,
    ) -> Result<assignment::Model, ServiceError> {
        let lock = self.locks.lock_for(id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(format!(
                "section approval for office {} requires Head authority",
                record.office_code
            )));
        }

        let current = record.section_status(section);
        if !SectionStatus::can_transition(current, SectionStatus::Approved) {
            return Err(ServiceError::bad_transition(
                &format!("{section} section"),
                current,
                SectionStatus::Approved,
            ));
        }

        let version = record.version;
        let stage = record.workflow_stage;
        let registration = record.approval_status;

        // Evaluate activation against the post-approval section states.
        let all_approved = AssignmentSection::ALL.iter().all(|s| {
            *s == section || record.section_status(*s) == SectionStatus::Approved
        });
        let activate = stage == WorkflowStage::DetailEntry
            && registration == ApprovalStatus::Approved
            && all_approved;

        let mut active: assignment::ActiveModel = record.into();
        active.set_section_status(section, SectionStatus::Approved);
        active.set_section_approved(section, approver.officer_id, now);
        if activate {
            active.workflow_stage = Set(WorkflowStage::Active);
            active.status = Set(ExecutionStatus::InProgress);
        }
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            approver.officer_id,
            "APPROVE",
            ENTITY,
            id,
            Some(format!("{section} section approved")),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::SectionApproved {
            assignment_id: id,
            section,
        })
        .await;
        if activate {
            info!(assignment_id = %id, "all gates approved, assignment activated");
            self.emit(Event::AssignmentActivated(id)).await;
        }

        Ok(updated)
    }

    /// Head rejects one section; the Team Leader must revise and resubmit.
    #[instrument(skip(self, approver, reason))]
    pub async fn reject_section(
        &self,
        id: Uuid,
        section: AssignmentSection,
        approver: &Principal,
        reason: String,
    ) -> Result<assignment::Model, ServiceError> {
        let lock = self.locks.lock_for(id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(format!(
                "section rejection for office {} requires Head authority",
                record.office_code
            )));
        }

        let current = record.section_status(section);
        if !SectionStatus::can_transition(current, SectionStatus::Rejected) {
            return Err(ServiceError::bad_transition(
                &format!("{section} section"),
                current,
                SectionStatus::Rejected,
            ));
        }

        let version = record.version;
        let mut active: assignment::ActiveModel = record.into();
        active.set_section_status(section, SectionStatus::Rejected);
        active.remarks = Set(Some(reason.clone()));
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        log_activity(&txn, approver.officer_id, "REJECT", ENTITY, id, Some(reason)).await?;
        txn.commit().await?;

        self.emit(Event::SectionRejected {
            assignment_id: id,
            section,
        })
        .await;

        Ok(updated)
    }

    /// Team Leader updates the cost estimate. An APPROVED cost section
    /// drops back to SUBMITTED, revoking ACTIVE eligibility until
    /// re-approved.
    #[instrument(skip(self, editor))]
    pub async fn edit_cost_estimate(
        &self,
        id: Uuid,
        editor: &Principal,
        total_expenditure: Decimal,
    ) -> Result<assignment::Model, ServiceError> {
        if total_expenditure < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "expenditure cannot be negative".to_string(),
            ));
        }

        let lock = self.locks.lock_for(id);
        let _guard = lock.lock().await;

        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        ensure_team_leader(editor, &record)?;

        let (updated, deactivated) = apply_section_edit(
            &txn,
            record,
            AssignmentSection::Cost,
            editor.officer_id,
            |active| {
                active.total_expenditure = Set(total_expenditure.round_dp(2));
            },
        )
        .await?;

        txn.commit().await?;

        self.emit_section_reset(id, AssignmentSection::Cost, deactivated)
            .await;

        Ok(updated)
    }

    /// Team Leader adds an officer to the roster (team section content).
    #[instrument(skip(self, editor))]
    pub async fn add_team_member(
        &self,
        id: Uuid,
        editor: &Principal,
        officer_id: Uuid,
    ) -> Result<assignment::Model, ServiceError> {
        let lock = self.locks.lock_for(id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        ensure_team_leader(editor, &record)?;

        let already = assignment_team::Entity::find()
            .filter(assignment_team::Column::AssignmentId.eq(id))
            .filter(assignment_team::Column::OfficerId.eq(officer_id))
            .filter(assignment_team::Column::IsActive.eq(true))
            .count(&txn)
            .await?;
        if already > 0 {
            return Err(ServiceError::Conflict(format!(
                "officer {} is already on the team",
                officer_id
            )));
        }

        assignment_team::ActiveModel {
            id: Set(Uuid::new_v4()),
            assignment_id: Set(id),
            officer_id: Set(officer_id),
            role: Set(TeamRole::Member),
            is_active: Set(true),
            assigned_by: Set(editor.officer_id),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let (updated, deactivated) = apply_section_edit(
            &txn,
            record,
            AssignmentSection::Team,
            editor.officer_id,
            |_| {},
        )
        .await?;

        txn.commit().await?;

        self.emit_section_reset(id, AssignmentSection::Team, deactivated)
            .await;

        Ok(updated)
    }

    /// Team Leader replaces the revenue-share allocation. Percentages must
    /// sum to 100 within the 0.01 tolerance.
    #[instrument(skip(self, editor, shares))]
    pub async fn set_revenue_shares(
        &self,
        id: Uuid,
        editor: &Principal,
        shares: Vec<RevenueShareInput>,
    ) -> Result<assignment::Model, ServiceError> {
        if shares.is_empty() {
            return Err(ServiceError::ValidationError(
                "at least one revenue share is required".to_string(),
            ));
        }
        for share in &shares {
            if share.share_percent <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "share percent for officer {} must be positive",
                    share.officer_id
                )));
            }
        }
        let total: Decimal = shares.iter().map(|s| s.share_percent).sum();
        if (total - Decimal::ONE_HUNDRED).abs() > SHARE_SUM_TOLERANCE {
            return Err(ServiceError::ValidationError(format!(
                "revenue shares must sum to 100, got {}",
                total
            )));
        }

        let lock = self.locks.lock_for(id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        ensure_team_leader(editor, &record)?;

        revenue_share::Entity::delete_many()
            .filter(revenue_share::Column::AssignmentId.eq(id))
            .exec(&txn)
            .await?;

        let shareable = record.shareable_revenue;
        for share in &shares {
            revenue_share::ActiveModel {
                id: Set(Uuid::new_v4()),
                assignment_id: Set(id),
                officer_id: Set(share.officer_id),
                share_percent: Set(share.share_percent),
                share_amount: Set(
                    (shareable * share.share_percent / Decimal::ONE_HUNDRED).round_dp(2),
                ),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            }
            .insert(&txn)
            .await?;
        }

        let (updated, deactivated) = apply_section_edit(
            &txn,
            record,
            AssignmentSection::Revenue,
            editor.officer_id,
            |_| {},
        )
        .await?;

        txn.commit().await?;

        self.emit_section_reset(id, AssignmentSection::Revenue, deactivated)
            .await;

        Ok(updated)
    }

    /// Current roster of an assignment.
    #[instrument(skip(self))]
    pub async fn team_roster(
        &self,
        id: Uuid,
    ) -> Result<Vec<assignment_team::Model>, ServiceError> {
        Ok(assignment_team::Entity::find()
            .filter(assignment_team::Column::AssignmentId.eq(id))
            .filter(assignment_team::Column::IsActive.eq(true))
            .order_by_asc(assignment_team::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Mark delivery finished. Only an ACTIVE assignment can complete.
    #[instrument(skip(self, actor))]
    pub async fn complete(
        &self,
        id: Uuid,
        actor: &Principal,
    ) -> Result<assignment::Model, ServiceError> {
        let lock = self.locks.lock_for(id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", id))?;

        ensure_team_leader(actor, &record)?;

        if !WorkflowStage::can_transition(record.workflow_stage, WorkflowStage::Completed) {
            return Err(ServiceError::bad_transition(
                "workflow stage",
                record.workflow_stage,
                WorkflowStage::Completed,
            ));
        }

        let version = record.version;
        let mut active: assignment::ActiveModel = record.into();
        active.workflow_stage = Set(WorkflowStage::Completed);
        active.status = Set(ExecutionStatus::Completed);
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            actor.officer_id,
            "UPDATE",
            ENTITY,
            id,
            Some("Assignment completed".to_string()),
        )
        .await?;
        txn.commit().await?;

        Ok(updated)
    }

    async fn emit_section_reset(
        &self,
        id: Uuid,
        section: AssignmentSection,
        deactivated: bool,
    ) {
        self.emit(Event::SectionReopened {
            assignment_id: id,
            section,
        })
        .await;
        if deactivated {
            self.emit(Event::AssignmentDeactivated(id)).await;
        }
    }

    /// Submission preconditions: a section cannot go to SUBMITTED while
    /// its backing content is empty.
    async fn check_section_content<C: ConnectionTrait>(
        &self,
        conn: &C,
        record: &assignment::Model,
        section: AssignmentSection,
    ) -> Result<(), ServiceError> {
        match section {
            AssignmentSection::Cost => {
                if record.total_expenditure <= Decimal::ZERO {
                    return Err(ServiceError::ValidationError(
                        "cost estimate has no expenditure entered".to_string(),
                    ));
                }
            }
            AssignmentSection::Team => {
                let count = assignment_team::Entity::find()
                    .filter(assignment_team::Column::AssignmentId.eq(record.id))
                    .filter(assignment_team::Column::IsActive.eq(true))
                    .count(conn)
                    .await?;
                if count == 0 {
                    return Err(ServiceError::ValidationError(
                        "team constitution has no members".to_string(),
                    ));
                }
            }
            AssignmentSection::Milestone => {
                let count = milestone::Entity::find()
                    .filter(milestone::Column::AssignmentId.eq(record.id))
                    .count(conn)
                    .await?;
                if count == 0 {
                    return Err(ServiceError::ValidationError(
                        "milestone plan has no milestones".to_string(),
                    ));
                }
            }
            AssignmentSection::Revenue => {
                let shares = revenue_share::Entity::find()
                    .filter(revenue_share::Column::AssignmentId.eq(record.id))
                    .all(conn)
                    .await?;
                if shares.is_empty() {
                    return Err(ServiceError::ValidationError(
                        "no revenue shares entered".to_string(),
                    ));
                }
                let total: Decimal = shares.iter().map(|s| s.share_percent).sum();
                if (total - Decimal::ONE_HUNDRED).abs() > SHARE_SUM_TOLERANCE {
                    return Err(ServiceError::ValidationError(format!(
                        "revenue shares must sum to 100, got {}",
                        total
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The Team Leader owns assignment content; Heads and senior management
/// may step in.
pub(crate) fn ensure_team_leader(
    actor: &Principal,
    record: &assignment::Model,
) -> Result<(), ServiceError> {
    if record.team_leader_officer_id == Some(actor.officer_id)
        || actor.is_office_head(&record.office_code)
    {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized(
            "only the Team Leader or an office Head may perform this action".to_string(),
        ))
    }
}

/// Apply a content edit to one section inside the caller's transaction.
///
/// If the section was APPROVED it is reset to SUBMITTED, and an ACTIVE
/// assignment is pushed back to DETAIL_ENTRY so the activation invariant
/// is re-established before the next approval. Returns the updated row
/// and whether a deactivation happened.
pub(crate) async fn apply_section_edit<C, F>(
    conn: &C,
    record: assignment::Model,
    section: AssignmentSection,
    editor_id: Uuid,
    mutate: F,
) -> Result<(assignment::Model, bool), ServiceError>
where
    C: ConnectionTrait,
    F: FnOnce(&mut assignment::ActiveModel),
{
    let now = Utc::now();
    let was_approved = record.section_status(section) == SectionStatus::Approved;
    let deactivate = was_approved && record.workflow_stage == WorkflowStage::Active;

    let id = record.id;
    let version = record.version;
    let mut active: assignment::ActiveModel = record.into();
    mutate(&mut active);
    if was_approved {
        active.set_section_status(section, SectionStatus::Submitted);
        active.set_section_submitted(section, editor_id, now);
    }
    if deactivate {
        active.workflow_stage = Set(WorkflowStage::DetailEntry);
    }
    active.updated_at = Set(Some(now));
    active.version = Set(version + 1);
    let updated = active.update(conn).await?;

    let remark = if was_approved {
        format!("{section} section edited, approval reset")
    } else {
        format!("{section} section edited")
    };
    log_activity(conn, editor_id, "UPDATE", ENTITY, id, Some(remark)).await?;

    Ok((updated, deactivate))
}
