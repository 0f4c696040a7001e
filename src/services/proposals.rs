//! Stage 3 of the opportunity pipeline: proposals.
//!
//! Beyond the shared approval pattern, proposals carry an outcome ladder
//! (SUBMITTED -> UNDER_REVIEW -> WON/LOST/WITHDRAWN); only a WON proposal
//! converts into a work order.

use crate::{
    auth::Principal,
    db::DbPool,
    entities::assignment,
    entities::proposal::{self, Entity as ProposalEntity},
    entities::status::{
        ApprovalStatus, ExecutionStatus, PipelineStage, PipelineStatus, SectionStatus,
        WorkflowStage,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    numbering::{month_prefix, serial_number, DocumentKind},
    services::audit::log_activity,
    services::enquiries::ensure_allocated_or_head,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const STAGE: PipelineStage = PipelineStage::Proposal;
const ENTITY: &str = "proposal";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProposalRequest {
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,
    pub client_type: Option<String>,
    pub domain: Option<String>,
    pub sub_domain: Option<String>,
    #[validate(length(min = 1, message = "Office code is required"))]
    pub office_code: String,
    pub officer_id: Option<Uuid>,
    pub description: Option<String>,
    pub estimated_value: Option<Decimal>,
    pub proposed_value: Option<Decimal>,
    pub target_date: Option<NaiveDate>,
    pub validity_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

/// Client decision on a submitted proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalOutcome {
    Won,
    Lost,
    Withdrawn,
}

/// Service for the proposal stage of the opportunity pipeline.
#[derive(Clone)]
pub struct ProposalService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProposalService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send proposal event");
            }
        }
    }

    /// Create a proposal directly, without a parent proposal request.
    #[instrument(skip(self, request, creator), fields(office_code = %request.office_code))]
    pub async fn create(
        &self,
        request: CreateProposalRequest,
        creator: &Principal,
    ) -> Result<proposal::Model, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let prefix = month_prefix(DocumentKind::Proposal, &request.office_code, now.date_naive());
        let existing = ProposalEntity::find()
            .filter(proposal::Column::ProposalNumber.starts_with(&prefix))
            .count(&txn)
            .await?;
        let proposal_number = serial_number(&prefix, existing);

        let is_head = creator.is_office_head(&request.office_code);
        let (status, approval_status) = if is_head {
            (PipelineStatus::Approved, ApprovalStatus::Approved)
        } else {
            (PipelineStatus::PendingApproval, ApprovalStatus::Pending)
        };

        let model = proposal::ActiveModel {
            id: Set(Uuid::new_v4()),
            proposal_number: Set(proposal_number.clone()),
            pr_id: Set(None),
            enquiry_id: Set(None),
            client_name: Set(request.client_name),
            client_type: Set(request.client_type),
            domain: Set(request.domain),
            sub_domain: Set(request.sub_domain),
            office_code: Set(request.office_code),
            officer_id: Set(if is_head { request.officer_id } else { None }),
            description: Set(request.description),
            estimated_value: Set(request.estimated_value),
            proposed_value: Set(request.proposed_value),
            work_order_value: Set(None),
            submission_date: Set(None),
            target_date: Set(request.target_date),
            validity_date: Set(request.validity_date),
            status: Set(status),
            approval_status: Set(approval_status),
            approved_by: Set(is_head.then_some(creator.officer_id)),
            approved_at: Set(is_head.then_some(now)),
            rejection_reason: Set(None),
            current_update: Set(None),
            drop_reason: Set(None),
            loss_reason: Set(None),
            withdraw_reason: Set(None),
            remarks: Set(request.remarks),
            created_by: Set(creator.officer_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        log_activity(
            &txn,
            creator.officer_id,
            "CREATE",
            ENTITY,
            model.id,
            Some(format!("Created proposal {}", proposal_number)),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::ProposalCreated(model.id)).await;

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<proposal::Model, ServiceError> {
        ProposalEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))
    }

    #[instrument(skip(self))]
    pub async fn list_by_office(
        &self,
        office_code: &str,
    ) -> Result<Vec<proposal::Model>, ServiceError> {
        Ok(ProposalEntity::find()
            .filter(proposal::Column::OfficeCode.eq(office_code))
            .order_by_desc(proposal::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, approver))]
    pub async fn approve(
        &self,
        id: Uuid,
        approver: &Principal,
        allocated_officer: Uuid,
    ) -> Result<proposal::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(format!(
                "approval of proposals for office {} requires Head authority",
                record.office_code
            )));
        }
        if !ApprovalStatus::can_transition(record.approval_status, ApprovalStatus::Approved) {
            return Err(ServiceError::bad_transition(
                "proposal approval",
                record.approval_status,
                ApprovalStatus::Approved,
            ));
        }

        let mut active: proposal::ActiveModel = record.into();
        active.status = Set(PipelineStatus::Approved);
        active.approval_status = Set(ApprovalStatus::Approved);
        active.officer_id = Set(Some(allocated_officer));
        active.approved_by = Set(Some(approver.officer_id));
        active.approved_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            approver.officer_id,
            "APPROVE",
            ENTITY,
            id,
            Some("Proposal approved".to_string()),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::ProposalApproved(id)).await;

        Ok(updated)
    }

    #[instrument(skip(self, approver, reason))]
    pub async fn reject(
        &self,
        id: Uuid,
        approver: &Principal,
        reason: String,
    ) -> Result<proposal::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(format!(
                "rejection of proposals for office {} requires Head authority",
                record.office_code
            )));
        }
        if !ApprovalStatus::can_transition(record.approval_status, ApprovalStatus::Rejected) {
            return Err(ServiceError::bad_transition(
                "proposal approval",
                record.approval_status,
                ApprovalStatus::Rejected,
            ));
        }

        let mut active: proposal::ActiveModel = record.into();
        active.status = Set(PipelineStatus::Rejected);
        active.approval_status = Set(ApprovalStatus::Rejected);
        active.rejection_reason = Set(Some(reason.clone()));
        active.approved_by = Set(Some(approver.officer_id));
        active.approved_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        log_activity(&txn, approver.officer_id, "REJECT", ENTITY, id, Some(reason)).await?;
        txn.commit().await?;

        Ok(updated)
    }

    #[instrument(skip(self, approver))]
    pub async fn reallocate(
        &self,
        id: Uuid,
        approver: &Principal,
        new_officer: Uuid,
    ) -> Result<proposal::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(
                "reallocation requires Head authority".to_string(),
            ));
        }

        let mut active: proposal::ActiveModel = record.into();
        active.officer_id = Set(Some(new_officer));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            approver.officer_id,
            "UPDATE",
            ENTITY,
            id,
            Some(format!("Reallocated to officer {}", new_officer)),
        )
        .await?;
        txn.commit().await?;

        Ok(updated)
    }

    #[instrument(skip(self, actor, note))]
    pub async fn update_progress(
        &self,
        id: Uuid,
        actor: &Principal,
        note: String,
        new_status: Option<PipelineStatus>,
    ) -> Result<proposal::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        ensure_allocated_or_head(actor, record.officer_id, &record.office_code)?;

        let next = match new_status {
            Some(status) => {
                if !PipelineStatus::can_transition(STAGE, record.status, status) {
                    return Err(ServiceError::bad_transition(
                        "proposal status",
                        record.status,
                        status,
                    ));
                }
                status
            }
            None if record.status == PipelineStatus::Approved => PipelineStatus::InProgress,
            None => record.status,
        };

        let combined = match &record.current_update {
            Some(existing) => format!("{existing}\n{note}"),
            None => note.clone(),
        };

        let mut active: proposal::ActiveModel = record.into();
        active.status = Set(next);
        active.current_update = Set(Some(combined));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(&txn, actor.officer_id, "UPDATE", ENTITY, id, Some(note)).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Record submission of the proposal to the client.
    #[instrument(skip(self, actor))]
    pub async fn mark_submitted(
        &self,
        id: Uuid,
        actor: &Principal,
        submission_date: NaiveDate,
    ) -> Result<proposal::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        ensure_allocated_or_head(actor, record.officer_id, &record.office_code)?;

        if !PipelineStatus::can_transition(STAGE, record.status, PipelineStatus::Submitted) {
            return Err(ServiceError::bad_transition(
                "proposal status",
                record.status,
                PipelineStatus::Submitted,
            ));
        }

        let mut active: proposal::ActiveModel = record.into();
        active.status = Set(PipelineStatus::Submitted);
        active.submission_date = Set(Some(submission_date));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            actor.officer_id,
            "SUBMIT",
            ENTITY,
            id,
            Some("Proposal submitted to client".to_string()),
        )
        .await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Record the client's decision. A WON proposal stores the final
    /// work-order value; LOST/WITHDRAWN store the reason.
    #[instrument(skip(self, actor, reason))]
    pub async fn record_outcome(
        &self,
        id: Uuid,
        actor: &Principal,
        outcome: ProposalOutcome,
        work_order_value: Option<Decimal>,
        reason: Option<String>,
    ) -> Result<proposal::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        ensure_allocated_or_head(actor, record.officer_id, &record.office_code)?;

        let to = match outcome {
            ProposalOutcome::Won => PipelineStatus::Won,
            ProposalOutcome::Lost => PipelineStatus::Lost,
            ProposalOutcome::Withdrawn => PipelineStatus::Withdrawn,
        };
        if !PipelineStatus::can_transition(STAGE, record.status, to) {
            return Err(ServiceError::bad_transition("proposal status", record.status, to));
        }

        let mut active: proposal::ActiveModel = record.into();
        active.status = Set(to);
        match outcome {
            ProposalOutcome::Won => {
                active.work_order_value = Set(work_order_value);
            }
            ProposalOutcome::Lost => {
                active.loss_reason = Set(reason.clone());
            }
            ProposalOutcome::Withdrawn => {
                active.withdraw_reason = Set(reason.clone());
            }
        }
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            actor.officer_id,
            "UPDATE",
            ENTITY,
            id,
            Some(format!("Proposal outcome: {to}")),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::ProposalOutcome {
            proposal_id: id,
            outcome: to.to_string(),
        })
        .await;

        Ok(updated)
    }

    /// Converts a WON proposal into a registered work order. The new
    /// assignment starts at workflow stage REGISTRATION with every section
    /// gate in DRAFT.
    #[instrument(skip(self, actor))]
    pub async fn convert(
        &self,
        id: Uuid,
        actor: &Principal,
    ) -> Result<(proposal::Model, assignment::Model), ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        ensure_allocated_or_head(actor, record.officer_id, &record.office_code)?;

        if !record.status.can_convert(STAGE) {
            return Err(ServiceError::bad_transition(
                "proposal status",
                record.status,
                STAGE.converted_status(),
            ));
        }

        let prefix = month_prefix(DocumentKind::WorkOrder, &record.office_code, now.date_naive());
        let existing = assignment::Entity::find()
            .filter(assignment::Column::AssignmentNo.starts_with(&prefix))
            .count(&txn)
            .await?;
        let assignment_no = serial_number(&prefix, existing);

        let total_value = record
            .work_order_value
            .or(record.proposed_value)
            .or(record.estimated_value)
            .unwrap_or(Decimal::ZERO);

        let new_assignment = assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            assignment_no: Set(assignment_no.clone()),
            title: Set(format!("{} - {}", record.client_name, assignment_no)),
            client_name: Set(record.client_name.clone()),
            client_type: Set(record.client_type.clone()),
            domain: Set(record.domain.clone()),
            sub_domain: Set(record.sub_domain.clone()),
            office_code: Set(record.office_code.clone()),
            proposal_id: Set(Some(record.id)),
            enquiry_id: Set(record.enquiry_id),
            team_leader_officer_id: Set(None),
            work_order_date: Set(Some(now.date_naive())),
            start_date: Set(None),
            target_date: Set(record.target_date),
            total_value: Set(total_value),
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
            remarks: Set(None),
            created_by: Set(actor.officer_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        }
        .insert(&txn)
        .await?;

        let mut active: proposal::ActiveModel = record.into();
        active.status = Set(PipelineStatus::ConvertedToWorkOrder);
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            actor.officer_id,
            "CONVERT",
            ENTITY,
            id,
            Some(format!("Converted to work order {}", assignment_no)),
        )
        .await?;
        txn.commit().await?;

        info!(proposal_id = %id, assignment_id = %new_assignment.id, "proposal converted to work order");
        self.emit(Event::ProposalConverted {
            proposal_id: id,
            assignment_id: new_assignment.id,
        })
        .await;

        Ok((updated, new_assignment))
    }

    #[instrument(skip(self, approver, reason))]
    pub async fn drop(
        &self,
        id: Uuid,
        approver: &Principal,
        reason: String,
    ) -> Result<proposal::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(
                "dropping a proposal requires Head authority".to_string(),
            ));
        }
        if !PipelineStatus::can_transition(STAGE, record.status, PipelineStatus::Dropped) {
            return Err(ServiceError::bad_transition(
                "proposal status",
                record.status,
                PipelineStatus::Dropped,
            ));
        }

        let mut active: proposal::ActiveModel = record.into();
        active.status = Set(PipelineStatus::Dropped);
        active.drop_reason = Set(Some(reason.clone()));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(&txn, approver.officer_id, "DROP", ENTITY, id, Some(reason)).await?;
        txn.commit().await?;

        Ok(updated)
    }

    #[instrument(skip(self, actor))]
    pub async fn hold(&self, id: Uuid, actor: &Principal) -> Result<proposal::Model, ServiceError> {
        self.move_status(id, actor, PipelineStatus::OnHold, "HOLD").await
    }

    #[instrument(skip(self, actor))]
    pub async fn resume(
        &self,
        id: Uuid,
        actor: &Principal,
    ) -> Result<proposal::Model, ServiceError> {
        self.move_status(id, actor, PipelineStatus::InProgress, "RESUME")
            .await
    }

    async fn move_status(
        &self,
        id: Uuid,
        actor: &Principal,
        to: PipelineStatus,
        action: &str,
    ) -> Result<proposal::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = ProposalEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal", id))?;

        ensure_allocated_or_head(actor, record.officer_id, &record.office_code)?;

        if !PipelineStatus::can_transition(STAGE, record.status, to) {
            return Err(ServiceError::bad_transition("proposal status", record.status, to));
        }

        let mut active: proposal::ActiveModel = record.into();
        active.status = Set(to);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(&txn, actor.officer_id, action, ENTITY, id, None).await?;
        txn.commit().await?;

        Ok(updated)
    }
}
