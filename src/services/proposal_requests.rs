//! Stage 2 of the opportunity pipeline: proposal requests.

use crate::{
    auth::Principal,
    db::DbPool,
    entities::proposal,
    entities::proposal_request::{self, Entity as PrEntity},
    entities::status::{ApprovalStatus, PipelineStage, PipelineStatus},
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

const STAGE: PipelineStage = PipelineStage::ProposalRequest;
const ENTITY: &str = "proposal_request";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProposalRequestRequest {
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
    pub target_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

/// Service for the proposal-request stage of the opportunity pipeline.
#[derive(Clone)]
pub struct ProposalRequestService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProposalRequestService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send proposal-request event");
            }
        }
    }

    /// Create a proposal request directly, without a parent enquiry.
    #[instrument(skip(self, request, creator), fields(office_code = %request.office_code))]
    pub async fn create(
        &self,
        request: CreateProposalRequestRequest,
        creator: &Principal,
    ) -> Result<proposal_request::Model, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let prefix = month_prefix(
            DocumentKind::ProposalRequest,
            &request.office_code,
            now.date_naive(),
        );
        let existing = PrEntity::find()
            .filter(proposal_request::Column::PrNumber.starts_with(&prefix))
            .count(&txn)
            .await?;
        let pr_number = serial_number(&prefix, existing);

        let is_head = creator.is_office_head(&request.office_code);
        let (status, approval_status) = if is_head {
            (PipelineStatus::Approved, ApprovalStatus::Approved)
        } else {
            (PipelineStatus::PendingApproval, ApprovalStatus::Pending)
        };

        let model = proposal_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            pr_number: Set(pr_number.clone()),
            enquiry_id: Set(None),
            client_name: Set(request.client_name),
            client_type: Set(request.client_type),
            domain: Set(request.domain),
            sub_domain: Set(request.sub_domain),
            office_code: Set(request.office_code),
            officer_id: Set(if is_head { request.officer_id } else { None }),
            description: Set(request.description),
            estimated_value: Set(request.estimated_value),
            target_date: Set(request.target_date),
            status: Set(status),
            approval_status: Set(approval_status),
            approved_by: Set(is_head.then_some(creator.officer_id)),
            approved_at: Set(is_head.then_some(now)),
            rejection_reason: Set(None),
            current_update: Set(None),
            drop_reason: Set(None),
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
            Some(format!("Created proposal request {}", pr_number)),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::ProposalRequestCreated(model.id)).await;

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<proposal_request::Model, ServiceError> {
        PrEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal request", id))
    }

    #[instrument(skip(self))]
    pub async fn list_by_office(
        &self,
        office_code: &str,
    ) -> Result<Vec<proposal_request::Model>, ServiceError> {
        Ok(PrEntity::find()
            .filter(proposal_request::Column::OfficeCode.eq(office_code))
            .order_by_desc(proposal_request::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, approver))]
    pub async fn approve(
        &self,
        id: Uuid,
        approver: &Principal,
        allocated_officer: Uuid,
    ) -> Result<proposal_request::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = PrEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal request", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(format!(
                "approval of proposal requests for office {} requires Head authority",
                record.office_code
            )));
        }
        if !ApprovalStatus::can_transition(record.approval_status, ApprovalStatus::Approved) {
            return Err(ServiceError::bad_transition(
                "proposal-request approval",
                record.approval_status,
                ApprovalStatus::Approved,
            ));
        }

        let mut active: proposal_request::ActiveModel = record.into();
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
            Some("Proposal request approved".to_string()),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::ProposalRequestApproved(id)).await;

        Ok(updated)
    }

    #[instrument(skip(self, approver, reason))]
    pub async fn reject(
        &self,
        id: Uuid,
        approver: &Principal,
        reason: String,
    ) -> Result<proposal_request::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = PrEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal request", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(format!(
                "rejection of proposal requests for office {} requires Head authority",
                record.office_code
            )));
        }
        if !ApprovalStatus::can_transition(record.approval_status, ApprovalStatus::Rejected) {
            return Err(ServiceError::bad_transition(
                "proposal-request approval",
                record.approval_status,
                ApprovalStatus::Rejected,
            ));
        }

        let mut active: proposal_request::ActiveModel = record.into();
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
    ) -> Result<proposal_request::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = PrEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal request", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(
                "reallocation requires Head authority".to_string(),
            ));
        }

        let mut active: proposal_request::ActiveModel = record.into();
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
    ) -> Result<proposal_request::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = PrEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal request", id))?;

        ensure_allocated_or_head(actor, record.officer_id, &record.office_code)?;

        let next = match new_status {
            Some(status) => {
                if !PipelineStatus::can_transition(STAGE, record.status, status) {
                    return Err(ServiceError::bad_transition(
                        "proposal-request status",
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

        let mut active: proposal_request::ActiveModel = record.into();
        active.status = Set(next);
        active.current_update = Set(Some(combined));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(&txn, actor.officer_id, "UPDATE", ENTITY, id, Some(note)).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Converts this proposal request into a proposal, freezing it at
    /// CONVERTED_TO_PROPOSAL.
    #[instrument(skip(self, actor))]
    pub async fn convert(
        &self,
        id: Uuid,
        actor: &Principal,
    ) -> Result<(proposal_request::Model, proposal::Model), ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = PrEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal request", id))?;

        ensure_allocated_or_head(actor, record.officer_id, &record.office_code)?;

        if !record.status.can_convert(STAGE) {
            return Err(ServiceError::bad_transition(
                "proposal-request status",
                record.status,
                STAGE.converted_status(),
            ));
        }

        let prefix = month_prefix(DocumentKind::Proposal, &record.office_code, now.date_naive());
        let existing = proposal::Entity::find()
            .filter(proposal::Column::ProposalNumber.starts_with(&prefix))
            .count(&txn)
            .await?;
        let proposal_number = serial_number(&prefix, existing);

        let new_proposal = proposal::ActiveModel {
            id: Set(Uuid::new_v4()),
            proposal_number: Set(proposal_number),
            pr_id: Set(Some(record.id)),
            enquiry_id: Set(record.enquiry_id),
            client_name: Set(record.client_name.clone()),
            client_type: Set(record.client_type.clone()),
            domain: Set(record.domain.clone()),
            sub_domain: Set(record.sub_domain.clone()),
            office_code: Set(record.office_code.clone()),
            officer_id: Set(None),
            description: Set(record.description.clone()),
            estimated_value: Set(record.estimated_value),
            proposed_value: Set(None),
            work_order_value: Set(None),
            submission_date: Set(None),
            target_date: Set(record.target_date),
            validity_date: Set(None),
            status: Set(PipelineStatus::PendingApproval),
            approval_status: Set(ApprovalStatus::Pending),
            approved_by: Set(None),
            approved_at: Set(None),
            rejection_reason: Set(None),
            current_update: Set(None),
            drop_reason: Set(None),
            loss_reason: Set(None),
            withdraw_reason: Set(None),
            remarks: Set(None),
            created_by: Set(actor.officer_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        let mut active: proposal_request::ActiveModel = record.into();
        active.status = Set(PipelineStatus::ConvertedToProposal);
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            actor.officer_id,
            "CONVERT",
            ENTITY,
            id,
            Some(format!(
                "Converted to proposal {}",
                new_proposal.proposal_number
            )),
        )
        .await?;
        txn.commit().await?;

        info!(pr_id = %id, proposal_id = %new_proposal.id, "proposal request converted");
        self.emit(Event::ProposalRequestConverted {
            proposal_request_id: id,
            proposal_id: new_proposal.id,
        })
        .await;

        Ok((updated, new_proposal))
    }

    #[instrument(skip(self, approver, reason))]
    pub async fn drop(
        &self,
        id: Uuid,
        approver: &Principal,
        reason: String,
    ) -> Result<proposal_request::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = PrEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal request", id))?;

        if !approver.is_office_head(&record.office_code) {
            return Err(ServiceError::Unauthorized(
                "dropping a proposal request requires Head authority".to_string(),
            ));
        }
        if !PipelineStatus::can_transition(STAGE, record.status, PipelineStatus::Dropped) {
            return Err(ServiceError::bad_transition(
                "proposal-request status",
                record.status,
                PipelineStatus::Dropped,
            ));
        }

        let mut active: proposal_request::ActiveModel = record.into();
        active.status = Set(PipelineStatus::Dropped);
        active.drop_reason = Set(Some(reason.clone()));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(&txn, approver.officer_id, "DROP", ENTITY, id, Some(reason)).await?;
        txn.commit().await?;

        Ok(updated)
    }

    #[instrument(skip(self, actor))]
    pub async fn hold(
        &self,
        id: Uuid,
        actor: &Principal,
    ) -> Result<proposal_request::Model, ServiceError> {
        self.move_status(id, actor, PipelineStatus::OnHold, "HOLD").await
    }

    #[instrument(skip(self, actor))]
    pub async fn resume(
        &self,
        id: Uuid,
        actor: &Principal,
    ) -> Result<proposal_request::Model, ServiceError> {
        self.move_status(id, actor, PipelineStatus::InProgress, "RESUME")
            .await
    }

    async fn move_status(
        &self,
        id: Uuid,
        actor: &Principal,
        to: PipelineStatus,
        action: &str,
    ) -> Result<proposal_request::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let record = PrEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Proposal request", id))?;

        ensure_allocated_or_head(actor, record.officer_id, &record.office_code)?;

        if !PipelineStatus::can_transition(STAGE, record.status, to) {
            return Err(ServiceError::bad_transition(
                "proposal-request status",
                record.status,
                to,
            ));
        }

        let mut active: proposal_request::ActiveModel = record.into();
        active.status = Set(to);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        log_activity(&txn, actor.officer_id, action, ENTITY, id, None).await?;
        txn.commit().await?;

        Ok(updated)
    }
}
