//! Milestone and invoicing engine: milestone plans, invoice-request
//! approval, payment receipts, and the 80/20 revenue-recognition split.
//!
//! Approving an invoice recognizes 80% of its value and fans it out to the
//! officer ledger by revenue share; each payment receipt independently
//! recognizes 20% of the amount actually received. Both recognitions are
//! status-guarded and fully transactional: the request/receipt row, the
//! milestone flags, the assignment totals, and the ledger rows commit as
//! one unit or not at all.

use crate::{
    auth::Principal,
    db::DbPool,
    entities::assignment::{self, Entity as AssignmentEntity},
    entities::invoice_request::{self, Entity as InvoiceRequestEntity},
    entities::milestone::{self, Entity as MilestoneEntity},
    entities::officer_revenue_ledger,
    entities::payment_receipt,
    entities::revenue_share,
    entities::status::{
        AssignmentSection, InvoiceStatus, InvoiceType, MilestoneStatus, PaymentMode, RevenueType,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    fiscal::fy_period_for,
    numbering::{month_prefix, serial_number, DocumentKind},
    services::assignments::{apply_section_edit, ensure_team_leader, AssignmentLocks},
    services::audit::log_activity,
    services::revenue::{physical_progress_of, shareable_revenue_of, timeline_progress_of},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Recognition fractions of the 80/20 policy.
const INVOICE_TRANCHE: Decimal = dec!(0.80);
const PAYMENT_TRANCHE: Decimal = dec!(0.20);

/// Slack allowed on the milestone invoice_percent total.
const PERCENT_TOLERANCE: Decimal = dec!(0.01);

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MilestoneInput {
    #[validate(length(min = 1, max = 200, message = "Milestone title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub invoice_percent: Decimal,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequestInput {
    pub assignment_id: Uuid,
    pub milestone_id: Option<Uuid>,
    pub amount: Decimal,
    pub invoice_type: InvoiceType,
    pub fy_period: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub invoice_request_id: Uuid,
    pub amount_received: Decimal,
    pub receipt_date: NaiveDate,
    pub payment_mode: PaymentMode,
    pub reference_number: Option<String>,
    pub remarks: Option<String>,
}

/// Service for milestones, invoice requests and payment receipts.
#[derive(Clone)]
pub struct InvoicingService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    locks: Arc<AssignmentLocks>,
}

impl InvoicingService {
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
                warn!(error = %e, "failed to send invoicing event");
            }
        }
    }

    /// Team Leader lays out the milestone plan. New milestones are numbered
    /// after any existing ones, and the invoice_percent total across the
    /// whole plan may not exceed 100.
    #[instrument(skip(self, milestones, actor), fields(count = milestones.len()))]
    pub async fn add_milestones(
        &self,
        assignment_id: Uuid,
        milestones: Vec<MilestoneInput>,
        actor: &Principal,
    ) -> Result<Vec<milestone::Model>, ServiceError> {
        if milestones.is_empty() {
            return Err(ServiceError::ValidationError(
                "at least one milestone is required".to_string(),
            ));
        }
        for m in &milestones {
            m.validate()?;
            if m.invoice_percent <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "invoice percent for '{}' must be positive",
                    m.title
                )));
            }
        }

        let lock = self.locks.lock_for(assignment_id);
        let _guard = lock.lock().await;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(assignment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", assignment_id))?;

        ensure_team_leader(actor, &record)?;

        let existing = MilestoneEntity::find()
            .filter(milestone::Column::AssignmentId.eq(assignment_id))
            .order_by_asc(milestone::Column::MilestoneNo)
            .all(&txn)
            .await?;

        let existing_percent: Decimal = existing.iter().map(|m| m.invoice_percent).sum();
        let new_percent: Decimal = milestones.iter().map(|m| m.invoice_percent).sum();
        if existing_percent + new_percent > Decimal::ONE_HUNDRED + PERCENT_TOLERANCE {
            return Err(ServiceError::ValidationError(format!(
                "milestone invoice percentages would total {}, exceeding 100",
                existing_percent + new_percent
            )));
        }

        let mut next_no = existing.iter().map(|m| m.milestone_no).max().unwrap_or(0) + 1;
        let mut created = Vec::with_capacity(milestones.len());
        for input in milestones {
            let row = milestone::ActiveModel {
                id: Set(Uuid::new_v4()),
                assignment_id: Set(assignment_id),
                milestone_no: Set(next_no),
                title: Set(input.title),
                description: Set(input.description),
                target_date: Set(input.target_date),
                actual_completion_date: Set(None),
                invoice_percent: Set(input.invoice_percent),
                invoice_amount: Set(Decimal::ZERO),
                invoice_raised: Set(false),
                invoice_raised_date: Set(None),
                payment_received: Set(false),
                payment_received_date: Set(None),
                status: Set(MilestoneStatus::Pending),
                remarks: Set(None),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            }
            .insert(&txn)
            .await?;
            created.push(row);
            next_no += 1;
        }

        let count = created.len();
        let (_, deactivated) = apply_section_edit(
            &txn,
            record,
            AssignmentSection::Milestone,
            actor.officer_id,
            |_| {},
        )
        .await?;

        txn.commit().await?;

        self.emit(Event::MilestonePlanned {
            assignment_id,
            count,
        })
        .await;
        if deactivated {
            self.emit(Event::AssignmentDeactivated(assignment_id)).await;
        }

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn milestones_of(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<milestone::Model>, ServiceError> {
        Ok(MilestoneEntity::find()
            .filter(milestone::Column::AssignmentId.eq(assignment_id))
            .order_by_asc(milestone::Column::MilestoneNo)
            .all(&*self.db)
            .await?)
    }

    /// Team Leader marks a milestone delivered. Invoicing is a separate
    /// step; completion alone recognizes nothing.
    #[instrument(skip(self, actor))]
    pub async fn mark_completed(
        &self,
        milestone_id: Uuid,
        actor: &Principal,
        completion_date: NaiveDate,
    ) -> Result<milestone::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let row = MilestoneEntity::find_by_id(milestone_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Milestone", milestone_id))?;

        let parent = AssignmentEntity::find_by_id(row.assignment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", row.assignment_id))?;

        ensure_team_leader(actor, &parent)?;

        if !MilestoneStatus::can_transition(row.status, MilestoneStatus::Completed) {
            return Err(ServiceError::bad_transition(
                "milestone status",
                row.status,
                MilestoneStatus::Completed,
            ));
        }

        let now = Utc::now();
        let mut active: milestone::ActiveModel = row.into();
        active.status = Set(MilestoneStatus::Completed);
        active.actual_completion_date = Set(Some(completion_date));
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        refresh_assignment_progress(&txn, parent, now.date_naive()).await?;

        log_activity(
            &txn,
            actor.officer_id,
            "UPDATE",
            "milestone",
            milestone_id,
            Some(format!("Milestone completed on {}", completion_date)),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::MilestoneCompleted(milestone_id)).await;

        Ok(updated)
    }

    /// Team Leader (or a Head) raises an invoice request for Finance
    /// approval. The requested amount may not exceed the contract value
    /// still un-invoiced.
    #[instrument(skip(self, input, requester), fields(assignment_id = %input.assignment_id))]
    pub async fn request_invoice(
        &self,
        input: InvoiceRequestInput,
        requester: &Principal,
    ) -> Result<invoice_request::Model, ServiceError> {
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "invoice amount must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let record = AssignmentEntity::find_by_id(input.assignment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", input.assignment_id))?;

        ensure_team_leader(requester, &record)?;

        if let Some(milestone_id) = input.milestone_id {
            let owned = MilestoneEntity::find_by_id(milestone_id)
                .one(&txn)
                .await?
                .map(|m| m.assignment_id == input.assignment_id)
                .unwrap_or(false);
            if !owned {
                return Err(ServiceError::ValidationError(format!(
                    "milestone {} does not belong to assignment {}",
                    milestone_id, input.assignment_id
                )));
            }
        }

        let requested_so_far: Decimal = InvoiceRequestEntity::find()
            .filter(invoice_request::Column::AssignmentId.eq(input.assignment_id))
            .filter(invoice_request::Column::Status.ne(InvoiceStatus::Rejected))
            .all(&txn)
            .await?
            .iter()
            .map(|r| r.invoice_amount)
            .sum();
        if requested_so_far + input.amount > record.total_value + PERCENT_TOLERANCE {
            return Err(ServiceError::ValidationError(format!(
                "invoice of {} exceeds remaining contract value ({} of {} already requested)",
                input.amount, requested_so_far, record.total_value
            )));
        }

        let prefix = month_prefix(
            DocumentKind::InvoiceRequest,
            &record.office_code,
            now.date_naive(),
        );
        let existing = InvoiceRequestEntity::find()
            .filter(invoice_request::Column::RequestNumber.starts_with(&prefix))
            .count(&txn)
            .await?;
        let request_number = serial_number(&prefix, existing);

        let model = invoice_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            request_number: Set(request_number.clone()),
            assignment_id: Set(input.assignment_id),
            milestone_id: Set(input.milestone_id),
            invoice_type: Set(input.invoice_type),
            invoice_amount: Set(input.amount.round_dp(2)),
            fy_period: Set(input.fy_period),
            description: Set(input.description),
            status: Set(InvoiceStatus::Pending),
            requested_by: Set(requester.officer_id),
            requested_at: Set(now),
            approved_by: Set(None),
            approved_at: Set(None),
            approval_remarks: Set(None),
            revenue_recognized_80: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        log_activity(
            &txn,
            requester.officer_id,
            "CREATE",
            "invoice_request",
            model.id,
            Some(format!(
                "Invoice request {} for {}",
                request_number, model.invoice_amount
            )),
        )
        .await?;
        txn.commit().await?;

        info!(request_id = %model.id, number = %request_number, "invoice request submitted");
        self.emit(Event::InvoiceRequested(model.id)).await;

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn pending_invoices(&self) -> Result<Vec<invoice_request::Model>, ServiceError> {
        Ok(InvoiceRequestEntity::find()
            .filter(invoice_request::Column::Status.eq(InvoiceStatus::Pending))
            .order_by_desc(invoice_request::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn invoice_requests_of(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<invoice_request::Model>, ServiceError> {
        Ok(InvoiceRequestEntity::find()
            .filter(invoice_request::Column::AssignmentId.eq(assignment_id))
            .order_by_desc(invoice_request::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Finance approves an invoice request, recognizing 80% of its value.
    ///
    /// One transaction covers: the request transition, the milestone
    /// invoice flags, the assignment's cumulative invoice figure and
    /// refreshed progress, and one ledger row per revenue share. The
    /// PENDING guard makes a second approval an error, not a double
    /// credit.
    #[instrument(skip(self, finance_officer))]
    pub async fn approve_invoice(
        &self,
        request_id: Uuid,
        finance_officer: &Principal,
    ) -> Result<invoice_request::Model, ServiceError> {
        if !finance_officer.is_finance_officer() {
            return Err(ServiceError::Unauthorized(
                "invoice approval requires Finance authority".to_string(),
            ));
        }

        let now = Utc::now();
        let today = now.date_naive();
        let txn = self.db.begin().await?;

        let request = InvoiceRequestEntity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice request", request_id))?;

        if !InvoiceStatus::can_transition(request.status, InvoiceStatus::Approved) {
            return Err(ServiceError::bad_transition(
                "invoice status",
                request.status,
                InvoiceStatus::Approved,
            ));
        }

        let assignment_row = AssignmentEntity::find_by_id(request.assignment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", request.assignment_id))?;

        let amount = request.invoice_amount;
        let revenue_80 = (amount * INVOICE_TRANCHE).round_dp(2);
        let assignment_id = request.assignment_id;
        let milestone_id = request.milestone_id;
        let fy_period = request.fy_period.clone();

        let mut request_active: invoice_request::ActiveModel = request.into();
        request_active.status = Set(InvoiceStatus::Approved);
        request_active.approved_by = Set(Some(finance_officer.officer_id));
        request_active.approved_at = Set(Some(now));
        request_active.revenue_recognized_80 = Set(revenue_80);
        request_active.updated_at = Set(Some(now));
        let updated_request = request_active.update(&txn).await?;

        if let Some(milestone_id) = milestone_id {
            let row = MilestoneEntity::find_by_id(milestone_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("Milestone", milestone_id))?;
            let mut active: milestone::ActiveModel = row.into();
            active.invoice_raised = Set(true);
            active.invoice_raised_date = Set(Some(today));
            active.invoice_amount = Set(amount);
            active.updated_at = Set(Some(now));
            active.update(&txn).await?;
        }

        let invoiced = assignment_row.invoice_amount;
        let version = assignment_row.version;
        let mut assignment_active: assignment::ActiveModel = assignment_row.into();
        assignment_active.invoice_amount = Set((invoiced + amount).round_dp(2));
        assignment_active.updated_at = Set(Some(now));
        assignment_active.version = Set(version + 1);
        let updated_assignment = assignment_active.update(&txn).await?;

        refresh_assignment_progress(&txn, updated_assignment, today).await?;

        append_ledger_entries(
            &txn,
            assignment_id,
            Some(request_id),
            None,
            RevenueType::Invoice80,
            revenue_80,
            &fy_period,
            today,
            "80% revenue on invoice approval",
        )
        .await?;

        log_activity(
            &txn,
            finance_officer.officer_id,
            "APPROVE",
            "invoice_request",
            request_id,
            Some("Invoice approved, 80% revenue recognized".to_string()),
        )
        .await?;
        txn.commit().await?;

        info!(request_id = %request_id, revenue = %revenue_80, "invoice approved");
        self.emit(Event::InvoiceApproved {
            request_id,
            revenue_recognized: revenue_80,
        })
        .await;

        Ok(updated_request)
    }

    /// Finance rejects an invoice request. No financial side effects.
    #[instrument(skip(self, finance_officer, reason))]
    pub async fn reject_invoice(
        &self,
        request_id: Uuid,
        finance_officer: &Principal,
        reason: String,
    ) -> Result<invoice_request::Model, ServiceError> {
        if !finance_officer.is_finance_officer() {
            return Err(ServiceError::Unauthorized(
                "invoice rejection requires Finance authority".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let request = InvoiceRequestEntity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice request", request_id))?;

        if !InvoiceStatus::can_transition(request.status, InvoiceStatus::Rejected) {
            return Err(ServiceError::bad_transition(
                "invoice status",
                request.status,
                InvoiceStatus::Rejected,
            ));
        }

        let mut active: invoice_request::ActiveModel = request.into();
        active.status = Set(InvoiceStatus::Rejected);
        active.approved_by = Set(Some(finance_officer.officer_id));
        active.approved_at = Set(Some(now));
        active.approval_remarks = Set(Some(reason.clone()));
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            finance_officer.officer_id,
            "REJECT",
            "invoice_request",
            request_id,
            Some(reason),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::InvoiceRejected(request_id)).await;

        Ok(updated)
    }

    /// Finance records a payment against an approved invoice, recognizing
    /// 20% of the amount actually received. Partial payments each carry
    /// their own proportional tranche; a later payment against the same
    /// invoice recognizes independently.
    #[instrument(skip(self, input, finance_officer), fields(invoice_request_id = %input.invoice_request_id))]
    pub async fn record_payment(
        &self,
        input: PaymentInput,
        finance_officer: &Principal,
    ) -> Result<payment_receipt::Model, ServiceError> {
        if !finance_officer.is_finance_officer() {
            return Err(ServiceError::Unauthorized(
                "payment recording requires Finance authority".to_string(),
            ));
        }
        if input.amount_received <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "received amount must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let request = InvoiceRequestEntity::find_by_id(input.invoice_request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found("Invoice request", input.invoice_request_id)
            })?;

        // Payment cannot precede invoicing.
        if request.status != InvoiceStatus::Approved {
            return Err(ServiceError::InvalidStateTransition(format!(
                "cannot record payment against a {} invoice request",
                request.status
            )));
        }

        let assignment_row = AssignmentEntity::find_by_id(request.assignment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment", request.assignment_id))?;

        let amount = input.amount_received.round_dp(2);
        let revenue_20 = (amount * PAYMENT_TRANCHE).round_dp(2);
        let fy = fy_period_for(input.receipt_date);

        let prefix = month_prefix(
            DocumentKind::PaymentReceipt,
            &assignment_row.office_code,
            now.date_naive(),
        );
        let existing = payment_receipt::Entity::find()
            .filter(payment_receipt::Column::ReceiptNumber.starts_with(&prefix))
            .count(&txn)
            .await?;
        let receipt_number = serial_number(&prefix, existing);

        let receipt = payment_receipt::ActiveModel {
            id: Set(Uuid::new_v4()),
            receipt_number: Set(receipt_number.clone()),
            invoice_request_id: Set(input.invoice_request_id),
            amount_received: Set(amount),
            receipt_date: Set(input.receipt_date),
            payment_mode: Set(input.payment_mode),
            reference_number: Set(input.reference_number),
            fy_period: Set(fy.clone()),
            remarks: Set(input.remarks),
            revenue_recognized_20: Set(revenue_20),
            recorded_by: Set(finance_officer.officer_id),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        if let Some(milestone_id) = request.milestone_id {
            let row = MilestoneEntity::find_by_id(milestone_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("Milestone", milestone_id))?;
            let mut active: milestone::ActiveModel = row.into();
            active.payment_received = Set(true);
            active.payment_received_date = Set(Some(input.receipt_date));
            active.status = Set(MilestoneStatus::Completed);
            active.updated_at = Set(Some(now));
            active.update(&txn).await?;
        }

        let received = assignment_row.amount_received;
        let version = assignment_row.version;
        let assignment_id = request.assignment_id;
        let mut assignment_active: assignment::ActiveModel = assignment_row.into();
        assignment_active.amount_received = Set((received + amount).round_dp(2));
        assignment_active.updated_at = Set(Some(now));
        assignment_active.version = Set(version + 1);
        let updated_assignment = assignment_active.update(&txn).await?;

        refresh_assignment_progress(&txn, updated_assignment, now.date_naive()).await?;

        append_ledger_entries(
            &txn,
            assignment_id,
            Some(input.invoice_request_id),
            Some(receipt.id),
            RevenueType::Payment20,
            revenue_20,
            &fy,
            input.receipt_date,
            "20% revenue on payment receipt",
        )
        .await?;

        log_activity(
            &txn,
            finance_officer.officer_id,
            "CREATE",
            "payment_receipt",
            receipt.id,
            Some(format!(
                "Payment {} recorded, 20% revenue recognized",
                receipt_number
            )),
        )
        .await?;
        txn.commit().await?;

        info!(receipt_id = %receipt.id, revenue = %revenue_20, "payment recorded");
        self.emit(Event::PaymentRecorded {
            receipt_id: receipt.id,
            revenue_recognized: revenue_20,
        })
        .await;

        Ok(receipt)
    }

    #[instrument(skip(self))]
    pub async fn payments_of(
        &self,
        invoice_request_id: Uuid,
    ) -> Result<Vec<payment_receipt::Model>, ServiceError> {
        Ok(payment_receipt::Entity::find()
            .filter(payment_receipt::Column::InvoiceRequestId.eq(invoice_request_id))
            .order_by_desc(payment_receipt::Column::ReceiptDate)
            .all(&*self.db)
            .await?)
    }
}

/// One ledger row per revenue share of the assignment:
/// amount = base x share_percent / 100.
#[allow(clippy::too_many_arguments)]
async fn append_ledger_entries<C: ConnectionTrait>(
    conn: &C,
    assignment_id: Uuid,
    invoice_request_id: Option<Uuid>,
    payment_receipt_id: Option<Uuid>,
    revenue_type: RevenueType,
    base_amount: Decimal,
    fy_period: &str,
    transaction_date: NaiveDate,
    remarks: &str,
) -> Result<usize, ServiceError> {
    let shares = revenue_share::Entity::find()
        .filter(revenue_share::Column::AssignmentId.eq(assignment_id))
        .all(conn)
        .await?;

    for share in &shares {
        let officer_amount =
            (base_amount * share.share_percent / Decimal::ONE_HUNDRED).round_dp(2);
        officer_revenue_ledger::ActiveModel {
            id: Set(Uuid::new_v4()),
            officer_id: Set(share.officer_id),
            assignment_id: Set(assignment_id),
            invoice_request_id: Set(invoice_request_id),
            payment_receipt_id: Set(payment_receipt_id),
            revenue_type: Set(revenue_type),
            share_percent: Set(share.share_percent),
            amount: Set(officer_amount),
            fy_period: Set(fy_period.to_string()),
            transaction_date: Set(transaction_date),
            remarks: Set(Some(remarks.to_string())),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;
    }

    Ok(shares.len())
}

/// Recompute the derived progress figures from current milestone state and
/// store them on the assignment row, inside the caller's transaction.
async fn refresh_assignment_progress<C: ConnectionTrait>(
    conn: &C,
    record: assignment::Model,
    today: NaiveDate,
) -> Result<assignment::Model, ServiceError> {
    let milestones = MilestoneEntity::find()
        .filter(milestone::Column::AssignmentId.eq(record.id))
        .all(conn)
        .await?;

    let physical = physical_progress_of(&milestones);
    let timeline = timeline_progress_of(&milestones, today);
    let shareable = shareable_revenue_of(&milestones);

    let mut active: assignment::ActiveModel = record.into();
    active.physical_progress_percent = Set(physical);
    active.timeline_progress_percent = Set(timeline);
    active.shareable_revenue = Set(shareable);
    Ok(active.update(conn).await?)
}
