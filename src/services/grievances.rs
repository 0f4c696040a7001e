//! Officer grievance tracker.
//!
//! A lightweight parallel of the approval pattern: tickets move
//! OPEN -> IN_PROGRESS -> ESCALATED -> RESOLVED -> CLOSED, climbing the
//! TL -> HEAD -> DDG -> DG ladder when they sit past their level's due
//! date.

use crate::{
    auth::Principal,
    db::DbPool,
    entities::grievance_escalation,
    entities::grievance_ticket::{self, Entity as TicketEntity},
    entities::status::{ComplaintType, EscalationLevel, GrievancePriority, GrievanceStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    numbering::{grievance_number, grievance_prefix},
    services::audit::log_activity,
};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const ENTITY: &str = "grievance";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpenGrievanceRequest {
    pub assignment_id: Option<Uuid>,
    pub complaint_type: ComplaintType,
    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub priority: GrievancePriority,
}

/// Service for grievance tickets and their escalation ladder.
#[derive(Clone)]
pub struct GrievanceService {
    db: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl GrievanceService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send grievance event");
            }
        }
    }

    /// Any officer opens a ticket on their own behalf. Tickets start at
    /// the TL level with a seven-day escalation clock.
    #[instrument(skip(self, request, complainant))]
    pub async fn open(
        &self,
        request: OpenGrievanceRequest,
        complainant: &Principal,
    ) -> Result<grievance_ticket::Model, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let today = now.date_naive();
        let txn = self.db.begin().await?;

        let prefix = grievance_prefix(today.year());
        let existing = TicketEntity::find()
            .filter(grievance_ticket::Column::TicketNumber.starts_with(&prefix))
            .count(&txn)
            .await?;
        let ticket_number = grievance_number(today.year(), existing);

        let due = EscalationLevel::Tl
            .escalation_days()
            .map(|days| today + Duration::days(days));

        let model = grievance_ticket::ActiveModel {
            id: Set(Uuid::new_v4()),
            ticket_number: Set(ticket_number.clone()),
            officer_id: Set(complainant.officer_id),
            assignment_id: Set(request.assignment_id),
            complaint_type: Set(request.complaint_type),
            subject: Set(request.subject),
            description: Set(request.description),
            status: Set(GrievanceStatus::Open),
            priority: Set(request.priority),
            current_level: Set(EscalationLevel::Tl),
            assigned_to: Set(None),
            resolution: Set(None),
            resolution_date: Set(None),
            escalation_due_date: Set(due),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            closed_at: Set(None),
        }
        .insert(&txn)
        .await?;

        log_activity(
            &txn,
            complainant.officer_id,
            "CREATE",
            ENTITY,
            model.id,
            Some(format!("Opened grievance {}", ticket_number)),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::GrievanceOpened(model.id)).await;

        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<grievance_ticket::Model, ServiceError> {
        TicketEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Grievance ticket", id))
    }

    #[instrument(skip(self))]
    pub async fn open_tickets(&self) -> Result<Vec<grievance_ticket::Model>, ServiceError> {
        Ok(TicketEntity::find()
            .filter(grievance_ticket::Column::Status.is_in([
                GrievanceStatus::Open,
                GrievanceStatus::InProgress,
                GrievanceStatus::Escalated,
            ]))
            .order_by_desc(grievance_ticket::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Handler takes the ticket up.
    #[instrument(skip(self, handler))]
    pub async fn take_up(
        &self,
        id: Uuid,
        handler: &Principal,
    ) -> Result<grievance_ticket::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let ticket = TicketEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Grievance ticket", id))?;

        if !GrievanceStatus::can_transition(ticket.status, GrievanceStatus::InProgress) {
            return Err(ServiceError::bad_transition(
                "grievance status",
                ticket.status,
                GrievanceStatus::InProgress,
            ));
        }

        let mut active: grievance_ticket::ActiveModel = ticket.into();
        active.status = Set(GrievanceStatus::InProgress);
        active.assigned_to = Set(Some(handler.officer_id));
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            handler.officer_id,
            "UPDATE",
            ENTITY,
            id,
            Some("Grievance taken up".to_string()),
        )
        .await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Manual escalation to the next level of the ladder.
    #[instrument(skip(self, actor, reason))]
    pub async fn escalate(
        &self,
        id: Uuid,
        actor: &Principal,
        reason: Option<String>,
    ) -> Result<grievance_ticket::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let ticket = TicketEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Grievance ticket", id))?;

        let updated = escalate_in_txn(&txn, ticket, Some(actor.officer_id), reason, false).await?;
        txn.commit().await?;

        self.emit(Event::GrievanceEscalated {
            ticket_id: id,
            to_level: updated.current_level,
        })
        .await;

        Ok(updated)
    }

    /// Handler resolves the ticket.
    #[instrument(skip(self, handler, resolution))]
    pub async fn resolve(
        &self,
        id: Uuid,
        handler: &Principal,
        resolution: String,
    ) -> Result<grievance_ticket::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let ticket = TicketEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Grievance ticket", id))?;

        if !GrievanceStatus::can_transition(ticket.status, GrievanceStatus::Resolved) {
            return Err(ServiceError::bad_transition(
                "grievance status",
                ticket.status,
                GrievanceStatus::Resolved,
            ));
        }

        let mut active: grievance_ticket::ActiveModel = ticket.into();
        active.status = Set(GrievanceStatus::Resolved);
        active.resolution = Set(Some(resolution.clone()));
        active.resolution_date = Set(Some(now.date_naive()));
        active.escalation_due_date = Set(None);
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        log_activity(&txn, handler.officer_id, "UPDATE", ENTITY, id, Some(resolution)).await?;
        txn.commit().await?;

        self.emit(Event::GrievanceResolved(id)).await;

        Ok(updated)
    }

    /// Complainant (or an admin) closes a resolved ticket.
    #[instrument(skip(self, actor))]
    pub async fn close(
        &self,
        id: Uuid,
        actor: &Principal,
    ) -> Result<grievance_ticket::Model, ServiceError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let ticket = TicketEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Grievance ticket", id))?;

        if ticket.officer_id != actor.officer_id && !actor.is_admin() {
            return Err(ServiceError::Unauthorized(
                "only the complainant or an administrator may close a ticket".to_string(),
            ));
        }
        if !GrievanceStatus::can_transition(ticket.status, GrievanceStatus::Closed) {
            return Err(ServiceError::bad_transition(
                "grievance status",
                ticket.status,
                GrievanceStatus::Closed,
            ));
        }

        let mut active: grievance_ticket::ActiveModel = ticket.into();
        active.status = Set(GrievanceStatus::Closed);
        active.closed_at = Set(Some(now));
        active.updated_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        log_activity(
            &txn,
            actor.officer_id,
            "UPDATE",
            ENTITY,
            id,
            Some("Grievance closed".to_string()),
        )
        .await?;
        txn.commit().await?;

        self.emit(Event::GrievanceClosed(id)).await;

        Ok(updated)
    }

    /// Sweep open tickets past their escalation due date one level up.
    /// Intended for a scheduled job in the embedding application. Returns
    /// the ids of the tickets escalated.
    #[instrument(skip(self))]
    pub async fn escalate_overdue(&self, today: NaiveDate) -> Result<Vec<Uuid>, ServiceError> {
        let txn = self.db.begin().await?;

        let overdue = TicketEntity::find()
            .filter(grievance_ticket::Column::Status.is_in([
                GrievanceStatus::Open,
                GrievanceStatus::InProgress,
                GrievanceStatus::Escalated,
            ]))
            .filter(grievance_ticket::Column::EscalationDueDate.lte(today))
            .filter(grievance_ticket::Column::CurrentLevel.ne(EscalationLevel::Dg))
            .all(&txn)
            .await?;

        let mut escalated = Vec::with_capacity(overdue.len());
        for ticket in overdue {
            let id = ticket.id;
            escalate_in_txn(
                &txn,
                ticket,
                None,
                Some("Auto-escalated due to timeline breach".to_string()),
                true,
            )
            .await?;
            escalated.push(id);
        }

        txn.commit().await?;

        for id in &escalated {
            info!(ticket_id = %id, "grievance auto-escalated");
        }

        Ok(escalated)
    }
}

/// Bump a ticket one level, recording the move in the escalation history.
async fn escalate_in_txn<C: sea_orm::ConnectionTrait>(
    conn: &C,
    ticket: grievance_ticket::Model,
    actor: Option<Uuid>,
    reason: Option<String>,
    auto: bool,
) -> Result<grievance_ticket::Model, ServiceError> {
    let now = Utc::now();
    let today = now.date_naive();

    let Some(next_level) = ticket.current_level.next() else {
        return Err(ServiceError::InvalidStateTransition(
            "grievance is already at the DG level".to_string(),
        ));
    };
    if !GrievanceStatus::can_transition(ticket.status, GrievanceStatus::Escalated) {
        return Err(ServiceError::bad_transition(
            "grievance status",
            ticket.status,
            GrievanceStatus::Escalated,
        ));
    }

    grievance_escalation::ActiveModel {
        id: Set(Uuid::new_v4()),
        ticket_id: Set(ticket.id),
        from_level: Set(ticket.current_level),
        to_level: Set(next_level),
        from_handler: Set(ticket.assigned_to),
        to_handler: Set(None),
        escalation_reason: Set(reason),
        auto_escalated: Set(auto),
        escalated_at: Set(now),
    }
    .insert(conn)
    .await?;

    let due = next_level
        .escalation_days()
        .map(|days| today + Duration::days(days));

    let ticket_id = ticket.id;
    let mut active: grievance_ticket::ActiveModel = ticket.into();
    active.status = Set(GrievanceStatus::Escalated);
    active.current_level = Set(next_level);
    active.escalation_due_date = Set(due);
    active.updated_at = Set(Some(now));
    let updated = active.update(conn).await?;

    if let Some(actor_id) = actor {
        log_activity(
            conn,
            actor_id,
            "ESCALATE",
            ENTITY,
            ticket_id,
            Some(format!("Escalated to {next_level}")),
        )
        .await?;
    }

    Ok(updated)
}
