//! Tests for the grievance tracker and its escalation ladder.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::{admin_principal, officer_principal, TestContext, OFFICE};
use pms_engine::{
    entities::status::{ComplaintType, EscalationLevel, GrievancePriority, GrievanceStatus},
    errors::ServiceError,
    services::grievances::OpenGrievanceRequest,
};

fn grievance() -> OpenGrievanceRequest {
    OpenGrievanceRequest {
        assignment_id: None,
        complaint_type: ComplaintType::RevenueShare,
        subject: "Share percentage disputed".to_string(),
        description: "My allocation dropped without discussion.".to_string(),
        priority: GrievancePriority::Normal,
    }
}

#[tokio::test]
async fn opening_assigns_a_yearly_ticket_number_and_due_date() {
    let ctx = TestContext::new().await;
    let officer = ctx.seed_officer("Asha Rao", OFFICE, None).await;

    let ticket = ctx
        .engine
        .grievances
        .open(grievance(), &officer_principal(&officer))
        .await
        .unwrap();

    let year = Utc::now().date_naive().format("%Y").to_string();
    assert!(ticket.ticket_number.starts_with(&format!("GRV/{year}/")));
    assert_eq!(ticket.status, GrievanceStatus::Open);
    assert_eq!(ticket.current_level, EscalationLevel::Tl);
    assert_eq!(
        ticket.escalation_due_date,
        Some(Utc::now().date_naive() + Duration::days(7))
    );
}

#[tokio::test]
async fn lifecycle_runs_open_to_closed() {
    let ctx = TestContext::new().await;
    let officer = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let handler = ctx.seed_officer("Ravi Menon", OFFICE, None).await;

    let ticket = ctx
        .engine
        .grievances
        .open(grievance(), &officer_principal(&officer))
        .await
        .unwrap();

    let taken = ctx
        .engine
        .grievances
        .take_up(ticket.id, &officer_principal(&handler))
        .await
        .unwrap();
    assert_eq!(taken.status, GrievanceStatus::InProgress);
    assert_eq!(taken.assigned_to, Some(handler.id));

    let resolved = ctx
        .engine
        .grievances
        .resolve(
            ticket.id,
            &officer_principal(&handler),
            "Share restored to the agreed split.".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(resolved.status, GrievanceStatus::Resolved);
    assert!(resolved.resolution_date.is_some());

    // A bystander cannot close someone else's ticket.
    let denied = ctx
        .engine
        .grievances
        .close(ticket.id, &officer_principal(&handler))
        .await;
    assert_matches!(denied, Err(ServiceError::Unauthorized(_)));

    let closed = ctx
        .engine
        .grievances
        .close(ticket.id, &officer_principal(&officer))
        .await
        .unwrap();
    assert_eq!(closed.status, GrievanceStatus::Closed);
    assert!(closed.closed_at.is_some());
}

#[tokio::test]
async fn manual_escalation_climbs_the_ladder_and_stops_at_dg() {
    let ctx = TestContext::new().await;
    let officer = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let admin = ctx.seed_officer("Site Admin", OFFICE, None).await;
    let admin_p = admin_principal(&admin);

    let ticket = ctx
        .engine
        .grievances
        .open(grievance(), &officer_principal(&officer))
        .await
        .unwrap();

    let mut current = ticket;
    for expected in [
        EscalationLevel::Head,
        EscalationLevel::Ddg,
        EscalationLevel::Dg,
    ] {
        current = ctx
            .engine
            .grievances
            .escalate(current.id, &admin_p, Some("no response".to_string()))
            .await
            .unwrap();
        assert_eq!(current.current_level, expected);
        assert_eq!(current.status, GrievanceStatus::Escalated);
    }

    // DG is the final level.
    let past_top = ctx
        .engine
        .grievances
        .escalate(current.id, &admin_p, None)
        .await;
    assert_matches!(past_top, Err(ServiceError::InvalidStateTransition(_)));
    assert_eq!(current.escalation_due_date, None);
}

#[tokio::test]
async fn overdue_sweep_escalates_stale_tickets() {
    let ctx = TestContext::new().await;
    let officer = ctx.seed_officer("Asha Rao", OFFICE, None).await;

    let ticket = ctx
        .engine
        .grievances
        .open(grievance(), &officer_principal(&officer))
        .await
        .unwrap();

    // Not yet due: nothing to sweep.
    let today = Utc::now().date_naive();
    let swept = ctx.engine.grievances.escalate_overdue(today).await.unwrap();
    assert!(swept.is_empty());

    // Eight days on, the TL window has lapsed.
    let swept = ctx
        .engine
        .grievances
        .escalate_overdue(today + Duration::days(8))
        .await
        .unwrap();
    assert_eq!(swept, vec![ticket.id]);

    let escalated = ctx.engine.grievances.get(ticket.id).await.unwrap();
    assert_eq!(escalated.current_level, EscalationLevel::Head);
    assert_eq!(escalated.status, GrievanceStatus::Escalated);
}
