//! End-to-end tests for the 80/20 revenue-recognition flow: invoice
//! approval, payment receipts, ledger fan-out by revenue share, and the
//! idempotency guards on financial mutations.

mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use common::{
    finance_principal, head_principal, make_active_assignment, officer_principal, TestContext,
    OFFICE,
};
use pms_engine::{
    entities::status::{InvoiceStatus, InvoiceType, PaymentMode, RevenueType},
    errors::ServiceError,
    fiscal::fy_period_for,
    services::invoicing::{InvoiceRequestInput, MilestoneInput, PaymentInput},
};
use rust_decimal_macros::dec;

struct Scenario {
    ctx: TestContext,
    assignment_id: uuid::Uuid,
    milestone_id: uuid::Uuid,
    tl: pms_engine::entities::officer::Model,
    member: pms_engine::entities::officer::Model,
    finance: pms_engine::entities::officer::Model,
}

/// Assignment of 100 Lakhs with one 100% milestone and a 60/40 share
/// split, activated and ready to invoice.
async fn scenario() -> Scenario {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let member = ctx.seed_officer("Vikram Shah", OFFICE, None).await;
    let finance = ctx.seed_officer("Leela Nair", OFFICE, None).await;

    let assignment = make_active_assignment(
        &ctx,
        &head,
        &tl,
        dec!(100.0),
        &[(tl.id, dec!(60.0)), (member.id, dec!(40.0))],
    )
    .await;

    let milestones = ctx.engine.invoicing.milestones_of(assignment.id).await.unwrap();
    let milestone_id = milestones[0].id;

    Scenario {
        ctx,
        assignment_id: assignment.id,
        milestone_id,
        tl,
        member,
        finance,
    }
}

fn invoice_input(s: &Scenario, amount: rust_decimal::Decimal) -> InvoiceRequestInput {
    InvoiceRequestInput {
        assignment_id: s.assignment_id,
        milestone_id: Some(s.milestone_id),
        amount,
        invoice_type: InvoiceType::Final,
        fy_period: fy_period_for(Utc::now().date_naive()),
        description: None,
    }
}

fn payment_input(
    request_id: uuid::Uuid,
    amount: rust_decimal::Decimal,
) -> PaymentInput {
    PaymentInput {
        invoice_request_id: request_id,
        amount_received: amount,
        receipt_date: Utc::now().date_naive(),
        payment_mode: PaymentMode::Neft,
        reference_number: Some("UTR0042".to_string()),
        remarks: None,
    }
}

#[tokio::test]
async fn invoice_approval_recognizes_eighty_percent_by_share() {
    let s = scenario().await;
    let fy = fy_period_for(Utc::now().date_naive());

    let request = s
        .ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(100.0)), &officer_principal(&s.tl))
        .await
        .unwrap();
    assert_eq!(request.status, InvoiceStatus::Pending);
    assert!(request.request_number.starts_with("INV-RO-DEL-"));

    let approved = s
        .ctx
        .engine
        .invoicing
        .approve_invoice(request.id, &finance_principal(&s.finance))
        .await
        .unwrap();
    assert_eq!(approved.status, InvoiceStatus::Approved);
    assert_eq!(approved.revenue_recognized_80, dec!(80.0));

    // Milestone flags flipped inside the same transaction.
    let milestones = s.ctx.engine.invoicing.milestones_of(s.assignment_id).await.unwrap();
    assert!(milestones[0].invoice_raised);
    assert_eq!(milestones[0].invoice_amount, dec!(100.0));

    // Assignment cumulative figure and physical progress updated.
    let assignment = s.ctx.engine.assignments.get(s.assignment_id).await.unwrap();
    assert_eq!(assignment.invoice_amount, dec!(100.0));
    assert_eq!(assignment.physical_progress_percent, dec!(80.00));

    // Ledger fan-out: 80 split 60/40.
    let ledger = s.ctx.engine.revenue.assignment_ledger(s.assignment_id).await.unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(ledger.iter().all(|e| e.revenue_type == RevenueType::Invoice80));
    let tl_amount: rust_decimal::Decimal = ledger
        .iter()
        .filter(|e| e.officer_id == s.tl.id)
        .map(|e| e.amount)
        .sum();
    let member_amount: rust_decimal::Decimal = ledger
        .iter()
        .filter(|e| e.officer_id == s.member.id)
        .map(|e| e.amount)
        .sum();
    assert_eq!(tl_amount, dec!(48.0));
    assert_eq!(member_amount, dec!(32.0));

    assert_eq!(
        s.ctx
            .engine
            .revenue
            .officer_recognized_revenue(s.tl.id, &fy)
            .await
            .unwrap(),
        dec!(48.0)
    );
}

#[tokio::test]
async fn full_payment_completes_the_hundred_percent() {
    let s = scenario().await;
    let fy = fy_period_for(Utc::now().date_naive());

    let request = s
        .ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(100.0)), &officer_principal(&s.tl))
        .await
        .unwrap();
    s.ctx
        .engine
        .invoicing
        .approve_invoice(request.id, &finance_principal(&s.finance))
        .await
        .unwrap();

    let receipt = s
        .ctx
        .engine
        .invoicing
        .record_payment(
            payment_input(request.id, dec!(100.0)),
            &finance_principal(&s.finance),
        )
        .await
        .unwrap();
    assert_eq!(receipt.revenue_recognized_20, dec!(20.0));
    assert!(receipt.receipt_number.starts_with("RCP-RO-DEL-"));

    // Milestone is paid and completed; payment implies invoicing.
    let milestones = s.ctx.engine.invoicing.milestones_of(s.assignment_id).await.unwrap();
    assert!(milestones[0].payment_received);
    assert!(milestones[0].invoice_raised);

    let assignment = s.ctx.engine.assignments.get(s.assignment_id).await.unwrap();
    assert_eq!(assignment.amount_received, dec!(100.0));
    assert_eq!(assignment.physical_progress_percent, dec!(100.00));
    assert_eq!(assignment.shareable_revenue, dec!(100.00));

    // 80% + 20% tranches credit the full contract value 60/40.
    let tl_total = s
        .ctx
        .engine
        .revenue
        .officer_recognized_revenue(s.tl.id, &fy)
        .await
        .unwrap();
    let member_total = s
        .ctx
        .engine
        .revenue
        .officer_recognized_revenue(s.member.id, &fy)
        .await
        .unwrap();
    assert_eq!(tl_total, dec!(60.0));
    assert_eq!(member_total, dec!(40.0));
    assert_eq!(tl_total + member_total, dec!(100.0));

    let (invoice_total, payment_total) = s
        .ctx
        .engine
        .revenue
        .assignment_recognition_totals(s.assignment_id)
        .await
        .unwrap();
    assert_eq!(invoice_total, dec!(80.0));
    assert_eq!(payment_total, dec!(20.0));
}

#[tokio::test]
async fn partial_payments_recognize_independent_tranches() {
    let s = scenario().await;
    let fy = fy_period_for(Utc::now().date_naive());

    let request = s
        .ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(100.0)), &officer_principal(&s.tl))
        .await
        .unwrap();
    s.ctx
        .engine
        .invoicing
        .approve_invoice(request.id, &finance_principal(&s.finance))
        .await
        .unwrap();

    let first = s
        .ctx
        .engine
        .invoicing
        .record_payment(
            payment_input(request.id, dec!(60.0)),
            &finance_principal(&s.finance),
        )
        .await
        .unwrap();
    assert_eq!(first.revenue_recognized_20, dec!(12.0));

    let second = s
        .ctx
        .engine
        .invoicing
        .record_payment(
            payment_input(request.id, dec!(40.0)),
            &finance_principal(&s.finance),
        )
        .await
        .unwrap();
    assert_eq!(second.revenue_recognized_20, dec!(8.0));

    // Cumulative 20% tranche equals the single full payment case, split
    // 60/40: (12+8) -> TL 7.2+4.8, member 4.8+3.2.
    let ledger = s.ctx.engine.revenue.assignment_ledger(s.assignment_id).await.unwrap();
    let payment_entries: Vec<_> = ledger
        .iter()
        .filter(|e| e.revenue_type == RevenueType::Payment20)
        .collect();
    assert_eq!(payment_entries.len(), 4);
    let payment_total: rust_decimal::Decimal = payment_entries.iter().map(|e| e.amount).sum();
    assert_eq!(payment_total, dec!(20.0));

    let tl_total = s
        .ctx
        .engine
        .revenue
        .officer_recognized_revenue(s.tl.id, &fy)
        .await
        .unwrap();
    let member_total = s
        .ctx
        .engine
        .revenue
        .officer_recognized_revenue(s.member.id, &fy)
        .await
        .unwrap();
    assert_eq!(tl_total, dec!(60.0));
    assert_eq!(member_total, dec!(40.0));

    let assignment = s.ctx.engine.assignments.get(s.assignment_id).await.unwrap();
    assert_eq!(assignment.amount_received, dec!(100.0));
}

#[tokio::test]
async fn approving_twice_cannot_double_recognize() {
    let s = scenario().await;

    let request = s
        .ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(100.0)), &officer_principal(&s.tl))
        .await
        .unwrap();
    s.ctx
        .engine
        .invoicing
        .approve_invoice(request.id, &finance_principal(&s.finance))
        .await
        .unwrap();

    let again = s
        .ctx
        .engine
        .invoicing
        .approve_invoice(request.id, &finance_principal(&s.finance))
        .await;
    assert_matches!(again, Err(ServiceError::InvalidStateTransition(_)));

    // No extra ledger rows from the failed retry.
    let ledger = s.ctx.engine.revenue.assignment_ledger(s.assignment_id).await.unwrap();
    assert_eq!(ledger.len(), 2);

    let assignment = s.ctx.engine.assignments.get(s.assignment_id).await.unwrap();
    assert_eq!(assignment.invoice_amount, dec!(100.0));
}

#[tokio::test]
async fn payment_cannot_precede_invoice_approval() {
    let s = scenario().await;

    let request = s
        .ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(100.0)), &officer_principal(&s.tl))
        .await
        .unwrap();

    let premature = s
        .ctx
        .engine
        .invoicing
        .record_payment(
            payment_input(request.id, dec!(100.0)),
            &finance_principal(&s.finance),
        )
        .await;
    assert_matches!(premature, Err(ServiceError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn finance_authority_is_required() {
    let s = scenario().await;

    let request = s
        .ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(100.0)), &officer_principal(&s.tl))
        .await
        .unwrap();

    let denied = s
        .ctx
        .engine
        .invoicing
        .approve_invoice(request.id, &officer_principal(&s.member))
        .await;
    assert_matches!(denied, Err(ServiceError::Unauthorized(_)));

    let denied = s
        .ctx
        .engine
        .invoicing
        .record_payment(
            payment_input(request.id, dec!(50.0)),
            &officer_principal(&s.member),
        )
        .await;
    assert_matches!(denied, Err(ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn rejected_invoice_has_no_financial_side_effects() {
    let s = scenario().await;

    let request = s
        .ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(100.0)), &officer_principal(&s.tl))
        .await
        .unwrap();

    let rejected = s
        .ctx
        .engine
        .invoicing
        .reject_invoice(
            request.id,
            &finance_principal(&s.finance),
            "supporting documents missing".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, InvoiceStatus::Rejected);

    let ledger = s.ctx.engine.revenue.assignment_ledger(s.assignment_id).await.unwrap();
    assert!(ledger.is_empty());

    let assignment = s.ctx.engine.assignments.get(s.assignment_id).await.unwrap();
    assert_eq!(assignment.invoice_amount, dec!(0.0));

    let milestones = s.ctx.engine.invoicing.milestones_of(s.assignment_id).await.unwrap();
    assert!(!milestones[0].invoice_raised);
}

#[tokio::test]
async fn invoicing_cannot_exceed_contract_value() {
    let s = scenario().await;

    s.ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(80.0)), &officer_principal(&s.tl))
        .await
        .unwrap();

    let excess = s
        .ctx
        .engine
        .invoicing
        .request_invoice(invoice_input(&s, dec!(30.0)), &officer_principal(&s.tl))
        .await;
    assert_matches!(excess, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn milestone_percentages_cannot_exceed_hundred() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;

    let assignment =
        make_active_assignment(&ctx, &head, &tl, dec!(100.0), &[(tl.id, dec!(100.0))]).await;

    // The plan already carries a 100% milestone.
    let overflow = ctx
        .engine
        .invoicing
        .add_milestones(
            assignment.id,
            vec![MilestoneInput {
                title: "Extension phase".to_string(),
                description: None,
                invoice_percent: dec!(10.0),
                target_date: None,
            }],
            &officer_principal(&tl),
        )
        .await;
    assert_matches!(overflow, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn adding_milestones_reopens_an_approved_plan() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let head_p = head_principal(&head);
    let tl_p = officer_principal(&tl);

    let registered = ctx
        .engine
        .assignments
        .register(
            pms_engine::services::assignments::RegisterAssignmentRequest {
                title: "Market study".to_string(),
                client_name: "Acme Industries".to_string(),
                client_type: None,
                domain: None,
                sub_domain: None,
                office_code: OFFICE.to_string(),
                total_value: dec!(100.0),
                work_order_date: None,
                start_date: None,
                target_date: None,
                remarks: None,
            },
            &tl_p,
        )
        .await
        .unwrap();
    ctx.engine
        .assignments
        .approve_registration(registered.id, &head_p)
        .await
        .unwrap();
    ctx.engine
        .assignments
        .allocate_team_leader(registered.id, &head_p, tl.id)
        .await
        .unwrap();

    ctx.engine
        .invoicing
        .add_milestones(
            registered.id,
            vec![MilestoneInput {
                title: "Interim report".to_string(),
                description: None,
                invoice_percent: dec!(40.0),
                target_date: None,
            }],
            &tl_p,
        )
        .await
        .unwrap();
    ctx.engine
        .assignments
        .submit_section(
            registered.id,
            pms_engine::entities::status::AssignmentSection::Milestone,
            &tl_p,
        )
        .await
        .unwrap();
    ctx.engine
        .assignments
        .approve_section(
            registered.id,
            pms_engine::entities::status::AssignmentSection::Milestone,
            &head_p,
        )
        .await
        .unwrap();

    // A later addition to the approved plan drops the gate back to
    // SUBMITTED.
    ctx.engine
        .invoicing
        .add_milestones(
            registered.id,
            vec![MilestoneInput {
                title: "Final report".to_string(),
                description: None,
                invoice_percent: dec!(60.0),
                target_date: None,
            }],
            &tl_p,
        )
        .await
        .unwrap();

    let current = ctx.engine.assignments.get(registered.id).await.unwrap();
    assert_eq!(
        current.section_status(pms_engine::entities::status::AssignmentSection::Milestone),
        pms_engine::entities::status::SectionStatus::Submitted
    );

    let milestones = ctx.engine.invoicing.milestones_of(registered.id).await.unwrap();
    assert_eq!(milestones.len(), 2);
    assert_eq!(milestones[0].milestone_no, 1);
    assert_eq!(milestones[1].milestone_no, 2);
}

#[tokio::test]
async fn officer_achievement_handles_zero_target() {
    let ctx = TestContext::new().await;
    let officer = ctx.seed_officer("Asha Rao", OFFICE, None).await;

    let fy = fy_period_for(Utc::now().date_naive());
    let achievement = ctx
        .engine
        .revenue
        .officer_achievement(
            officer.id,
            &fy,
            chrono::NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
        )
        .await
        .unwrap();

    // April 1 means zero pro-rata target; the percentage degrades to 0
    // instead of dividing by zero.
    assert_eq!(achievement.prorata_target, dec!(0.0));
    assert_eq!(achievement.achievement_pct, dec!(0.0));
}
