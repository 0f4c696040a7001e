//! End-to-end tests for the assignment workflow engine: registration,
//! section gates, auto-activation, and the reset-on-edit rule.

mod common;

use assert_matches::assert_matches;
use common::{
    head_principal, make_active_assignment, officer_principal, TestContext, OFFICE,
};
use pms_engine::{
    entities::status::{
        ApprovalStatus, AssignmentSection, SectionStatus, TeamRole, WorkflowStage,
    },
    errors::ServiceError,
    services::assignments::{RegisterAssignmentRequest, RevenueShareInput},
    services::invoicing::MilestoneInput,
};
use rust_decimal_macros::dec;

fn registration(office: &str) -> RegisterAssignmentRequest {
    RegisterAssignmentRequest {
        title: "Market study".to_string(),
        client_name: "Acme Industries".to_string(),
        client_type: None,
        domain: Some("Energy".to_string()),
        sub_domain: None,
        office_code: office.to_string(),
        total_value: dec!(100.0),
        work_order_date: None,
        start_date: None,
        target_date: None,
        remarks: None,
    }
}

#[tokio::test]
async fn registration_starts_with_draft_sections() {
    let ctx = TestContext::new().await;
    let officer = ctx.seed_officer("Asha Rao", OFFICE, None).await;

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &officer_principal(&officer))
        .await
        .unwrap();

    assert_eq!(registered.workflow_stage, WorkflowStage::Registration);
    assert_eq!(registered.approval_status, ApprovalStatus::Pending);
    for section in AssignmentSection::ALL {
        assert_eq!(registered.section_status(section), SectionStatus::Draft);
    }
    assert!(registered.assignment_no.starts_with("WO-RO-DEL-"));
}

#[tokio::test]
async fn registration_approval_advances_to_tl_assignment() {
    let ctx = TestContext::new().await;
    let officer = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &officer_principal(&officer))
        .await
        .unwrap();

    let denied = ctx
        .engine
        .assignments
        .approve_registration(registered.id, &officer_principal(&officer))
        .await;
    assert_matches!(denied, Err(ServiceError::Unauthorized(_)));

    let approved = ctx
        .engine
        .assignments
        .approve_registration(registered.id, &head_principal(&head))
        .await
        .unwrap();
    assert_eq!(approved.approval_status, ApprovalStatus::Approved);
    assert_eq!(approved.workflow_stage, WorkflowStage::TlAssignment);
}

#[tokio::test]
async fn team_leader_allocation_builds_the_roster() {
    let ctx = TestContext::new().await;
    let officer = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &officer_principal(&officer))
        .await
        .unwrap();
    ctx.engine
        .assignments
        .approve_registration(registered.id, &head_principal(&head))
        .await
        .unwrap();

    let allocated = ctx
        .engine
        .assignments
        .allocate_team_leader(registered.id, &head_principal(&head), officer.id)
        .await
        .unwrap();
    assert_eq!(allocated.workflow_stage, WorkflowStage::DetailEntry);
    assert_eq!(allocated.team_leader_officer_id, Some(officer.id));

    let roster = ctx.engine.assignments.team_roster(registered.id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].officer_id, officer.id);
    assert_eq!(roster[0].role, TeamRole::TeamLeader);
}

#[tokio::test]
async fn empty_sections_cannot_be_submitted() {
    let ctx = TestContext::new().await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &officer_principal(&tl))
        .await
        .unwrap();
    ctx.engine
        .assignments
        .approve_registration(registered.id, &head_principal(&head))
        .await
        .unwrap();
    ctx.engine
        .assignments
        .allocate_team_leader(registered.id, &head_principal(&head), tl.id)
        .await
        .unwrap();

    for section in [
        AssignmentSection::Cost,
        AssignmentSection::Milestone,
        AssignmentSection::Revenue,
    ] {
        let result = ctx
            .engine
            .assignments
            .submit_section(registered.id, section, &officer_principal(&tl))
            .await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }
}

#[tokio::test]
async fn approving_an_unsubmitted_section_is_an_error() {
    let ctx = TestContext::new().await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &officer_principal(&tl))
        .await
        .unwrap();
    ctx.engine
        .assignments
        .approve_registration(registered.id, &head_principal(&head))
        .await
        .unwrap();

    let result = ctx
        .engine
        .assignments
        .approve_section(registered.id, AssignmentSection::Cost, &head_principal(&head))
        .await;
    assert_matches!(result, Err(ServiceError::InvalidStateTransition(_)));
}

#[tokio::test]
async fn only_the_team_leader_submits_sections() {
    let ctx = TestContext::new().await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let other = ctx.seed_officer("Vikram Shah", OFFICE, None).await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &officer_principal(&tl))
        .await
        .unwrap();
    ctx.engine
        .assignments
        .approve_registration(registered.id, &head_principal(&head))
        .await
        .unwrap();
    ctx.engine
        .assignments
        .allocate_team_leader(registered.id, &head_principal(&head), tl.id)
        .await
        .unwrap();
    ctx.engine
        .assignments
        .edit_cost_estimate(registered.id, &officer_principal(&tl), dec!(5.0))
        .await
        .unwrap();

    let denied = ctx
        .engine
        .assignments
        .submit_section(
            registered.id,
            AssignmentSection::Cost,
            &officer_principal(&other),
        )
        .await;
    assert_matches!(denied, Err(ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn all_four_approvals_activate_the_assignment() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let member = ctx.seed_officer("Vikram Shah", OFFICE, None).await;

    let active = make_active_assignment(
        &ctx,
        &head,
        &tl,
        dec!(100.0),
        &[(tl.id, dec!(60.0)), (member.id, dec!(40.0))],
    )
    .await;

    assert_eq!(active.workflow_stage, WorkflowStage::Active);
    assert!(active.activation_gates_hold());
}

#[tokio::test]
async fn three_approvals_are_not_enough() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let head_p = head_principal(&head);
    let tl_p = officer_principal(&tl);

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &tl_p)
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
        .assignments
        .edit_cost_estimate(registered.id, &tl_p, dec!(10.0))
        .await
        .unwrap();
    ctx.engine
        .invoicing
        .add_milestones(
            registered.id,
            vec![MilestoneInput {
                title: "Final report".to_string(),
                description: None,
                invoice_percent: dec!(100.0),
                target_date: None,
            }],
            &tl_p,
        )
        .await
        .unwrap();
    ctx.engine
        .assignments
        .set_revenue_shares(
            registered.id,
            &tl_p,
            vec![RevenueShareInput {
                officer_id: tl.id,
                share_percent: dec!(100.0),
            }],
        )
        .await
        .unwrap();

    // Approve only cost, team and milestone; leave revenue submitted.
    for section in [
        AssignmentSection::Cost,
        AssignmentSection::Team,
        AssignmentSection::Milestone,
    ] {
        ctx.engine
            .assignments
            .submit_section(registered.id, section, &tl_p)
            .await
            .unwrap();
        ctx.engine
            .assignments
            .approve_section(registered.id, section, &head_p)
            .await
            .unwrap();
    }
    ctx.engine
        .assignments
        .submit_section(registered.id, AssignmentSection::Revenue, &tl_p)
        .await
        .unwrap();

    let current = ctx.engine.assignments.get(registered.id).await.unwrap();
    assert_eq!(current.workflow_stage, WorkflowStage::DetailEntry);
    assert!(!current.activation_gates_hold());
}

#[tokio::test]
async fn editing_an_approved_section_resets_it_and_deactivates() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;

    let active = make_active_assignment(&ctx, &head, &tl, dec!(100.0), &[(tl.id, dec!(100.0))]).await;
    assert_eq!(active.workflow_stage, WorkflowStage::Active);

    let edited = ctx
        .engine
        .assignments
        .edit_cost_estimate(active.id, &officer_principal(&tl), dec!(12.5))
        .await
        .unwrap();

    // The edit forces re-approval and pushes the workflow back.
    assert_eq!(
        edited.section_status(AssignmentSection::Cost),
        SectionStatus::Submitted
    );
    assert_eq!(edited.workflow_stage, WorkflowStage::DetailEntry);
    assert_eq!(edited.total_expenditure, dec!(12.50));

    // Re-approval restores ACTIVE.
    let reapproved = ctx
        .engine
        .assignments
        .approve_section(active.id, AssignmentSection::Cost, &head_principal(&head))
        .await
        .unwrap();
    assert_eq!(reapproved.workflow_stage, WorkflowStage::Active);
}

#[tokio::test]
async fn editing_a_draft_section_keeps_it_draft() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let head_p = head_principal(&head);
    let tl_p = officer_principal(&tl);

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &tl_p)
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

    let edited = ctx
        .engine
        .assignments
        .edit_cost_estimate(registered.id, &tl_p, dec!(7.0))
        .await
        .unwrap();
    assert_eq!(
        edited.section_status(AssignmentSection::Cost),
        SectionStatus::Draft
    );
    assert_eq!(edited.workflow_stage, WorkflowStage::DetailEntry);
}

#[tokio::test]
async fn rejected_section_can_be_resubmitted() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let head_p = head_principal(&head);
    let tl_p = officer_principal(&tl);

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &tl_p)
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
        .assignments
        .edit_cost_estimate(registered.id, &tl_p, dec!(5.0))
        .await
        .unwrap();
    ctx.engine
        .assignments
        .submit_section(registered.id, AssignmentSection::Cost, &tl_p)
        .await
        .unwrap();

    let rejected = ctx
        .engine
        .assignments
        .reject_section(
            registered.id,
            AssignmentSection::Cost,
            &head_p,
            "estimate looks thin".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(
        rejected.section_status(AssignmentSection::Cost),
        SectionStatus::Rejected
    );

    let resubmitted = ctx
        .engine
        .assignments
        .submit_section(registered.id, AssignmentSection::Cost, &tl_p)
        .await
        .unwrap();
    assert_eq!(
        resubmitted.section_status(AssignmentSection::Cost),
        SectionStatus::Submitted
    );
}

#[tokio::test]
async fn revenue_share_sum_is_validated_within_tolerance() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;
    let member = ctx.seed_officer("Vikram Shah", OFFICE, None).await;
    let head_p = head_principal(&head);
    let tl_p = officer_principal(&tl);

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &tl_p)
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

    // 50 + 50.02 = 100.02: beyond the 0.01 tolerance.
    let rejected = ctx
        .engine
        .assignments
        .set_revenue_shares(
            registered.id,
            &tl_p,
            vec![
                RevenueShareInput {
                    officer_id: tl.id,
                    share_percent: dec!(50.0),
                },
                RevenueShareInput {
                    officer_id: member.id,
                    share_percent: dec!(50.02),
                },
            ],
        )
        .await;
    assert_matches!(rejected, Err(ServiceError::ValidationError(_)));

    // 49.995 + 50.005 = 100.00 exactly.
    let accepted = ctx
        .engine
        .assignments
        .set_revenue_shares(
            registered.id,
            &tl_p,
            vec![
                RevenueShareInput {
                    officer_id: tl.id,
                    share_percent: dec!(49.995),
                },
                RevenueShareInput {
                    officer_id: member.id,
                    share_percent: dec!(50.005),
                },
            ],
        )
        .await;
    assert!(accepted.is_ok());
}

#[tokio::test]
async fn completion_requires_active() {
    let ctx = TestContext::new().await;
    let head = ctx.seed_officer("Ravi Menon", OFFICE, None).await;
    let tl = ctx.seed_officer("Asha Rao", OFFICE, None).await;

    let registered = ctx
        .engine
        .assignments
        .register(registration(OFFICE), &officer_principal(&tl))
        .await
        .unwrap();
    ctx.engine
        .assignments
        .approve_registration(registered.id, &head_principal(&head))
        .await
        .unwrap();

    let premature = ctx
        .engine
        .assignments
        .complete(registered.id, &head_principal(&head))
        .await;
    assert_matches!(premature, Err(ServiceError::InvalidStateTransition(_)));

    let active = make_active_assignment(&ctx, &head, &tl, dec!(80.0), &[(tl.id, dec!(100.0))]).await;
    let completed = ctx
        .engine
        .assignments
        .complete(active.id, &officer_principal(&tl))
        .await
        .unwrap();
    assert_eq!(completed.workflow_stage, WorkflowStage::Completed);
}
