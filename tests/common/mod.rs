//! Shared harness for integration tests: an engine over in-memory SQLite
//! with seeded reference data and ready-made principals.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use pms_engine::{
    auth::{Grant, Principal},
    config::AppConfig,
    db::{self, DbConfig},
    entities::officer_role::{Role, ScopeType},
    entities::{office, officer},
    migrator::Migrator,
    EngineState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

pub const OFFICE: &str = "RO-DEL";
pub const OTHER_OFFICE: &str = "RO-MUM";

/// Engine over a fresh in-memory SQLite database.
pub struct TestContext {
    pub engine: EngineState,
}

impl TestContext {
    pub async fn new() -> Self {
        // A single connection keeps every session on the same in-memory
        // database.
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("connect to in-memory sqlite");
        Migrator::up(&pool, None).await.expect("run migrations");

        let config = AppConfig::new("sqlite::memory:".to_string(), "test".to_string());
        let engine = EngineState::new(Arc::new(pool), config, None);

        let ctx = Self { engine };
        ctx.seed_office(OFFICE, "Regional Office Delhi").await;
        ctx.seed_office(OTHER_OFFICE, "Regional Office Mumbai").await;
        ctx
    }

    pub async fn seed_office(&self, code: &str, name: &str) -> office::Model {
        office::ActiveModel {
            id: Set(Uuid::new_v4()),
            office_code: Set(code.to_string()),
            office_name: Set(name.to_string()),
            officer_count: Set(0),
            annual_target_per_officer: Set(dec!(60.0)),
            annual_revenue_target: Set(Decimal::ZERO),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.engine.db)
        .await
        .expect("seed office")
    }

    pub async fn seed_officer(
        &self,
        name: &str,
        office_code: &str,
        designation: Option<&str>,
    ) -> officer::Model {
        officer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(format!(
                "{}@example.org",
                name.to_lowercase().replace(' ', ".")
            )),
            designation: Set(designation.map(String::from)),
            office_code: Set(office_code.to_string()),
            is_active: Set(true),
            annual_target: Set(dec!(60.0)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.engine.db)
        .await
        .expect("seed officer")
    }
}

fn open_grant(role: Role, scope_type: ScopeType, scope_value: Option<&str>) -> Grant {
    Grant {
        role,
        scope_type,
        scope_value: scope_value.map(String::from),
        effective_from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        effective_to: None,
    }
}

/// A plain officer with no role grants.
pub fn officer_principal(officer: &officer::Model) -> Principal {
    Principal::with_grants(officer.id, officer.name.clone(), officer.office_code.clone(), vec![])
}

/// An RD Head scoped to their own office.
pub fn head_principal(officer: &officer::Model) -> Principal {
    Principal::with_grants(
        officer.id,
        officer.name.clone(),
        officer.office_code.clone(),
        vec![open_grant(
            Role::RdHead,
            ScopeType::Office,
            Some(&officer.office_code),
        )],
    )
}

/// A Finance officer.
pub fn finance_principal(officer: &officer::Model) -> Principal {
    Principal::with_grants(
        officer.id,
        officer.name.clone(),
        officer.office_code.clone(),
        vec![open_grant(Role::Finance, ScopeType::Global, None)],
    )
}

/// Drive a freshly registered assignment all the way to ACTIVE: approve
/// registration, allocate the team leader, fill every section, submit and
/// approve all four gates. Returns the activated assignment.
pub async fn make_active_assignment(
    ctx: &TestContext,
    head: &officer::Model,
    team_leader: &officer::Model,
    total_value: Decimal,
    shares: &[(Uuid, Decimal)],
) -> pms_engine::entities::assignment::Model {
    use pms_engine::entities::status::AssignmentSection;
    use pms_engine::services::assignments::{RegisterAssignmentRequest, RevenueShareInput};
    use pms_engine::services::invoicing::MilestoneInput;

    let head_p = head_principal(head);
    let tl_p = officer_principal(team_leader);

    let registered = ctx
        .engine
        .assignments
        .register(
            RegisterAssignmentRequest {
                title: "Market study".to_string(),
                client_name: "Acme Industries".to_string(),
                client_type: None,
                domain: Some("Energy".to_string()),
                sub_domain: None,
                office_code: head.office_code.clone(),
                total_value,
                work_order_date: None,
                start_date: None,
                target_date: None,
                remarks: None,
            },
            &tl_p,
        )
        .await
        .expect("register assignment");

    ctx.engine
        .assignments
        .approve_registration(registered.id, &head_p)
        .await
        .expect("approve registration");
    ctx.engine
        .assignments
        .allocate_team_leader(registered.id, &head_p, team_leader.id)
        .await
        .expect("allocate team leader");

    ctx.engine
        .assignments
        .edit_cost_estimate(registered.id, &tl_p, dec!(10.0))
        .await
        .expect("cost estimate");
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
        .expect("milestone plan");
    ctx.engine
        .assignments
        .set_revenue_shares(
            registered.id,
            &tl_p,
            shares
                .iter()
                .map(|(officer_id, share_percent)| RevenueShareInput {
                    officer_id: *officer_id,
                    share_percent: *share_percent,
                })
                .collect(),
        )
        .await
        .expect("revenue shares");

    for section in AssignmentSection::ALL {
        ctx.engine
            .assignments
            .submit_section(registered.id, section, &tl_p)
            .await
            .expect("submit section");
        ctx.engine
            .assignments
            .approve_section(registered.id, section, &head_p)
            .await
            .expect("approve section");
    }

    ctx.engine
        .assignments
        .get(registered.id)
        .await
        .expect("reload assignment")
}

/// An administrator.
pub fn admin_principal(officer: &officer::Model) -> Principal {
    Principal::with_grants(
        officer.id,
        officer.name.clone(),
        officer.office_code.clone(),
        vec![open_grant(Role::Admin, ScopeType::Global, None)],
    )
}
