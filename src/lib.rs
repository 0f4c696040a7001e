//! PMS Engine Library
//!
//! Performance-management engine for consulting organizations: the
//! opportunity pipeline (Enquiry -> Proposal Request -> Proposal -> Work
//! Order), the assignment section-approval workflow, milestone-based
//! invoicing with 80/20 revenue recognition, and the officer revenue
//! ledger reconciled against pro-rata targets.
//!
//! The engine exposes no wire protocol of its own; an embedding
//! application (HTTP layer, scheduler, reporting) calls the services in
//! [`services`] with a loaded [`auth::Principal`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod fiscal;
#[allow(elided_lifetimes_in_paths)]
pub mod migrator;
pub mod numbering;
pub mod services;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use services::{
    AssignmentLocks, AssignmentService, EnquiryService, GrievanceService, InvoicingService,
    ProposalRequestService, ProposalService, ReferenceDataService, RevenueService,
};

/// Engine state: one database pool, one event channel, and every service
/// wired over them. Cloneable and cheap to share.
#[derive(Clone)]
pub struct EngineState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub enquiries: EnquiryService,
    pub proposal_requests: ProposalRequestService,
    pub proposals: ProposalService,
    pub assignments: AssignmentService,
    pub invoicing: InvoicingService,
    pub revenue: RevenueService,
    pub grievances: GrievanceService,
    pub reference_data: ReferenceDataService,
}

impl EngineState {
    /// Wire every service over a shared pool and optional event sender.
    /// Assignment-level mutual exclusion is shared between the workflow
    /// and invoicing services so milestone edits serialize with section
    /// approvals.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Option<Arc<events::EventSender>>,
    ) -> Self {
        let locks = Arc::new(AssignmentLocks::new());

        Self {
            enquiries: EnquiryService::new(db.clone(), event_sender.clone()),
            proposal_requests: ProposalRequestService::new(db.clone(), event_sender.clone()),
            proposals: ProposalService::new(db.clone(), event_sender.clone()),
            assignments: AssignmentService::new(db.clone(), event_sender.clone(), locks.clone()),
            invoicing: InvoicingService::new(db.clone(), event_sender.clone(), locks),
            revenue: RevenueService::new(db.clone()),
            grievances: GrievanceService::new(db.clone(), event_sender),
            reference_data: ReferenceDataService::new(db.clone()),
            db,
            config,
        }
    }

    /// Connect, optionally migrate, and wire services from configuration.
    pub async fn from_config(
        config: config::AppConfig,
        event_sender: Option<Arc<events::EventSender>>,
    ) -> Result<Self, errors::ServiceError> {
        let db_config = db::DbConfig::from(&config);
        let pool = db::establish_connection_with_config(&db_config).await?;

        if config.auto_migrate {
            use sea_orm_migration::MigratorTrait;
            migrator::Migrator::up(&pool, None)
                .await
                .map_err(errors::ServiceError::DatabaseError)?;
        }

        Ok(Self::new(Arc::new(pool), config, event_sender))
    }
}

pub mod prelude {
    pub use crate::auth::{Action, Grant, Principal};
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::services::*;
    pub use crate::EngineState;
}
