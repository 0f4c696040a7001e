use super::status::{ComplaintType, EscalationLevel, GrievancePriority, GrievanceStatus};
use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Officer grievance ticket, escalated TL -> HEAD -> DDG -> DG when it
/// sits unresolved past its level's due date.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "grievance_tickets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub ticket_number: String,

    pub officer_id: Uuid,
    /// None for grievances not tied to a specific assignment.
    pub assignment_id: Option<Uuid>,

    pub complaint_type: ComplaintType,

    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub status: GrievanceStatus,
    pub priority: GrievancePriority,
    pub current_level: EscalationLevel,

    /// Current handler.
    pub assigned_to: Option<Uuid>,

    pub resolution: Option<String>,
    pub resolution_date: Option<NaiveDate>,
    pub escalation_due_date: Option<NaiveDate>,

    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub closed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::officer::Entity",
        from = "Column::OfficerId",
        to = "super::officer::Column::Id"
    )]
    Officer,
    #[sea_orm(has_many = "super::grievance_escalation::Entity")]
    Escalations,
}

impl Related<super::officer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Officer.def()
    }
}

impl Related<super::grievance_escalation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Escalations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
