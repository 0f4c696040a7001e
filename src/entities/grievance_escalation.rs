use super::status::EscalationLevel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// History of level changes on a grievance ticket, manual or automatic.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grievance_escalations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub ticket_id: Uuid,
    pub from_level: EscalationLevel,
    pub to_level: EscalationLevel,
    pub from_handler: Option<Uuid>,
    pub to_handler: Option<Uuid>,
    pub escalation_reason: Option<String>,
    pub auto_escalated: bool,
    pub escalated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grievance_ticket::Entity",
        from = "Column::TicketId",
        to = "super::grievance_ticket::Column::Id"
    )]
    Ticket,
}

impl Related<super::grievance_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
