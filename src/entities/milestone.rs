use super::status::MilestoneStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Delivery milestone, ordered by `milestone_no` within its assignment.
///
/// Invariant: `payment_received` implies `invoice_raised`; payment can
/// never precede invoicing.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "milestones")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub assignment_id: Uuid,

    /// 1-based position within the assignment; unique per assignment.
    pub milestone_no: i32,

    #[validate(length(min = 1, max = 200, message = "Milestone title is required"))]
    pub title: String,

    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    /// Set only when status is Completed.
    pub actual_completion_date: Option<NaiveDate>,

    /// Share of contract value this milestone represents (percent).
    pub invoice_percent: Decimal,
    /// Invoice value raised against this milestone.
    pub invoice_amount: Decimal,

    pub invoice_raised: bool,
    pub invoice_raised_date: Option<NaiveDate>,
    pub payment_received: bool,
    pub payment_received_date: Option<NaiveDate>,

    pub status: MilestoneStatus,
    pub remarks: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
    #[sea_orm(has_many = "super::invoice_request::Entity")]
    InvoiceRequests,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::invoice_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Recognition weight of this milestone for physical progress:
    /// 1.0 once paid, 0.8 once invoiced, 0 otherwise.
    pub fn recognition_factor(&self) -> Decimal {
        if self.payment_received {
            Decimal::ONE
        } else if self.invoice_raised {
            Decimal::new(8, 1)
        } else {
            Decimal::ZERO
        }
    }
}
