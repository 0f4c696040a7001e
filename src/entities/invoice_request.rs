use super::status::{InvoiceStatus, InvoiceType};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A Team Leader's request to raise an invoice, approved by Finance.
/// Approval recognizes 80% of the invoice amount as earned revenue.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub request_number: String,

    pub assignment_id: Uuid,
    pub milestone_id: Option<Uuid>,
    pub invoice_type: InvoiceType,

    /// Requested invoice value in Lakhs.
    pub invoice_amount: Decimal,

    /// Financial year the invoice falls in, e.g. "2025-26".
    pub fy_period: String,

    pub description: Option<String>,
    pub status: InvoiceStatus,

    pub requested_by: Uuid,
    pub requested_at: DateTimeUtc,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeUtc>,
    pub approval_remarks: Option<String>,

    /// 80% of `invoice_amount`, written on approval.
    pub revenue_recognized_80: Decimal,

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
    #[sea_orm(
        belongs_to = "super::milestone::Entity",
        from = "Column::MilestoneId",
        to = "super::milestone::Column::Id"
    )]
    Milestone,
    #[sea_orm(has_many = "super::payment_receipt::Entity")]
    PaymentReceipts,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::milestone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Milestone.def()
    }
}

impl Related<super::payment_receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentReceipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
