use super::status::RevenueType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of one revenue-recognition event credited to one
/// officer. This table is the source of truth for officer achievement:
/// rows are never updated or deleted, and they outlive their source
/// invoice/payment rows for audit purposes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "officer_revenue_ledger")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub officer_id: Uuid,
    pub assignment_id: Uuid,
    pub invoice_request_id: Option<Uuid>,
    pub payment_receipt_id: Option<Uuid>,

    pub revenue_type: RevenueType,

    /// The officer's share percentage at recognition time.
    pub share_percent: Decimal,

    /// event_base_amount x share_percent / 100, in Lakhs.
    pub amount: Decimal,

    pub fy_period: String,
    pub transaction_date: NaiveDate,
    pub remarks: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::officer::Entity",
        from = "Column::OfficerId",
        to = "super::officer::Column::Id"
    )]
    Officer,
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
}

impl Related<super::officer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Officer.def()
    }
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_invoice_tranche(&self) -> bool {
        self.revenue_type == RevenueType::Invoice80
    }

    pub fn is_payment_tranche(&self) -> bool {
        self.revenue_type == RevenueType::Payment20
    }
}
