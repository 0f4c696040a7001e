use super::status::PaymentMode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A payment collected against an approved invoice request. Each receipt
/// independently recognizes 20% of its own received amount; partial
/// payments produce proportionally smaller tranches.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_receipts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub receipt_number: String,

    pub invoice_request_id: Uuid,

    /// Amount actually received, which may be less than the invoice amount.
    pub amount_received: Decimal,

    pub receipt_date: NaiveDate,
    pub payment_mode: PaymentMode,

    /// UTR / cheque / DD number.
    pub reference_number: Option<String>,

    /// Financial year derived from `receipt_date`.
    pub fy_period: String,

    pub remarks: Option<String>,

    /// 20% of `amount_received`, written when the receipt is recorded.
    pub revenue_recognized_20: Decimal,

    pub recorded_by: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoice_request::Entity",
        from = "Column::InvoiceRequestId",
        to = "super::invoice_request::Column::Id"
    )]
    InvoiceRequest,
}

impl Related<super::invoice_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
