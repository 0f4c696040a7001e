use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Consulting officer. Read-mostly reference data consumed for allocation,
/// revenue apportionment and target reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "officers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Officer name is required"))]
    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Designation string, e.g. "Dy. Director (Technical)"; drives the
    /// default annual target.
    pub designation: Option<String>,

    pub office_code: String,
    pub is_active: bool,

    /// Annual revenue target in Lakhs.
    pub annual_target: Decimal,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::office::Entity",
        from = "Column::OfficeCode",
        to = "super::office::Column::OfficeCode"
    )]
    Office,
    #[sea_orm(has_many = "super::officer_role::Entity")]
    RoleGrants,
    #[sea_orm(has_many = "super::officer_revenue_ledger::Entity")]
    LedgerEntries,
}

impl Related<super::office::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Office.def()
    }
}

impl Related<super::officer_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoleGrants.def()
    }
}

impl Related<super::officer_revenue_ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
