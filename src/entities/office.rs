use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Regional/group office. Read-mostly reference data; writes originate in
/// the org-management application, not this engine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Short code used in document numbers, e.g. "RO-DEL".
    #[sea_orm(unique)]
    pub office_code: String,

    pub office_name: String,
    pub officer_count: i32,
    pub annual_target_per_officer: Decimal,
    pub annual_revenue_target: Decimal,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::officer::Entity")]
    Officers,
}

impl Related<super::officer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Officers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
