use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organisational roles, highest authority first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Role {
    #[sea_orm(string_value = "ADMIN")]
    #[strum(serialize = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "DG")]
    #[strum(serialize = "DG")]
    Dg,
    #[sea_orm(string_value = "DDG-I")]
    #[strum(serialize = "DDG-I")]
    DdgI,
    #[sea_orm(string_value = "DDG-II")]
    #[strum(serialize = "DDG-II")]
    DdgII,
    #[sea_orm(string_value = "FINANCE")]
    #[strum(serialize = "FINANCE")]
    Finance,
    #[sea_orm(string_value = "ACCOUNTS")]
    #[strum(serialize = "ACCOUNTS")]
    Accounts,
    #[sea_orm(string_value = "RD_HEAD")]
    #[strum(serialize = "RD_HEAD")]
    RdHead,
    #[sea_orm(string_value = "GROUP_HEAD")]
    #[strum(serialize = "GROUP_HEAD")]
    GroupHead,
    #[sea_orm(string_value = "TEAM_LEADER")]
    #[strum(serialize = "TEAM_LEADER")]
    TeamLeader,
    #[sea_orm(string_value = "OFFICER")]
    #[strum(serialize = "OFFICER")]
    Officer,
}

impl Role {
    /// Roles whose authority is organisation-wide rather than scoped to an
    /// office or group.
    pub fn is_global(self) -> bool {
        matches!(self, Role::Admin | Role::Dg | Role::DdgI | Role::DdgII)
    }
}

/// What a role grant is scoped to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeType {
    #[sea_orm(string_value = "GLOBAL")]
    Global,
    #[sea_orm(string_value = "OFFICE")]
    Office,
    #[sea_orm(string_value = "GROUP")]
    Group,
    #[sea_orm(string_value = "INDIVIDUAL")]
    Individual,
}

/// Time-scoped role grant. The grants table is the single source of truth
/// for an officer's roles; a "primary role" is one GLOBAL-scope grant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "officer_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub officer_id: Uuid,
    pub role_type: Role,
    pub scope_type: ScopeType,

    /// Office or group code the grant applies to; None for GLOBAL scope.
    pub scope_value: Option<String>,

    pub is_primary: bool,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
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
}

impl Related<super::officer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Officer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A grant is active on `today` iff the validity window contains it.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.effective_from <= today && self.effective_to.map_or(true, |to| to >= today)
    }
}
