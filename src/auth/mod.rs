//! Authorization: the [`Principal`] capability object.
//!
//! A principal is an officer plus their active, time-scoped role grants.
//! The grants table is the single source of truth for roles; a plain
//! officer with no grants still acts under an implicit OFFICER grant.
//! Every service operation receives a `&Principal` and asks it capability
//! questions; no call site compares role strings.

use crate::entities::officer;
use crate::entities::officer_role::{self, Role, ScopeType};
use crate::errors::ServiceError;
use chrono::{NaiveDate, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod permissions;

pub use permissions::{role_permissions, Action};

/// Roles in hierarchy order, highest authority first. Used to pick the
/// primary role for display and tie-breaking.
pub const ROLE_HIERARCHY: [Role; 10] = [
    Role::Admin,
    Role::Dg,
    Role::DdgI,
    Role::DdgII,
    Role::Finance,
    Role::Accounts,
    Role::RdHead,
    Role::GroupHead,
    Role::TeamLeader,
    Role::Officer,
];

/// One role grant held by a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub role: Role,
    pub scope_type: ScopeType,
    pub scope_value: Option<String>,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

impl Grant {
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.effective_from <= today && self.effective_to.map_or(true, |to| to >= today)
    }

    fn matches_office(&self, office_code: &str) -> bool {
        match self.scope_type {
            ScopeType::Global => true,
            ScopeType::Office | ScopeType::Group => {
                self.scope_value.as_deref() == Some(office_code)
            }
            ScopeType::Individual => false,
        }
    }
}

/// An authenticated officer and their capability set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub officer_id: Uuid,
    pub name: String,
    pub office_code: String,
    pub grants: Vec<Grant>,
}

impl Principal {
    /// Load a principal from reference data. Grants come exclusively from
    /// the officer_roles table; the implicit OFFICER grant is appended so
    /// every principal has at least one role.
    pub async fn load<C: ConnectionTrait>(db: &C, officer_id: Uuid) -> Result<Self, ServiceError> {
        let officer = officer::Entity::find_by_id(officer_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Officer", officer_id))?;

        let rows = officer_role::Entity::find()
            .filter(officer_role::Column::OfficerId.eq(officer_id))
            .all(db)
            .await?;

        let mut grants: Vec<Grant> = rows
            .into_iter()
            .map(|r| Grant {
                role: r.role_type,
                scope_type: r.scope_type,
                scope_value: r.scope_value,
                effective_from: r.effective_from,
                effective_to: r.effective_to,
            })
            .collect();

        grants.push(Grant {
            role: Role::Officer,
            scope_type: ScopeType::Individual,
            scope_value: None,
            effective_from: NaiveDate::MIN,
            effective_to: None,
        });

        Ok(Self {
            officer_id,
            name: officer.name,
            office_code: officer.office_code,
            grants,
        })
    }

    /// Build a principal without touching storage (tests, embedders).
    pub fn with_grants(
        officer_id: Uuid,
        name: impl Into<String>,
        office_code: impl Into<String>,
        grants: Vec<Grant>,
    ) -> Self {
        Self {
            officer_id,
            name: name.into(),
            office_code: office_code.into(),
            grants,
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Roles active on `today`, deduplicated, in hierarchy order.
    pub fn active_roles_on(&self, today: NaiveDate) -> Vec<Role> {
        let mut roles: Vec<Role> = Vec::new();
        for role in ROLE_HIERARCHY {
            if self
                .grants
                .iter()
                .any(|g| g.role == role && g.is_active_on(today))
                && !roles.contains(&role)
            {
                roles.push(role);
            }
        }
        roles
    }

    /// Highest active role in the hierarchy; OFFICER at minimum.
    pub fn primary_role(&self) -> Role {
        self.active_roles_on(Self::today())
            .into_iter()
            .next()
            .unwrap_or(Role::Officer)
    }

    pub fn has_active_role_on(&self, role: Role, today: NaiveDate) -> bool {
        self.grants
            .iter()
            .any(|g| g.role == role && g.is_active_on(today))
    }

    pub fn has_active_role(&self, role: Role) -> bool {
        self.has_active_role_on(role, Self::today())
    }

    pub fn is_admin(&self) -> bool {
        self.has_active_role(Role::Admin)
    }

    /// DG/DDG level.
    pub fn is_senior_management(&self) -> bool {
        let today = Self::today();
        [Role::Dg, Role::DdgI, Role::DdgII]
            .into_iter()
            .any(|r| self.has_active_role_on(r, today))
    }

    /// RD Head or Group Head of anything.
    pub fn is_head(&self) -> bool {
        let today = Self::today();
        [Role::RdHead, Role::GroupHead]
            .into_iter()
            .any(|r| self.has_active_role_on(r, today))
    }

    /// Finance sign-off capability: invoice approval and payment recording.
    pub fn is_finance_officer(&self) -> bool {
        let today = Self::today();
        [
            Role::Admin,
            Role::Finance,
            Role::Accounts,
            Role::Dg,
            Role::DdgI,
            Role::DdgII,
        ]
        .into_iter()
        .any(|r| self.has_active_role_on(r, today))
    }

    /// Head authority over a specific office: a global role, or an active
    /// RD_HEAD / GROUP_HEAD / TEAM_LEADER grant scoped to that office.
    pub fn is_office_head_on(&self, office_code: &str, today: NaiveDate) -> bool {
        self.grants.iter().any(|g| {
            g.is_active_on(today)
                && (g.role.is_global()
                    || (matches!(g.role, Role::RdHead | Role::GroupHead | Role::TeamLeader)
                        && g.matches_office(office_code)))
        })
    }

    pub fn is_office_head(&self, office_code: &str) -> bool {
        self.is_office_head_on(office_code, Self::today())
    }

    /// Table-driven capability check across all active roles.
    pub fn can(&self, action: Action) -> bool {
        let today = Self::today();
        self.grants
            .iter()
            .filter(|g| g.is_active_on(today))
            .any(|g| role_permissions(g.role).contains(&action))
    }

    /// All permissions currently held, for display/introspection.
    pub fn permissions(&self) -> Vec<Action> {
        let today = Self::today();
        let mut all: Vec<Action> = Vec::new();
        for grant in self.grants.iter().filter(|g| g.is_active_on(today)) {
            for action in role_permissions(grant.role) {
                if !all.contains(action) {
                    all.push(*action);
                }
            }
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn grant(role: Role, scope_type: ScopeType, scope_value: Option<&str>) -> Grant {
        Grant {
            role,
            scope_type,
            scope_value: scope_value.map(String::from),
            effective_from: date(2020, 1, 1),
            effective_to: None,
        }
    }

    fn principal(grants: Vec<Grant>) -> Principal {
        Principal::with_grants(Uuid::new_v4(), "A. Officer", "RO-DEL", grants)
    }

    #[test]
    fn expired_grant_is_inactive() {
        let mut g = grant(Role::RdHead, ScopeType::Office, Some("RO-DEL"));
        g.effective_to = Some(date(2024, 3, 31));
        assert!(g.is_active_on(date(2024, 3, 31)));
        assert!(!g.is_active_on(date(2024, 4, 1)));
    }

    #[test]
    fn future_grant_is_inactive() {
        let mut g = grant(Role::GroupHead, ScopeType::Group, Some("ENERGY"));
        g.effective_from = date(2030, 1, 1);
        assert!(!g.is_active_on(date(2026, 8, 6)));
    }

    #[test]
    fn open_ended_grant_stays_active() {
        let g = grant(Role::RdHead, ScopeType::Office, Some("RO-DEL"));
        assert!(g.is_active_on(date(2099, 12, 31)));
    }

    #[test]
    fn global_roles_head_any_office() {
        let p = principal(vec![grant(Role::DdgI, ScopeType::Global, None)]);
        assert!(p.is_office_head_on("RO-DEL", date(2026, 8, 6)));
        assert!(p.is_office_head_on("RO-MUM", date(2026, 8, 6)));
    }

    #[test]
    fn scoped_head_is_confined_to_their_office() {
        let p = principal(vec![grant(Role::RdHead, ScopeType::Office, Some("RO-DEL"))]);
        assert!(p.is_office_head_on("RO-DEL", date(2026, 8, 6)));
        assert!(!p.is_office_head_on("RO-MUM", date(2026, 8, 6)));
    }

    #[test]
    fn plain_officer_heads_nothing() {
        let p = principal(vec![grant(Role::Officer, ScopeType::Individual, None)]);
        assert!(!p.is_office_head_on("RO-DEL", date(2026, 8, 6)));
        assert!(!p.is_finance_officer());
        assert!(!p.is_head());
    }

    #[test]
    fn finance_capability_includes_senior_management() {
        let p = principal(vec![grant(Role::DdgII, ScopeType::Global, None)]);
        assert!(p.is_finance_officer());

        let f = principal(vec![grant(Role::Finance, ScopeType::Global, None)]);
        assert!(f.is_finance_officer());
        assert!(!f.is_head());
    }

    #[test]
    fn primary_role_follows_hierarchy() {
        let p = principal(vec![
            grant(Role::TeamLeader, ScopeType::Office, Some("RO-DEL")),
            grant(Role::GroupHead, ScopeType::Group, Some("ENERGY")),
        ]);
        assert_eq!(p.primary_role(), Role::GroupHead);
    }

    #[test]
    fn head_can_approve_assignments_officer_cannot() {
        let head = principal(vec![grant(Role::RdHead, ScopeType::Office, Some("RO-DEL"))]);
        let officer = principal(vec![]);
        assert!(head.can(Action::ApproveAssignment));
        assert!(!officer.can(Action::ApproveAssignment));
    }
}
