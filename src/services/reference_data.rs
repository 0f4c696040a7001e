//! Read-mostly reference data: offices, officers, designation targets.
//!
//! Writes to these tables originate in the excluded org-management
//! application; this engine only reads them, treating a renamed office or
//! transferred officer as an eventually-consistent input.

use crate::db::DbPool;
use crate::entities::{office, officer};
use crate::errors::ServiceError;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Designation-based annual revenue targets in Lakhs, matched by
/// case-insensitive substring, first hit wins. Order matters: the more
/// specific designations must precede plain "Director".
static DESIGNATION_TARGETS: Lazy<Vec<(&'static str, Decimal)>> = Lazy::new(|| {
    vec![
        ("Assistant Director", dec!(30.0)),
        ("Dy. Director", dec!(50.0)),
        ("Deputy Director", dec!(50.0)),
        ("Director-II", dec!(60.0)),
        ("Director-I", dec!(70.0)),
        ("Director", dec!(60.0)),
    ]
});

/// Default annual target when the designation is unknown.
pub const DEFAULT_TARGET: Decimal = dec!(60.0);

/// Annual target for a designation string.
pub fn target_for_designation(designation: Option<&str>) -> Decimal {
    let Some(designation) = designation else {
        return DEFAULT_TARGET;
    };
    let designation = designation.trim().to_lowercase();
    if designation.is_empty() {
        return DEFAULT_TARGET;
    }
    for (key, target) in DESIGNATION_TARGETS.iter() {
        if designation.contains(&key.to_lowercase()) {
            return *target;
        }
    }
    DEFAULT_TARGET
}

/// Lookup service over office/officer reference data.
#[derive(Clone)]
pub struct ReferenceDataService {
    db: Arc<DbPool>,
}

impl ReferenceDataService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_office(&self, office_code: &str) -> Result<office::Model, ServiceError> {
        office::Entity::find()
            .filter(office::Column::OfficeCode.eq(office_code))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Office {} not found", office_code)))
    }

    #[instrument(skip(self))]
    pub async fn list_offices(&self) -> Result<Vec<office::Model>, ServiceError> {
        Ok(office::Entity::find()
            .order_by_asc(office::Column::OfficeCode)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_officer(&self, officer_id: Uuid) -> Result<officer::Model, ServiceError> {
        officer::Entity::find_by_id(officer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Officer", officer_id))
    }

    #[instrument(skip(self))]
    pub async fn list_officers_by_office(
        &self,
        office_code: &str,
    ) -> Result<Vec<officer::Model>, ServiceError> {
        Ok(officer::Entity::find()
            .filter(officer::Column::OfficeCode.eq(office_code))
            .filter(officer::Column::IsActive.eq(true))
            .order_by_asc(officer::Column::Name)
            .all(&*self.db)
            .await?)
    }

    /// The target an officer is measured against: their explicit target if
    /// set, otherwise the designation default.
    pub fn effective_annual_target(officer: &officer::Model) -> Decimal {
        if officer.annual_target > Decimal::ZERO {
            officer.annual_target
        } else {
            target_for_designation(officer.designation.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some("Assistant Director"), dec!(30.0); "assistant director")]
    #[test_case(Some("Dy. Director (Technical)"), dec!(50.0); "dy director with suffix")]
    #[test_case(Some("deputy director"), dec!(50.0); "case insensitive")]
    #[test_case(Some("Director-I"), dec!(70.0); "director one")]
    #[test_case(Some("Director-II"), dec!(60.0); "director two")]
    #[test_case(Some("Director"), dec!(60.0); "plain director")]
    #[test_case(Some("Consultant"), dec!(60.0); "unknown designation")]
    #[test_case(None, dec!(60.0); "missing designation")]
    fn designation_targets(designation: Option<&str>, expect: Decimal) {
        assert_eq!(target_for_designation(designation), expect);
    }

    #[test]
    fn blank_designation_falls_back_to_default() {
        assert_eq!(target_for_designation(Some("   ")), DEFAULT_TARGET);
    }
}
