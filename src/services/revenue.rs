//! Revenue ledger aggregation, progress metrics, and target reconciliation.
//!
//! The officer revenue ledger is the authoritative source for achievement
//! figures. The progress metrics are pure functions over milestone state,
//! always recomputable and never a source of truth themselves.

use crate::{
    db::DbPool,
    entities::milestone,
    entities::officer::{self, Entity as OfficerEntity},
    entities::officer_revenue_ledger::{self, Entity as LedgerEntity},
    entities::status::RevenueType,
    errors::ServiceError,
    fiscal::fy_elapsed_fraction,
    services::reference_data::ReferenceDataService,
};
use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Officer achievement against their pro-rata target for one FY.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficerAchievement {
    pub officer_id: Uuid,
    pub fy_period: String,
    pub annual_target: Decimal,
    pub prorata_target: Decimal,
    pub recognized_revenue: Decimal,
    pub achievement_pct: Decimal,
}

/// Service over the append-only officer revenue ledger.
#[derive(Clone)]
pub struct RevenueService {
    db: Arc<DbPool>,
}

impl RevenueService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Authoritative recognized revenue of one officer in one FY.
    #[instrument(skip(self))]
    pub async fn officer_recognized_revenue(
        &self,
        officer_id: Uuid,
        fy_period: &str,
    ) -> Result<Decimal, ServiceError> {
        let entries = LedgerEntity::find()
            .filter(officer_revenue_ledger::Column::OfficerId.eq(officer_id))
            .filter(officer_revenue_ledger::Column::FyPeriod.eq(fy_period))
            .all(&*self.db)
            .await?;

        Ok(entries.iter().map(|e| e.amount).sum())
    }

    /// Office roll-up: recognized revenue of every officer posted to the
    /// office, for one FY.
    #[instrument(skip(self))]
    pub async fn office_recognized_revenue(
        &self,
        office_code: &str,
        fy_period: &str,
    ) -> Result<Decimal, ServiceError> {
        let officer_ids: Vec<Uuid> = OfficerEntity::find()
            .filter(officer::Column::OfficeCode.eq(office_code))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();

        if officer_ids.is_empty() {
            return Ok(Decimal::ZERO);
        }

        let entries = LedgerEntity::find()
            .filter(officer_revenue_ledger::Column::OfficerId.is_in(officer_ids))
            .filter(officer_revenue_ledger::Column::FyPeriod.eq(fy_period))
            .all(&*self.db)
            .await?;

        Ok(entries.iter().map(|e| e.amount).sum())
    }

    /// Full ledger trail of one assignment, oldest first.
    #[instrument(skip(self))]
    pub async fn assignment_ledger(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<officer_revenue_ledger::Model>, ServiceError> {
        Ok(LedgerEntity::find()
            .filter(officer_revenue_ledger::Column::AssignmentId.eq(assignment_id))
            .order_by_asc(officer_revenue_ledger::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Ledger totals of one assignment split by recognition tranche.
    #[instrument(skip(self))]
    pub async fn assignment_recognition_totals(
        &self,
        assignment_id: Uuid,
    ) -> Result<(Decimal, Decimal), ServiceError> {
        let entries = self.assignment_ledger(assignment_id).await?;
        let invoice_total = entries
            .iter()
            .filter(|e| e.revenue_type == RevenueType::Invoice80)
            .map(|e| e.amount)
            .sum();
        let payment_total = entries
            .iter()
            .filter(|e| e.revenue_type == RevenueType::Payment20)
            .map(|e| e.amount)
            .sum();
        Ok((invoice_total, payment_total))
    }

    /// Weighted physical progress of an assignment from current milestone
    /// state.
    #[instrument(skip(self))]
    pub async fn physical_progress(&self, assignment_id: Uuid) -> Result<Decimal, ServiceError> {
        let milestones = self.milestones_of(assignment_id).await?;
        Ok(physical_progress_of(&milestones))
    }

    /// Timeline progress of an assignment as of `today`.
    #[instrument(skip(self))]
    pub async fn timeline_progress(
        &self,
        assignment_id: Uuid,
        today: NaiveDate,
    ) -> Result<Decimal, ServiceError> {
        let milestones = self.milestones_of(assignment_id).await?;
        Ok(timeline_progress_of(&milestones, today))
    }

    /// Recognition-adjusted revenue eligible for officer distribution.
    #[instrument(skip(self))]
    pub async fn shareable_revenue(&self, assignment_id: Uuid) -> Result<Decimal, ServiceError> {
        let milestones = self.milestones_of(assignment_id).await?;
        Ok(shareable_revenue_of(&milestones))
    }

    /// Officer achievement against their pro-rata target as of `today`.
    #[instrument(skip(self))]
    pub async fn officer_achievement(
        &self,
        officer_id: Uuid,
        fy_period: &str,
        today: NaiveDate,
    ) -> Result<OfficerAchievement, ServiceError> {
        let officer_row = OfficerEntity::find_by_id(officer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Officer", officer_id))?;

        let annual_target = ReferenceDataService::effective_annual_target(&officer_row);
        let recognized = self
            .officer_recognized_revenue(officer_id, fy_period)
            .await?;
        let prorata = prorata_target(annual_target, today);

        Ok(OfficerAchievement {
            officer_id,
            fy_period: fy_period.to_string(),
            annual_target,
            prorata_target: prorata,
            recognized_revenue: recognized,
            achievement_pct: achievement_pct(recognized, prorata),
        })
    }

    async fn milestones_of(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<milestone::Model>, ServiceError> {
        Ok(milestone::Entity::find()
            .filter(milestone::Column::AssignmentId.eq(assignment_id))
            .order_by_asc(milestone::Column::MilestoneNo)
            .all(&*self.db)
            .await?)
    }
}

/// Weighted sum over milestones of invoice_percent x recognition factor
/// (1.0 paid, 0.8 invoiced, 0 otherwise), rounded to 2 decimals.
pub fn physical_progress_of(milestones: &[milestone::Model]) -> Decimal {
    let weighted: Decimal = milestones
        .iter()
        .map(|m| m.invoice_percent * m.recognition_factor())
        .sum();
    weighted.round_dp(2)
}

/// Recognition-adjusted invoice value eligible for distribution: 100% of a
/// paid milestone's invoice amount, 80% of an invoiced-only one.
pub fn shareable_revenue_of(milestones: &[milestone::Model]) -> Decimal {
    let total: Decimal = milestones
        .iter()
        .map(|m| m.invoice_amount * m.recognition_factor())
        .sum();
    total.round_dp(2)
}

/// Weighted timeline performance across milestones.
///
/// Each milestone contributes 100% when completed on time (or still in the
/// future), a delay-reduced percentage (at most 50 points off) when late,
/// and nothing when overdue without an invoice.
pub fn timeline_progress_of(milestones: &[milestone::Model], today: NaiveDate) -> Decimal {
    if milestones.is_empty() {
        return Decimal::ZERO;
    }

    let mut total_weight = 0.0_f64;
    let mut weighted_sum = 0.0_f64;

    for m in milestones {
        let weight = decimal_to_f64(m.invoice_percent);
        total_weight += weight;

        let Some(target) = m.target_date else {
            continue;
        };

        if m.status == crate::entities::status::MilestoneStatus::Completed {
            if let Some(actual) = m.actual_completion_date {
                if actual <= target {
                    weighted_sum += weight * 100.0;
                } else {
                    let delay_pct = delay_percentage(target, actual);
                    weighted_sum += weight * (100.0 - delay_pct);
                }
                continue;
            }
        }

        if m.invoice_raised && target < today {
            let delay_pct = delay_percentage(target, today);
            weighted_sum += weight * (100.0 - delay_pct);
        } else if target >= today {
            // Not yet due: on track until proven otherwise.
            weighted_sum += weight * 100.0;
        }
    }

    if total_weight <= 0.0 {
        return Decimal::ZERO;
    }

    Decimal::from_f64(weighted_sum / total_weight)
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

/// Delay as a percentage of the milestone's nominal runway (April 1 of the
/// target year to the target date, minimum 30 days), capped at 50.
fn delay_percentage(target: NaiveDate, actual: NaiveDate) -> f64 {
    use chrono::Datelike;

    let delay_days = (actual - target).num_days() as f64;
    let runway_start = NaiveDate::from_ymd_opt(target.year(), 4, 1).unwrap_or(target);
    let total_days = ((target - runway_start).num_days() as f64).max(30.0);
    (delay_days / total_days * 100.0).min(50.0)
}

/// Annual target scaled by the fraction of the financial year elapsed.
pub fn prorata_target(annual_target: Decimal, today: NaiveDate) -> Decimal {
    let fraction = Decimal::from_f64(fy_elapsed_fraction(today)).unwrap_or(Decimal::ZERO);
    (annual_target * fraction).round_dp(2)
}

/// Achievement percentage; 0 whenever the pro-rata target is 0, never an
/// error.
pub fn achievement_pct(recognized: Decimal, prorata: Decimal) -> Decimal {
    if prorata <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (recognized / prorata * Decimal::ONE_HUNDRED).round_dp(1)
}

fn decimal_to_f64(value: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::status::MilestoneStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn milestone(
        no: i32,
        invoice_percent: Decimal,
        invoice_amount: Decimal,
        invoice_raised: bool,
        payment_received: bool,
    ) -> milestone::Model {
        milestone::Model {
            id: Uuid::new_v4(),
            assignment_id: Uuid::new_v4(),
            milestone_no: no,
            title: format!("Milestone {no}"),
            description: None,
            target_date: None,
            actual_completion_date: None,
            invoice_percent,
            invoice_amount,
            invoice_raised,
            invoice_raised_date: None,
            payment_received,
            payment_received_date: None,
            status: MilestoneStatus::Pending,
            remarks: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn physical_progress_weights_by_recognition() {
        let milestones = vec![
            milestone(1, dec!(40.0), dec!(40.0), true, true),
            milestone(2, dec!(40.0), dec!(40.0), true, false),
            milestone(3, dec!(20.0), dec!(0.0), false, false),
        ];
        // 40*1.0 + 40*0.8 + 20*0 = 72
        assert_eq!(physical_progress_of(&milestones), dec!(72.00));
    }

    #[test]
    fn physical_progress_of_empty_plan_is_zero() {
        assert_eq!(physical_progress_of(&[]), Decimal::ZERO);
    }

    #[test]
    fn shareable_revenue_uses_invoice_amounts() {
        let milestones = vec![
            milestone(1, dec!(50.0), dec!(50.0), true, true),
            milestone(2, dec!(50.0), dec!(50.0), true, false),
        ];
        // 50*1.0 + 50*0.8 = 90
        assert_eq!(shareable_revenue_of(&milestones), dec!(90.00));
    }

    #[test]
    fn timeline_full_marks_for_future_targets() {
        let mut m = milestone(1, dec!(100.0), dec!(0.0), false, false);
        m.target_date = Some(date(2026, 12, 31));
        assert_eq!(
            timeline_progress_of(&[m], date(2026, 8, 6)),
            dec!(100.00)
        );
    }

    #[test]
    fn timeline_full_marks_for_on_time_completion() {
        let mut m = milestone(1, dec!(100.0), dec!(100.0), true, true);
        m.status = MilestoneStatus::Completed;
        m.target_date = Some(date(2025, 12, 31));
        m.actual_completion_date = Some(date(2025, 12, 15));
        assert_eq!(
            timeline_progress_of(&[m], date(2026, 8, 6)),
            dec!(100.00)
        );
    }

    #[test]
    fn timeline_penalizes_late_completion_up_to_half() {
        let mut m = milestone(1, dec!(100.0), dec!(100.0), true, true);
        m.status = MilestoneStatus::Completed;
        m.target_date = Some(date(2025, 6, 1));
        // Two years late blows through the cap: reduction tops out at 50.
        m.actual_completion_date = Some(date(2027, 6, 1));
        assert_eq!(timeline_progress_of(&[m], date(2027, 8, 6)), dec!(50.00));
    }

    #[test]
    fn timeline_overdue_uninvoiced_scores_nothing() {
        let mut m = milestone(1, dec!(100.0), dec!(0.0), false, false);
        m.target_date = Some(date(2025, 6, 1));
        assert_eq!(timeline_progress_of(&[m], date(2026, 8, 6)), dec!(0.00));
    }

    #[test]
    fn timeline_of_empty_plan_is_zero() {
        assert_eq!(timeline_progress_of(&[], date(2026, 8, 6)), Decimal::ZERO);
    }

    #[test]
    fn prorata_scales_with_fy_fraction() {
        // FY start: no target accrued yet.
        assert_eq!(prorata_target(dec!(60.0), date(2026, 4, 1)), dec!(0.00));
        // FY end: full target.
        assert_eq!(prorata_target(dec!(60.0), date(2026, 3, 31)), dec!(60.00));
    }

    #[test]
    fn achievement_pct_handles_zero_target() {
        assert_eq!(achievement_pct(dec!(10.0), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(achievement_pct(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn achievement_pct_computes_ratio() {
        assert_eq!(achievement_pct(dec!(30.0), dec!(60.0)), dec!(50.0));
        assert_eq!(achievement_pct(dec!(90.0), dec!(60.0)), dec!(150.0));
    }
}
