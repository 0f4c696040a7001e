//! Table-driven role -> permission mapping.

use crate::entities::officer_role::Role;
use serde::{Deserialize, Serialize};

/// Actions a principal may be permitted to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    ViewAllMis,
    ExportData,
    ImportData,
    ManageConfig,
    ManageUsers,
    ResetPassword,
    ChangeRoles,
    ApproveEscalated,
    AllocateTeamLeader,
    ApproveAssignment,
    ApproveMilestone,
    ApproveRevenueShare,
    ApproveInvoice,
    RecordPayment,
    SetTeam,
    FillAssignmentDetails,
    FillMilestoneDetails,
    RegisterAssignment,
    RaiseRequest,
    DownloadReports,
}

/// The permission set of one role. The map is total: every role resolves
/// to a static slice, so capability checks never miss.
pub fn role_permissions(role: Role) -> &'static [Action] {
    match role {
        Role::Admin => &[
            Action::ViewAllMis,
            Action::ExportData,
            Action::ImportData,
            Action::ManageConfig,
            Action::ManageUsers,
            Action::ResetPassword,
            Action::ChangeRoles,
            Action::ApproveInvoice,
            Action::RecordPayment,
            Action::DownloadReports,
        ],
        Role::Dg | Role::DdgI | Role::DdgII => &[
            Action::ViewAllMis,
            Action::ApproveEscalated,
            Action::ApproveInvoice,
            Action::RecordPayment,
            Action::DownloadReports,
        ],
        Role::Finance | Role::Accounts => &[
            Action::ViewAllMis,
            Action::ApproveInvoice,
            Action::RecordPayment,
            Action::DownloadReports,
        ],
        Role::RdHead | Role::GroupHead => &[
            Action::ViewAllMis,
            Action::AllocateTeamLeader,
            Action::ApproveAssignment,
            Action::ApproveMilestone,
            Action::ApproveRevenueShare,
            Action::DownloadReports,
        ],
        Role::TeamLeader => &[
            Action::ViewAllMis,
            Action::SetTeam,
            Action::FillAssignmentDetails,
            Action::FillMilestoneDetails,
            Action::DownloadReports,
        ],
        Role::Officer => &[
            Action::ViewAllMis,
            Action::RegisterAssignment,
            Action::RaiseRequest,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_can_view_mis() {
        for role in crate::auth::ROLE_HIERARCHY {
            assert!(
                role_permissions(role).contains(&Action::ViewAllMis),
                "{role} lost MIS visibility"
            );
        }
    }

    #[test]
    fn only_finance_capable_roles_approve_invoices() {
        let approvers: Vec<Role> = crate::auth::ROLE_HIERARCHY
            .into_iter()
            .filter(|r| role_permissions(*r).contains(&Action::ApproveInvoice))
            .collect();
        assert_eq!(
            approvers,
            vec![
                Role::Admin,
                Role::Dg,
                Role::DdgI,
                Role::DdgII,
                Role::Finance,
                Role::Accounts
            ]
        );
    }

    #[test]
    fn heads_approve_sections_team_leaders_fill_them() {
        assert!(role_permissions(Role::RdHead).contains(&Action::ApproveRevenueShare));
        assert!(!role_permissions(Role::TeamLeader).contains(&Action::ApproveRevenueShare));
        assert!(role_permissions(Role::TeamLeader).contains(&Action::FillMilestoneDetails));
        assert!(!role_permissions(Role::Officer).contains(&Action::FillMilestoneDetails));
    }
}
