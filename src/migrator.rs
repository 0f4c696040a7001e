use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_reference_tables::Migration),
            Box::new(m20250101_000002_create_pipeline_tables::Migration),
            Box::new(m20250101_000003_create_assignment_tables::Migration),
            Box::new(m20250101_000004_create_milestones_table::Migration),
            Box::new(m20250101_000005_create_finance_tables::Migration),
            Box::new(m20250101_000006_create_revenue_ledger_table::Migration),
            Box::new(m20250101_000007_create_grievance_tables::Migration),
            Box::new(m20250101_000008_create_activity_log_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_reference_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Offices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Offices::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Offices::OfficeCode)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Offices::OfficeName).string().not_null())
                        .col(
                            ColumnDef::new(Offices::OfficerCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Offices::AnnualTargetPerOfficer)
                                .decimal()
                                .not_null()
                                .default(60),
                        )
                        .col(
                            ColumnDef::new(Offices::AnnualRevenueTarget)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Offices::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Officers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Officers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Officers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Officers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Officers::Designation).string().null())
                        .col(ColumnDef::new(Officers::OfficeCode).string().not_null())
                        .col(
                            ColumnDef::new(Officers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Officers::AnnualTarget)
                                .decimal()
                                .not_null()
                                .default(60),
                        )
                        .col(ColumnDef::new(Officers::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_officers_office_code")
                        .table(Officers::Table)
                        .col(Officers::OfficeCode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OfficerRoles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OfficerRoles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OfficerRoles::OfficerId).uuid().not_null())
                        .col(ColumnDef::new(OfficerRoles::RoleType).string().not_null())
                        .col(ColumnDef::new(OfficerRoles::ScopeType).string().not_null())
                        .col(ColumnDef::new(OfficerRoles::ScopeValue).string().null())
                        .col(
                            ColumnDef::new(OfficerRoles::IsPrimary)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(OfficerRoles::EffectiveFrom)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OfficerRoles::EffectiveTo).date().null())
                        .col(
                            ColumnDef::new(OfficerRoles::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(OfficerRoles::Table, OfficerRoles::OfficerId)
                                .to(Officers::Table, Officers::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_officer_roles_officer_id")
                        .table(OfficerRoles::Table)
                        .col(OfficerRoles::OfficerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OfficerRoles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Officers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Offices::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Offices {
        Table,
        Id,
        OfficeCode,
        OfficeName,
        OfficerCount,
        AnnualTargetPerOfficer,
        AnnualRevenueTarget,
        CreatedAt,
    }

    #[derive(Iden)]
    enum Officers {
        Table,
        Id,
        Name,
        Email,
        Designation,
        OfficeCode,
        IsActive,
        AnnualTarget,
        CreatedAt,
    }

    #[derive(Iden)]
    enum OfficerRoles {
        Table,
        Id,
        OfficerId,
        RoleType,
        ScopeType,
        ScopeValue,
        IsPrimary,
        EffectiveFrom,
        EffectiveTo,
        CreatedAt,
    }
}

mod m20250101_000002_create_pipeline_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_pipeline_tables"
        }
    }

    /// Columns shared by all three pipeline stage tables.
    fn pipeline_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
        table
            .col(ColumnDef::new(Common::ClientName).string().not_null())
            .col(ColumnDef::new(Common::ClientType).string().null())
            .col(ColumnDef::new(Common::Domain).string().null())
            .col(ColumnDef::new(Common::SubDomain).string().null())
            .col(ColumnDef::new(Common::OfficeCode).string().not_null())
            .col(ColumnDef::new(Common::OfficerId).uuid().null())
            .col(ColumnDef::new(Common::Description).string().null())
            .col(ColumnDef::new(Common::EstimatedValue).decimal().null())
            .col(ColumnDef::new(Common::TargetDate).date().null())
            .col(ColumnDef::new(Common::Status).string().not_null())
            .col(ColumnDef::new(Common::ApprovalStatus).string().not_null())
            .col(ColumnDef::new(Common::ApprovedBy).uuid().null())
            .col(ColumnDef::new(Common::ApprovedAt).timestamp().null())
            .col(ColumnDef::new(Common::RejectionReason).string().null())
            .col(ColumnDef::new(Common::CurrentUpdate).string().null())
            .col(ColumnDef::new(Common::DropReason).string().null())
            .col(ColumnDef::new(Common::Remarks).string().null())
            .col(ColumnDef::new(Common::CreatedBy).uuid().not_null())
            .col(ColumnDef::new(Common::CreatedAt).timestamp().not_null())
            .col(ColumnDef::new(Common::UpdatedAt).timestamp().null())
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut enquiries = Table::create();
            enquiries
                .table(Enquiries::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Enquiries::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Enquiries::EnquiryNumber)
                        .string()
                        .not_null()
                        .unique_key(),
                );
            pipeline_columns(&mut enquiries);
            manager.create_table(enquiries).await?;

            let mut prs = Table::create();
            prs.table(ProposalRequests::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(ProposalRequests::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ProposalRequests::PrNumber)
                        .string()
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(ProposalRequests::EnquiryId).uuid().null())
                .foreign_key(
                    ForeignKey::create()
                        .from(ProposalRequests::Table, ProposalRequests::EnquiryId)
                        .to(Enquiries::Table, Enquiries::Id),
                );
            pipeline_columns(&mut prs);
            manager.create_table(prs).await?;

            let mut proposals = Table::create();
            proposals
                .table(Proposals::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Proposals::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Proposals::ProposalNumber)
                        .string()
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Proposals::PrId).uuid().null())
                .col(ColumnDef::new(Proposals::EnquiryId).uuid().null())
                .col(ColumnDef::new(Proposals::ProposedValue).decimal().null())
                .col(ColumnDef::new(Proposals::WorkOrderValue).decimal().null())
                .col(ColumnDef::new(Proposals::SubmissionDate).date().null())
                .col(ColumnDef::new(Proposals::ValidityDate).date().null())
                .col(ColumnDef::new(Proposals::LossReason).string().null())
                .col(ColumnDef::new(Proposals::WithdrawReason).string().null())
                .foreign_key(
                    ForeignKey::create()
                        .from(Proposals::Table, Proposals::PrId)
                        .to(ProposalRequests::Table, ProposalRequests::Id),
                );
            pipeline_columns(&mut proposals);
            manager.create_table(proposals).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_enquiries_office_code")
                        .table(Enquiries::Table)
                        .col(Common::OfficeCode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_proposal_requests_office_code")
                        .table(ProposalRequests::Table)
                        .col(Common::OfficeCode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_proposals_office_code")
                        .table(Proposals::Table)
                        .col(Common::OfficeCode)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Proposals::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProposalRequests::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Enquiries::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Enquiries {
        Table,
        Id,
        EnquiryNumber,
    }

    #[derive(Iden)]
    enum ProposalRequests {
        Table,
        Id,
        PrNumber,
        EnquiryId,
    }

    #[derive(Iden)]
    enum Proposals {
        Table,
        Id,
        ProposalNumber,
        PrId,
        EnquiryId,
        ProposedValue,
        WorkOrderValue,
        SubmissionDate,
        ValidityDate,
        LossReason,
        WithdrawReason,
    }

    #[derive(Iden, Clone, Copy)]
    enum Common {
        ClientName,
        ClientType,
        Domain,
        SubDomain,
        OfficeCode,
        OfficerId,
        Description,
        EstimatedValue,
        TargetDate,
        Status,
        ApprovalStatus,
        ApprovedBy,
        ApprovedAt,
        RejectionReason,
        CurrentUpdate,
        DropReason,
        Remarks,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_assignment_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_assignment_tables"
        }
    }

    /// status / submitted-by / submitted-at / approved-by / approved-at
    /// columns for one sign-off section.
    fn section_columns(
        table: &mut TableCreateStatement,
        status: Assignments,
        submitted_by: Assignments,
        submitted_at: Assignments,
        approved_by: Assignments,
        approved_at: Assignments,
    ) -> &mut TableCreateStatement {
        table
            .col(ColumnDef::new(status).string().not_null())
            .col(ColumnDef::new(submitted_by).uuid().null())
            .col(ColumnDef::new(submitted_at).timestamp().null())
            .col(ColumnDef::new(approved_by).uuid().null())
            .col(ColumnDef::new(approved_at).timestamp().null())
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut assignments = Table::create();
            assignments
                .table(Assignments::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Assignments::Id)
                        .uuid()
                        .primary_key()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Assignments::AssignmentNo)
                        .string()
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Assignments::Title).string().not_null())
                .col(ColumnDef::new(Assignments::ClientName).string().not_null())
                .col(ColumnDef::new(Assignments::ClientType).string().null())
                .col(ColumnDef::new(Assignments::Domain).string().null())
                .col(ColumnDef::new(Assignments::SubDomain).string().null())
                .col(ColumnDef::new(Assignments::OfficeCode).string().not_null())
                .col(ColumnDef::new(Assignments::ProposalId).uuid().null())
                .col(ColumnDef::new(Assignments::EnquiryId).uuid().null())
                .col(
                    ColumnDef::new(Assignments::TeamLeaderOfficerId)
                        .uuid()
                        .null(),
                )
                .col(ColumnDef::new(Assignments::WorkOrderDate).date().null())
                .col(ColumnDef::new(Assignments::StartDate).date().null())
                .col(ColumnDef::new(Assignments::TargetDate).date().null())
                .col(
                    ColumnDef::new(Assignments::TotalValue)
                        .decimal()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Assignments::InvoiceAmount)
                        .decimal()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Assignments::AmountReceived)
                        .decimal()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Assignments::TotalExpenditure)
                        .decimal()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Assignments::ShareableRevenue)
                        .decimal()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Assignments::PhysicalProgressPercent)
                        .decimal()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Assignments::TimelineProgressPercent)
                        .decimal()
                        .not_null()
                        .default(0),
                )
                .col(ColumnDef::new(Assignments::Status).string().not_null())
                .col(
                    ColumnDef::new(Assignments::WorkflowStage)
                        .string()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Assignments::ApprovalStatus)
                        .string()
                        .not_null(),
                );

            section_columns(
                &mut assignments,
                Assignments::CostApprovalStatus,
                Assignments::CostSubmittedBy,
                Assignments::CostSubmittedAt,
                Assignments::CostApprovedBy,
                Assignments::CostApprovedAt,
            );
            section_columns(
                &mut assignments,
                Assignments::TeamApprovalStatus,
                Assignments::TeamSubmittedBy,
                Assignments::TeamSubmittedAt,
                Assignments::TeamApprovedBy,
                Assignments::TeamApprovedAt,
            );
            section_columns(
                &mut assignments,
                Assignments::MilestoneApprovalStatus,
                Assignments::MilestoneSubmittedBy,
                Assignments::MilestoneSubmittedAt,
                Assignments::MilestoneApprovedBy,
                Assignments::MilestoneApprovedAt,
            );
            section_columns(
                &mut assignments,
                Assignments::RevenueApprovalStatus,
                Assignments::RevenueSubmittedBy,
                Assignments::RevenueSubmittedAt,
                Assignments::RevenueApprovedBy,
                Assignments::RevenueApprovedAt,
            );

            assignments
                .col(ColumnDef::new(Assignments::Remarks).string().null())
                .col(ColumnDef::new(Assignments::CreatedBy).uuid().not_null())
                .col(
                    ColumnDef::new(Assignments::CreatedAt)
                        .timestamp()
                        .not_null(),
                )
                .col(ColumnDef::new(Assignments::UpdatedAt).timestamp().null())
                .col(
                    ColumnDef::new(Assignments::Version)
                        .integer()
                        .not_null()
                        .default(1),
                );
            manager.create_table(assignments).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assignments_office_code")
                        .table(Assignments::Table)
                        .col(Assignments::OfficeCode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assignments_workflow_stage")
                        .table(Assignments::Table)
                        .col(Assignments::WorkflowStage)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AssignmentTeam::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssignmentTeam::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssignmentTeam::AssignmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AssignmentTeam::OfficerId).uuid().not_null())
                        .col(ColumnDef::new(AssignmentTeam::Role).string().not_null())
                        .col(
                            ColumnDef::new(AssignmentTeam::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(AssignmentTeam::AssignedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AssignmentTeam::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(AssignmentTeam::Table, AssignmentTeam::AssignmentId)
                                .to(Assignments::Table, Assignments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assignment_team_assignment_id")
                        .table(AssignmentTeam::Table)
                        .col(AssignmentTeam::AssignmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AssignmentTeam::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Assignments::Table).to_owned())
                .await
        }
    }

    #[derive(Iden, Clone, Copy)]
    enum Assignments {
        Table,
        Id,
        AssignmentNo,
        Title,
        ClientName,
        ClientType,
        Domain,
        SubDomain,
        OfficeCode,
        ProposalId,
        EnquiryId,
        TeamLeaderOfficerId,
        WorkOrderDate,
        StartDate,
        TargetDate,
        TotalValue,
        InvoiceAmount,
        AmountReceived,
        TotalExpenditure,
        ShareableRevenue,
        PhysicalProgressPercent,
        TimelineProgressPercent,
        Status,
        WorkflowStage,
        ApprovalStatus,
        CostApprovalStatus,
        CostSubmittedBy,
        CostSubmittedAt,
        CostApprovedBy,
        CostApprovedAt,
        TeamApprovalStatus,
        TeamSubmittedBy,
        TeamSubmittedAt,
        TeamApprovedBy,
        TeamApprovedAt,
        MilestoneApprovalStatus,
        MilestoneSubmittedBy,
        MilestoneSubmittedAt,
        MilestoneApprovedBy,
        MilestoneApprovedAt,
        RevenueApprovalStatus,
        RevenueSubmittedBy,
        RevenueSubmittedAt,
        RevenueApprovedBy,
        RevenueApprovedAt,
        Remarks,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
        Version,
    }

    #[derive(Iden)]
    enum AssignmentTeam {
        Table,
        Id,
        AssignmentId,
        OfficerId,
        Role,
        IsActive,
        AssignedBy,
        CreatedAt,
    }
}

mod m20250101_000004_create_milestones_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_milestones_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Milestones::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Milestones::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Milestones::AssignmentId).uuid().not_null())
                        .col(
                            ColumnDef::new(Milestones::MilestoneNo)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Milestones::Title).string().not_null())
                        .col(ColumnDef::new(Milestones::Description).string().null())
                        .col(ColumnDef::new(Milestones::TargetDate).date().null())
                        .col(
                            ColumnDef::new(Milestones::ActualCompletionDate)
                                .date()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Milestones::InvoicePercent)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Milestones::InvoiceAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Milestones::InvoiceRaised)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Milestones::InvoiceRaisedDate).date().null())
                        .col(
                            ColumnDef::new(Milestones::PaymentReceived)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Milestones::PaymentReceivedDate)
                                .date()
                                .null(),
                        )
                        .col(ColumnDef::new(Milestones::Status).string().not_null())
                        .col(ColumnDef::new(Milestones::Remarks).string().null())
                        .col(
                            ColumnDef::new(Milestones::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Milestones::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(Milestones::Table, Milestones::AssignmentId)
                                .to(Assignments::Table, Assignments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_milestones_assignment_no")
                        .table(Milestones::Table)
                        .col(Milestones::AssignmentId)
                        .col(Milestones::MilestoneNo)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Milestones::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Milestones {
        Table,
        Id,
        AssignmentId,
        MilestoneNo,
        Title,
        Description,
        TargetDate,
        ActualCompletionDate,
        InvoicePercent,
        InvoiceAmount,
        InvoiceRaised,
        InvoiceRaisedDate,
        PaymentReceived,
        PaymentReceivedDate,
        Status,
        Remarks,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Assignments {
        Table,
        Id,
    }
}

mod m20250101_000005_create_finance_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_finance_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InvoiceRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::RequestNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::AssignmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoiceRequests::MilestoneId).uuid().null())
                        .col(
                            ColumnDef::new(InvoiceRequests::InvoiceType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::InvoiceAmount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::FyPeriod)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::Description)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(InvoiceRequests::Status).string().not_null())
                        .col(
                            ColumnDef::new(InvoiceRequests::RequestedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::RequestedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoiceRequests::ApprovedBy).uuid().null())
                        .col(
                            ColumnDef::new(InvoiceRequests::ApprovedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::ApprovalRemarks)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::RevenueRecognized80)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InvoiceRequests::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(InvoiceRequests::Table, InvoiceRequests::AssignmentId)
                                .to(Assignments::Table, Assignments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_requests_assignment_id")
                        .table(InvoiceRequests::Table)
                        .col(InvoiceRequests::AssignmentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_requests_status")
                        .table(InvoiceRequests::Table)
                        .col(InvoiceRequests::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PaymentReceipts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentReceipts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::ReceiptNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::InvoiceRequestId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::AmountReceived)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::ReceiptDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::PaymentMode)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::ReferenceNumber)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::FyPeriod)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentReceipts::Remarks).string().null())
                        .col(
                            ColumnDef::new(PaymentReceipts::RevenueRecognized20)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::RecordedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentReceipts::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(PaymentReceipts::Table, PaymentReceipts::InvoiceRequestId)
                                .to(InvoiceRequests::Table, InvoiceRequests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RevenueShares::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RevenueShares::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RevenueShares::AssignmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RevenueShares::OfficerId).uuid().not_null())
                        .col(
                            ColumnDef::new(RevenueShares::SharePercent)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RevenueShares::ShareAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(RevenueShares::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RevenueShares::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(RevenueShares::Table, RevenueShares::AssignmentId)
                                .to(Assignments::Table, Assignments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_revenue_shares_assignment_officer")
                        .table(RevenueShares::Table)
                        .col(RevenueShares::AssignmentId)
                        .col(RevenueShares::OfficerId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RevenueShares::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaymentReceipts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InvoiceRequests::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum InvoiceRequests {
        Table,
        Id,
        RequestNumber,
        AssignmentId,
        MilestoneId,
        InvoiceType,
        InvoiceAmount,
        FyPeriod,
        Description,
        Status,
        RequestedBy,
        RequestedAt,
        ApprovedBy,
        ApprovedAt,
        ApprovalRemarks,
        #[iden = "revenue_recognized_80"]
        RevenueRecognized80,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum PaymentReceipts {
        Table,
        Id,
        ReceiptNumber,
        InvoiceRequestId,
        AmountReceived,
        ReceiptDate,
        PaymentMode,
        ReferenceNumber,
        FyPeriod,
        Remarks,
        #[iden = "revenue_recognized_20"]
        RevenueRecognized20,
        RecordedBy,
        CreatedAt,
    }

    #[derive(Iden)]
    enum RevenueShares {
        Table,
        Id,
        AssignmentId,
        OfficerId,
        SharePercent,
        ShareAmount,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Assignments {
        Table,
        Id,
    }
}

mod m20250101_000006_create_revenue_ledger_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_revenue_ledger_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Deliberately no foreign keys: ledger rows must outlive their
            // source invoice/payment rows for audit.
            manager
                .create_table(
                    Table::create()
                        .table(OfficerRevenueLedger::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::OfficerId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::AssignmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::InvoiceRequestId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::PaymentReceiptId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::RevenueType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::SharePercent)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::FyPeriod)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::TransactionDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::Remarks)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OfficerRevenueLedger::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ledger_officer_fy")
                        .table(OfficerRevenueLedger::Table)
                        .col(OfficerRevenueLedger::OfficerId)
                        .col(OfficerRevenueLedger::FyPeriod)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_ledger_assignment_id")
                        .table(OfficerRevenueLedger::Table)
                        .col(OfficerRevenueLedger::AssignmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OfficerRevenueLedger::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum OfficerRevenueLedger {
        Table,
        Id,
        OfficerId,
        AssignmentId,
        InvoiceRequestId,
        PaymentReceiptId,
        RevenueType,
        SharePercent,
        Amount,
        FyPeriod,
        TransactionDate,
        Remarks,
        CreatedAt,
    }
}

mod m20250101_000007_create_grievance_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_grievance_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(GrievanceTickets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GrievanceTickets::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::TicketNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::OfficerId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::AssignmentId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::ComplaintType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::Subject)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::Description)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GrievanceTickets::Status).string().not_null())
                        .col(
                            ColumnDef::new(GrievanceTickets::Priority)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::CurrentLevel)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GrievanceTickets::AssignedTo).uuid().null())
                        .col(
                            ColumnDef::new(GrievanceTickets::Resolution)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::ResolutionDate)
                                .date()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::EscalationDueDate)
                                .date()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceTickets::ClosedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_grievance_tickets_status")
                        .table(GrievanceTickets::Table)
                        .col(GrievanceTickets::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(GrievanceEscalations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GrievanceEscalations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceEscalations::TicketId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceEscalations::FromLevel)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceEscalations::ToLevel)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceEscalations::FromHandler)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceEscalations::ToHandler)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceEscalations::EscalationReason)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(GrievanceEscalations::AutoEscalated)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(GrievanceEscalations::EscalatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(
                                    GrievanceEscalations::Table,
                                    GrievanceEscalations::TicketId,
                                )
                                .to(GrievanceTickets::Table, GrievanceTickets::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(GrievanceEscalations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(GrievanceTickets::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum GrievanceTickets {
        Table,
        Id,
        TicketNumber,
        OfficerId,
        AssignmentId,
        ComplaintType,
        Subject,
        Description,
        Status,
        Priority,
        CurrentLevel,
        AssignedTo,
        Resolution,
        ResolutionDate,
        EscalationDueDate,
        CreatedAt,
        UpdatedAt,
        ClosedAt,
    }

    #[derive(Iden)]
    enum GrievanceEscalations {
        Table,
        Id,
        TicketId,
        FromLevel,
        ToLevel,
        FromHandler,
        ToHandler,
        EscalationReason,
        AutoEscalated,
        EscalatedAt,
    }
}

mod m20250101_000008_create_activity_log_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000008_create_activity_log_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ActivityLog::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ActivityLog::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ActivityLog::ActorId).uuid().not_null())
                        .col(ColumnDef::new(ActivityLog::Action).string().not_null())
                        .col(ColumnDef::new(ActivityLog::EntityType).string().not_null())
                        .col(ColumnDef::new(ActivityLog::EntityId).uuid().not_null())
                        .col(ColumnDef::new(ActivityLog::Remarks).string().null())
                        .col(
                            ColumnDef::new(ActivityLog::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_activity_log_entity")
                        .table(ActivityLog::Table)
                        .col(ActivityLog::EntityType)
                        .col(ActivityLog::EntityId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ActivityLog {
        Table,
        Id,
        ActorId,
        Action,
        EntityType,
        EntityId,
        Remarks,
        CreatedAt,
    }
}
