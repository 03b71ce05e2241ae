use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_hazard_tables::Migration),
            Box::new(m20240601_000002_create_patrol_tables::Migration),
            Box::new(m20240601_000003_create_inventory_tables::Migration),
            Box::new(m20240601_000004_create_field_log_tables::Migration),
        ]
    }
}

// Migration implementations
//
// Reference columns (`hazard_id`, `shift_id`, `item_id`) are plain integers
// without foreign-key constraints.

mod m20240601_000001_create_hazard_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_hazard_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Hazards::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Hazards::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Hazards::Latitude).double().null())
                        .col(ColumnDef::new(Hazards::Longitude).double().null())
                        .col(ColumnDef::new(Hazards::Location).string().null())
                        .col(
                            ColumnDef::new(Hazards::Description)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Hazards::Severity)
                                .string_len(32)
                                .not_null()
                                .default("Low"),
                        )
                        .col(
                            ColumnDef::new(Hazards::Status)
                                .string_len(32)
                                .not_null()
                                .default("Logged"),
                        )
                        .col(ColumnDef::new(Hazards::PhotoPath).string().null())
                        .col(
                            ColumnDef::new(Hazards::ReportedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_hazards_reported_at")
                        .table(Hazards::Table)
                        .col(Hazards::ReportedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MitigationNotes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MitigationNotes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(MitigationNotes::HazardId).integer().not_null())
                        .col(ColumnDef::new(MitigationNotes::NoteText).text().not_null())
                        .col(ColumnDef::new(MitigationNotes::PhotoPath).string().null())
                        .col(ColumnDef::new(MitigationNotes::Author).string().not_null())
                        .col(
                            ColumnDef::new(MitigationNotes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_mitigation_notes_hazard_id")
                        .table(MitigationNotes::Table)
                        .col(MitigationNotes::HazardId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MitigationNotes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Hazards::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Hazards {
        Table,
        Id,
        Latitude,
        Longitude,
        Location,
        Description,
        Severity,
        Status,
        PhotoPath,
        ReportedAt,
    }

    #[derive(DeriveIden)]
    enum MitigationNotes {
        Table,
        Id,
        HazardId,
        NoteText,
        PhotoPath,
        Author,
        CreatedAt,
    }
}

mod m20240601_000002_create_patrol_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_patrol_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shifts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Shifts::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Shifts::Date).date().not_null())
                        .col(ColumnDef::new(Shifts::TimeSlot).string().not_null())
                        .col(ColumnDef::new(Shifts::Crew).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shifts_date")
                        .table(Shifts::Table)
                        .col(Shifts::Date)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Incidents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Incidents::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Incidents::ShiftId).integer().not_null())
                        .col(ColumnDef::new(Incidents::Category).string().not_null())
                        .col(ColumnDef::new(Incidents::Description).text().not_null())
                        .col(ColumnDef::new(Incidents::PhotoPath).string().null())
                        .col(ColumnDef::new(Incidents::Latitude).double().null())
                        .col(ColumnDef::new(Incidents::Longitude).double().null())
                        .col(
                            ColumnDef::new(Incidents::OccurredAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_incidents_occurred_at")
                        .table(Incidents::Table)
                        .col(Incidents::OccurredAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_incidents_shift_id")
                        .table(Incidents::Table)
                        .col(Incidents::ShiftId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Incidents::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Shifts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Shifts {
        Table,
        Id,
        Date,
        TimeSlot,
        Crew,
    }

    #[derive(DeriveIden)]
    enum Incidents {
        Table,
        Id,
        ShiftId,
        Category,
        Description,
        PhotoPath,
        Latitude,
        Longitude,
        OccurredAt,
    }
}

mod m20240601_000003_create_inventory_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Category).string().not_null().default(""))
                        .col(ColumnDef::new(Items::Location).string().not_null().default(""))
                        .col(ColumnDef::new(Items::Quantity).integer().not_null().default(0))
                        .col(ColumnDef::new(Items::Unit).string().not_null().default(""))
                        .col(ColumnDef::new(Items::Threshold).integer().not_null().default(0))
                        .col(ColumnDef::new(Items::Supplier).string().null())
                        .col(ColumnDef::new(Items::SupplierContact).string().null())
                        .col(ColumnDef::new(Items::SupplierSku).string().null())
                        .col(ColumnDef::new(Items::UnitCost).double().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transactions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Transactions::ItemId).integer().not_null())
                        .col(ColumnDef::new(Transactions::Person).string().not_null())
                        .col(
                            ColumnDef::new(Transactions::OutDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::ExpectedReturnDate).date().null())
                        .col(
                            ColumnDef::new(Transactions::ActualReturnDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Transactions::OutNotes).text().null())
                        .col(ColumnDef::new(Transactions::ReturnNotes).text().null())
                        .col(ColumnDef::new(Transactions::OutPhoto).string().null())
                        .col(ColumnDef::new(Transactions::ReturnPhoto).string().null())
                        .col(
                            ColumnDef::new(Transactions::Status)
                                .string_len(16)
                                .not_null()
                                .default("out"),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_item_id")
                        .table(Transactions::Table)
                        .col(Transactions::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_out_date")
                        .table(Transactions::Table)
                        .col(Transactions::OutDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
        Name,
        Category,
        Location,
        Quantity,
        Unit,
        Threshold,
        Supplier,
        SupplierContact,
        SupplierSku,
        UnitCost,
    }

    #[derive(DeriveIden)]
    enum Transactions {
        Table,
        Id,
        ItemId,
        Person,
        OutDate,
        ExpectedReturnDate,
        ActualReturnDate,
        OutNotes,
        ReturnNotes,
        OutPhoto,
        ReturnPhoto,
        Status,
    }
}

mod m20240601_000004_create_field_log_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_field_log_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenanceLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenanceLogs::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(MaintenanceLogs::Equipment).string().not_null())
                        .col(ColumnDef::new(MaintenanceLogs::Issue).text().not_null())
                        .col(
                            ColumnDef::new(MaintenanceLogs::Done)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(MaintenanceLogs::Notes).text().null())
                        .col(ColumnDef::new(MaintenanceLogs::PhotoPath).string().null())
                        .col(
                            ColumnDef::new(MaintenanceLogs::ReportedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TrailCamCaptures::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TrailCamCaptures::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(TrailCamCaptures::Location).string().not_null())
                        .col(ColumnDef::new(TrailCamCaptures::PhotoPath).string().not_null())
                        .col(ColumnDef::new(TrailCamCaptures::Notes).text().null())
                        .col(
                            ColumnDef::new(TrailCamCaptures::CapturedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TrailCamCaptures::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MaintenanceLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum MaintenanceLogs {
        Table,
        Id,
        Equipment,
        Issue,
        Done,
        Notes,
        PhotoPath,
        ReportedAt,
    }

    #[derive(DeriveIden)]
    enum TrailCamCaptures {
        Table,
        Id,
        Location,
        PhotoPath,
        Notes,
        CapturedAt,
    }
}
