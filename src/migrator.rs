use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_stock_tables::Migration),
            Box::new(m20240601_000002_create_job_card_tables::Migration),
            Box::new(m20240601_000003_create_material_requests_table::Migration),
            Box::new(m20240601_000004_create_transaction_tables::Migration),
            Box::new(m20240601_000005_create_customer_goods_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240601_000001_create_stock_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_stock_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Materials::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Materials::Category).string().not_null())
                        .col(ColumnDef::new(Materials::Name).string().not_null())
                        .col(ColumnDef::new(Materials::Variant).string().null())
                        .col(
                            ColumnDef::new(Materials::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Materials::MinThreshold)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Materials::Unit).string().not_null())
                        .col(
                            ColumnDef::new(Materials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_materials_category_name_variant")
                        .table(Materials::Table)
                        .col(Materials::Category)
                        .col(Materials::Name)
                        .col(Materials::Variant)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Tools::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Tools::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Tools::Name).string().not_null())
                        .col(
                            ColumnDef::new(Tools::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Tools::Location).string().null())
                        .col(ColumnDef::new(Tools::Condition).string().null())
                        .col(
                            ColumnDef::new(Tools::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Tools::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Boards::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Boards::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Boards::BoardType).string().not_null())
                        .col(ColumnDef::new(Boards::Color).string().not_null())
                        .col(
                            ColumnDef::new(Boards::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Boards::MinThreshold)
                                .integer()
                                .not_null()
                                .default(2),
                        )
                        .col(
                            ColumnDef::new(Boards::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Boards::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_boards_type_color")
                        .table(Boards::Table)
                        .col(Boards::BoardType)
                        .col(Boards::Color)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Boards::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tools::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Materials {
        Table,
        Id,
        Category,
        Name,
        Variant,
        Quantity,
        MinThreshold,
        Unit,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Tools {
        Table,
        Id,
        Name,
        Quantity,
        Location,
        Condition,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Boards {
        Table,
        Id,
        BoardType,
        Color,
        Quantity,
        MinThreshold,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000002_create_job_card_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_job_card_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(JobCards::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(JobCards::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCards::JobCardNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(JobCards::JobName).string().not_null())
                        .col(ColumnDef::new(JobCards::ClientName).string().not_null())
                        .col(ColumnDef::new(JobCards::BoardName).string().not_null())
                        .col(ColumnDef::new(JobCards::BoardType).string().not_null())
                        .col(ColumnDef::new(JobCards::BoardColor).string().not_null())
                        .col(ColumnDef::new(JobCards::Recipient).string().null())
                        .col(ColumnDef::new(JobCards::Supervisor).string().null())
                        .col(ColumnDef::new(JobCards::Priority).string().null())
                        .col(ColumnDef::new(JobCards::Notes).text().null())
                        .col(ColumnDef::new(JobCards::PhotoUrls).json().not_null())
                        .col(
                            ColumnDef::new(JobCards::FabricationStatus)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCards::AssemblingStatus)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(JobCards::Phase).string_len(16).not_null())
                        .col(ColumnDef::new(JobCards::FabricationById).string().null())
                        .col(ColumnDef::new(JobCards::FabricationByName).string().null())
                        .col(
                            ColumnDef::new(JobCards::FabricationCompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(JobCards::AssemblingById).string().null())
                        .col(ColumnDef::new(JobCards::AssemblingByName).string().null())
                        .col(
                            ColumnDef::new(JobCards::AssemblingCompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(JobCards::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(JobCards::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCards::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(JobCardMaterials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(JobCardMaterials::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCardMaterials::JobCardId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCardMaterials::MaterialId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCardMaterials::MaterialName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCardMaterials::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCardMaterials::Process)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(JobCardMaterials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_job_card_materials_job_card")
                                .from(JobCardMaterials::Table, JobCardMaterials::JobCardId)
                                .to(JobCards::Table, JobCards::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(JobCardMaterials::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(JobCards::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum JobCards {
        Table,
        Id,
        JobCardNumber,
        JobName,
        ClientName,
        BoardName,
        BoardType,
        BoardColor,
        Recipient,
        Supervisor,
        Priority,
        Notes,
        PhotoUrls,
        FabricationStatus,
        AssemblingStatus,
        Phase,
        FabricationById,
        FabricationByName,
        FabricationCompletedAt,
        AssemblingById,
        AssemblingByName,
        AssemblingCompletedAt,
        CompletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum JobCardMaterials {
        Table,
        Id,
        JobCardId,
        MaterialId,
        MaterialName,
        Quantity,
        Process,
        CreatedAt,
    }
}

mod m20240601_000003_create_material_requests_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_material_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaterialRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaterialRequests::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequests::MaterialId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequests::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequests::RequestedById)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequests::RequestedByName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequests::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaterialRequests::DecidedById).string().null())
                        .col(
                            ColumnDef::new(MaterialRequests::DecidedByName)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequests::DecidedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(MaterialRequests::Notes).text().null())
                        .col(
                            ColumnDef::new(MaterialRequests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialRequests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_material_requests_status")
                        .table(MaterialRequests::Table)
                        .col(MaterialRequests::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaterialRequests::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum MaterialRequests {
        Table,
        Id,
        MaterialId,
        Quantity,
        RequestedById,
        RequestedByName,
        Status,
        DecidedById,
        DecidedByName,
        DecidedAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000004_create_transaction_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_transaction_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaterialTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaterialTransactions::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialTransactions::MaterialId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialTransactions::Kind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialTransactions::ActorId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialTransactions::ActorName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialTransactions::Reference)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(MaterialTransactions::Notes).text().null())
                        .col(
                            ColumnDef::new(MaterialTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ToolTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ToolTransactions::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolTransactions::ToolId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolTransactions::Kind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolTransactions::ActorId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ToolTransactions::ActorName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ToolTransactions::Notes).text().null())
                        .col(
                            ColumnDef::new(ToolTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BoardTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BoardTransactions::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BoardTransactions::BoardId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BoardTransactions::Kind)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BoardTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BoardTransactions::ActorId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BoardTransactions::ActorName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BoardTransactions::Reference)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(BoardTransactions::Notes).text().null())
                        .col(
                            ColumnDef::new(BoardTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BoardTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ToolTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MaterialTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum MaterialTransactions {
        Table,
        Id,
        MaterialId,
        Kind,
        Quantity,
        ActorId,
        ActorName,
        Reference,
        Notes,
        CreatedAt,
    }

    #[derive(Iden)]
    enum ToolTransactions {
        Table,
        Id,
        ToolId,
        Kind,
        Quantity,
        ActorId,
        ActorName,
        Notes,
        CreatedAt,
    }

    #[derive(Iden)]
    enum BoardTransactions {
        Table,
        Id,
        BoardId,
        Kind,
        Quantity,
        ActorId,
        ActorName,
        Reference,
        Notes,
        CreatedAt,
    }
}

mod m20240601_000005_create_customer_goods_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_customer_goods_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CustomerGoods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomerGoods::Id)
                                .big_integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerGoods::CustomerName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerGoods::Description)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerGoods::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerGoods::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerGoods::ReceivedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerGoods::ReturnedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(CustomerGoods::Notes).text().null())
                        .col(
                            ColumnDef::new(CustomerGoods::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerGoods::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomerGoods::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum CustomerGoods {
        Table,
        Id,
        CustomerName,
        Description,
        Quantity,
        Status,
        ReceivedAt,
        ReturnedAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}
