use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PrintJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrintJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::Description)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::Material)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::FileName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::FileSizeBytes)
                            .big_integer(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::FileUrl)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::Price)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::EstimatedDurationMinutes)
                            .integer(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    // Assigned by status updates; devices may report before
                    // they ever register, so this is not a foreign key.
                    .col(
                        ColumnDef::new(PrintJobs::PrinterId)
                            .string_len(100),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::CustomerEmail)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::CustomerPhone)
                            .string_len(32),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::FailureReason)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::Revision)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::StartedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::CompletedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(PrintJobs::FailedAt)
                            .timestamp_with_time_zone(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_print_jobs_status")
                    .table(PrintJobs::Table)
                    .col(PrintJobs::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_print_jobs_customer_email")
                    .table(PrintJobs::Table)
                    .col(PrintJobs::CustomerEmail)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_print_jobs_created_at")
                    .table(PrintJobs::Table)
                    .col(PrintJobs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrintJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PrintJobs {
    Table,
    Id,
    Name,
    Description,
    Material,
    FileName,
    FileSizeBytes,
    FileUrl,
    Price,
    EstimatedDurationMinutes,
    Status,
    PrinterId,
    Progress,
    CustomerEmail,
    CustomerPhone,
    FailureReason,
    Revision,
    CreatedAt,
    StartedAt,
    CompletedAt,
    FailedAt,
}
