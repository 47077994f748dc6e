use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_print_jobs_table::PrintJobs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PrintJobLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrintJobLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrintJobLogs::PrintJobId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobLogs::EventType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobLogs::Message)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrintJobLogs::AdditionalData)
                            .json(),
                    )
                    .col(
                        ColumnDef::new(PrintJobLogs::CausationId)
                            .uuid(),
                    )
                    .col(
                        ColumnDef::new(PrintJobLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_print_job_logs_print_job_id")
                            .from(PrintJobLogs::Table, PrintJobLogs::PrintJobId)
                            .to(PrintJobs::Table, PrintJobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_print_job_logs_print_job_id")
                    .table(PrintJobLogs::Table)
                    .col(PrintJobLogs::PrintJobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_print_job_logs_created_at")
                    .table(PrintJobLogs::Table)
                    .col(PrintJobLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Duplicate delivery guard: one log row per (job, causation id).
        // NULL causation ids are exempt in both Postgres and SQLite.
        manager
            .create_index(
                Index::create()
                    .name("idx_print_job_logs_causation")
                    .table(PrintJobLogs::Table)
                    .col(PrintJobLogs::PrintJobId)
                    .col(PrintJobLogs::CausationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrintJobLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PrintJobLogs {
    Table,
    Id,
    PrintJobId,
    EventType,
    Message,
    AdditionalData,
    CausationId,
    CreatedAt,
}
