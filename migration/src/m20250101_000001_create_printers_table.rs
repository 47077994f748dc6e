use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Printers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Printers::Id)
                            .string_len(100)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Printers::Status)
                            .string_len(20)
                            .not_null()
                            .default("offline"),
                    )
                    .col(
                        ColumnDef::new(Printers::CurrentMaterial)
                            .string_len(100),
                    )
                    .col(
                        ColumnDef::new(Printers::MaterialLevel)
                            .double(),
                    )
                    .col(
                        ColumnDef::new(Printers::Temperature)
                            .double(),
                    )
                    .col(
                        ColumnDef::new(Printers::ErrorMessage)
                            .text(),
                    )
                    .col(
                        ColumnDef::new(Printers::LastSeenAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Printers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Printers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_printers_status")
                    .table(Printers::Table)
                    .col(Printers::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_printers_last_seen_at")
                    .table(Printers::Table)
                    .col(Printers::LastSeenAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Printers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Printers {
    Table,
    Id,
    Status,
    CurrentMaterial,
    MaterialLevel,
    Temperature,
    ErrorMessage,
    LastSeenAt,
    CreatedAt,
    UpdatedAt,
}
