pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_printers_table;
mod m20250101_000002_create_print_jobs_table;
mod m20250101_000003_create_print_job_logs_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_printers_table::Migration),
            Box::new(m20250101_000002_create_print_jobs_table::Migration),
            Box::new(m20250101_000003_create_print_job_logs_table::Migration),
        ]
    }
}
