//! Test utilities for Printvend
//!
//! Provides helpers for creating isolated test environments with:
//! - In-memory SQLite databases (one per test)
//! - AppState factories
//! - Test data generators

use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use crate::{
    config::Config,
    db::entities::{print_job, print_job::JobStatus, printer, printer::PrinterStatus},
    services::{
        lifecycle::{self, NewPrintJob},
        Notifier,
    },
    state::AppState,
};

/// Setup an in-memory SQLite database with all migrations applied
///
/// Each call creates a fresh, isolated database perfect for parallel testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    // Run all migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create a test configuration with sensible defaults
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 3000,
        notify_webhook_url: None,
        printer_offline_after_minutes: 5,
    }
}

/// Create a complete test AppState with an isolated database and a notifier
/// that drops every event (no webhook configured)
pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    let config = test_config();
    let notifier = Notifier::new(None);

    AppState::new(db, config, notifier)
}

// ============================================================================
// Test Data Factories
// ============================================================================

/// Minimal valid creation request
pub fn sample_new_job(name: &str, customer_email: &str) -> NewPrintJob {
    NewPrintJob {
        name: Some(name.to_string()),
        description: None,
        material: Some("PLA".to_string()),
        file_name: Some("model.stl".to_string()),
        file_size_bytes: Some(1024),
        file_url: Some("s3://printvend-uploads/model.stl".to_string()),
        price: Some(5.0),
        estimated_duration_minutes: Some(90),
        customer_email: Some(customer_email.to_string()),
        customer_phone: None,
    }
}

/// Create a job through the lifecycle service (status Pending, one Created log)
pub async fn create_test_print_job(
    db: &DatabaseConnection,
    name: &str,
    customer_email: &str,
) -> print_job::Model {
    lifecycle::create_print_job(db, sample_new_job(name, customer_email))
        .await
        .expect("Failed to create test print job")
}

/// Insert a job row directly with an arbitrary status, bypassing the
/// lifecycle. Listing and stats tests use this to stage data without walking
/// the full transition graph.
pub async fn insert_job_with_status(
    db: &DatabaseConnection,
    name: &str,
    customer_email: &str,
    status: JobStatus,
) -> print_job::Model {
    let now = Utc::now().into();
    let job = print_job::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        material: Set("PLA".to_string()),
        file_name: Set("model.stl".to_string()),
        file_size_bytes: Set(None),
        file_url: Set("s3://printvend-uploads/model.stl".to_string()),
        price: Set(5.0),
        estimated_duration_minutes: Set(None),
        status: Set(status),
        printer_id: Set(None),
        progress: Set(0),
        customer_email: Set(customer_email.to_string()),
        customer_phone: Set(None),
        failure_reason: Set(None),
        revision: Set(1),
        created_at: Set(now),
        started_at: Set(None),
        completed_at: Set(None),
        failed_at: Set(None),
    };

    job.insert(db).await.expect("Failed to insert test print job")
}

/// Insert a printer whose last heartbeat was `last_seen_minutes_ago` minutes
/// in the past
pub async fn insert_test_printer(
    db: &DatabaseConnection,
    id: &str,
    status: PrinterStatus,
    last_seen_minutes_ago: i64,
) -> printer::Model {
    let now = Utc::now();
    let last_seen = now - chrono::Duration::minutes(last_seen_minutes_ago);

    let model = printer::ActiveModel {
        id: Set(id.to_string()),
        status: Set(status),
        current_material: Set(Some("PLA".to_string())),
        material_level: Set(Some(80.0)),
        temperature: Set(Some(210.0)),
        error_message: Set(None),
        last_seen_at: Set(last_seen.into()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    model.insert(db).await.expect("Failed to insert test printer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;

    use crate::db::entities::{PrintJob, PrintJobLog};

    #[tokio::test]
    async fn test_setup_test_db() {
        let db = setup_test_db().await;
        // Verify we can query the database (it has tables from migrations)
        let jobs = PrintJob::find().all(&db).await.unwrap();
        assert_eq!(jobs.len(), 0);
    }

    #[tokio::test]
    async fn test_create_test_print_job() {
        let db = setup_test_db().await;
        let job = create_test_print_job(&db, "Keychain", "a@b.com").await;

        assert_eq!(job.name, "Keychain");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.revision, 1);

        let logs = PrintJobLog::find().all(&db).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].event_type, "Created");
    }

    #[tokio::test]
    async fn test_parallel_databases() {
        // Run two database setups in parallel - they should not interfere
        let (db1, db2) = tokio::join!(setup_test_db(), setup_test_db());

        create_test_print_job(&db1, "Job 1", "one@b.com").await;
        create_test_print_job(&db2, "Job 2", "two@b.com").await;

        let db1_jobs = PrintJob::find().all(&db1).await.unwrap();
        let db2_jobs = PrintJob::find().all(&db2).await.unwrap();

        assert_eq!(db1_jobs.len(), 1);
        assert_eq!(db2_jobs.len(), 1);
        assert_eq!(db1_jobs[0].name, "Job 1");
        assert_eq!(db2_jobs[0].name, "Job 2");
    }
}
