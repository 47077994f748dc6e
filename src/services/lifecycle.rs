//! Print-job lifecycle: creation, status transitions and the audit log.
//!
//! Every mutation couples the job row and its log append in one transaction.
//! Status moves along a fixed graph; entering a state stamps its timestamp
//! exactly once. Device reports and operator updates both land here, there is
//! no privileged path.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entities::{
    print_job,
    print_job::JobStatus,
    print_job_log,
    print_job_log::LogPayload,
    PrintJob, PrintJobLog,
};
use crate::db::with_retries;
use crate::error::{AppError, FieldViolation, Result};

/// Creation request as received on the wire. Required fields are `Option` so
/// that a missing field surfaces as a per-field violation instead of a
/// deserializer error.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPrintJob {
    pub name: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub file_name: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub file_url: Option<String>,
    pub price: Option<f64>,
    pub estimated_duration_minutes: Option<i32>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

/// Status update request, shared by operator calls and edge-device reports.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: JobStatus,
    pub progress: Option<i32>,
    pub printer_id: Option<String>,
    pub failure_reason: Option<String>,
    /// Optimistic concurrency token: reject the update unless the job is
    /// still at this revision.
    pub expected_revision: Option<i32>,
    /// Idempotency tag: a report carrying an already-seen causation id is
    /// absorbed without mutating anything.
    pub causation_id: Option<Uuid>,
}

#[derive(Debug)]
pub enum TransitionOutcome {
    Applied {
        job: print_job::Model,
        previous: JobStatus,
    },
    /// Duplicate causation id or a repeat of the current status with nothing
    /// else to write.
    Unchanged,
}

/// The allowed (from, to) pairs. A job may skip the queue when a printer
/// picks it up immediately. Repeating the current status is not listed here;
/// it is handled as an idempotent no-op by the caller.
pub fn transition_allowed(from: JobStatus, to: JobStatus) -> bool {
    use JobStatus::*;
    matches!(
        (from, to),
        (Pending, Queued)
            | (Pending, Printing)
            | (Queued, Printing)
            | (Printing, Completed)
            | (Printing, Failed)
            | (Pending, Cancelled)
            | (Queued, Cancelled)
            | (Printing, Cancelled)
    )
}

pub async fn create_print_job(db: &DatabaseConnection, req: NewPrintJob) -> Result<print_job::Model> {
    let job = validate_new_job(req)?;
    let job_ref = &job;
    with_retries(move || async move { create_txn(db, job_ref).await }).await
}

pub async fn apply_status_update(
    db: &DatabaseConnection,
    id: Uuid,
    update: &StatusUpdate,
) -> Result<TransitionOutcome> {
    validate_status_update(update)?;
    with_retries(move || async move { transition_txn(db, id, update).await }).await
}

pub async fn delete_print_job(db: &DatabaseConnection, id: Uuid) -> Result<()> {
    with_retries(move || async move { delete_txn(db, id).await }).await
}

struct ValidatedJob {
    name: String,
    description: Option<String>,
    material: String,
    file_name: String,
    file_size_bytes: Option<i64>,
    file_url: String,
    price: f64,
    estimated_duration_minutes: Option<i32>,
    customer_email: String,
    customer_phone: Option<String>,
}

fn required_string(
    value: Option<String>,
    field: &str,
    max_len: usize,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        None => {
            violations.push(FieldViolation::new(field, "is required"));
            None
        }
        Some(v) if v.is_empty() => {
            violations.push(FieldViolation::new(field, "must not be empty"));
            None
        }
        Some(v) if v.chars().count() > max_len => {
            violations.push(FieldViolation::new(
                field,
                format!("must be at most {} characters", max_len),
            ));
            None
        }
        Some(v) => Some(v),
    }
}

fn validate_new_job(req: NewPrintJob) -> Result<ValidatedJob> {
    let mut violations = Vec::new();

    let name = required_string(req.name, "name", 255, &mut violations);
    let material = required_string(req.material, "material", 100, &mut violations);
    let file_name = required_string(req.file_name, "file_name", 255, &mut violations);
    let file_url = required_string(req.file_url, "file_url", 2048, &mut violations);

    let customer_email = required_string(req.customer_email, "customer_email", 320, &mut violations);
    let customer_email = match customer_email {
        Some(v) if !v.contains('@') => {
            violations.push(FieldViolation::new(
                "customer_email",
                "must be a valid email address",
            ));
            None
        }
        other => other,
    };

    let price = match req.price {
        None => {
            violations.push(FieldViolation::new("price", "is required"));
            None
        }
        Some(p) if !p.is_finite() || p < 0.0 => {
            violations.push(FieldViolation::new("price", "must be a non-negative number"));
            None
        }
        Some(p) => Some(p),
    };

    if let Some(minutes) = req.estimated_duration_minutes {
        if minutes <= 0 {
            violations.push(FieldViolation::new(
                "estimated_duration_minutes",
                "must be a positive number of minutes",
            ));
        }
    }

    let customer_phone = match req.customer_phone.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => None,
        Some(v) if v.chars().count() > 32 => {
            violations.push(FieldViolation::new(
                "customer_phone",
                "must be at most 32 characters",
            ));
            None
        }
        other => other,
    };

    let description = req
        .description
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match (name, material, file_name, file_url, price, customer_email) {
        (Some(name), Some(material), Some(file_name), Some(file_url), Some(price), Some(customer_email))
            if violations.is_empty() =>
        {
            Ok(ValidatedJob {
                name,
                description,
                material,
                file_name,
                file_size_bytes: req.file_size_bytes,
                file_url,
                price,
                estimated_duration_minutes: req.estimated_duration_minutes,
                customer_email,
                customer_phone,
            })
        }
        _ => Err(AppError::Validation(violations)),
    }
}

fn validate_status_update(update: &StatusUpdate) -> Result<()> {
    let mut violations = Vec::new();

    if let Some(progress) = update.progress {
        if !(0..=100).contains(&progress) {
            violations.push(FieldViolation::new("progress", "must be between 0 and 100"));
        }
    }

    if update.status == JobStatus::Failed {
        let has_reason = update
            .failure_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .is_some();
        if !has_reason {
            violations.push(FieldViolation::new(
                "failure_reason",
                "is required when status is failed",
            ));
        }
    }

    if let Some(printer_id) = &update.printer_id {
        if printer_id.trim().is_empty() || printer_id.chars().count() > 100 {
            violations.push(FieldViolation::new(
                "printer_id",
                "must be between 1 and 100 characters",
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violations))
    }
}

async fn create_txn(db: &DatabaseConnection, job: &ValidatedJob) -> Result<print_job::Model> {
    let txn = db.begin().await?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let id = Uuid::new_v4();

    let model = print_job::ActiveModel {
        id: Set(id),
        name: Set(job.name.clone()),
        description: Set(job.description.clone()),
        material: Set(job.material.clone()),
        file_name: Set(job.file_name.clone()),
        file_size_bytes: Set(job.file_size_bytes),
        file_url: Set(job.file_url.clone()),
        price: Set(job.price),
        estimated_duration_minutes: Set(job.estimated_duration_minutes),
        status: Set(JobStatus::Pending),
        printer_id: Set(None),
        progress: Set(0),
        customer_email: Set(job.customer_email.clone()),
        customer_phone: Set(job.customer_phone.clone()),
        failure_reason: Set(None),
        revision: Set(1),
        created_at: Set(now),
        started_at: Set(None),
        completed_at: Set(None),
        failed_at: Set(None),
    };
    let inserted = model.insert(&txn).await?;

    append_log(
        &txn,
        id,
        "Created",
        format!("Print job \"{}\" created", inserted.name),
        None,
        None,
    )
    .await?;

    txn.commit().await?;

    tracing::info!("created print job {} for {}", inserted.id, inserted.customer_email);

    Ok(inserted)
}

async fn transition_txn(
    db: &DatabaseConnection,
    id: Uuid,
    update: &StatusUpdate,
) -> Result<TransitionOutcome> {
    let txn = db.begin().await?;

    let job = PrintJob::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Print job not found".to_string()))?;

    if let Some(causation_id) = update.causation_id {
        let seen = PrintJobLog::find()
            .filter(print_job_log::Column::PrintJobId.eq(id))
            .filter(print_job_log::Column::CausationId.eq(causation_id))
            .one(&txn)
            .await?;
        if seen.is_some() {
            txn.commit().await?;
            tracing::debug!("duplicate report {} for job {}, ignoring", causation_id, id);
            return Ok(TransitionOutcome::Unchanged);
        }
    }

    if let Some(expected) = update.expected_revision {
        if expected != job.revision {
            return Err(AppError::Conflict(format!(
                "expected revision {}, current revision is {}",
                expected, job.revision
            )));
        }
    }

    let from = job.status;
    let to = update.status;

    if from != to && !transition_allowed(from, to) {
        return Err(AppError::Validation(vec![FieldViolation::new(
            "status",
            format!("cannot transition from {} to {}", from.as_str(), to.as_str()),
        )]));
    }

    if from == to && update.progress.is_none() && update.printer_id.is_none() {
        txn.commit().await?;
        return Ok(TransitionOutcome::Unchanged);
    }

    let now: DateTimeWithTimeZone = Utc::now().into();

    let mut mutation = PrintJob::update_many()
        .col_expr(print_job::Column::Status, Expr::value(to.to_value()))
        .col_expr(print_job::Column::Revision, Expr::value(job.revision + 1))
        .filter(print_job::Column::Id.eq(id))
        .filter(print_job::Column::Revision.eq(job.revision));

    if let Some(progress) = update.progress {
        mutation = mutation.col_expr(print_job::Column::Progress, Expr::value(progress));
    }
    if let Some(printer_id) = &update.printer_id {
        mutation = mutation.col_expr(
            print_job::Column::PrinterId,
            Expr::value(Some(printer_id.clone())),
        );
    }

    // Lifecycle timestamps are written on first entry and never touched again.
    if to == JobStatus::Printing && job.started_at.is_none() {
        mutation = mutation.col_expr(print_job::Column::StartedAt, Expr::value(Some(now)));
    }
    if to == JobStatus::Completed && job.completed_at.is_none() {
        mutation = mutation.col_expr(print_job::Column::CompletedAt, Expr::value(Some(now)));
    }
    if to == JobStatus::Failed && job.failed_at.is_none() {
        mutation = mutation
            .col_expr(print_job::Column::FailedAt, Expr::value(Some(now)))
            .col_expr(
                print_job::Column::FailureReason,
                Expr::value(update.failure_reason.clone()),
            );
    }

    // Conditional on the loaded revision: a concurrent writer that commits
    // first leaves zero rows for us to touch.
    let result = mutation.exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::Conflict(
            "print job was modified concurrently".to_string(),
        ));
    }

    if from != to {
        let reason = if to == JobStatus::Failed {
            update.failure_reason.clone()
        } else {
            None
        };
        append_log(
            &txn,
            id,
            "StatusChanged",
            format!("Status changed from {} to {}", from.as_str(), to.as_str()),
            Some(LogPayload::StatusChanged {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
                reason,
            }),
            update.causation_id,
        )
        .await?;
    } else if let Some(progress) = update.progress {
        append_log(
            &txn,
            id,
            "ProgressReported",
            format!("Progress reported at {}%", progress),
            Some(LogPayload::ProgressReported { progress }),
            update.causation_id,
        )
        .await?;
    } else if let Some(printer_id) = &update.printer_id {
        append_log(
            &txn,
            id,
            "PrinterAssigned",
            format!("Assigned to printer {}", printer_id),
            Some(LogPayload::PrinterAssigned {
                printer_id: printer_id.clone(),
            }),
            update.causation_id,
        )
        .await?;
    }

    let updated = PrintJob::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("print job vanished mid-transaction".to_string()))?;

    txn.commit().await?;

    tracing::info!(
        "print job {} moved {} -> {}",
        id,
        from.as_str(),
        updated.status.as_str()
    );

    Ok(TransitionOutcome::Applied {
        job: updated,
        previous: from,
    })
}

async fn delete_txn(db: &DatabaseConnection, id: Uuid) -> Result<()> {
    let txn = db.begin().await?;

    let job = PrintJob::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Print job not found".to_string()))?;

    // Logs are owned by the job; drop them in the same transaction rather
    // than leaning on the FK cascade, so behavior is identical on every
    // backend.
    PrintJobLog::delete_many()
        .filter(print_job_log::Column::PrintJobId.eq(id))
        .exec(&txn)
        .await?;
    job.delete(&txn).await?;

    txn.commit().await?;

    tracing::info!("deleted print job {}", id);

    Ok(())
}

async fn append_log<C: ConnectionTrait>(
    conn: &C,
    job_id: Uuid,
    event_type: &str,
    message: String,
    payload: Option<LogPayload>,
    causation_id: Option<Uuid>,
) -> Result<print_job_log::Model> {
    let additional_data = match payload {
        Some(p) => Some(serde_json::to_value(&p)?),
        None => None,
    };

    let entry = print_job_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        print_job_id: Set(job_id),
        event_type: Set(event_type.to_string()),
        message: Set(message),
        additional_data: Set(additional_data),
        causation_id: Set(causation_id),
        created_at: Set(Utc::now().into()),
    };

    Ok(entry.insert(conn).await?)
}
