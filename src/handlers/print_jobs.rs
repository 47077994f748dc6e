use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::{
    ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::entities::{print_job, print_job::JobStatus, print_job_log, PrintJob, PrintJobLog, Printer},
    error::{AppError, FieldViolation, Result},
    services::lifecycle::{self, NewPrintJob, StatusUpdate, TransitionOutcome},
    state::AppState,
};

/// Listing embeds only the tail of each job's history; the detail endpoint
/// returns everything.
const RECENT_LOGS: u64 = 5;

#[derive(Deserialize)]
pub struct ListPrintJobsQuery {
    pub status: Option<String>,
    pub customer_email: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

#[derive(Serialize)]
pub struct LogEntryResponse {
    pub id: Uuid,
    pub event_type: String,
    pub message: String,
    pub additional_data: Option<serde_json::Value>,
    pub created_at: String,
}

impl From<print_job_log::Model> for LogEntryResponse {
    fn from(log: print_job_log::Model) -> Self {
        Self {
            id: log.id,
            event_type: log.event_type,
            message: log.message,
            additional_data: log.additional_data,
            created_at: log.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct PrintJobResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub material: String,
    pub file_name: String,
    pub file_size_bytes: Option<i64>,
    pub file_url: String,
    pub price: f64,
    pub estimated_duration_minutes: Option<i32>,
    pub status: String,
    pub printer_id: Option<String>,
    pub progress: i32,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub failure_reason: Option<String>,
    pub revision: i32,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub failed_at: Option<String>,
    pub logs: Vec<LogEntryResponse>,
}

impl PrintJobResponse {
    fn from_model(job: print_job::Model, logs: Vec<print_job_log::Model>) -> Self {
        Self {
            id: job.id,
            name: job.name,
            description: job.description,
            material: job.material,
            file_name: job.file_name,
            file_size_bytes: job.file_size_bytes,
            file_url: job.file_url,
            price: job.price,
            estimated_duration_minutes: job.estimated_duration_minutes,
            status: job.status.as_str().to_string(),
            printer_id: job.printer_id,
            progress: job.progress,
            customer_email: job.customer_email,
            customer_phone: job.customer_phone,
            failure_reason: job.failure_reason,
            revision: job.revision,
            created_at: job.created_at.to_rfc3339(),
            started_at: job.started_at.map(|dt| dt.to_rfc3339()),
            completed_at: job.completed_at.map(|dt| dt.to_rfc3339()),
            failed_at: job.failed_at.map(|dt| dt.to_rfc3339()),
            logs: logs.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct PaginatedPrintJobsResponse {
    pub print_jobs: Vec<PrintJobResponse>,
    pub pagination: PaginationInfo,
}

#[derive(Serialize)]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_jobs: u64,
    pub pending_jobs: u64,
    pub queued_jobs: u64,
    pub printing_jobs: u64,
    pub completed_jobs: u64,
    pub failed_jobs: u64,
    pub cancelled_jobs: u64,
    pub total_printers: u64,
}

pub async fn create_print_job(
    State(state): State<AppState>,
    Json(payload): Json<NewPrintJob>,
) -> Result<(StatusCode, Json<PrintJobResponse>)> {
    let job = lifecycle::create_print_job(&state.db, payload).await?;

    let logs = job
        .find_related(PrintJobLog)
        .order_by_desc(print_job_log::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PrintJobResponse::from_model(job, logs)),
    ))
}

pub async fn list_print_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListPrintJobsQuery>,
) -> Result<Json<PaginatedPrintJobsResponse>> {
    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 100);

    let mut select = PrintJob::find();

    if let Some(status) = &query.status {
        let status = JobStatus::parse(status).ok_or_else(|| {
            AppError::Validation(vec![FieldViolation::new(
                "status",
                format!("unknown status \"{}\"", status),
            )])
        })?;
        select = select.filter(print_job::Column::Status.eq(status));
    }

    if let Some(email) = &query.customer_email {
        select = select.filter(print_job::Column::CustomerEmail.eq(email.clone()));
    }

    let total_items = select.clone().count(&state.db).await?;
    let total_pages = (total_items + page_size - 1) / page_size;

    let jobs = select
        .order_by_desc(print_job::Column::CreatedAt)
        .offset((page - 1) * page_size)
        .limit(page_size)
        .all(&state.db)
        .await?;

    let mut print_jobs = Vec::with_capacity(jobs.len());
    for job in jobs {
        let logs = job
            .find_related(PrintJobLog)
            .order_by_desc(print_job_log::Column::CreatedAt)
            .limit(RECENT_LOGS)
            .all(&state.db)
            .await?;
        print_jobs.push(PrintJobResponse::from_model(job, logs));
    }

    Ok(Json(PaginatedPrintJobsResponse {
        print_jobs,
        pagination: PaginationInfo {
            page,
            page_size,
            total_items,
            total_pages,
        },
    }))
}

pub async fn get_print_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PrintJobResponse>> {
    let job = PrintJob::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Print job not found".to_string()))?;

    let logs = job
        .find_related(PrintJobLog)
        .order_by_desc(print_job_log::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(PrintJobResponse::from_model(job, logs)))
}

pub async fn update_print_job_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<StatusCode> {
    let outcome = lifecycle::apply_status_update(&state.db, id, &payload).await?;

    if let TransitionOutcome::Applied { job, previous } = outcome {
        if previous != job.status {
            state
                .notifier
                .publish_status_changed(job.id, job.status, &job.customer_email)
                .await;
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_print_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    lifecycle::delete_print_job(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let total_jobs = PrintJob::find().count(&state.db).await?;

    let pending_jobs = PrintJob::find()
        .filter(print_job::Column::Status.eq(JobStatus::Pending))
        .count(&state.db)
        .await?;

    let queued_jobs = PrintJob::find()
        .filter(print_job::Column::Status.eq(JobStatus::Queued))
        .count(&state.db)
        .await?;

    let printing_jobs = PrintJob::find()
        .filter(print_job::Column::Status.eq(JobStatus::Printing))
        .count(&state.db)
        .await?;

    let completed_jobs = PrintJob::find()
        .filter(print_job::Column::Status.eq(JobStatus::Completed))
        .count(&state.db)
        .await?;

    let failed_jobs = PrintJob::find()
        .filter(print_job::Column::Status.eq(JobStatus::Failed))
        .count(&state.db)
        .await?;

    let cancelled_jobs = PrintJob::find()
        .filter(print_job::Column::Status.eq(JobStatus::Cancelled))
        .count(&state.db)
        .await?;

    let total_printers = Printer::find().count(&state.db).await?;

    Ok(Json(StatsResponse {
        total_jobs,
        pending_jobs,
        queued_jobs,
        printing_jobs,
        completed_jobs,
        failed_jobs,
        cancelled_jobs,
        total_printers,
    }))
}
