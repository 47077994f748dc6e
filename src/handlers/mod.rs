pub mod health;
pub mod print_jobs;
pub mod printers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Print job endpoints
        .route("/print-jobs", post(print_jobs::create_print_job))
        .route("/print-jobs", get(print_jobs::list_print_jobs))
        .route("/print-jobs/:id", get(print_jobs::get_print_job))
        .route("/print-jobs/:id", delete(print_jobs::delete_print_job))
        .route("/print-jobs/:id/status", put(print_jobs::update_print_job_status))

        // Printer registry endpoints (edge-device facing)
        .route("/printers", get(printers::list_printers))
        .route("/printers/:id", get(printers::get_printer))
        .route("/printers/:id/heartbeat", post(printers::heartbeat))

        // Statistics
        .route("/stats", get(print_jobs::get_stats))
}
