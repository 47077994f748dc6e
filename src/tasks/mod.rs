use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::state::AppState;

pub mod printer_sweep;

pub async fn start_scheduler(state: AppState) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Sweep printers with stale heartbeats once a minute.
    let sweep_state = state.clone();
    let sweep = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let state = sweep_state.clone();
        Box::pin(async move {
            if let Err(err) = printer_sweep::mark_stale_printers_offline(&state).await {
                tracing::warn!("printer sweep failed: {}", err);
            }
        })
    })?;
    scheduler.add(sweep).await?;

    scheduler.start().await?;

    Ok(scheduler)
}
