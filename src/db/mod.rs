pub mod entities;

pub use entities::*;

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use sea_orm::DbErr;

use crate::error::AppError;

const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(100);

/// Run a storage operation, retrying transient connection failures with
/// exponential backoff. Logic errors (NotFound, Conflict, validation) and
/// query errors pass through untouched.
pub async fn with_retries<T, F, Fut>(op: F) -> Result<T, AppError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(AppError::Database(ref db_err)) if attempt < MAX_ATTEMPTS && is_transient(db_err) => {
                let jitter = rand::thread_rng().gen_range(0..50);
                let backoff = BASE_BACKOFF * 2u32.pow(attempt - 1) + Duration::from_millis(jitter);
                tracing::warn!(
                    "transient database error (attempt {}/{}), retrying in {:?}: {}",
                    attempt,
                    MAX_ATTEMPTS,
                    backoff,
                    db_err
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}
