use chrono::{Duration, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveEnum, ColumnTrait, EntityTrait, QueryFilter};

use crate::db::entities::{printer, printer::PrinterStatus, Printer};
use crate::error::Result;
use crate::state::AppState;

/// Mark printers offline when their last heartbeat is older than the
/// configured threshold. Devices re-announce themselves with the next
/// heartbeat, so the sweep never deletes anything.
pub async fn mark_stale_printers_offline(state: &AppState) -> Result<u64> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let cutoff: DateTimeWithTimeZone =
        (Utc::now() - Duration::minutes(state.config.printer_offline_after_minutes)).into();

    let result = Printer::update_many()
        .col_expr(
            printer::Column::Status,
            Expr::value(PrinterStatus::Offline.to_value()),
        )
        .col_expr(printer::Column::UpdatedAt, Expr::value(now))
        .filter(printer::Column::Status.ne(PrinterStatus::Offline))
        .filter(printer::Column::LastSeenAt.lt(cutoff))
        .exec(&state.db)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!("marked {} stale printer(s) offline", result.rows_affected);
    }

    Ok(result.rows_affected)
}
