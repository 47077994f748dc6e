use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::{printer, printer::PrinterStatus, Printer},
    error::{AppError, FieldViolation, Result},
    state::AppState,
};

/// Device report, mirroring what the edge client publishes on its status
/// topic. An unknown printer id registers the device on first contact.
#[derive(Deserialize)]
pub struct HeartbeatRequest {
    pub status: PrinterStatus,
    pub current_material: Option<String>,
    pub material_level: Option<f64>,
    pub temperature: Option<f64>,
    pub error_message: Option<String>,
}

#[derive(Serialize)]
pub struct PrinterResponse {
    pub id: String,
    pub status: String,
    pub current_material: Option<String>,
    pub material_level: Option<f64>,
    pub temperature: Option<f64>,
    pub error_message: Option<String>,
    pub last_seen_at: String,
}

impl From<printer::Model> for PrinterResponse {
    fn from(model: printer::Model) -> Self {
        Self {
            id: model.id,
            status: model.status.as_str().to_string(),
            current_material: model.current_material,
            material_level: model.material_level,
            temperature: model.temperature,
            error_message: model.error_message,
            last_seen_at: model.last_seen_at.to_rfc3339(),
        }
    }
}

pub async fn heartbeat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<HeartbeatRequest>,
) -> Result<StatusCode> {
    let id = id.trim().to_string();
    if id.is_empty() || id.chars().count() > 100 {
        return Err(AppError::Validation(vec![FieldViolation::new(
            "id",
            "must be between 1 and 100 characters",
        )]));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();

    match Printer::find_by_id(id.clone()).one(&state.db).await? {
        Some(model) => {
            let mut active: printer::ActiveModel = model.into();
            active.status = Set(payload.status);
            active.current_material = Set(payload.current_material);
            active.material_level = Set(payload.material_level);
            active.temperature = Set(payload.temperature);
            active.error_message = Set(payload.error_message);
            active.last_seen_at = Set(now);
            active.updated_at = Set(now);
            active.update(&state.db).await?;
        }
        None => {
            let active = printer::ActiveModel {
                id: Set(id.clone()),
                status: Set(payload.status),
                current_material: Set(payload.current_material),
                material_level: Set(payload.material_level),
                temperature: Set(payload.temperature),
                error_message: Set(payload.error_message),
                last_seen_at: Set(now),
                created_at: Set(now),
                updated_at: Set(now),
            };
            active.insert(&state.db).await?;
            tracing::info!("registered printer {}", id);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_printers(State(state): State<AppState>) -> Result<Json<Vec<PrinterResponse>>> {
    let printers = Printer::find()
        .order_by_asc(printer::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(printers.into_iter().map(Into::into).collect()))
}

pub async fn get_printer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PrinterResponse>> {
    let model = Printer::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Printer not found".to_string()))?;

    Ok(Json(model.into()))
}
