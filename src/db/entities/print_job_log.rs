use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit entry. Rows are never updated or deleted on their own;
/// they go away only when the owning job is deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "print_job_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub print_job_id: Uuid,
    pub event_type: String,
    pub message: String,
    pub additional_data: Option<Json>,
    pub causation_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

/// Structured payload stored in `additional_data`. `Raw` preserves payloads
/// written by older clients that logged plain strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogPayload {
    StatusChanged {
        from: String,
        to: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    ProgressReported {
        progress: i32,
    },
    PrinterAssigned {
        printer_id: String,
    },
    Raw {
        value: String,
    },
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::print_job::Entity",
        from = "Column::PrintJobId",
        to = "super::print_job::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PrintJob,
}

impl Related<super::print_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrintJob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
