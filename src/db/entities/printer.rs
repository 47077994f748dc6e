use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A physical printer-attached device. Rows are created and refreshed by
/// heartbeat messages from the edge client, never by the customer surface.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "printers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub status: PrinterStatus,
    pub current_material: Option<String>,
    pub material_level: Option<f64>,
    pub temperature: Option<f64>,
    pub error_message: Option<String>,
    pub last_seen_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum PrinterStatus {
    #[sea_orm(string_value = "offline")]
    Offline,
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "printing")]
    Printing,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "error")]
    Error,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

impl PrinterStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Offline => "offline",
            Self::Online => "online",
            Self::Printing => "printing",
            Self::Paused => "paused",
            Self::Error => "error",
            Self::Maintenance => "maintenance",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
