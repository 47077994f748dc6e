use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Webhook URL for status-change notifications. Fan-out to customers is
    /// owned by the bus behind this URL; unset means notifications are logged
    /// and dropped.
    pub notify_webhook_url: Option<String>,
    /// Printers with no heartbeat for this many minutes are swept to offline.
    pub printer_offline_after_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            notify_webhook_url: env::var("NOTIFY_WEBHOOK_URL").ok(),
            printer_offline_after_minutes: env::var("PRINTER_OFFLINE_AFTER_MINUTES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("PRINTER_OFFLINE_AFTER_MINUTES must be a number of minutes")?,
        })
    }
}
