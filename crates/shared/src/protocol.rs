use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CardConfig, TargetId};

pub const PRINT_DOMAIN: &str = "ipp_printer_service";
pub const PRINT_SERVICE: &str = "print_pdf";
pub const UPLOAD_FIELD: &str = "file";
pub const CONFIG_CHANGED_EVENT: &str = "config-changed";

pub fn upload_route() -> &'static str {
    "/api/ipp_printer_service/upload"
}

pub fn last_job_route() -> &'static str {
    "/api/ipp_printer_service/last_job"
}

pub fn service_route(domain: &str, service: &str) -> String {
    format!("/api/services/{domain}/{service}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_path: String,
}

/// Payload of the `ipp_printer_service.print_pdf` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintPdfRequest {
    pub entity_id: TargetId,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies: Option<u32>,
}

impl PrintPdfRequest {
    pub fn new(entity_id: TargetId, file_path: impl Into<String>) -> Self {
        Self {
            entity_id,
            file_path: file_path.into(),
            copies: None,
        }
    }
}

/// Emitted by the editor whenever the user picks a different target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigChangedEvent {
    pub config: CardConfig,
}

impl ConfigChangedEvent {
    pub fn name(&self) -> &'static str {
        CONFIG_CHANGED_EVENT
    }

    pub fn bubbles(&self) -> bool {
        true
    }

    pub fn composed(&self) -> bool {
        true
    }
}

/// Entry the host scans to offer a card in its picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDescriptor {
    #[serde(rename = "type")]
    pub card_type: String,
    pub name: String,
    pub preview: bool,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRecordStatus {
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastJob {
    pub entity_id: TargetId,
    pub file_path: String,
    pub copies: u32,
    pub timestamp: DateTime<Utc>,
    pub status: JobRecordStatus,
}
