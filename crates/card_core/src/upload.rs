//! Upload-then-print workflow for a single card instance.

use std::{path::Path, sync::Arc};

use shared::{
    domain::TargetId,
    protocol::{PrintPdfRequest, PRINT_DOMAIN, PRINT_SERVICE},
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

use crate::{ConnectionContext, FileUploader};

const STATUS_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: "application/pdf".to_string(),
            bytes,
        }
    }

    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self::new(name, bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    NoFileSelected,
    Uploading,
    Printing,
    Succeeded,
    Failed(String),
}

impl JobStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, JobStatus::Uploading | JobStatus::Printing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::NoFileSelected | JobStatus::Succeeded | JobStatus::Failed(_)
        )
    }

    /// Human-readable line for the card's status area.
    pub fn text(&self) -> String {
        match self {
            JobStatus::Idle => String::new(),
            JobStatus::NoFileSelected => SubmitError::NoFileSelected.to_string(),
            JobStatus::Uploading => "Uploading...".to_string(),
            JobStatus::Printing => "Printing...".to_string(),
            JobStatus::Succeeded => "Print job sent successfully!".to_string(),
            JobStatus::Failed(message) => format!("Error: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please select a PDF file.")]
    NoFileSelected,
    #[error("{0}")]
    Upload(String),
    #[error("{0}")]
    PrintInvocation(String),
    /// The card could not start an attempt (unconfigured or no host connection).
    #[error("{0}")]
    NotReady(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent { file_path: String },
    Failed(SubmitError),
    /// Another attempt was still uploading or printing; nothing was sent.
    Busy,
}

struct JobState {
    file: Option<PdfFile>,
    selection: u64,
    status: JobStatus,
}

pub struct UploadPrintController {
    uploader: Arc<dyn FileUploader>,
    state: Mutex<JobState>,
    events: broadcast::Sender<JobStatus>,
}

impl UploadPrintController {
    pub fn new(uploader: Arc<dyn FileUploader>) -> Self {
        let (events, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            uploader,
            state: Mutex::new(JobState {
                file: None,
                selection: 0,
                status: JobStatus::Idle,
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobStatus> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> JobStatus {
        self.state.lock().await.status.clone()
    }

    pub async fn status_text(&self) -> String {
        self.status().await.text()
    }

    pub async fn selected_file_name(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .file
            .as_ref()
            .map(|file| file.name.clone())
    }

    /// Replaces the selected document. Outside of an attempt this also resets the
    /// status area; an attempt in flight keeps reporting its own progress.
    pub async fn select_file(&self, file: PdfFile) {
        let mut guard = self.state.lock().await;
        guard.file = Some(file);
        guard.selection += 1;
        if !guard.status.is_in_flight() {
            self.transition(&mut guard, JobStatus::Idle);
        }
    }

    pub async fn clear_selection(&self) {
        let mut guard = self.state.lock().await;
        guard.file = None;
        guard.selection += 1;
    }

    /// Runs one upload-and-print attempt with the selected document.
    ///
    /// Remote failures never escape as errors: they end in [`JobStatus::Failed`] and
    /// leave the selection in place for an explicit resubmit.
    pub async fn submit(&self, target: &TargetId, context: &ConnectionContext) -> SubmitOutcome {
        let (file, selection) = {
            let mut guard = self.state.lock().await;
            if guard.status.is_in_flight() {
                warn!(%target, "print attempt already in progress; ignoring trigger");
                return SubmitOutcome::Busy;
            }
            let Some(file) = guard.file.clone() else {
                self.transition(&mut guard, JobStatus::NoFileSelected);
                return SubmitOutcome::Failed(SubmitError::NoFileSelected);
            };
            self.transition(&mut guard, JobStatus::Uploading);
            (file, guard.selection)
        };

        let context = context.clone();
        match self.upload_and_print(&file, target, &context).await {
            Ok(file_path) => {
                info!(%target, file = %file.name, %file_path, "print job sent");
                let mut guard = self.state.lock().await;
                if guard.selection == selection {
                    guard.file = None;
                }
                self.transition(&mut guard, JobStatus::Succeeded);
                SubmitOutcome::Sent { file_path }
            }
            Err(err) => {
                error!(%target, file = %file.name, error = %err, "print attempt failed");
                let mut guard = self.state.lock().await;
                self.transition(&mut guard, JobStatus::Failed(err.to_string()));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Reports a failure that prevented an attempt from starting. The selection is kept.
    pub async fn reject(&self, err: SubmitError) -> SubmitOutcome {
        let mut guard = self.state.lock().await;
        if guard.status.is_in_flight() {
            return SubmitOutcome::Busy;
        }
        self.transition(&mut guard, JobStatus::Failed(err.to_string()));
        SubmitOutcome::Failed(err)
    }

    async fn upload_and_print(
        &self,
        file: &PdfFile,
        target: &TargetId,
        context: &ConnectionContext,
    ) -> Result<String, SubmitError> {
        let uploaded = self
            .uploader
            .upload(context.access_token(), file)
            .await
            .map_err(|e| SubmitError::Upload(e.to_string()))?;

        {
            let mut guard = self.state.lock().await;
            self.transition(&mut guard, JobStatus::Printing);
        }

        let request = PrintPdfRequest::new(target.clone(), uploaded.file_path.clone());
        let data =
            serde_json::to_value(&request).map_err(|e| SubmitError::PrintInvocation(e.to_string()))?;
        context
            .call_service(PRINT_DOMAIN, PRINT_SERVICE, data)
            .await
            .map_err(|e| SubmitError::PrintInvocation(e.to_string()))?;

        Ok(uploaded.file_path)
    }

    fn transition(&self, state: &mut JobState, status: JobStatus) {
        state.status = status.clone();
        let _ = self.events.send(status);
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
