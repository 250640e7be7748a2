use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use shared::protocol::UploadResponse;

pub mod card;
pub mod editor;
pub mod registry;
pub mod transport;
pub mod upload;

pub use card::PrintCard;
pub use editor::{ConfigBindingController, EditorLifecycle, EntitySelector, SelectorView};
pub use registry::{register_print_card, CardRegistry, Registration, RegistryError};
pub use transport::{HomeAssistantClient, RestServiceCaller, TransportError};
pub use upload::{JobStatus, PdfFile, SubmitError, SubmitOutcome, UploadPrintController};

/// Remote-invocation capability handed out by the host.
#[async_trait]
pub trait ServiceCaller: Send + Sync {
    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: Value,
    ) -> Result<(), TransportError>;
}

/// Accepts a document and answers with the path the host stored it under.
#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(
        &self,
        access_token: &str,
        file: &PdfFile,
    ) -> Result<UploadResponse, TransportError>;
}

/// Snapshot of the host connection: credential plus service-call capability.
///
/// The host replaces the whole snapshot on every update. Calls that are already in
/// flight keep the snapshot (and credential) they started with.
#[derive(Clone)]
pub struct ConnectionContext {
    access_token: String,
    services: Arc<dyn ServiceCaller>,
}

impl ConnectionContext {
    pub fn new(access_token: impl Into<String>, services: Arc<dyn ServiceCaller>) -> Self {
        Self {
            access_token: access_token.into(),
            services,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: Value,
    ) -> Result<(), TransportError> {
        self.services.call_service(domain, service, data).await
    }

    /// True when both snapshots carry the same credential and the same capability.
    pub fn same_as(&self, other: &ConnectionContext) -> bool {
        self.access_token == other.access_token && Arc::ptr_eq(&self.services, &other.services)
    }
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}
