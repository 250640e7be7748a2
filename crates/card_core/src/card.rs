use std::sync::{Arc, PoisonError, RwLock};

use shared::{
    domain::{CardConfig, TargetId},
    error::SetupError,
    protocol::CardDescriptor,
};
use tracing::{info, warn};

use crate::{
    editor::ConfigBindingController,
    upload::{PdfFile, SubmitError, SubmitOutcome, UploadPrintController},
    ConnectionContext, FileUploader,
};

pub const CARD_TYPE: &str = "ipp-printer-card";
pub const EDITOR_TAG: &str = "ipp-printer-card-editor";
pub const CARD_NAME: &str = "IPP Printer Card";
pub const CARD_DESCRIPTION: &str = "A card to upload and print PDF files via IPP";
const CARD_SIZE: u32 = 3;

#[derive(Default)]
struct CardState {
    config: Option<CardConfig>,
    target: Option<TargetId>,
    context: Option<ConnectionContext>,
}

/// The upload-and-print card bound to one target.
pub struct PrintCard {
    state: RwLock<CardState>,
    controller: UploadPrintController,
}

impl PrintCard {
    pub fn new(uploader: Arc<dyn FileUploader>) -> Self {
        Self {
            state: RwLock::new(CardState::default()),
            controller: UploadPrintController::new(uploader),
        }
    }

    pub fn descriptor() -> CardDescriptor {
        CardDescriptor {
            card_type: CARD_TYPE.to_string(),
            name: CARD_NAME.to_string(),
            preview: true,
            description: CARD_DESCRIPTION.to_string(),
        }
    }

    pub fn stub_config() -> CardConfig {
        CardConfig::stub()
    }

    pub fn card_size(&self) -> u32 {
        CARD_SIZE
    }

    /// A fresh, unmounted editor for this card type.
    pub fn config_element() -> ConfigBindingController {
        ConfigBindingController::new()
    }

    /// Binds the card to `config`. Rejected configs leave the previous binding intact.
    pub fn set_config(&self, config: CardConfig) -> Result<(), SetupError> {
        let target = config.target()?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        info!(%target, "print card configured");
        state.config = Some(config);
        state.target = Some(target);
        Ok(())
    }

    pub fn config(&self) -> Option<CardConfig> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .config
            .clone()
    }

    pub fn set_context(&self, context: ConnectionContext) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .context = Some(context);
    }

    pub fn controller(&self) -> &UploadPrintController {
        &self.controller
    }

    pub async fn select_file(&self, file: PdfFile) {
        self.controller.select_file(file).await;
    }

    /// Print button handler: submits the selected file to the bound target using the
    /// connection snapshot current at the time of the trigger.
    pub async fn print(&self) -> SubmitOutcome {
        let (target, context) = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            (state.target.clone(), state.context.clone())
        };

        let Some(target) = target else {
            warn!("print requested before the card was configured");
            return self
                .controller
                .reject(SubmitError::NotReady(SetupError::MissingEntity.to_string()))
                .await;
        };
        let Some(context) = context else {
            warn!(%target, "print requested without a host connection");
            return self
                .controller
                .reject(SubmitError::NotReady("not connected to the host".to_string()))
                .await;
        };

        self.controller.submit(&target, &context).await
    }
}

#[cfg(test)]
#[path = "tests/card_tests.rs"]
mod tests;
