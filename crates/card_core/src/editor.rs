//! Configuration editor binding: host-owned snapshot in, `config-changed` events out.

use serde::Serialize;
use shared::{
    domain::CardConfig,
    protocol::{ConfigChangedEvent, PRINT_DOMAIN},
};
use tokio::sync::broadcast;
use tracing::debug;

use crate::ConnectionContext;

const EVENT_CHANNEL_CAPACITY: usize = 32;
pub const SELECTOR_LABEL: &str = "Printer Entity";

/// Restricts the entity picker to sensors provided by the printer integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySelector {
    pub domain: String,
    pub integration: String,
}

impl EntitySelector {
    pub fn printers() -> Self {
        Self {
            domain: "sensor".to_string(),
            integration: PRINT_DOMAIN.to_string(),
        }
    }
}

/// What the editor displays for a given configuration and context.
#[derive(Debug, Clone)]
pub struct SelectorView {
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub selector: EntitySelector,
    pub context: Option<ConnectionContext>,
}

impl SelectorView {
    pub fn project(config: &CardConfig, context: Option<&ConnectionContext>) -> Self {
        Self {
            label: SELECTOR_LABEL,
            value: config.entity.clone(),
            required: true,
            selector: EntitySelector::printers(),
            context: context.cloned(),
        }
    }

    fn patch(&mut self, config: &CardConfig, context: Option<&ConnectionContext>) {
        if let Some(context) = context {
            self.context = Some(context.clone());
        }
        self.value = config.entity.clone();
        self.required = true;
        self.selector = EntitySelector::printers();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorLifecycle {
    Unmounted,
    AwaitingConfig,
    AwaitingContext,
    Ready,
}

pub struct ConfigBindingController {
    mounted: bool,
    ready: bool,
    config: Option<CardConfig>,
    context: Option<ConnectionContext>,
    view: Option<SelectorView>,
    constructions: usize,
    events: broadcast::Sender<ConfigChangedEvent>,
}

impl Default for ConfigBindingController {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBindingController {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            mounted: false,
            ready: false,
            config: None,
            context: None,
            view: None,
            constructions: 0,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChangedEvent> {
        self.events.subscribe()
    }

    pub fn mount(&mut self) {
        self.mounted = true;
        self.refresh_lifecycle();
    }

    /// Drops everything the mounted surface held; a later mount starts over.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.ready = false;
        self.config = None;
        self.context = None;
        self.view = None;
    }

    pub fn lifecycle(&self) -> EditorLifecycle {
        if self.ready {
            return EditorLifecycle::Ready;
        }
        if !self.mounted {
            return EditorLifecycle::Unmounted;
        }
        match (&self.config, &self.context) {
            (None, _) => EditorLifecycle::AwaitingConfig,
            (Some(_), None) => EditorLifecycle::AwaitingContext,
            (Some(_), Some(_)) => EditorLifecycle::Ready,
        }
    }

    pub fn config(&self) -> Option<&CardConfig> {
        self.config.as_ref()
    }

    pub fn view(&self) -> Option<&SelectorView> {
        self.view.as_ref()
    }

    /// How many times the display has been built from scratch.
    pub fn constructions(&self) -> usize {
        self.constructions
    }

    pub fn set_config(&mut self, config: CardConfig) {
        self.config = Some(config);
        self.refresh_lifecycle();
        if self.context.is_some() {
            self.render();
        }
    }

    pub fn set_context(&mut self, context: ConnectionContext) {
        self.context = Some(context);
        self.refresh_lifecycle();
        if let Some(view) = self.view.as_mut() {
            view.context = self.context.clone();
        } else if self.config.is_some() {
            self.render();
        }
    }

    pub fn render(&mut self) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        if let Some(view) = self.view.as_mut() {
            view.patch(config, self.context.as_ref());
            return;
        }
        self.view = Some(SelectorView::project(config, self.context.as_ref()));
        self.constructions += 1;
        debug!(entity = %config.entity, "constructed editor view");
    }

    /// Handles an edit coming from the display. Returns the emitted event, if any.
    pub fn on_value_changed(&mut self, raw_value: &str) -> Option<ConfigChangedEvent> {
        if self.lifecycle() != EditorLifecycle::Ready || self.context.is_none() {
            return None;
        }
        let current = self.config.as_ref()?;
        if current.entity == raw_value {
            return None;
        }

        let next = current.with_entity(raw_value);
        if let Some(view) = self.view.as_mut() {
            view.value = next.entity.clone();
        }
        self.config = Some(next.clone());

        let event = ConfigChangedEvent { config: next };
        debug!(entity = %raw_value, "editor config changed");
        let _ = self.events.send(event.clone());
        Some(event)
    }

    fn refresh_lifecycle(&mut self) {
        if self.mounted && self.config.is_some() && self.context.is_some() {
            self.ready = true;
        }
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
