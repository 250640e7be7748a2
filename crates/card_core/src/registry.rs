//! Element and card-picker registry the host scans for placeable cards.

use std::collections::HashSet;

use shared::protocol::CardDescriptor;
use thiserror::Error;
use tracing::debug;

use crate::card::{PrintCard, CARD_TYPE, EDITOR_TAG};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("element `{0}` has already been defined")]
    AlreadyDefined(String),
}

#[derive(Debug, Default)]
pub struct CardRegistry {
    elements: HashSet<String>,
    cards: Vec<CardDescriptor>,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, tag: &str) -> Result<(), RegistryError> {
        if !self.elements.insert(tag.to_string()) {
            return Err(RegistryError::AlreadyDefined(tag.to_string()));
        }
        debug!(%tag, "element defined");
        Ok(())
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.elements.contains(tag)
    }

    /// Adds a picker entry unless one with the same card type is already listed.
    pub fn push_card(&mut self, descriptor: CardDescriptor) -> bool {
        if self
            .cards
            .iter()
            .any(|card| card.card_type == descriptor.card_type)
        {
            return false;
        }
        self.cards.push(descriptor);
        true
    }

    pub fn cards(&self) -> &[CardDescriptor] {
        &self.cards
    }
}

/// What a call to [`register_print_card`] actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registration {
    pub card_defined: bool,
    pub editor_defined: bool,
    pub descriptor_added: bool,
}

impl Registration {
    pub fn changed(&self) -> bool {
        self.card_defined || self.editor_defined || self.descriptor_added
    }
}

/// Registers the print card, its editor and its picker entry. Safe to call repeatedly.
pub fn register_print_card(registry: &mut CardRegistry) -> Registration {
    let mut registration = Registration::default();
    if !registry.is_defined(CARD_TYPE) {
        registration.card_defined = registry.define(CARD_TYPE).is_ok();
    }
    if !registry.is_defined(EDITOR_TAG) {
        registration.editor_defined = registry.define(EDITOR_TAG).is_ok();
    }
    registration.descriptor_added = registry.push_card(PrintCard::descriptor());
    registration
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
