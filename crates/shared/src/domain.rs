use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SetupError;

macro_rules! name_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

name_newtype!(TargetId);

/// Card configuration snapshot as the host stores it.
///
/// `entity` holds the target identifier. Any other keys the host keeps next to it
/// (`type`, view options, ...) travel through `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default)]
    pub entity: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CardConfig {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            extra: Map::new(),
        }
    }

    /// The configuration offered when the card is first placed.
    pub fn stub() -> Self {
        Self::new("")
    }

    /// Returns a new snapshot that differs from `self` only in its entity.
    pub fn with_entity(&self, entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            extra: self.extra.clone(),
        }
    }

    pub fn target(&self) -> Result<TargetId, SetupError> {
        if self.entity.is_empty() {
            return Err(SetupError::MissingEntity);
        }
        Ok(TargetId(self.entity.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entity_key_deserializes_to_stub() {
        let config: CardConfig =
            serde_json::from_value(serde_json::json!({ "type": "custom:ipp-printer-card" }))
                .expect("config");
        assert_eq!(config.entity, "");
        assert!(matches!(config.target(), Err(SetupError::MissingEntity)));
    }

    #[test]
    fn with_entity_keeps_extra_keys() {
        let config: CardConfig = serde_json::from_value(serde_json::json!({
            "type": "custom:ipp-printer-card",
            "entity": "sensor.office",
        }))
        .expect("config");

        let edited = config.with_entity("sensor.lobby");
        assert_eq!(edited.entity, "sensor.lobby");
        assert_eq!(
            edited.extra.get("type"),
            Some(&Value::String("custom:ipp-printer-card".into()))
        );
        assert_eq!(config.entity, "sensor.office");

        let wire = serde_json::to_value(&edited).expect("json");
        assert_eq!(wire["entity"], "sensor.lobby");
        assert_eq!(wire["type"], "custom:ipp-printer-card");
    }

    #[test]
    fn target_is_taken_verbatim() {
        let target = CardConfig::new("printer.office").target().expect("target");
        assert_eq!(target, TargetId("printer.office".into()));
        assert_eq!(target.to_string(), "printer.office");
    }
}
