use std::{collections::HashMap, env, fs};

#[derive(Debug, Clone)]
pub struct Settings {
    pub hass_url: String,
    pub access_token: String,
    pub entity: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hass_url: "http://127.0.0.1:8123".into(),
            access_token: String::new(),
            entity: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("print_card.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("hass_url") {
                settings.hass_url = v.clone();
            }
            if let Some(v) = file_cfg.get("access_token") {
                settings.access_token = v.clone();
            }
            if let Some(v) = file_cfg.get("entity") {
                settings.entity = Some(v.clone());
            }
        }
    }

    if let Ok(v) = env::var("HASS_URL") {
        settings.hass_url = v;
    }
    if let Ok(v) = env::var("APP__HASS_URL") {
        settings.hass_url = v;
    }

    if let Ok(v) = env::var("HASS_TOKEN") {
        settings.access_token = v;
    }
    if let Ok(v) = env::var("APP__HASS_TOKEN") {
        settings.access_token = v;
    }

    if let Ok(v) = env::var("PRINT_CARD_ENTITY") {
        settings.entity = Some(v);
    }
    if let Ok(v) = env::var("APP__ENTITY") {
        settings.entity = Some(v);
    }

    settings
}
