use std::{collections::HashMap, env, fs, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub access_token: String,
    pub entities: Vec<String>,
    /// Largest accepted upload request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8123".into(),
            upload_dir: env::temp_dir().join("ipp_printer_service"),
            access_token: "dev-token".into(),
            entities: vec!["sensor.office_printer".into()],
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("dev_host.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_overrides(&mut settings, &file_cfg);
        }
    }

    if let Ok(v) = env::var("DEV_HOST_BIND") {
        settings.bind_addr = v;
    }
    if let Ok(v) = env::var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Ok(v) = env::var("DEV_HOST_UPLOAD_DIR") {
        settings.upload_dir = PathBuf::from(v);
    }

    if let Ok(v) = env::var("DEV_HOST_TOKEN") {
        settings.access_token = v;
    }

    if let Ok(v) = env::var("DEV_HOST_ENTITIES") {
        settings.entities = parse_entities(&v);
    }

    if let Some(v) = env::var("DEV_HOST_MAX_UPLOAD_BYTES")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        settings.max_upload_bytes = v;
    }

    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.bind_addr = v.clone();
    }
    if let Some(v) = file_cfg.get("upload_dir") {
        settings.upload_dir = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("access_token") {
        settings.access_token = v.clone();
    }
    if let Some(v) = file_cfg.get("entities") {
        settings.entities = parse_entities(v);
    }
    if let Some(v) = file_cfg
        .get("max_upload_bytes")
        .and_then(|v| v.parse().ok())
    {
        settings.max_upload_bytes = v;
    }
}

fn parse_entities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entity| !entity.is_empty())
        .map(str::to_string)
        .collect()
}
