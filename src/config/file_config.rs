use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::LoadMode;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub dataset_path: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub bind_address: Option<String>,
    pub logging_level: Option<String>,
    pub content_cache_age_sec: Option<usize>,
    pub frontend_dir_path: Option<String>,
    pub load_mode: Option<LoadMode>,
    pub environment: Option<String>,

    // Feature configs
    pub cors: Option<CorsConfig>,
    pub selection: Option<SelectionConfig>,
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    /// Fixed seed for reproducible picks, mostly useful in demos and tests.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per client IP within the window, 0 disables limiting.
    pub max_requests: Option<u32>,
    pub window_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
