mod file_config;

pub use file_config::{CorsConfig, FileConfig, RateLimitConfig, SelectionConfig};

use crate::server::{
    config::DEFAULT_ALLOWED_ORIGIN, RateLimit, RequestsLoggingLevel, ServerConfig,
};
use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// When the recipe dataset is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Before the server starts listening, a failed load aborts startup.
    #[default]
    Eager,
    /// Right after startup, requests get 503 until it completes.
    Background,
    /// On the first request that needs the catalog.
    Lazy,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub dataset_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub load_mode: LoadMode,
    pub allowed_origins: Vec<String>,
    pub environment: Option<String>,
    pub selection_seed: Option<u64>,
    /// 0 disables rate limiting.
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_sec: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    pub load_mode: LoadMode,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub selection_seed: Option<u64>,
    pub rate_limit: Option<RateLimit>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let dataset_path = file
            .dataset_path
            .map(PathBuf::from)
            .or_else(|| cli.dataset_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "dataset_path must be specified via --dataset-path or in config file"
                )
            })?;

        let load_mode = file.load_mode.unwrap_or(cli.load_mode);

        // Deferred modes report a missing dataset through the readiness gate instead
        if load_mode == LoadMode::Eager {
            if !dataset_path.exists() {
                bail!("Recipe dataset does not exist: {:?}", dataset_path);
            }
            if !dataset_path.is_file() {
                bail!("Recipe dataset is not a file: {:?}", dataset_path);
            }
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ, both are {}", port);
        }

        let bind_address = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let allowed_origins = file
            .cors
            .and_then(|cors| cors.allowed_origins)
            .unwrap_or_else(|| cli.allowed_origins.clone());
        let allowed_origins = if allowed_origins.is_empty() {
            vec![DEFAULT_ALLOWED_ORIGIN.to_string()]
        } else {
            allowed_origins
        };

        let environment = file
            .environment
            .or_else(|| cli.environment.clone())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let selection_seed = file
            .selection
            .and_then(|selection| selection.seed)
            .or(cli.selection_seed);

        let rate_limit_file = file.rate_limit.unwrap_or_default();
        let max_requests = rate_limit_file
            .max_requests
            .unwrap_or(cli.rate_limit_max_requests);
        let window_sec = rate_limit_file
            .window_sec
            .unwrap_or(cli.rate_limit_window_sec);
        let rate_limit = if max_requests == 0 {
            None
        } else {
            if window_sec == 0 {
                bail!("rate limit window must be at least one second");
            }
            Some(RateLimit {
                max_requests,
                window_sec,
            })
        };

        Ok(Self {
            dataset_path,
            port,
            metrics_port,
            bind_address,
            logging_level,
            content_cache_age_sec,
            frontend_dir_path,
            load_mode,
            allowed_origins,
            environment,
            selection_seed,
            rate_limit,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            bind_address: self.bind_address.clone(),
            content_cache_age_sec: self.content_cache_age_sec,
            frontend_dir_path: self.frontend_dir_path.clone(),
            allowed_origins: self.allowed_origins.clone(),
            environment: self.environment.clone(),
            rate_limit: self.rate_limit.clone(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
