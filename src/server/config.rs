use super::RequestsLoggingLevel;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SEC: u64 = 15 * 60;

/// Requests a single client IP may make within a window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window_sec: u64,
}

impl RateLimit {
    /// Time for one spent request to be given back.
    pub fn replenish_interval_ms(&self) -> u64 {
        let window_ms = self.window_sec.saturating_mul(1000);
        (window_ms / u64::from(self.max_requests.max(1))).max(1)
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        RateLimit {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window_sec: DEFAULT_RATE_LIMIT_WINDOW_SEC,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub bind_address: String,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
    /// Reported by the health endpoint, e.g. "development" or "production".
    pub environment: String,
    /// Per-IP request limit, `None` disables limiting.
    pub rate_limit: Option<RateLimit>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            bind_address: "127.0.0.1".to_owned(),
            content_cache_age_sec: 300,
            frontend_dir_path: None,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_owned()],
            environment: "development".to_owned(),
            rate_limit: Some(RateLimit::default()),
        }
    }
}
