//! Per-IP rate limiting using tower-governor
//!
//! Every client IP gets a bucket of `max_requests` tokens that refills over
//! `window_sec`. Requests past the limit are answered with 429.

use axum::{extract::ConnectInfo, http::Request, Router};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorError, GovernorLayer,
};
use tracing::warn;

use crate::server::config::RateLimit;

/// Extracts the peer IP address from ConnectInfo.
/// The server must be started with `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct IpKeyExtractor;

impl KeyExtractor for IpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Wraps every route of `router` in a per-IP limiter.
pub fn with_rate_limit(router: Router, limit: &RateLimit) -> Router {
    let config = GovernorConfigBuilder::default()
        .key_extractor(IpKeyExtractor)
        .per_millisecond(limit.replenish_interval_ms())
        .burst_size(limit.max_requests)
        .finish();

    match config {
        Some(config) => router.layer(GovernorLayer::new(Arc::new(config))),
        None => {
            warn!("Invalid rate limit {:?}, requests are not limited", limit);
            router
        }
    }
}
