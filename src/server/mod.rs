mod api_error;
pub mod config;
mod http_layers;
pub mod metrics;
mod recipes;
pub mod server;
pub mod state;

pub use api_error::ApiError;
pub use config::{RateLimit, ServerConfig};
pub use http_layers::*;
pub use recipes::MATCH_STAGE_HEADER;
pub use server::{make_app, run_server};
