mod http_cache;
mod rate_limit;
mod requests_logging;

pub use http_cache::http_cache;
pub use rate_limit::{with_rate_limit, IpKeyExtractor};
pub use requests_logging::{log_requests, RequestsLoggingLevel};
