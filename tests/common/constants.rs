//! Shared constants for end-to-end tests
//!
//! When the fixture dataset changes, update only this file and `fixtures.rs`.

// ============================================================================
// Fixture Recipes
// ============================================================================

/// Happy, Italian dinner, any weather, evening
pub const PIZZA_NAME: &str = "Margherita Pizza";

/// Happy, Mexican lunch, sunny afternoon
pub const TACOS_NAME: &str = "Chicken Tacos";

/// Cozy, Japanese dinner, rainy evening
pub const RAMEN_NAME: &str = "Tonkotsu Ramen";

/// Cozy, American lunch, cold weather, steps in the legacy `{"step": ...}` form
pub const SOUP_NAME: &str = "Tomato Soup";

/// Energetic breakfast with bare-string ingredients and no cuisine type
pub const SMOOTHIE_NAME: &str = "Green Smoothie";

/// Sad dinner whose ingredients column is not valid JSON
pub const STEW_NAME: &str = "Mystery Stew";

/// Number of recipes the fixture dataset loads into
pub const FIXTURE_RECIPE_COUNT: usize = 6;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Seed for the recipe picker, so repeated runs pick the same recipes
pub const SELECTION_SEED: u64 = 1234;

/// Rate limit window for servers spawned with a limit, long enough that no
/// request is given back during a test (seconds)
pub const RATE_LIMIT_WINDOW_SEC: u64 = 3600;
