use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodplate_server::catalog::{Catalog, CatalogGate, GuardedCatalogGate, LoadCatalogProblem};
use moodplate_server::config::{self, LoadMode};
use moodplate_server::selection::make_random_source;
use moodplate_server::server::{metrics, run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(version, about = "Serves mood based recipe suggestions from a CSV dataset")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the recipe dataset CSV file.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub dataset_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The address both listeners bind to.
    #[clap(long, default_value = "127.0.0.1")]
    pub bind_address: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of the filters listing in client caches, in seconds.
    #[clap(long, default_value_t = 300)]
    pub content_cache_age_sec: usize,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// When to read the recipe dataset.
    #[clap(long, value_enum, default_value_t = LoadMode::Eager)]
    pub load_mode: LoadMode,

    /// Origin allowed to call the API from a browser. Repeat for several origins.
    #[clap(long = "allowed-origin")]
    pub allowed_origins: Vec<String>,

    /// Deployment environment reported by the health endpoint.
    #[clap(long)]
    pub environment: Option<String>,

    /// Seed for the recipe picker, makes suggestions reproducible.
    #[clap(long)]
    pub selection_seed: Option<u64>,

    /// Requests a client IP may make per rate limit window, 0 disables limiting.
    #[clap(long, default_value_t = 100)]
    pub rate_limit_max_requests: u32,

    /// Length of the rate limit window, in seconds.
    #[clap(long, default_value_t = 900)]
    pub rate_limit_window_sec: u64,

    /// Load and check the dataset, print a report and exit without serving.
    #[clap(long)]
    pub check_only: bool,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            dataset_path: args.dataset_path.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            bind_address: args.bind_address.clone(),
            logging_level: args.logging_level.clone(),
            content_cache_age_sec: args.content_cache_age_sec,
            frontend_dir_path: args.frontend_dir_path.clone(),
            load_mode: args.load_mode,
            allowed_origins: args.allowed_origins.clone(),
            environment: args.environment.clone(),
            selection_seed: args.selection_seed,
            rate_limit_max_requests: args.rate_limit_max_requests,
            rate_limit_window_sec: args.rate_limit_window_sec,
        }
    }
}

/// Builds the catalog without serving and prints every problem found.
fn check_dataset(path: &std::path::Path) -> Result<()> {
    info!("Checking recipe dataset at {:?}...", path);
    let result = Catalog::build(path).with_context(|| format!("Could not check {:?}", path))?;

    for problem in result.problems.iter() {
        match problem {
            LoadCatalogProblem::FieldDecode {
                line,
                dish_name,
                field,
                reason,
            } => println!("line {}: {} has an unreadable {}: {}", line, dish_name, field, reason),
            LoadCatalogProblem::RowDropped { line, reason } => match line {
                Some(line) => println!("line {}: row dropped: {}", line, reason),
                None => println!("row dropped: {}", reason),
            },
        }
    }

    let options = result.catalog.filter_options();
    println!(
        "{} recipes from {} rows, {} problems ({} rows dropped)",
        result.catalog.len(),
        result.rows_read,
        result.problems.len(),
        result.dropped_rows()
    );
    println!("moods: {}", options.moods.join(", "));
    println!("cuisine types: {}", options.cuisine_types.join(", "));
    println!("meal types: {}", options.meal_types.join(", "));
    println!("difficulties: {}", options.difficulties.join(", "));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    if cli_args.check_only {
        return check_dataset(&app_config.dataset_path);
    }

    info!("Configuration loaded:");
    info!("  dataset_path: {:?}", app_config.dataset_path);
    info!("  load_mode: {:?}", app_config.load_mode);
    info!("  port: {}", app_config.port);
    info!("  environment: {}", app_config.environment);
    match app_config.rate_limit {
        Some(ref limit) => info!(
            "  rate_limit: {} requests per {}s per IP",
            limit.max_requests, limit.window_sec
        ),
        None => info!("  rate_limit: disabled"),
    }

    // Initialize metrics system
    info!("Initializing metrics...");
    metrics::init_metrics();

    let catalog_gate: GuardedCatalogGate =
        Arc::new(CatalogGate::from_source(app_config.dataset_path.clone()));
    match app_config.load_mode {
        LoadMode::Eager => {
            catalog_gate
                .load_now()
                .await
                .context("Failed to load the recipe catalog")?;
        }
        LoadMode::Background => {
            info!("Loading the recipe catalog in the background");
            catalog_gate.ensure_loaded();
        }
        LoadMode::Lazy => {
            info!("The recipe catalog will be loaded on the first request");
        }
    }

    if let Some(seed) = app_config.selection_seed {
        warn!("Recipe picks are seeded with {}, suggestions are reproducible", seed);
    }
    let random = make_random_source(app_config.selection_seed);

    tokio::select! {
        result = run_server(app_config.server_config(), catalog_gate, random) => {
            info!("HTTP server stopped: {:?}", result);
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, exiting");
            Ok(())
        }
    }
}
