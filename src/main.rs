//! mobile-backend - HTTP backend stub for the mobile app
//!
//! Serves descriptive statistics over posted data, a mock linear
//! classifier, and a sample user list as JSON.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup or runtime error (bad config, port in use, etc.)

mod analysis;
mod api;
mod cli;
mod config;
mod error;
mod ml;
mod models;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("mobile-backend v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_server(args).await {
        error!("Server failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .mobile-backend.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the bind address, CORS and model weights.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` wins over the verbosity flags when set.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load config, bind the listener and serve until Ctrl-C.
async fn run_server(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let state = api::AppState::from_config(&config.model)?;
    let app = api::router(state, config.server.cors);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    let local = listener.local_addr().context("Failed to read bound address")?;

    println!("🚀 Starting backend server on {}", local);
    println!("📡 API endpoints:");
    for path in [
        "/api/health",
        "/api/users",
        "/api/process",
        "/api/predict",
        "/api/predict/batch",
        "/api/model/importance",
        "/api/model/train",
        "/api/stats",
    ] {
        println!("   - http://{}{}", local, path);
    }
    info!(
        "Model: {} features, bias {}, CORS {}",
        config.model.weights.len(),
        config.model.bias,
        if config.server.cors { "on" } else { "off" }
    );

    api::serve(listener, app, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down the server...");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
