//! Product listing page (PLP) dev server and tools.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  DEV SERVER                   │
//!   Browser request       │  ┌─────────┐    ┌──────────┐                  │
//!   ──────────────────────┼─▶│  http   │───▶│  proxy   │──────────────────┼──▶ Remote API
//!                         │  │ server  │    │ (/api/*) │◀─────────────────┼─── (prefix stripped)
//!                         │  └────┬────┘    └──────────┘                  │
//!                         │       │ other paths                           │
//!                         │       ▼                                       │
//!                         │  ┌─────────┐    ┌──────────┐                  │
//!   ◀─────────────────────┼──│  pages  │◀───│ routing  │                  │
//!   redirect / shell / 404│  └─────────┘    │  table   │                  │
//!                         │                 └──────────┘                  │
//!                         │  config · observability · lifecycle · format  │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use plp_page::config::{
    load_or_default, validate_config, ConfigError, ConfigWatcher, ServerOverrides,
};
use plp_page::format::NumberFormat;
use plp_page::http::DevServer;
use plp_page::lifecycle::{signals, Shutdown};
use plp_page::observability::{logging, metrics};
use plp_page::routing::{product_listing, RouteTarget};

#[derive(Parser)]
#[command(name = "plp-page")]
#[command(about = "Product listing page dev server and routing tools", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dev server
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
        /// Reload proxy rules when the config file changes
        #[arg(long)]
        watch: bool,
    },
    /// Print the route table
    Routes,
    /// Resolve a path against the route table
    Resolve { path: String },
    /// Format a number for display
    FormatPrice {
        #[arg(allow_negative_numbers = true)]
        price: f64,
        #[arg(long, default_value = "fa-IR")]
        locale: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, watch } => {
            serve(cli.config, host, port, watch).await?;
        }
        Commands::Routes => {
            let routes = product_listing()?;
            for entry in routes.entries() {
                match entry.target() {
                    RouteTarget::View { name, view } => {
                        println!("{:<32} {:<14} {}", entry.pattern(), name, view);
                    }
                    RouteTarget::Redirect { to } => {
                        println!("{:<32} {:<14} -> {}", entry.pattern(), "(redirect)", to);
                    }
                }
            }
        }
        Commands::Resolve { path } => {
            let navigation = product_listing()?.navigate(&path)?;
            println!("{}", serde_json::to_string_pretty(&navigation)?);
        }
        Commands::FormatPrice { price, locale } => {
            let format = NumberFormat::for_locale(&locale)
                .ok_or_else(|| format!("unsupported locale `{}`", locale))?;
            println!("{}", format.format(price));
        }
    }

    Ok(())
}

async fn serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let overrides = ServerOverrides { host, port };
    let mut config = load_or_default(config_path.as_deref())?;
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);
    tracing::info!("plp-page v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        proxies = config.proxy.len(),
        "Listening for connections"
    );

    // Keep the watcher alive for the lifetime of the server
    let (config_updates, _watcher) = match (&config_path, watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            let watcher = watcher.with_overrides(overrides);
            (updates, Some(watcher.run()?))
        }
        (None, true) => {
            tracing::warn!("--watch needs --config, hot reload disabled");
            (mpsc::unbounded_channel().1, None)
        }
        _ => (mpsc::unbounded_channel().1, None),
    };

    let shutdown = Shutdown::new();
    signals::spawn_handler(shutdown.clone());

    let server = DevServer::new(config, product_listing()?)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
