//! CoinPilot - main entry point
//!
//! Two subcommands:
//! - run: start the grid/DCA strategy against the configured venue
//! - validate: parse and validate a config file, print the resolved
//!   parameters, and exit without touching the network

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coinpilot::{runner, Config};

#[derive(Parser, Debug)]
#[command(name = "coinpilot")]
#[command(about = "Grid trading bot with drawdown-triggered DCA", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the grid strategy (CAUTION - submits real orders unless testnet)
    Run {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/grid.json")]
        config: String,
    },

    /// Validate a configuration file and print the resolved parameters
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/grid.json")]
        config: String,
    },
}

fn setup_logging(verbose: bool) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let log_filename = format!(
        "coinpilot_{}.log",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Run { config } => {
            let config = Config::from_file(&config)
                .with_context(|| format!("Failed to load config from {}", config))?;

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to build tokio runtime")?;

            runtime.block_on(runner::run(config))
        }

        Commands::Validate { config } => {
            let config = Config::from_file(&config)
                .with_context(|| format!("Failed to load config from {}", config))?;
            config.validate().context("Invalid configuration")?;

            println!("Configuration OK");
            println!("  venue:            {}", config.exchange.venue);
            println!("  testnet:          {}", config.exchange.testnet);
            println!("  symbol:           {}", config.strategy.symbol);
            println!("  grid_levels:      {} per side", config.strategy.grid_levels);
            println!("  grid_spacing:     {}", config.strategy.grid_spacing);
            println!("  investment_usd:   {}", config.strategy.investment_usd);
            println!("  dca_enabled:      {}", config.strategy.dca_enabled);
            println!("  dca_multiplier:   {}", config.strategy.dca_multiplier);
            println!("  resting_limits:   {}", config.strategy.resting_limit_orders);
            println!("  poll_interval:    {}s", config.runtime.poll_interval_secs);
            println!("  error_backoff:    {}s", config.runtime.error_backoff_secs);
            Ok(())
        }
    }
}
