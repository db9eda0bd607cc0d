use anyhow::Result;
use clap::Parser;
use clap_serde_derive::ClapSerde;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use tcm_advisor::config::{Config, DEFAULT_CONFIG_FILE};
use tcm_advisor::telemetry::{init_console, init_telemetry, shutdown_telemetry};
use tcm_advisor::{gemini_advisors, server};

macro_rules! exit_err {
    ($code:expr, $fmt:expr $(, $arg:expr)*) => {
        {
            init_console();
            error!($fmt $(, $arg)*);
            std::process::exit($code);
        }
    };
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env, default_value = DEFAULT_CONFIG_FILE)]
    config_file: String,

    /// Configuration options
    #[command(flatten)]
    pub opt_config: <Config as ClapSerde>::Opt,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = match Config::load_file(&args.config_file) {
        Ok(conf) => conf.merge(args.opt_config),
        Err(err) => exit_err!(1, "{:#}", err),
    };
    if let Err(err) = config.validate() {
        exit_err!(1, "Invalid configuration: {}", err);
    }

    init_telemetry(config.otlp_endpoint(), config.console)?;

    let advisors = gemini_advisors(&config);
    if config.api_key.trim().is_empty() {
        warn!("GEMINI_API_KEY is not set, every question will be answered with 500 Missing API Key");
    }
    for advisor in &advisors {
        let profile = advisor.profile();
        info!(
            "Endpoint {} on {} using model {} ({:?})",
            profile.name, profile.path, profile.model, profile.prompt_style
        );
    }

    let listener = TcpListener::bind(format!("{}:{}", config.address, config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, server::router(advisors))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    shutdown_telemetry();
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
