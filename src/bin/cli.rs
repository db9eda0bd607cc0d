use anyhow::{anyhow, Context, Result};
use clap::Parser;
use clap::Subcommand;
use clap_serde_derive::ClapSerde;
use rand::rngs::OsRng;
use tokio::io::AsyncReadExt;

use tcm_advisor::config::{Config, DEFAULT_CONFIG_FILE};
use tcm_advisor::event::InboundRequest;
use tcm_advisor::gemini_advisors;
use tcm_advisor::passgen::generate_passwords;
use tcm_advisor::telemetry::init_console;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single invocation from a JSON event and print the response envelope
    Invoke {
        /// Path to the configuration file
        #[arg(short, long, env, default_value = DEFAULT_CONFIG_FILE)]
        config_file: String,

        /// Name of the endpoint profile, defaults to the first one configured
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Path to the event JSON, `-` reads from stdin
        #[arg(long, default_value = "-")]
        event: String,

        #[command(flatten)]
        opt_config: <Config as ClapSerde>::Opt,
    },
    /// Generate passwords for beta testers
    GeneratePasswords {
        /// Number of passwords to generate
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Length of each password
        #[arg(short, long, default_value_t = 16)]
        length: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_console();
    let args = Args::parse();

    match args.cmd {
        Commands::Invoke {
            config_file,
            endpoint,
            event,
            opt_config,
        } => {
            let config = Config::load_file(&config_file)?.merge(opt_config);
            config.validate()?;

            let raw_event = read_event(&event).await?;
            let request: InboundRequest =
                serde_json::from_str(&raw_event).context("Event is not a valid request")?;

            let advisors = gemini_advisors(&config);
            let advisor = match &endpoint {
                Some(name) => advisors
                    .iter()
                    .find(|advisor| &advisor.profile().name == name)
                    .ok_or_else(|| anyhow!("No endpoint named {}", name))?,
                None => advisors
                    .first()
                    .ok_or_else(|| anyhow!("No endpoints configured"))?,
            };

            let response = advisor.handle(&request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::GeneratePasswords { count, length } => {
            for password in generate_passwords(&mut OsRng, count, length)? {
                println!("{}", password);
            }
        }
    }
    Ok(())
}

async fn read_event(path: &str) -> Result<String> {
    if path == "-" {
        let mut raw = String::new();
        tokio::io::stdin().read_to_string(&mut raw).await?;
        Ok(raw)
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file {}", path))
    }
}
