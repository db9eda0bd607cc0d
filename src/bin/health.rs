use std::process::ExitCode;

use clap::Parser;
use reqwest::Url;
use serde::Deserialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Health route of the running service
    #[arg(env = "HEALTH_URL", default_value = "http://127.0.0.1:25566/health")]
    url: Url,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let response = match reqwest::blocking::get(args.url) {
        Ok(response) => response,
        Err(err) => {
            eprintln!("Request failed: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if !response.status().is_success() {
        eprintln!("Service answered with {}", response.status());
        return ExitCode::FAILURE;
    }
    match response.json::<HealthResponse>() {
        Ok(health) if health.status == "ok" => ExitCode::SUCCESS,
        Ok(health) => {
            eprintln!("Service reported status {}", health.status);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Unreadable health response: {}", err);
            ExitCode::FAILURE
        }
    }
}
