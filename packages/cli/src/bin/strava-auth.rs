use clap::Parser;
use colored::*;
use std::process;

mod cli;

use strava_auth::AuthSettings;
use strava_auth_cli::{logging::init_logging, Cli};

#[tokio::main]
async fn main() {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = AuthSettings::from(cli.auth);
    if let Err(e) = cli::auth::handle_command(cli.command, settings).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
