//! qrgate binary.
//!
//! - Serve the metered QR code API
//! - Apply database migrations
//! - Register accounts and change plans from the command line

use clap::Parser;
use qrgate_rate_limit::QrGateConfig;
use qrgate_server::init_observability;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check_config, migrate, register, serve, set_plan};

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = QrGateConfig::load_with(cli.config.as_deref())?;
    init_observability(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Serve { bind } => serve(config, bind).await?,
        Commands::Migrate => migrate()?,
        Commands::Register => register(&config).await?,
        Commands::SetPlan { api_key, tier } => set_plan(&config, api_key, tier).await?,
        Commands::CheckConfig => check_config(&config)?,
    }

    Ok(())
}
