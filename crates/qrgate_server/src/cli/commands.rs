//! CLI command definitions.

use clap::{Parser, Subcommand};
use qrgate_core::PlanTier;
use std::path::PathBuf;

/// qrgate - metered API gateway for QR code rendering
#[derive(Parser, Debug)]
#[command(name = "qrgate")]
#[command(about = "Metered API gateway for QR code rendering", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from this file instead of the user and working directories
    #[arg(long, global = true, env = "QRGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Apply pending database migrations
    Migrate,

    /// Register a new free-plan account and print its API key
    Register,

    /// Move an account to a different plan
    SetPlan {
        /// API key of the account
        api_key: String,

        /// Target plan (free, starter, pro, business)
        tier: PlanTier,
    },

    /// Load and validate configuration, then print a summary
    CheckConfig,
}
