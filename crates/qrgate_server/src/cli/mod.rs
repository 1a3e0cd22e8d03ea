//! Command-line interface for the qrgate binary.

mod admin;
mod commands;
mod serve;

pub use admin::{check_config, migrate, register, set_plan};
pub use commands::{Cli, Commands};
pub use serve::serve;
