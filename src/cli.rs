//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// Linkscope - URL shortener with click analytics
#[derive(Parser, Debug)]
#[command(name = "linkscope")]
#[command(version)]
#[command(about = "URL shortener with click analytics", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Write a sample configuration file
    GenerateConfig {
        /// Output path, `-` for stdout
        #[arg(long, short = 'o', default_value = DEFAULT_CONFIG_PATH)]
        output: String,
    },
}
