//! ConsentUI CLI - run consent flows from a terminal
//!
//! # Commands
//! - `consentui region [--region CC] [--config FILE]` - Show the resolved region and whether consent is required
//! - `consentui eea` - List the EEA region codes
//! - `consentui request [--if-needed] ...` - Run a consent flow with a terminal dialog
//! - `consentui schematic` - Print the consent flow schematic as JSON

mod region;
mod request;
mod settings;
mod terminal;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ConsentUI CLI
#[derive(Parser)]
#[command(name = "consentui")]
#[command(author, version, about = "Run GDPR consent flows from the terminal")]
struct Cli {
    /// Log output format (filter with RUST_LOG)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved region and whether consent is required
    Region {
        /// Region code to use instead of the locale or config file (e.g. DE)
        #[arg(short, long)]
        region: Option<String>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the region codes that require consent
    Eea,

    /// Run a consent flow with a y/n terminal dialog
    Request {
        /// Only show the dialog when consent is required
        #[arg(long)]
        if_needed: bool,

        /// Region code to use instead of the locale or config file
        #[arg(short, long)]
        region: Option<String>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host identifier for duplicate-dialog suppression
        #[arg(long, default_value = "terminal")]
        host: String,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the consent flow schematic as JSON
    Schematic,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.log_format {
        LogFormat::Plain => consentui_observe::init_fmt_tracing(),
        LogFormat::Json => consentui_observe::init_json_tracing(),
    }

    match cli.command {
        Commands::Region { region, config } => {
            region::run_region_command(config.as_deref(), region.as_deref())
        }
        Commands::Eea => {
            region::run_eea_command();
            Ok(())
        }
        Commands::Request {
            if_needed,
            region,
            config,
            host,
            json,
        } => {
            let options = request::RequestOptions {
                if_needed,
                region,
                config,
                host,
                json,
            };
            request::run_request_command(options).await
        }
        Commands::Schematic => run_schematic_command(),
    }
}

fn run_schematic_command() -> Result<()> {
    let controller = request::controller(consentui_core::ConsentConfig::default());
    let json = controller
        .schematic()
        .to_json_pretty()
        .context("Failed to serialize schematic")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_request_flags_parse() {
        let cli = Cli::parse_from([
            "consentui",
            "request",
            "--if-needed",
            "--region",
            "de",
            "--json",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Request {
                if_needed,
                region,
                host,
                json,
                config,
            } => {
                assert!(if_needed);
                assert!(json);
                assert_eq!(region.as_deref(), Some("de"));
                assert_eq!(host, "terminal");
                assert!(config.is_none());
            }
            _ => panic!("expected request"),
        }
    }
}
