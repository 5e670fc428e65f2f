//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a job and poll it until it finishes
    Submit {
        /// JSON body sent to the execute route
        #[arg(
            short,
            long,
            value_parser = job::parse_json,
            conflicts_with = "form",
            required_unless_present = "form"
        )]
        data: Option<String>,

        /// Form field sent URL-encoded, as name=value (repeatable)
        #[arg(short = 'F', long = "form", value_parser = job::parse_form_field)]
        form: Vec<(String, String)>,

        /// Extra request header, as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header", value_parser = job::parse_header)]
        headers: Vec<(String, String)>,

        /// Download every result into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resume polling a job handle returned by an earlier submission
    Poll {
        /// Job location, e.g. /poll/<id>
        location: String,

        /// Download every result into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Download a single result of a finished job
    Fetch {
        /// Job location, e.g. /poll/<id>
        location: String,

        /// Result key
        key: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Submit {
            data,
            form,
            headers,
            output,
        } => job::submit(config, data, form, headers, output).await,
        Commands::Poll { location, output } => job::poll(config, location, output).await,
        Commands::Fetch {
            location,
            key,
            output,
        } => job::fetch(config, &location, &key, output).await,
    }
}
