//! Jobpoll CLI
//!
//! Command-line interface for submitting jobs to a job server and following
//! them to completion.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use jobpoll_client::ClientOptions;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "jobpoll_cli=info,jobpoll_client=warn";

#[derive(Parser)]
#[command(name = "jobpoll")]
#[command(about = "Submit jobs to a job server and poll them to completion", long_about = None)]
struct Cli {
    /// Job server origin, relative URLs are resolved against it
    #[arg(long, env = "JOBPOLL_SERVER", default_value = "http://localhost:8000")]
    server: String,

    /// Prefix of the execute route (default "/")
    #[arg(long, env = "JOBPOLL_BASE_URL")]
    base_url: Option<String>,

    /// Execute route appended to the base URL (default "execute")
    #[arg(long, env = "JOBPOLL_EXECUTE_ROUTE")]
    execute_route: Option<String>,

    /// Poll route (accepted for compatibility, jobs are polled at their location)
    #[arg(long, env = "JOBPOLL_POLL_ROUTE")]
    poll_route: Option<String>,

    /// Delay before each poll, in milliseconds (default 100)
    #[arg(long, env = "JOBPOLL_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "JOBPOLL_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            server: self.server.clone(),
            options: ClientOptions {
                base_url: self.base_url.clone(),
                poll_interval: self.poll_interval_ms.map(Duration::from_millis),
                execute_route: self.execute_route.clone(),
                poll_route: self.poll_route.clone(),
            },
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Status reports go to stdout; diagnostics stay on stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_options_map_to_config() {
        let cli = Cli::try_parse_from([
            "jobpoll",
            "--server",
            "http://jobs.internal:9000",
            "--base-url",
            "/api/",
            "--poll-interval-ms",
            "250",
            "--timeout-secs",
            "30",
            "fetch",
            "/poll/1",
            "out",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.server, "http://jobs.internal:9000");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));

        let client = config.client_config();
        assert_eq!(client.execute_url(), "/api/execute");
        assert_eq!(client.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_submit_requires_data_or_form() {
        assert!(Cli::try_parse_from(["jobpoll", "submit"]).is_err());
        assert!(
            Cli::try_parse_from(["jobpoll", "submit", "--data", "{}", "--form", "a=1"]).is_err()
        );
    }

    #[test]
    fn test_submit_accepts_form_fields() {
        let cli = Cli::try_parse_from([
            "jobpoll", "submit", "-F", "timeout=0.1", "-F", "msg=hello",
        ])
        .unwrap();

        match cli.command {
            Commands::Submit { data, form, .. } => {
                assert_eq!(data, None);
                assert_eq!(
                    form,
                    vec![
                        ("timeout".to_string(), "0.1".to_string()),
                        ("msg".to_string(), "hello".to_string()),
                    ]
                );
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_submit_rejects_invalid_header() {
        assert!(
            Cli::try_parse_from(["jobpoll", "submit", "--data", "{}", "-H", "X Bad: 1"]).is_err()
        );
    }
}
