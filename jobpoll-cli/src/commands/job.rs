//! Job command handlers
//!
//! Submits jobs, resumes polling of existing job handles and downloads
//! results.

use anyhow::{Context, Result, bail};
use colored::*;
use jobpoll_client::{ClientError, HttpTransport, JobHandler, JobOutcome, JobRequest, JobSession};
use reqwest::header::{HeaderName, HeaderValue};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::Config;
use crate::output::{ConsoleSink, print_results};

/// Encoded submission body with its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    content_type: &'static str,
    body: String,
}

impl Payload {
    /// A body that has already been checked to be JSON
    pub fn json(body: String) -> Self {
        Self {
            content_type: "application/json",
            body,
        }
    }

    /// Form fields, URL-encoded in the given order
    pub fn form(fields: &[(String, String)]) -> Result<Self> {
        let body = serde_urlencoded::to_string(fields).context("Failed to encode form fields")?;
        Ok(Self {
            content_type: "application/x-www-form-urlencoded",
            body,
        })
    }
}

/// Concrete client used by the CLI
///
/// Sends the `--data` or `--form` payload and remembers the results of the
/// job.
pub struct CliHandler {
    payload: Option<Payload>,
    headers: Vec<(String, String)>,
    result: Option<(String, Vec<String>)>,
}

impl CliHandler {
    pub fn new(payload: Option<Payload>, headers: Vec<(String, String)>) -> Self {
        Self {
            payload,
            headers,
            result: None,
        }
    }
}

impl JobHandler for CliHandler {
    fn generate_request(&self, request: &mut JobRequest) -> Option<String> {
        if let Some(payload) = &self.payload {
            request.set_header("Content-Type", payload.content_type);
        }
        for (name, value) in &self.headers {
            request.set_header(name.as_str(), value.as_str());
        }
        self.payload.as_ref().map(|payload| payload.body.clone())
    }

    fn consume_success(&mut self, location: &str, keys: &[String]) {
        print_results(location, keys);
        self.result = Some((location.to_string(), keys.to_vec()));
    }
}

/// How a session is started
enum Start {
    Execute,
    Poll(String),
}

/// Submit a job and follow it
///
/// `data` is sent as JSON; otherwise `form` is sent URL-encoded.
pub async fn submit(
    config: &Config,
    data: Option<String>,
    form: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    output: Option<PathBuf>,
) -> Result<()> {
    let payload = match data {
        Some(data) => Payload::json(data),
        None => Payload::form(&form)?,
    };
    let handler = CliHandler::new(Some(payload), headers);
    run(config, handler, Start::Execute, output).await
}

/// Resume polling an existing job handle
pub async fn poll(config: &Config, location: String, output: Option<PathBuf>) -> Result<()> {
    let handler = CliHandler::new(None, Vec::new());
    run(config, handler, Start::Poll(location), output).await
}

/// Download one result
pub async fn fetch(
    config: &Config,
    location: &str,
    key: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let transport = config.transport()?;
    let bytes = fetch_result(&transport, location, key).await?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} {} ({} bytes)",
                "Saved".green(),
                path.display(),
                bytes.len()
            );
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&bytes).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

async fn run(
    config: &Config,
    handler: CliHandler,
    start: Start,
    output: Option<PathBuf>,
) -> Result<()> {
    let transport = Arc::new(config.transport()?);
    let mut session = JobSession::new(config.client_config(), handler, transport.clone())
        .with_sink(Arc::new(ConsoleSink));

    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping");
            cancel.cancel();
        }
    });

    let outcome = match start {
        Start::Execute => session.execute().await,
        Start::Poll(location) => session.poll(&location).await,
    };
    debug!("Session outcome: {:?}", outcome);

    match outcome {
        JobOutcome::Succeeded { .. } => {}
        JobOutcome::Failed { message } => bail!(
            "Job failed: {}",
            message.as_deref().unwrap_or("server gave no reason")
        ),
        JobOutcome::Stalled => {
            bail!("Server answered with an unrecognized status, polling stopped")
        }
        JobOutcome::Aborted => bail!("Server did not return valid JSON"),
        JobOutcome::Cancelled => bail!("Cancelled"),
    }

    if let (Some(dir), Some((location, keys))) = (output, session.into_handler().result) {
        download_results(&transport, &location, &keys, &dir).await?;
    }

    Ok(())
}

/// Download every result of a job into `dir`
async fn download_results(
    transport: &HttpTransport,
    location: &str,
    keys: &[String],
    dir: &Path,
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for key in keys {
        let path = dir.join(result_file_name(key)?);
        let bytes = fetch_result(transport, location, key).await?;
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {} {}", "✓".green(), path.display());
    }

    Ok(())
}

async fn fetch_result(transport: &HttpTransport, location: &str, key: &str) -> Result<Vec<u8>> {
    match transport.fetch_result(location, key).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.is_not_found() => bail!("No result '{}' for job {}", key, location),
        Err(e @ ClientError::ApiError { .. }) => Err(e.into()),
        Err(e) => Err(e).with_context(|| format!("Failed to fetch result '{}'", key)),
    }
}

/// Result keys become file names; anything that is not a plain name is rejected
fn result_file_name(key: &str) -> Result<&str> {
    match Path::new(key).file_name().and_then(|name| name.to_str()) {
        Some(name) if name == key => Ok(name),
        _ => bail!("Refusing to write result with unsafe name '{}'", key),
    }
}

/// Value parser for `--data`
pub fn parse_json(s: &str) -> std::result::Result<String, String> {
    serde_json::from_str::<serde_json::Value>(s)
        .map(|_| s.to_string())
        .map_err(|e| format!("not valid JSON: {}", e))
}

/// Value parser for `--header`
///
/// Rejects names and values that could not go on the wire.
pub fn parse_header(s: &str) -> std::result::Result<(String, String), String> {
    let Some((name, value)) = s.split_once(':') else {
        return Err(format!("expected \"Name: value\", got \"{}\"", s));
    };
    let (name, value) = (name.trim(), value.trim());

    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| format!("invalid header name \"{}\"", name))?;
    HeaderValue::from_str(value).map_err(|_| format!("invalid value for header \"{}\"", name))?;

    Ok((name.to_string(), value.to_string()))
}

/// Value parser for `--form`
pub fn parse_form_field(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected \"name=value\", got \"{}\"", s)),
    }
}
