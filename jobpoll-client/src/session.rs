//! Job session
//!
//! A [`JobSession`] submits one job and polls its handle until the job
//! reaches a terminal state:
//!
//! ```text
//! Idle -> Submitting -> Polling -> Succeeded | Failed | Stalled
//!                    \-> Failed
//! ```
//!
//! Poll cycles run one after another inside a single task. Each cycle waits
//! for the configured interval, issues one `GET` against the job handle and
//! classifies the reply before anything else is scheduled. Every recognized
//! transition is reported to the session's [`StatusSink`].

use jobpoll_core::domain::request::{JobRequest, Method};
use jobpoll_core::domain::response::ServerResponse;
use jobpoll_core::domain::status::StatusState;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::delay::{Delay, TokioDelay};
use crate::handler::JobHandler;
use crate::sink::{StatusSink, TracingSink};
use crate::transport::Transport;

/// Message reported when a response body cannot be parsed
pub const INVALID_JSON_MESSAGE: &str = "server did not return valid JSON";

/// Lifecycle state of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
    Polling { location: String },
    Succeeded,
    Failed,
    /// The server answered a poll with nothing recognizable
    Stalled,
    /// A response could not be parsed; nothing further was scheduled
    Aborted,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            SessionState::Idle | SessionState::Submitting | SessionState::Polling { .. }
        )
    }
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded { location: String, keys: Vec<String> },
    Failed { message: Option<String> },
    Stalled,
    Aborted,
    Cancelled,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }
}

/// Result of one request cycle
enum Reply {
    Body(Value),
    Dropped,
    Cancelled,
}

/// Client session driving one job at a time
///
/// All operations take `&mut self`, so a session never has more than one
/// submission or polling loop in flight.
pub struct JobSession<H> {
    config: ClientConfig,
    handler: H,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn StatusSink>,
    delay: Arc<dyn Delay>,
    state: SessionState,
    cancel: CancellationToken,
}

impl<H: JobHandler> JobSession<H> {
    /// Creates a session reporting through [`TracingSink`] and sleeping with
    /// [`TokioDelay`]
    pub fn new(config: ClientConfig, handler: H, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            handler,
            transport,
            sink: Arc::new(TracingSink),
            delay: Arc::new(TokioDelay),
            state: SessionState::Idle,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the status sink
    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the delay used between poll cycles
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Job handle of the job being polled
    pub fn location(&self) -> Option<&str> {
        match &self.state {
            SessionState::Polling { location } => Some(location),
            _ => None,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Handle that stops the session from any task
    ///
    /// Cancelling interrupts an in-flight request or a pending delay; the
    /// running operation then returns [`JobOutcome::Cancelled`].
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Forwards one report to the sink
    pub fn report_status(&self, state: StatusState, message: Option<&str>) {
        self.sink.report_status(state, message);
    }

    /// Performs one request/response cycle
    ///
    /// `before` may add headers and returns the body to send. Returns the
    /// parsed body; when the request fails or the body is not JSON, reports
    /// [`INVALID_JSON_MESSAGE`] and returns `None`.
    pub async fn raw_request<F>(&self, method: Method, url: &str, before: F) -> Option<Value>
    where
        F: FnOnce(&mut JobRequest) -> Option<String>,
    {
        let mut request = JobRequest::new(method, url);
        request.body = before(&mut request);

        debug!("Sending {} {}", method, url);

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{} {} failed: {}", method, url, e);
                self.report_status(StatusState::Error, Some(INVALID_JSON_MESSAGE));
                return None;
            }
        };

        match serde_json::from_str(&response.body) {
            Ok(obj) => Some(obj),
            Err(e) => {
                debug!(
                    "{} {} returned status {} with a non-JSON body: {}",
                    method, url, response.status, e
                );
                self.report_status(StatusState::Error, Some(INVALID_JSON_MESSAGE));
                None
            }
        }
    }

    /// Submits the job and polls it to completion
    pub async fn execute(&mut self) -> JobOutcome {
        let execute_url = self.config.execute_url();
        self.state = SessionState::Submitting;
        info!("Submitting job to {}", execute_url);

        let handler = &self.handler;
        let reply = self
            .cycle(Method::Post, &execute_url, |request| {
                handler.generate_request(request)
            })
            .await;

        match reply {
            Reply::Body(obj) => self.response_job_created(&obj).await,
            Reply::Dropped => self.finish(SessionState::Aborted, JobOutcome::Aborted),
            Reply::Cancelled => self.finish(SessionState::Cancelled, JobOutcome::Cancelled),
        }
    }

    /// Handles the body returned by the execute endpoint
    ///
    /// Starts polling when the job was created; otherwise reports the
    /// server's error content, which may be absent.
    pub async fn response_job_created(&mut self, obj: &Value) -> JobOutcome {
        match ServerResponse::from_creation(obj) {
            ServerResponse::Created { location } => {
                self.report_status(StatusState::Status, Some("job created"));
                info!("Job created at {}", location);
                self.poll(&location).await
            }
            response => {
                let message = match response {
                    ServerResponse::Error { message } => message,
                    _ => None,
                };
                self.report_status(StatusState::Error, message.as_deref());
                self.finish(SessionState::Failed, JobOutcome::Failed { message })
            }
        }
    }

    /// Polls a job handle until a terminal response
    ///
    /// Each cycle waits the poll interval before its request, so the first
    /// request goes out one interval after this is called.
    pub async fn poll(&mut self, location: &str) -> JobOutcome {
        self.state = SessionState::Polling {
            location: location.to_string(),
        };

        let cancel = self.cancel.clone();
        let delay = Arc::clone(&self.delay);
        let interval = self.config.poll_interval();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return self.finish(SessionState::Cancelled, JobOutcome::Cancelled);
                }
                _ = delay.sleep(interval) => {}
            }

            let response = match self.cycle(Method::Get, location, |_| None).await {
                Reply::Body(obj) => ServerResponse::from_poll(&obj),
                Reply::Dropped => ServerResponse::Malformed,
                Reply::Cancelled => {
                    return self.finish(SessionState::Cancelled, JobOutcome::Cancelled);
                }
            };

            match response {
                ServerResponse::Running => {
                    self.report_status(StatusState::Status, Some("job running"));
                }
                ServerResponse::Success { keys } => {
                    self.report_status(StatusState::Status, Some("success"));
                    self.handler.consume_success(location, &keys);
                    let outcome = JobOutcome::Succeeded {
                        location: location.to_string(),
                        keys,
                    };
                    return self.finish(SessionState::Succeeded, outcome);
                }
                ServerResponse::Error { message } => {
                    self.report_status(StatusState::Error, message.as_deref());
                    return self.finish(SessionState::Failed, JobOutcome::Failed { message });
                }
                // Already reported by `raw_request`.
                ServerResponse::Malformed => {
                    return self.finish(SessionState::Aborted, JobOutcome::Aborted);
                }
                ServerResponse::Unrecognized | ServerResponse::Created { .. } => {
                    debug!("Unrecognized poll response from {}, polling stopped", location);
                    return self.finish(SessionState::Stalled, JobOutcome::Stalled);
                }
            }
        }
    }

    /// Runs `raw_request` unless the session is cancelled first
    async fn cycle<F>(&self, method: Method, url: &str, before: F) -> Reply
    where
        F: FnOnce(&mut JobRequest) -> Option<String>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Reply::Cancelled,
            obj = self.raw_request(method, url, before) => match obj {
                Some(obj) => Reply::Body(obj),
                None => Reply::Dropped,
            },
        }
    }

    fn finish(&mut self, state: SessionState, outcome: JobOutcome) -> JobOutcome {
        info!("Session finished: {:?}", outcome);
        self.state = state;
        outcome
    }
}
