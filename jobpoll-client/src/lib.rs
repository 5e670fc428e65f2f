//! Jobpoll Client
//!
//! Submits jobs to an asynchronous job server and polls them to completion.
//!
//! A job server accepts a submission on `POST {base_url}{execute_route}`,
//! answers with `{"status": "created", "location": ...}` and then reports
//! progress on `GET {location}` until the job succeeds or fails. A
//! [`JobSession`] drives that conversation, reporting every recognized
//! transition to a [`StatusSink`] and handing the final result to the
//! application's [`JobHandler`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jobpoll_client::{ClientConfig, HttpTransport, JobHandler, JobRequest, JobSession};
//!
//! struct Greeting;
//!
//! impl JobHandler for Greeting {
//!     fn generate_request(&self, request: &mut JobRequest) -> Option<String> {
//!         request.set_header("Content-Type", "application/json");
//!         Some(r#"{"msg": "hello"}"#.to_string())
//!     }
//!
//!     fn consume_success(&mut self, location: &str, keys: &[String]) {
//!         println!("{} produced {:?}", location, keys);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = HttpTransport::with_origin("http://localhost:8000")?;
//!     let mut session = JobSession::new(ClientConfig::default(), Greeting, Arc::new(transport));
//!
//!     let outcome = session.execute().await;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod delay;
pub mod error;
pub mod handler;
pub mod session;
pub mod sink;
pub mod transport;

// Re-export commonly used types
pub use config::{ClientConfig, ClientOptions};
pub use delay::{Delay, TokioDelay};
pub use error::{ClientError, Result};
pub use handler::JobHandler;
pub use session::{INVALID_JSON_MESSAGE, JobOutcome, JobSession, SessionState};
pub use sink::{RecordingSink, StatusSink, TracingSink};
pub use transport::{HttpTransport, Transport, TransportResponse};

pub use jobpoll_core::domain::request::{JobRequest, Method};
pub use jobpoll_core::domain::status::{StatusReport, StatusState};
pub use tokio_util::sync::CancellationToken;
