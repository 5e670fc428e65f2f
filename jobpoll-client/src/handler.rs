//! Job handler capabilities
//!
//! A session only knows how to drive the submit/poll protocol. What to send
//! and what to do with the results is supplied by a [`JobHandler`].

use jobpoll_core::domain::request::JobRequest;

/// Capabilities every concrete client must provide
///
/// Both methods are required; a handler that leaves one out does not
/// compile:
///
/// ```compile_fail
/// use jobpoll_client::{JobHandler, JobRequest};
///
/// struct Incomplete;
///
/// impl JobHandler for Incomplete {
///     fn generate_request(&self, _request: &mut JobRequest) -> Option<String> {
///         None
///     }
/// }
/// ```
pub trait JobHandler: Send + Sync {
    /// Prepares the submission request
    ///
    /// Called once per `execute` with the `POST` request already targeted at
    /// the execute URL. Implementations add headers as needed and return the
    /// body to send.
    fn generate_request(&self, request: &mut JobRequest) -> Option<String>;

    /// Consumes the final result of a successful job
    ///
    /// Called exactly once per successful job with the job handle and the
    /// result keys in server order.
    fn consume_success(&mut self, location: &str, keys: &[String]);
}
