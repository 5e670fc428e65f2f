//! Status report domain types

use serde::{Deserialize, Serialize};

/// Kind of a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Status,
    Error,
}

impl StatusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusState::Status => "status",
            StatusState::Error => "error",
        }
    }
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded `(state, message)` report
///
/// `message` is absent when the server supplied no error text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub state: StatusState,
    pub message: Option<String>,
}

impl StatusReport {
    pub fn new(state: StatusState, message: Option<&str>) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            state,
            message: message.map(str::to_string),
        }
    }

    /// The report without its timestamp, for comparisons
    pub fn as_pair(&self) -> (StatusState, Option<&str>) {
        (self.state, self.message.as_deref())
    }
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.state, message),
            None => write!(f, "{}: <no message>", self.state),
        }
    }
}
