//! Status sinks
//!
//! Every recognized transition of a session is reported as a
//! `(state, message)` pair to a [`StatusSink`]. Sessions own their sink;
//! there is no process-wide default.

use jobpoll_core::domain::status::{StatusReport, StatusState};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info};

/// Observer for session status reports
pub trait StatusSink: Send + Sync {
    /// Receives one report
    ///
    /// `message` is `None` when the server supplied no error text.
    fn report_status(&self, state: StatusState, message: Option<&str>);
}

/// Default sink: writes each report as a log line
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn report_status(&self, state: StatusState, message: Option<&str>) {
        let message = message.unwrap_or("<no message>");
        match state {
            StatusState::Status => info!("{}: {}", state, message),
            StatusState::Error => error!("{}: {}", state, message),
        }
    }
}

/// Sink that keeps every report in memory
///
/// Clones share the same buffer, so one handle can be given to a session
/// while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<StatusReport>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all reports received so far
    pub fn reports(&self) -> Vec<StatusReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the reports as owned `(state, message)` pairs
    pub fn pairs(&self) -> Vec<(StatusState, Option<String>)> {
        self.reports()
            .into_iter()
            .map(|report| {
                let (state, message) = report.as_pair();
                (state, message.map(str::to_string))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatusSink for RecordingSink {
    fn report_status(&self, state: StatusState, message: Option<&str>) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StatusReport::new(state, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_shares_buffer() {
        let sink = RecordingSink::new();
        let handle = sink.clone();

        sink.report_status(StatusState::Status, Some("job created"));
        sink.report_status(StatusState::Error, None);

        assert_eq!(handle.len(), 2);
        assert_eq!(
            handle.pairs(),
            vec![
                (StatusState::Status, Some("job created".to_string())),
                (StatusState::Error, None),
            ]
        );
    }

    #[test]
    fn test_tracing_sink_accepts_missing_message() {
        TracingSink.report_status(StatusState::Error, None);
        TracingSink.report_status(StatusState::Status, Some("job running"));
    }
}
