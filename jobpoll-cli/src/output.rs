//! Terminal output
//!
//! Prints session status reports and results with colors.

use colored::*;
use jobpoll_client::StatusSink;
use jobpoll_core::domain::status::{StatusReport, StatusState};

/// Status sink printing each report on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn report_status(&self, state: StatusState, message: Option<&str>) {
        print_report(&StatusReport::new(state, message));
    }
}

/// Print one status report
pub fn print_report(report: &StatusReport) {
    let message = match &report.message {
        Some(message) => message.normal(),
        None => "<no message>".dimmed(),
    };

    println!(
        "{} {}: {}",
        report.timestamp.format("%H:%M:%S").to_string().dimmed(),
        colorize_state(report.state),
        message
    );
}

/// Print the result keys of a finished job
pub fn print_results(location: &str, keys: &[String]) {
    println!(
        "{}",
        format!("Job {} produced {} result(s):", location, keys.len()).bold()
    );
    for key in keys {
        println!("  {} {}", "▸".cyan(), key);
    }
}

/// Colorize a report state for display
fn colorize_state(state: StatusState) -> ColoredString {
    match state {
        StatusState::Status => state.as_str().green(),
        StatusState::Error => state.as_str().red(),
    }
}
