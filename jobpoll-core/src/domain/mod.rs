//! Core domain types
//!
//! These types describe the conversation between a client and a job server:
//! the request sent for each cycle, the classified response, and the status
//! reports emitted for every recognized transition.

pub mod request;
pub mod response;
pub mod status;
