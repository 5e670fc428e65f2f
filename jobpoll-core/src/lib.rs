//! Jobpoll Core
//!
//! Core types shared by the jobpoll client and command-line tool.
//!
//! This crate contains:
//! - Domain types: requests, server responses and status reports
//! - Classification of the JSON bodies returned by job servers

pub mod domain;
