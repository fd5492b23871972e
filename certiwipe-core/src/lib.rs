//! 🧹 certiwipe core library.
//!
//! `certiwipe-core` holds the wipe workflow, the JSON audit log and the pieces the binary
//! wires together (CLI, config, logging, confirmation prompts, Ctrl+C handling).

pub mod audit_log;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod device;
pub mod errors;
pub mod fastboot;
pub mod logging;
pub mod summary;
pub mod wipe;
