//! Operator tooling for the clustered cache subsystem
//!
//! Backs the `ispn-compat` binary: configuration, logging and the
//! `versions`, `transform`, `check` and `plan` commands.

#![warn(unreachable_pub)]

pub mod commands;
pub mod config;
mod logger;

pub use commands::{read_tree, resolve_target, Compat};
pub use config::{CompatConfig, LogFormat, CONFIG_FILE};
pub use logger::{init_logger, LOG_ENV};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
