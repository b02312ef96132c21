//! Server core functionality
//!
//! This module contains the HTTP server and its configuration.

pub mod config;
pub mod core;

pub use config::ServerConfig;
pub use core::Server;
