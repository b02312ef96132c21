//! Utility functions
//!
//! Provides logging setup and network address discovery.

pub mod logging;
pub mod network;
