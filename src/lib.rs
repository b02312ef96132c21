pub mod api;
pub mod cli;
pub mod error;
pub mod middleware;
pub mod server;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use server::Server;
