//! `trafficwatch-agent` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod billing;
pub mod config;
pub mod executor;
pub mod shutdown;
pub mod state;
pub mod telegram;
