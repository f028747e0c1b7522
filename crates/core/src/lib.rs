//! `trafficwatch-core` -- pure decision logic for the free-traffic monitor.
//!
//! Everything in this crate is I/O-free: the evaluator consumes usage
//! records plus the persisted debounce state and produces a declarative
//! action plan that the agent crate executes. Request-signing primitives
//! live here too so any future CLI tooling can reuse them.

pub mod error;
pub mod evaluate;
pub mod message;
pub mod signing;
pub mod state;
pub mod tier;
pub mod usage;
