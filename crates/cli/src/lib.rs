//! ocipower CLI
//!
//! Submits power actions (reset, start, stop, ...) for compute instances
//! using the provider credentials in the local config file.

pub mod client;
pub mod commands;
pub mod invoker;
pub mod output;
