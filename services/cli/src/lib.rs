//! Viral or Fail CLI Library Crate
//!
//! Startup configuration, command-line flags and the terminal front end for
//! the game. The `viral_or_fail.rs` binary wires these to the agents in
//! `viral-core`.

pub mod cli;
pub mod config;
pub mod terminal;
