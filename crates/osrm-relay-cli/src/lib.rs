//! OSRM relay CLI library.
//!
//! Subcommand handlers, output formatting and terminal styling for the
//! `osrm-relay-cli` binary.

pub mod commands;
pub mod output;
pub mod terminal;
