//! sbomfetch command-line front end
//!
//! Wires the resolver, download engine and extractor together and renders
//! their summaries. Handlers return report values; `main` only parses
//! arguments, loads configuration and maps errors to exit codes.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
