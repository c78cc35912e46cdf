//! Deterministic record/replay harness for outbound HTTP in integration tests.
//!
//! A [`Harness`] gives each test its own [`Client`]. Depending on the mode
//! resolved from `VCR_MODE` and `VCR_PATH`, the client's transport either
//! goes straight to the network, records every exchange into a per-test
//! cassette, or serves the recorded exchanges back without any network I/O.
//! Random test inputs stay reproducible through a per-test seed that is
//! persisted next to the cassette.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod harness;
pub mod mode;
pub mod ports;
pub mod random;

pub use client::{Client, RetryPolicy};
pub use config::VcrConfig;
pub use error::{BoxError, Result, VcrError};
pub use harness::{Harness, TestContext, TestState};
pub use mode::Mode;
pub use random::RandomSource;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> std::result::Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
