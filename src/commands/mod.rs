//! Command dispatch and handlers.

pub mod mode;
pub mod seed;
pub mod show;

use crate::cli::Command;
use crate::ports::env::{EnvProvider, RealEnv};

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    dispatch_with_env(command, &RealEnv)
}

/// Dispatch a command, reading configuration through `env`.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_env(command: &Command, env: &dyn EnvProvider) -> Result<(), String> {
    let output = match command {
        Command::Mode => mode::run(env)?,
        Command::Show { cassette } => show::run(cassette)?,
        Command::Seed { test } => seed::run(env, test)?,
    };
    print!("{output}");
    Ok(())
}
