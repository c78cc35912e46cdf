//! Operating mode resolution.

use std::fmt;
use std::path::Path;

use crate::error::{Result, VcrError};

/// Mode selector value that turns on recording.
pub const RECORD_ONLY: &str = "RECORD_ONLY";
/// Mode selector value that turns on replaying.
pub const REPLAY_ONLY: &str = "REPLAY_ONLY";

/// How the harness treats outbound HTTP traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Traffic passes straight through; nothing is recorded or replayed.
    Disabled,
    /// Traffic hits the network and every interaction is captured.
    Recording,
    /// Traffic is served from a cassette; the network is never touched.
    Replaying,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disabled => "disabled",
            Self::Recording => "recording",
            Self::Replaying => "replaying",
        };
        f.write_str(name)
    }
}

/// Resolve the harness mode from the mode selector and the storage path.
///
/// An unset storage path disables the harness no matter what the selector
/// says. With a path set, an unset or empty selector also disables it.
///
/// # Errors
///
/// Returns [`VcrError::UnsupportedMode`] for any other non-empty selector.
pub fn resolve_mode(mode: Option<&str>, path: Option<&Path>) -> Result<Mode> {
    if path.is_none() {
        return Ok(Mode::Disabled);
    }
    match mode {
        None | Some("") => Ok(Mode::Disabled),
        Some(RECORD_ONLY) => Ok(Mode::Recording),
        Some(REPLAY_ONLY) => Ok(Mode::Replaying),
        Some(other) => Err(VcrError::UnsupportedMode(other.to_string())),
    }
}
