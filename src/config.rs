//! Harness configuration read from the environment.

use std::path::PathBuf;

use crate::cassette::store::CassetteStore;
use crate::error::Result;
use crate::mode::{resolve_mode, Mode};
use crate::ports::env::EnvProvider;

/// Environment variable selecting the mode (`RECORD_ONLY` or `REPLAY_ONLY`).
pub const MODE_VAR: &str = "VCR_MODE";
/// Environment variable naming the cassette directory.
pub const PATH_VAR: &str = "VCR_PATH";

/// Raw configuration values. Empty variables count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcrConfig {
    /// Mode selector.
    pub mode: Option<String>,
    /// Cassette directory.
    pub path: Option<PathBuf>,
}

impl VcrConfig {
    /// Reads [`MODE_VAR`] and [`PATH_VAR`].
    pub fn from_env(env: &dyn EnvProvider) -> Self {
        let read = |key: &str| env.var(key).filter(|v| !v.is_empty());
        Self { mode: read(MODE_VAR), path: read(PATH_VAR).map(PathBuf::from) }
    }

    /// Resolves the operating mode.
    ///
    /// # Errors
    ///
    /// Returns an error for an unrecognized mode selector.
    pub fn resolve(&self) -> Result<Mode> {
        resolve_mode(self.mode.as_deref(), self.path.as_deref())
    }

    /// Cassette store for the configured directory.
    #[must_use]
    pub fn store(&self) -> Option<CassetteStore> {
        self.path.clone().map(CassetteStore::new)
    }
}
