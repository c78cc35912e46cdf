//! Locates, loads and creates per-test cassettes and seed files.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::recorder::CassetteRecorder;
use super::replayer::CassetteReplayer;
use crate::error::{Result, VcrError};
use crate::mode::Mode;

/// File extension of cassette files.
pub const CASSETTE_EXTENSION: &str = "cassette";
/// File extension of seed files.
pub const SEED_EXTENSION: &str = "seed";

/// A cassette opened for one test.
#[derive(Debug)]
pub enum OpenCassette {
    /// Empty cassette that will be flushed at teardown.
    Recording(CassetteRecorder),
    /// Read-only cassette loaded from storage.
    Replaying(CassetteReplayer),
}

/// Makes a test identity safe to use as a file name.
///
/// Path separators become underscores, so `Suite/CaseA` maps to `Suite_CaseA`.
#[must_use]
pub fn normalize_name(test: &str) -> String {
    test.replace(['/', '\\'], "_")
}

/// Directory holding one cassette file and one seed file per test.
#[derive(Debug, Clone)]
pub struct CassetteStore {
    dir: PathBuf,
}

impl CassetteStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cassette file for a test.
    #[must_use]
    pub fn cassette_path(&self, test: &str) -> PathBuf {
        self.dir.join(format!("{}.{CASSETTE_EXTENSION}", normalize_name(test)))
    }

    /// Seed file for a test.
    #[must_use]
    pub fn seed_path(&self, test: &str) -> PathBuf {
        self.dir.join(format!("{}.{SEED_EXTENSION}", normalize_name(test)))
    }

    /// Opens the cassette for `test` in the given mode.
    ///
    /// Recording creates an empty cassette without touching storage.
    /// Replaying loads the cassette file. Disabled mode has no cassette.
    ///
    /// # Errors
    ///
    /// Returns [`VcrError::CassetteNotFound`] when replaying a test that was
    /// never recorded, or a parse/I/O error for an unreadable file.
    pub fn open(&self, test: &str, mode: Mode) -> Result<Option<OpenCassette>> {
        match mode {
            Mode::Disabled => Ok(None),
            Mode::Recording => Ok(Some(OpenCassette::Recording(CassetteRecorder::new(
                self.cassette_path(test),
                normalize_name(test),
            )))),
            Mode::Replaying => {
                let cassette = self.load(test)?;
                Ok(Some(OpenCassette::Replaying(CassetteReplayer::new(cassette))))
            }
        }
    }

    /// Loads and parses the cassette recorded for `test`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn load(&self, test: &str) -> Result<Cassette> {
        load_cassette_file(&self.cassette_path(test), &normalize_name(test))
    }
}

/// Loads a cassette file from an explicit path.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable or malformed.
pub fn load_cassette_file(path: &Path, name: &str) -> Result<Cassette> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VcrError::CassetteNotFound {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(VcrError::io(path, e)),
    };
    serde_yaml::from_str(&content)
        .map_err(|source| VcrError::CassetteParse { path: path.to_path_buf(), source })
}
