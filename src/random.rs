//! Seeded randomness that survives the trip from recording to replay.
//!
//! A test that names its resources randomly would send different requests
//! on every run and never match its cassette. Each test therefore draws from
//! a source seeded per test identity: a fresh seed while recording, the
//! persisted one while replaying.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cassette::store::CassetteStore;
use crate::error::{Result, VcrError};
use crate::mode::Mode;

/// Prefix for randomly named test resources.
pub const RESOURCE_PREFIX: &str = "tf-acc-test";

/// Lower-case letters and digits.
pub const CHARSET_ALPHA_NUM: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// A pseudo-random source, optionally pinned to a seed.
#[derive(Debug)]
pub struct RandomSource {
    rng: Mutex<StdRng>,
    seed: Option<i64>,
}

impl RandomSource {
    /// A reproducible source: the same seed yields the same sequence.
    #[must_use]
    pub fn seeded(seed: i64) -> Self {
        let state = u64::from_le_bytes(seed.to_le_bytes());
        Self { rng: Mutex::new(StdRng::seed_from_u64(state)), seed: Some(seed) }
    }

    /// A non-reproducible source seeded from system entropy.
    #[must_use]
    pub fn unseeded() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()), seed: None }
    }

    /// Seed of a reproducible source.
    #[must_use]
    pub fn seed(&self) -> Option<i64> {
        self.seed
    }

    /// Any `i64`.
    pub fn next_i64(&self) -> i64 {
        self.rng.lock().gen()
    }

    /// A non-negative integer.
    pub fn rand_int(&self) -> i64 {
        self.rng.lock().gen_range(0..=i64::MAX)
    }

    /// An integer in `[min, max)`; `min` when the range is empty.
    pub fn rand_int_range(&self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.lock().gen_range(min..max)
    }

    /// `len` characters drawn from [`CHARSET_ALPHA_NUM`].
    pub fn rand_string(&self, len: usize) -> String {
        self.rand_string_from_charset(len, CHARSET_ALPHA_NUM)
    }

    /// `len` characters drawn from `charset`; empty when `charset` is.
    pub fn rand_string_from_charset(&self, len: usize, charset: &str) -> String {
        let chars: Vec<char> = charset.chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        let mut rng = self.rng.lock();
        (0..len).map(|_| chars[rng.gen_range(0..chars.len())]).collect()
    }

    /// `"<prefix>-<random digits>"`, for naming test resources.
    pub fn random_with_prefix(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.rand_int())
    }

    /// A name under [`RESOURCE_PREFIX`].
    pub fn resource_name(&self) -> String {
        self.random_with_prefix(RESOURCE_PREFIX)
    }
}

/// Parses seed file contents: decimal text, optionally NUL-padded.
///
/// # Errors
///
/// Returns [`VcrError::SeedInvalid`] if the contents are not an `i64`.
pub fn parse_seed(bytes: &[u8], path: &std::path::Path) -> Result<i64> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    trimmed.parse().map_err(|_| VcrError::SeedInvalid {
        path: path.to_path_buf(),
        content: trimmed.to_string(),
    })
}

/// Per-test cache of randomness sources.
pub struct RandomnessManager {
    mode: Mode,
    store: Option<CassetteStore>,
    sources: RwLock<HashMap<String, Arc<RandomSource>>>,
}

impl RandomnessManager {
    /// Creates a manager. `store` is required unless `mode` is disabled.
    #[must_use]
    pub fn new(mode: Mode, store: Option<CassetteStore>) -> Self {
        Self { mode, store, sources: RwLock::new(HashMap::new()) }
    }

    /// Returns the source for `test`, creating it on first use.
    ///
    /// Recording seeds it freshly and keeps the seed in memory until
    /// [`persist_seed`](Self::persist_seed). Replaying reads the seed file.
    /// Disabled mode returns an uncached, unseeded source.
    ///
    /// # Errors
    ///
    /// Returns [`VcrError::SeedNotFound`] or [`VcrError::SeedInvalid`] when
    /// replaying without a usable seed file.
    pub fn source_for(&self, test: &str) -> Result<Arc<RandomSource>> {
        let store = match (self.mode, &self.store) {
            (Mode::Disabled, _) | (_, None) => return Ok(Arc::new(RandomSource::unseeded())),
            (_, Some(store)) => store,
        };

        if let Some(source) = self.sources.read().get(test) {
            return Ok(Arc::clone(source));
        }

        let seed = match self.mode {
            Mode::Replaying => read_seed(store, test)?,
            _ => rand::random::<i64>(),
        };

        let mut sources = self.sources.write();
        let source = sources
            .entry(test.to_string())
            .or_insert_with(|| {
                tracing::debug!(test, seed, mode = %self.mode, "seeded randomness source");
                Arc::new(RandomSource::seeded(seed))
            });
        Ok(Arc::clone(source))
    }

    /// Writes the seed of `test`'s source to its seed file.
    ///
    /// Returns `None` when the test never drew from a seeded source.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the seed file cannot be written.
    pub fn persist_seed(&self, test: &str) -> Result<Option<PathBuf>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let Some(seed) = self.sources.read().get(test).and_then(|source| source.seed()) else {
            return Ok(None);
        };

        let path = store.seed_path(test);
        std::fs::create_dir_all(store.dir()).map_err(|e| VcrError::io(store.dir(), e))?;
        std::fs::write(&path, seed.to_string()).map_err(|e| VcrError::io(&path, e))?;
        tracing::info!(test, path = %path.display(), "wrote seed file");
        Ok(Some(path))
    }

    /// Drops the cached source for `test`.
    pub fn remove(&self, test: &str) {
        self.sources.write().remove(test);
    }

    /// Returns `true` if a source is cached for `test`.
    #[must_use]
    pub fn contains(&self, test: &str) -> bool {
        self.sources.read().contains_key(test)
    }
}

fn read_seed(store: &CassetteStore, test: &str) -> Result<i64> {
    let path = store.seed_path(test);
    match std::fs::read(&path) {
        Ok(bytes) => parse_seed(&bytes, &path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VcrError::SeedNotFound { test: test.to_string(), path })
        }
        Err(e) => Err(VcrError::io(&path, e)),
    }
}
