//! Error types for the record/replay harness.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by a test body run under the harness.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the harness and the transports it installs.
#[derive(Debug, Error)]
pub enum VcrError {
    /// The mode selector holds a value other than the two recognized ones.
    #[error("unsupported VCR_MODE value {0:?} (expected RECORD_ONLY or REPLAY_ONLY)")]
    UnsupportedMode(String),

    /// Replaying a test whose cassette file does not exist.
    #[error("cassette {name:?} not found at {}; re-record this test", .path.display())]
    CassetteNotFound {
        /// Normalized cassette name.
        name: String,
        /// Expected location of the cassette file.
        path: PathBuf,
    },

    /// The cassette file exists but cannot be decoded.
    #[error("failed to parse cassette {}: {source}", .path.display())]
    CassetteParse {
        /// Location of the cassette file.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// No unconsumed recorded interaction matches the live request.
    #[error("no matching interaction for {method} {url} in cassette; re-record this test")]
    InteractionNotFound {
        /// Method of the live request.
        method: String,
        /// URL of the live request.
        url: String,
    },

    /// Replaying a test whose seed file does not exist.
    #[error("seed file for test {test:?} not found at {}; re-record this test", .path.display())]
    SeedNotFound {
        /// Test identity.
        test: String,
        /// Expected location of the seed file.
        path: PathBuf,
    },

    /// The seed file does not hold a signed 64-bit decimal integer.
    #[error("seed file {} holds {content:?}, not an i64; re-record this test", .path.display())]
    SeedInvalid {
        /// Location of the seed file.
        path: PathBuf,
        /// Trimmed file contents.
        content: String,
    },

    /// Reading or writing a harness artifact failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Encoding a cassette for storage failed.
    #[error("failed to serialize cassette: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// The live network call failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request cannot be turned into a network call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The unit of work run under the harness returned an error.
    #[error("test failed: {0}")]
    Test(BoxError),
}

impl VcrError {
    /// Returns `true` if a retry policy may safely repeat the request.
    ///
    /// Only transient network failures qualify. Replay misses in particular
    /// are never retryable: the cassette is stale and looping would hide it.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, VcrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_not_found_is_not_retryable() {
        let err = VcrError::InteractionNotFound {
            method: "GET".into(),
            url: "https://example.com/".into(),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("no matching interaction"));
    }

    #[test]
    fn missing_artifacts_ask_for_rerecord() {
        let cassette =
            VcrError::CassetteNotFound { name: "a".into(), path: PathBuf::from("/t/a.cassette") };
        let seed = VcrError::SeedNotFound { test: "a".into(), path: PathBuf::from("/t/a.seed") };
        assert!(cassette.to_string().contains("re-record"));
        assert!(seed.to_string().contains("re-record"));
        assert!(!cassette.is_retryable());
        assert!(!seed.is_retryable());
    }

    #[test]
    fn unsupported_mode_names_value() {
        let err = VcrError::UnsupportedMode("RECORD".into());
        assert!(err.to_string().contains("\"RECORD\""));
    }
}
