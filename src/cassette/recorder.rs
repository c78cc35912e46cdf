//! Records interactions into a cassette file.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::format::{Cassette, Interaction, RecordedRequest, RecordedResponse};
use super::redact::redact;
use crate::error::{Result, VcrError};
use crate::ports::transport::{HttpRequest, HttpResponse};

/// Accumulates interactions in memory and writes them as a YAML cassette.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), interactions: Vec::new(), next_seq: 0 }
    }

    /// Record an interaction. Credentials are redacted and `seq` is assigned automatically.
    pub fn record(&mut self, request: &HttpRequest, response: &HttpResponse) {
        let interaction = redact(Interaction {
            seq: self.next_seq,
            request: RecordedRequest::from(request),
            response: RecordedResponse::from(response),
        });
        self.next_seq += 1;
        self.interactions.push(interaction);
    }

    /// Interactions recorded so far, in order.
    #[must_use]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Location the cassette is written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every recorded interaction to disk, replacing any earlier file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be encoded or written.
    pub fn flush(&self) -> Result<PathBuf> {
        let cassette = Cassette {
            name: self.name.clone(),
            recorded_at: Utc::now(),
            interactions: self.interactions.clone(),
        };
        let yaml = serde_yaml::to_string(&cassette)?;
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| VcrError::io(dir, e))?;
        }
        std::fs::write(&self.path, yaml).map_err(|e| VcrError::io(&self.path, e))?;
        tracing::info!(
            cassette = %self.name,
            path = %self.path.display(),
            interactions = self.interactions.len(),
            "wrote cassette"
        );
        Ok(self.path.clone())
    }
}
