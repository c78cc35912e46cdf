//! Replays recorded interactions from a cassette.

use super::format::{Cassette, Interaction};
use super::matcher::matches;
use crate::error::{Result, VcrError};
use crate::ports::transport::HttpRequest;

/// Serves interactions from a loaded cassette.
///
/// Each interaction is handed out at most once, so a test that repeats an
/// identical request receives the recorded responses in their original order.
#[derive(Debug)]
pub struct CassetteReplayer {
    interactions: Vec<Interaction>,
    consumed: Vec<bool>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        let consumed = vec![false; cassette.interactions.len()];
        Self { interactions: cassette.interactions, consumed }
    }

    /// Return the first unconsumed interaction matching `request` and mark it consumed.
    ///
    /// # Errors
    ///
    /// Returns [`VcrError::InteractionNotFound`] if nothing left in the
    /// cassette matches.
    pub fn next_interaction(&mut self, request: &HttpRequest) -> Result<&Interaction> {
        let position = self
            .interactions
            .iter()
            .zip(&self.consumed)
            .position(|(interaction, used)| !used && matches(request, &interaction.request));

        let Some(index) = position else {
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                remaining = self.remaining(),
                "no matching interaction in cassette"
            );
            return Err(VcrError::InteractionNotFound {
                method: request.method.clone(),
                url: request.url.clone(),
            });
        };

        self.consumed[index] = true;
        Ok(&self.interactions[index])
    }

    /// Number of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.consumed.iter().filter(|used| !**used).count()
    }
}
