//! Replaying adapter for the `HttpTransport` port.

use parking_lot::Mutex;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::transport::{HttpRequest, HttpTransport, TransportFuture};

/// Serves recorded responses from a cassette without touching the network.
pub struct ReplayingTransport {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTransport {
    /// Create a replaying transport backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    /// Number of recorded interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replayer.lock().remaining()
    }
}

impl HttpTransport for ReplayingTransport {
    fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
        // A miss surfaces as `InteractionNotFound`, which retry policies never repeat.
        let result = self
            .replayer
            .lock()
            .next_interaction(&request)
            .map(|interaction| interaction.response.to_response());
        Box::pin(async move { result })
    }
}
