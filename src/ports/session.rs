//! Session port supplying the unintercepted base transport.

use std::sync::Arc;

use crate::error::Result;
use crate::ports::transport::HttpTransport;

/// Supplies the base transport a test's client is built on.
///
/// Credential resolution and endpoint configuration live behind this port;
/// the harness only wraps what it is given.
pub trait SessionProvider: Send + Sync {
    /// Returns a fresh base transport for one test.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be configured.
    fn base_transport(&self) -> Result<Arc<dyn HttpTransport>>;
}

impl<F> SessionProvider for F
where
    F: Fn() -> Result<Arc<dyn HttpTransport>> + Send + Sync,
{
    fn base_transport(&self) -> Result<Arc<dyn HttpTransport>> {
        self()
    }
}
