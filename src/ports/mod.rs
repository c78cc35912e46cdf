//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the harness and something it
//! does not own (the network, the session that supplies a transport, the
//! process environment). Implementations live in `src/adapters/`.

pub mod env;
pub mod session;
pub mod transport;

pub use env::{EnvProvider, MockEnv, RealEnv};
pub use session::SessionProvider;
pub use transport::{Headers, HttpRequest, HttpResponse, HttpTransport, TransportFuture};
