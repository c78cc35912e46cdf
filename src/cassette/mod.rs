//! Cassette format, storage, matching and redaction for recorded HTTP traffic.

pub mod format;
pub mod matcher;
pub mod recorder;
pub mod redact;
pub mod replayer;
pub mod store;

pub use format::{Cassette, Interaction, RecordedRequest, RecordedResponse};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;
pub use store::{normalize_name, CassetteStore, OpenCassette};
