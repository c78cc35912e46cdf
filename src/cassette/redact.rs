//! Strips credentials from interactions before they are persisted.

use super::format::Interaction;

/// Request headers that never reach a cassette file.
///
/// Names are matched exactly against the lower-case names the transport
/// layer stores.
pub const REDACTED_HEADERS: &[&str] = &["authorization", "x-amz-security-token"];

/// Removes every header in [`REDACTED_HEADERS`] from the request side.
#[must_use]
pub fn redact(mut interaction: Interaction) -> Interaction {
    for name in REDACTED_HEADERS {
        interaction.request.headers.remove(*name);
    }
    interaction
}
