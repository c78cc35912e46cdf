//! Adapter implementations of the port traits.
//!
//! `live` talks to the real network, `recording` wraps a live transport and
//! captures every interaction, `replaying` serves interactions from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
