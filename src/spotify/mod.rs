//! Spotify Web API adapter, the source side of the mirror.

pub mod client;
pub mod types;
