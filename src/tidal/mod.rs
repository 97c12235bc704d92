//! Tidal API adapter, the destination side of the mirror.

pub mod client;
pub mod types;
