//! Port traits decoupling the sync logic from the concrete catalog APIs.

pub mod destination;
pub mod source;
