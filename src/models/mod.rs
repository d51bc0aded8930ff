//! Data models for the donation tracker.
//!
//! The snapshot types serialize with the exact field names of the existing
//! snapshot history, so stored documents round-trip unchanged.

mod roster;
mod snapshot;

pub use roster::*;
pub use snapshot::*;
