//! Domain models for the MedSage client core.

mod conversation;
mod patient;
mod summary;

pub use conversation::*;
pub use patient::*;
pub use summary::*;
