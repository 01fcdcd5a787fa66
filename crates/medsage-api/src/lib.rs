//! REST client for the MedSage diagnostic backend.
//!
//! This crate is the concrete side of the seam defined by
//! `medsage_core::backend::DiagnosticBackend`: JSON wire types matching
//! the backend's API, a blocking HTTP client, a scripted mock for tests,
//! and a `DiagnosticFlow` that sequences one chat exchange end to end.

pub mod client;
pub mod flow;
pub mod mock;
pub mod types;

pub use client::*;
pub use flow::*;
pub use mock::*;
pub use types::*;
