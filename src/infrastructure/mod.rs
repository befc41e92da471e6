//! # Infrastructure Layer
//!
//! Process-level plumbing shared by the binaries.
//!
//! - [`telemetry`]: `tracing` subscriber setup per deployment environment

pub mod telemetry;
