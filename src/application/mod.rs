//! # Application Layer
//!
//! Orchestrates the domain for the two front ends: admission control for the
//! HTTP service, file-driven summation for the batch tool, and the error
//! type both surfaces report through.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
