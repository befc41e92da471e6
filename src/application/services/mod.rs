//! # Application Services
//!
//! Services that sit between the transports and the domain.
//!
//! This module provides:
//! - [`AdmissionGate`]: Per-caller admission decision, with
//!   [`SlidingWindowGate`] and [`TokenBucketGate`] implementations
//! - [`BatchSummation`]: Summation of a newline-delimited file

pub mod admission;
pub mod batch_sum;

pub use admission::{
    AdmissionGate, ManualClock, MonotonicClock, SlidingWindowGate, TokenBucketGate, WindowClock,
    build_gate,
};
pub use batch_sum::{BatchSummation, split_lines};
