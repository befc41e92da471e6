//! # Domain Services
//!
//! Domain services encapsulating the computations that don't naturally
//! belong to a single value object.
//!
//! ## Services
//!
//! - [`summation::SummationEngine`]: Exact sum of decimal text lines
//! - [`ratio_comparator::RatioComparator`]: Rounded ratio evaluation and comparison

pub mod ratio_comparator;
pub mod summation;

pub use ratio_comparator::{RatioComparator, RatioOperands, RatioResult};
pub use summation::{LineFailure, SumReport, SummationEngine};
