//! # decimal-ratio
//!
//! Exact arbitrary-precision decimal arithmetic with two front ends:
//!
//! - `decimal-sum`: sums a file of decimal lines, reporting the lines it
//!   could not parse instead of failing.
//! - `ratio-service`: an HTTP service that evaluates `X1·X3/X2` and
//!   `Y1·Y3/Y2`, rounds both half away from zero to `E` fractional digits and
//!   reports whether they are equal. Callers are rate limited per address.
//!
//! ## Layout
//!
//! - [`domain`]: [`DecimalValue`](domain::value_objects::DecimalValue),
//!   [`SummationEngine`](domain::services::SummationEngine),
//!   [`RatioComparator`](domain::services::RatioComparator)
//! - [`application`]: admission gates, batch summation, application errors
//! - [`api`]: REST router, handlers and server loop
//! - [`config`]: service configuration
//! - [`infrastructure`]: logging setup
//!
//! ## Example
//!
//! ```
//! use decimal_ratio::domain::services::{RatioComparator, RatioOperands};
//!
//! let operands = RatioOperands::parse(["3.4", "2.0", "1.5", "12", "4.0", "1.5"]).unwrap();
//! let result = RatioComparator::new().compute(&operands, 0);
//!
//! assert_eq!(result.x().to_string(), "3");
//! assert_eq!(result.y().to_string(), "5");
//! assert!(!result.verdict().is_equal());
//! ```

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
