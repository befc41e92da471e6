//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Numeric Types
//!
//! - [`DecimalValue`]: Exact arbitrary-precision decimal
//! - [`ParseDecimalError`]: Why a text is not a decimal
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`]: Error type for arithmetic failures
//! - [`div_round`]: Division to a fixed number of fractional digits
//!
//! ## Domain Enums
//!
//! - [`Verdict`]: Equal or not-equal outcome of a ratio comparison

pub mod arithmetic;
pub mod decimal;
pub mod enums;

pub use arithmetic::{ArithmeticError, ArithmeticResult, div_round};
pub use decimal::{DecimalValue, ParseDecimalError};
pub use enums::Verdict;
