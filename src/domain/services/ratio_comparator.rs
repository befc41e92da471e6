//! # Ratio Comparator
//!
//! Evaluates and compares two rounded ratios:
//!
//! ```text
//! X = X1 · X3 / X2
//! Y = Y1 · Y3 / Y2
//! ```
//!
//! Both quotients are rounded half away from zero to the requested number of
//! fractional digits. If either denominator is zero the whole comparison
//! fails: no quotient is computed, X and Y are zero and the verdict is
//! not-equal.
//!
//! # Examples
//!
//! ```
//! use decimal_ratio::domain::services::ratio_comparator::{RatioComparator, RatioOperands};
//! use decimal_ratio::domain::value_objects::Verdict;
//!
//! let operands = RatioOperands::parse(["1.5", "2.0", "3.0", "4.5", "6.0", "3.0"]).unwrap();
//! let result = RatioComparator::new().compute(&operands, 3);
//!
//! assert_eq!(result.x().to_string(), "2.25");
//! assert_eq!(result.verdict(), Verdict::Equal);
//! assert!(result.failure().is_none());
//! ```

use crate::domain::value_objects::{ArithmeticError, DecimalValue, ParseDecimalError, Verdict};
use num_traits::Zero;

/// The six inputs of a ratio comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioOperands {
    /// First factor of X's numerator.
    pub x1: DecimalValue,
    /// Denominator of X.
    pub x2: DecimalValue,
    /// Second factor of X's numerator.
    pub x3: DecimalValue,
    /// First factor of Y's numerator.
    pub y1: DecimalValue,
    /// Denominator of Y.
    pub y2: DecimalValue,
    /// Second factor of Y's numerator.
    pub y3: DecimalValue,
}

impl RatioOperands {
    /// Parses operands given in `X1, X2, X3, Y1, Y2, Y3` order.
    ///
    /// # Errors
    ///
    /// Returns the first `ParseDecimalError` encountered.
    pub fn parse<S: AsRef<str>>(fields: [S; 6]) -> Result<Self, ParseDecimalError> {
        let [x1, x2, x3, y1, y2, y3] = fields;
        Ok(Self {
            x1: x1.as_ref().parse()?,
            x2: x2.as_ref().parse()?,
            x3: x3.as_ref().parse()?,
            y1: y1.as_ref().parse()?,
            y2: y2.as_ref().parse()?,
            y3: y3.as_ref().parse()?,
        })
    }

    /// Returns true if either denominator is zero.
    #[must_use]
    pub fn has_zero_denominator(&self) -> bool {
        self.x2.is_zero() || self.y2.is_zero()
    }
}

/// Result of a ratio comparison.
///
/// On failure X and Y are zero and the verdict is [`Verdict::NotEqual`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioResult {
    x: DecimalValue,
    y: DecimalValue,
    verdict: Verdict,
    failure: Option<ArithmeticError>,
}

impl RatioResult {
    fn computed(x: DecimalValue, y: DecimalValue) -> Self {
        let verdict = Verdict::from_equality(x == y);
        Self {
            x,
            y,
            verdict,
            failure: None,
        }
    }

    fn failed(failure: ArithmeticError) -> Self {
        Self {
            x: DecimalValue::zero(),
            y: DecimalValue::zero(),
            verdict: Verdict::NotEqual,
            failure: Some(failure),
        }
    }

    /// Returns the rounded X ratio.
    #[inline]
    #[must_use]
    pub fn x(&self) -> &DecimalValue {
        &self.x
    }

    /// Returns the rounded Y ratio.
    #[inline]
    #[must_use]
    pub fn y(&self) -> &DecimalValue {
        &self.y
    }

    /// Returns the equality verdict.
    #[inline]
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Returns why the comparison failed, if it did.
    #[inline]
    #[must_use]
    pub fn failure(&self) -> Option<ArithmeticError> {
        self.failure
    }
}

/// Stateless evaluator of the two ratios.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioComparator;

impl RatioComparator {
    /// Creates a comparator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes X and Y rounded to `digits` fractional digits and compares them.
    ///
    /// `digits` may be negative to round to tens, hundreds and so on.
    #[must_use]
    pub fn compute(&self, operands: &RatioOperands, digits: i32) -> RatioResult {
        if operands.has_zero_denominator() {
            return RatioResult::failed(ArithmeticError::DivisionByZero);
        }

        let ratio = |a: &DecimalValue, b: &DecimalValue, denominator: &DecimalValue| {
            (a * b).div_rounded(denominator, digits)
        };
        let x = ratio(&operands.x1, &operands.x3, &operands.x2);
        let y = ratio(&operands.y1, &operands.y3, &operands.y2);

        match (x, y) {
            (Ok(x), Ok(y)) => RatioResult::computed(x, y),
            (Err(failure), _) | (_, Err(failure)) => RatioResult::failed(failure),
        }
    }
}
