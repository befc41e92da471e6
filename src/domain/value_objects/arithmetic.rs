//! # Rounded Arithmetic
//!
//! Division for [`DecimalValue`].
//!
//! This module provides:
//! - [`ArithmeticError`] - Error type for arithmetic failures
//! - [`div_round`] - Division to a fixed number of fractional digits
//!
//! Addition, subtraction and multiplication of decimals are exact and live on
//! [`DecimalValue`] itself. Division is the only lossy operation, so it always
//! takes the number of fractional digits and rounds half away from zero.
//!
//! # Examples
//!
//! ```
//! use decimal_ratio::domain::value_objects::arithmetic::div_round;
//! use decimal_ratio::domain::value_objects::DecimalValue;
//!
//! let numerator = DecimalValue::from(10);
//! let denominator = DecimalValue::from(4);
//!
//! let result = div_round(&numerator, &denominator, 0).unwrap();
//! assert_eq!(result, DecimalValue::from(3));
//! ```

use crate::domain::value_objects::decimal::DecimalValue;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use thiserror::Error;

/// Error type for arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Division by zero attempted.
    #[error("division by zero")]
    DivisionByZero,
}

/// Result type for arithmetic operations.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

/// Divide to exactly `digits` fractional digits, rounding half away from zero.
///
/// The result has exponent `-digits`. A negative `digits` rounds to a
/// multiple of `10^(-digits)`.
///
/// # Arguments
///
/// * `numerator` - The dividend
/// * `denominator` - The divisor
/// * `digits` - Number of fractional digits to keep
///
/// # Errors
///
/// Returns `ArithmeticError::DivisionByZero` if the denominator is zero.
///
/// # Examples
///
/// ```
/// use decimal_ratio::domain::value_objects::arithmetic::div_round;
/// use decimal_ratio::domain::value_objects::DecimalValue;
///
/// let result = div_round(&DecimalValue::from(7), &DecimalValue::from(2), 0).unwrap();
/// assert_eq!(result, DecimalValue::from(4));
/// ```
#[must_use = "this returns the result of the operation, without modifying the original"]
pub fn div_round(
    numerator: &DecimalValue,
    denominator: &DecimalValue,
    digits: i32,
) -> ArithmeticResult<DecimalValue> {
    if denominator.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }

    Ok(quantize(
        numerator.coefficient(),
        numerator.exponent(),
        denominator.coefficient(),
        denominator.exponent(),
        digits,
    ))
}

/// Multiplies `coefficient` by `10^places`.
pub(crate) fn scale_up(coefficient: &BigInt, places: u64) -> BigInt {
    if places == 0 || coefficient.is_zero() {
        return coefficient.clone();
    }
    coefficient * pow10(places)
}

fn pow10(mut places: u64) -> BigInt {
    let ten = BigInt::from(10u8);
    let mut result = BigInt::one();
    while places > 0 {
        let step = u32::try_from(places).unwrap_or(u32::MAX);
        result *= ten.pow(step);
        places -= u64::from(step);
    }
    result
}

/// Computes `(n · 10^ne) / (d · 10^de)` as a coefficient with exponent `-digits`.
///
/// `d` must be non-zero.
fn quantize(n: &BigInt, ne: i64, d: &BigInt, de: i64, digits: i32) -> DecimalValue {
    let exponent = -i64::from(digits);
    let shift = i128::from(ne) - i128::from(de) + i128::from(digits);
    let places = u64::try_from(shift.unsigned_abs()).unwrap_or(u64::MAX);

    let (numerator, denominator) = if shift >= 0 {
        (scale_up(n, places), d.clone())
    } else if below_one_tenth(n, d, places) {
        // |quotient| < 0.1 of the unit, rounds to zero.
        return DecimalValue::new(BigInt::zero(), exponent);
    } else {
        (n.clone(), scale_up(d, places))
    };

    let (quotient, remainder) = numerator.div_rem(&denominator);
    if remainder.abs() * 2u8 < denominator.abs() {
        return DecimalValue::new(quotient, exponent);
    }

    let unit = if n.is_negative() != d.is_negative() {
        -BigInt::one()
    } else {
        BigInt::one()
    };
    DecimalValue::new(quotient + unit, exponent)
}

/// True when `|n| / |d · 10^places| < 1/10`, decided from bit lengths alone.
///
/// `|n| < 2^bn` and `|d · 10^places| >= 2^(bd - 1 + 3·places)`.
fn below_one_tenth(n: &BigInt, d: &BigInt, places: u64) -> bool {
    let numerator_bits = i128::from(n.bits());
    let denominator_bits = i128::from(d.bits());
    3 * i128::from(places) >= numerator_bits - denominator_bits + 5
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> DecimalValue {
        s.parse().unwrap()
    }

    mod arithmetic_error {
        use super::*;

        #[test]
        fn display_formats_correctly() {
            assert_eq!(
                ArithmeticError::DivisionByZero.to_string(),
                "division by zero"
            );
        }
    }

    mod div_round_tests {
        use super::*;

        #[test]
        fn div_round_exact_no_rounding() {
            assert_eq!(div_round(&dec("10"), &dec("2"), 0).unwrap(), dec("5"));
            assert_eq!(div_round(&dec("-10"), &dec("4"), 1).unwrap(), dec("-2.5"));
        }

        #[test]
        fn div_round_by_zero_fails() {
            let result = div_round(&dec("10"), &dec("0"), 2);
            assert_eq!(result, Err(ArithmeticError::DivisionByZero));
        }

        #[test]
        fn half_ties_go_away_from_zero() {
            assert_eq!(div_round(&dec("1"), &dec("8"), 2).unwrap(), dec("0.13"));
            assert_eq!(div_round(&dec("-1"), &dec("8"), 2).unwrap(), dec("-0.13"));
            assert_eq!(div_round(&dec("1"), &dec("-8"), 2).unwrap(), dec("-0.13"));
            assert_eq!(div_round(&dec("-1"), &dec("-8"), 2).unwrap(), dec("0.13"));
        }

        #[test]
        fn below_half_rounds_toward_zero() {
            assert_eq!(div_round(&dec("1"), &dec("3"), 3).unwrap(), dec("0.333"));
            assert_eq!(div_round(&dec("-2"), &dec("3"), 0).unwrap(), dec("-1"));
            assert_eq!(div_round(&dec("-10"), &dec("3"), 0).unwrap(), dec("-3"));
        }

        #[test]
        fn result_exponent_is_minus_digits() {
            let result = div_round(&dec("1"), &dec("4"), 5).unwrap();
            assert_eq!(result.exponent(), -5);
            let result = div_round(&dec("12345"), &dec("1"), -2).unwrap();
            assert_eq!(result.exponent(), 2);
            assert_eq!(result, dec("12300"));
        }

        #[test]
        fn far_coarser_digits_cancel_to_zero() {
            assert_eq!(div_round(&dec("9e20"), &dec("1"), -30).unwrap(), dec("0"));
            assert_eq!(div_round(&dec("-9e20"), &dec("1"), -30).unwrap(), dec("0"));
            assert_eq!(div_round(&dec("0"), &dec("1"), -30).unwrap(), dec("0"));
        }

        #[test]
        fn rounding_boundary_near_cancellation() {
            // 0.5 of the unit is not negligible and rounds away from zero.
            assert_eq!(div_round(&dec("5"), &dec("1"), -1).unwrap(), dec("10"));
            assert_eq!(div_round(&dec("4"), &dec("1"), -1).unwrap(), dec("0"));
            assert_eq!(div_round(&dec("50"), &dec("1"), -2).unwrap(), dec("100"));
            assert_eq!(div_round(&dec("-50"), &dec("1"), -2).unwrap(), dec("-100"));
        }
    }
}
