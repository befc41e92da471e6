//! # Decimal Value
//!
//! Exact, arbitrary-precision signed decimal numbers.
//!
//! A [`DecimalValue`] is a `BigInt` coefficient scaled by a power of ten:
//!
//! ```text
//! value = coefficient × 10^exponent
//! ```
//!
//! Addition, subtraction and multiplication are exact. Division always goes
//! through [`DecimalValue::div_rounded`] with an explicit number of fractional
//! digits.
//!
//! # Canonical Form
//!
//! Equality, ordering and hashing are by mathematical value, so `3` and
//! `3.000` are the same number. [`Display`](fmt::Display) renders the
//! canonical string: plain notation, no trailing fractional zeros, no leading
//! zeros, and zero is always `"0"`.
//!
//! # Examples
//!
//! ```
//! use decimal_ratio::domain::value_objects::DecimalValue;
//!
//! let a: DecimalValue = "999999999999999999999999999999.999999999999999999999999999999"
//!     .parse()
//!     .unwrap();
//! let b: DecimalValue = "0.000000000000000000000000000001".parse().unwrap();
//!
//! assert_eq!((a + b).to_string(), "1000000000000000000000000000000");
//! assert_eq!("3".parse::<DecimalValue>(), "3.000".parse::<DecimalValue>());
//! ```

use crate::domain::value_objects::arithmetic::{self, ArithmeticResult};
use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when text is not a valid decimal number.
///
/// Every variant keeps the rejected input so the diagnosis can be reported
/// next to the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDecimalError {
    /// The text does not follow the decimal grammar.
    #[error("can't convert {0} to decimal")]
    Syntax(String),

    /// The mantissa contains more than one decimal point.
    #[error("can't convert {0} to decimal: too many .s")]
    TooManyPoints(String),

    /// The exponent after `e`/`E` is missing or not an integer.
    #[error("can't convert {0} to decimal: exponent is not numeric")]
    InvalidExponent(String),

    /// The exponent does not fit in 32 bits.
    #[error("can't convert {0} to decimal: exponent out of range")]
    ExponentOutOfRange(String),
}

impl ParseDecimalError {
    /// Returns the text that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::Syntax(input)
            | Self::TooManyPoints(input)
            | Self::InvalidExponent(input)
            | Self::ExponentOutOfRange(input) => input,
        }
    }
}

/// An exact signed decimal number of unbounded magnitude.
///
/// Immutable: every operation returns a new value.
#[derive(Debug, Clone)]
pub struct DecimalValue {
    coefficient: BigInt,
    exponent: i64,
}

impl DecimalValue {
    /// Creates a value equal to `coefficient × 10^exponent`.
    ///
    /// # Examples
    ///
    /// ```
    /// use decimal_ratio::domain::value_objects::DecimalValue;
    ///
    /// let value = DecimalValue::new(2250, -3);
    /// assert_eq!(value.to_string(), "2.25");
    /// ```
    #[must_use]
    pub fn new(coefficient: impl Into<BigInt>, exponent: i64) -> Self {
        Self {
            coefficient: coefficient.into(),
            exponent,
        }
    }

    /// Returns the unscaled coefficient.
    #[inline]
    #[must_use]
    pub fn coefficient(&self) -> &BigInt {
        &self.coefficient
    }

    /// Returns the base-10 exponent.
    #[inline]
    #[must_use]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Returns true if the value is strictly below zero.
    #[inline]
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.coefficient.is_negative()
    }

    /// Returns true if the value is strictly above zero.
    #[inline]
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.coefficient.is_positive()
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self::new(self.coefficient.abs(), self.exponent)
    }

    /// Returns the same value with trailing zeros moved into the exponent.
    ///
    /// Zero normalizes to a zero coefficient with exponent 0.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let (digits, exponent) = self.significant_digits();
        if digits.is_empty() {
            return Self::zero();
        }
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).unwrap_or_default();
        let coefficient = if self.is_negative() { -magnitude } else { magnitude };
        Self::new(coefficient, exponent)
    }

    /// Decimal digits of `|coefficient|` without trailing zeros, and the
    /// exponent that goes with them. Zero yields no digits.
    fn significant_digits(&self) -> (String, i64) {
        if self.coefficient.is_zero() {
            return (String::new(), 0);
        }
        let mut digits = self.coefficient.magnitude().to_str_radix(10);
        let significant = digits.trim_end_matches('0').len();
        let stripped = (digits.len() - significant) as i64;
        digits.truncate(significant);
        (digits, self.exponent.saturating_add(stripped))
    }

    /// Bounds on `log10 |self|` for a non-zero value: `lo <= log10 < hi`.
    fn magnitude_bounds(&self) -> (i128, i128) {
        // 2^(bits-1) <= |c| < 2^bits and 0.30102 < log10(2) < 0.30103.
        let bits = i128::from(self.coefficient.bits());
        let exponent = i128::from(self.exponent);
        let lo = exponent + (bits - 1) * 30_102 / 100_000;
        let hi = exponent + (bits * 30_103 + 99_999) / 100_000;
        (lo, hi)
    }

    /// Compares absolute values of two non-zero numbers.
    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        let (self_lo, self_hi) = self.magnitude_bounds();
        let (other_lo, other_hi) = other.magnitude_bounds();
        if self_hi <= other_lo {
            return Ordering::Less;
        }
        if other_hi <= self_lo {
            return Ordering::Greater;
        }
        // Overlapping bounds keep the exponent gap within the digit counts.
        let (lhs, rhs, _) = self.aligned(other);
        lhs.magnitude().cmp(rhs.magnitude())
    }

    /// Divides by `denominator`, rounding half away from zero to exactly
    /// `digits` fractional digits.
    ///
    /// A negative `digits` rounds to a power of ten above the unit, so
    /// `digits = -1` rounds to the nearest 10.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticError::DivisionByZero` if `denominator` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use decimal_ratio::domain::value_objects::DecimalValue;
    ///
    /// let numerator: DecimalValue = "4.5".parse().unwrap();
    /// let denominator: DecimalValue = "2.0".parse().unwrap();
    ///
    /// let quotient = numerator.div_rounded(&denominator, 3).unwrap();
    /// assert_eq!(quotient.exponent(), -3);
    /// assert_eq!(quotient.to_string(), "2.25");
    /// ```
    pub fn div_rounded(&self, denominator: &Self, digits: i32) -> ArithmeticResult<Self> {
        arithmetic::div_round(self, denominator, digits)
    }

    /// Brings both coefficients to the smaller of the two exponents.
    fn aligned(&self, other: &Self) -> (BigInt, BigInt, i64) {
        let exponent = self.exponent.min(other.exponent);
        let lhs = arithmetic::scale_up(&self.coefficient, (self.exponent - exponent).unsigned_abs());
        let rhs = arithmetic::scale_up(&other.coefficient, (other.exponent - exponent).unsigned_abs());
        (lhs, rhs, exponent)
    }
}

impl Default for DecimalValue {
    fn default() -> Self {
        Self::zero()
    }
}

impl Zero for DecimalValue {
    fn zero() -> Self {
        Self::new(BigInt::zero(), 0)
    }

    fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }
}

impl One for DecimalValue {
    fn one() -> Self {
        Self::new(BigInt::one(), 0)
    }
}

impl PartialEq for DecimalValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DecimalValue {}

impl Hash for DecimalValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (digits, exponent) = self.significant_digits();
        self.coefficient.sign().hash(state);
        digits.hash(state);
        exponent.hash(state);
    }
}

impl PartialOrd for DecimalValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DecimalValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.coefficient.sign(), other.coefficient.sign()) {
            (Sign::NoSign, Sign::NoSign) => Ordering::Equal,
            (Sign::Plus, Sign::Plus) => self.cmp_magnitude(other),
            (Sign::Minus, Sign::Minus) => other.cmp_magnitude(self),
            (lhs, rhs) => lhs.cmp(&rhs),
        }
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (digits, exponent) = self.significant_digits();
        if digits.is_empty() {
            return f.write_str("0");
        }
        if self.is_negative() {
            f.write_str("-")?;
        }

        if exponent >= 0 {
            f.write_str(&digits)?;
            for _ in 0..exponent {
                f.write_str("0")?;
            }
            return Ok(());
        }

        let fraction_len = exponent.unsigned_abs();
        match usize::try_from(fraction_len) {
            Ok(fraction_len) if fraction_len < digits.len() => {
                let (integer, fraction) = digits.split_at(digits.len() - fraction_len);
                write!(f, "{integer}.{fraction}")
            }
            _ => {
                f.write_str("0.")?;
                let leading_zeros = fraction_len - digits.len() as u64;
                for _ in 0..leading_zeros {
                    f.write_str("0")?;
                }
                f.write_str(&digits)
            }
        }
    }
}

impl FromStr for DecimalValue {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s)
    }
}

/// Parses `[+-]digits[.digits][(e|E)[+-]digits]`.
///
/// At least one mantissa digit is required on either side of the point.
fn parse_decimal(text: &str) -> Result<DecimalValue, ParseDecimalError> {
    let syntax_error = || ParseDecimalError::Syntax(text.to_string());

    let (negative, unsigned) = if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    };

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, parse_exponent(exponent, text)?),
        None => (unsigned, 0),
    };

    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if fraction.contains('.') {
        return Err(ParseDecimalError::TooManyPoints(text.to_string()));
    }
    if integer.is_empty() && fraction.is_empty() {
        return Err(syntax_error());
    }
    if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(syntax_error());
    }

    let digits = format!("{integer}{fraction}");
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(syntax_error)?;
    let coefficient = if negative { -magnitude } else { magnitude };

    Ok(DecimalValue::new(coefficient, exponent - fraction.len() as i64))
}

fn parse_exponent(exponent: &str, input: &str) -> Result<i64, ParseDecimalError> {
    let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseDecimalError::InvalidExponent(input.to_string()));
    }
    exponent
        .parse::<i32>()
        .map(i64::from)
        .map_err(|_| ParseDecimalError::ExponentOutOfRange(input.to_string()))
}

impl From<BigInt> for DecimalValue {
    fn from(coefficient: BigInt) -> Self {
        Self::new(coefficient, 0)
    }
}

impl From<i64> for DecimalValue {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

impl From<i32> for DecimalValue {
    fn from(value: i32) -> Self {
        Self::new(value, 0)
    }
}

impl From<u64> for DecimalValue {
    fn from(value: u64) -> Self {
        Self::new(value, 0)
    }
}

impl Add<&DecimalValue> for &DecimalValue {
    type Output = DecimalValue;

    fn add(self, rhs: &DecimalValue) -> DecimalValue {
        let (lhs, rhs, exponent) = self.aligned(rhs);
        DecimalValue::new(lhs + rhs, exponent)
    }
}

impl Add for DecimalValue {
    type Output = DecimalValue;

    fn add(self, rhs: DecimalValue) -> DecimalValue {
        &self + &rhs
    }
}

impl AddAssign<&DecimalValue> for DecimalValue {
    fn add_assign(&mut self, rhs: &DecimalValue) {
        *self = &*self + rhs;
    }
}

impl AddAssign for DecimalValue {
    fn add_assign(&mut self, rhs: DecimalValue) {
        *self += &rhs;
    }
}

impl Sub<&DecimalValue> for &DecimalValue {
    type Output = DecimalValue;

    fn sub(self, rhs: &DecimalValue) -> DecimalValue {
        let (lhs, rhs, exponent) = self.aligned(rhs);
        DecimalValue::new(lhs - rhs, exponent)
    }
}

impl Sub for DecimalValue {
    type Output = DecimalValue;

    fn sub(self, rhs: DecimalValue) -> DecimalValue {
        &self - &rhs
    }
}

impl Mul<&DecimalValue> for &DecimalValue {
    type Output = DecimalValue;

    fn mul(self, rhs: &DecimalValue) -> DecimalValue {
        DecimalValue::new(
            &self.coefficient * &rhs.coefficient,
            self.exponent + rhs.exponent,
        )
    }
}

impl Mul for DecimalValue {
    type Output = DecimalValue;

    fn mul(self, rhs: DecimalValue) -> DecimalValue {
        &self * &rhs
    }
}

impl Neg for &DecimalValue {
    type Output = DecimalValue;

    fn neg(self) -> DecimalValue {
        DecimalValue::new(-&self.coefficient, self.exponent)
    }
}

impl Neg for DecimalValue {
    type Output = DecimalValue;

    fn neg(self) -> DecimalValue {
        -&self
    }
}

impl Sum for DecimalValue {
    fn sum<I: Iterator<Item = DecimalValue>>(iter: I) -> Self {
        iter.fold(Self::zero(), |total, value| total + value)
    }
}

impl<'a> Sum<&'a DecimalValue> for DecimalValue {
    fn sum<I: Iterator<Item = &'a DecimalValue>>(iter: I) -> Self {
        iter.fold(Self::zero(), |mut total, value| {
            total += value;
            total
        })
    }
}

impl Serialize for DecimalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DecimalValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

/// Accepts quoted decimal text or bare JSON numbers.
///
/// JSON numbers arrive as their literal text (serde_json's
/// `arbitrary_precision`), so no digit goes through `f64`.
struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = DecimalValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or a string holding one")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(DecimalValue::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(DecimalValue::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
        Ok(DecimalValue::from(BigInt::from(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(DecimalValue::from(BigInt::from(v)))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        let number = serde_json::Number::deserialize(de::value::MapAccessDeserializer::new(map))?;
        number.to_string().parse().map_err(de::Error::custom)
    }
}
