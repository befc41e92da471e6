//! # Domain Enums
//!
//! Enumeration types for domain concepts.
//!
//! - [`Verdict`] - Outcome of comparing the two ratios
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, and Serde traits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Equality verdict of a ratio comparison.
///
/// On the wire the verdict is a single flag: `"T"` when the rounded ratios
/// are equal and `"F"` otherwise.
///
/// # Examples
///
/// ```
/// use decimal_ratio::domain::value_objects::enums::Verdict;
///
/// let verdict = Verdict::from_equality(true);
/// assert!(verdict.is_equal());
/// assert_eq!(verdict.to_string(), "T");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Verdict {
    /// Both rounded ratios are the same number.
    #[serde(rename = "T")]
    Equal = 0,
    /// The ratios differ, or could not be computed.
    #[serde(rename = "F")]
    NotEqual = 1,
}

impl Verdict {
    /// Maps an equality check onto a verdict.
    #[inline]
    #[must_use]
    pub const fn from_equality(equal: bool) -> Self {
        if equal { Self::Equal } else { Self::NotEqual }
    }

    /// Returns true if this is the equal verdict.
    #[inline]
    #[must_use]
    pub const fn is_equal(self) -> bool {
        matches!(self, Self::Equal)
    }

    /// Returns the wire flag.
    #[inline]
    #[must_use]
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::Equal => "T",
            Self::NotEqual => "F",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod verdict {
        use super::*;

        #[test]
        fn from_equality_works() {
            assert_eq!(Verdict::from_equality(true), Verdict::Equal);
            assert_eq!(Verdict::from_equality(false), Verdict::NotEqual);
        }

        #[test]
        fn display_flag() {
            assert_eq!(Verdict::Equal.to_string(), "T");
            assert_eq!(Verdict::NotEqual.to_string(), "F");
        }

        #[test]
        fn serde_uses_flags() {
            assert_eq!(serde_json::to_string(&Verdict::Equal).unwrap(), "\"T\"");
            let parsed: Verdict = serde_json::from_str("\"F\"").unwrap();
            assert_eq!(parsed, Verdict::NotEqual);
        }
    }
}
