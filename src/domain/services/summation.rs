//! # Summation Engine
//!
//! Exact sum of decimal text lines with per-line failure isolation.
//!
//! Lines that do not parse are reported as [`LineFailure`]s and left out of
//! the total; they never abort the computation.
//!
//! # Examples
//!
//! ```
//! use decimal_ratio::domain::services::summation::SummationEngine;
//!
//! let report = SummationEngine::sum(["1.1", "abc", "3.3"]);
//!
//! assert_eq!(report.total().to_string(), "4.4");
//! assert_eq!(report.failures().len(), 1);
//! assert_eq!(
//!     report.failure_message().unwrap(),
//!     "Ошибочные строки: abc Ошибка: can't convert abc to decimal. \
//!      Они не включены в подсчёт суммы."
//! );
//! ```

use crate::domain::value_objects::DecimalValue;
use num_traits::Zero;
use serde::Serialize;

/// Prefix of the aggregated failure message.
pub const FAILURE_PREFIX: &str = "Ошибочные строки: ";

/// Sentence closing the aggregated failure message.
pub const FAILURE_SUFFIX: &str = ". Они не включены в подсчёт суммы.";

/// An input line that could not be parsed, with the parser's diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineFailure {
    line: String,
    diagnosis: String,
}

impl LineFailure {
    /// Creates a failure record.
    #[must_use]
    pub fn new(line: impl Into<String>, diagnosis: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            diagnosis: diagnosis.into(),
        }
    }

    /// Returns the original line text.
    #[inline]
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Returns the reason the line was rejected.
    #[inline]
    #[must_use]
    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }
}

impl std::fmt::Display for LineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Ошибка: {}", self.line, self.diagnosis)
    }
}

/// Outcome of a summation: the total of every valid line plus the rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumReport {
    total: DecimalValue,
    failures: Vec<LineFailure>,
}

impl SumReport {
    /// Returns the exact total of the lines that parsed.
    #[inline]
    #[must_use]
    pub fn total(&self) -> &DecimalValue {
        &self.total
    }

    /// Returns the rejected lines in input order.
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[LineFailure] {
        &self.failures
    }

    /// Returns true if at least one line was rejected.
    #[inline]
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Builds the human-readable report of rejected lines.
    ///
    /// Returns `None` when every line parsed.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let entries: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        Some(format!(
            "{FAILURE_PREFIX}{}{FAILURE_SUFFIX}",
            entries.join(" ")
        ))
    }
}

/// Sums decimal text lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummationEngine;

impl SummationEngine {
    /// Parses each line and adds it to the total.
    ///
    /// An empty input yields a zero total and no failures.
    #[must_use]
    pub fn sum<I, S>(lines: I) -> SumReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut total = DecimalValue::zero();
        let mut failures = Vec::new();

        for line in lines {
            let line = line.as_ref();
            match line.parse::<DecimalValue>() {
                Ok(value) => total += value,
                Err(err) => failures.push(LineFailure::new(line, err.to_string())),
            }
        }

        SumReport { total, failures }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn total_of(lines: &[&str]) -> String {
        SummationEngine::sum(lines).total().to_string()
    }

    mod partial_failures {
        use super::*;

        #[test]
        fn all_valid() {
            let report = SummationEngine::sum(["1.1", "2.2", "3.3"]);
            assert_eq!(report.total().to_string(), "6.6");
            assert!(!report.has_failures());
            assert_eq!(report.failure_message(), None);
        }

        #[test]
        fn some_lines_invalid() {
            let report = SummationEngine::sum(["1.1", "abc", "3.3"]);
            assert_eq!(report.total().to_string(), "4.4");
            assert_eq!(
                report.failures(),
                &[LineFailure::new("abc", "can't convert abc to decimal")]
            );
            assert_eq!(
                report.failure_message().unwrap(),
                "Ошибочные строки: abc Ошибка: can't convert abc to decimal. \
                 Они не включены в подсчёт суммы."
            );
        }

        #[test]
        fn all_lines_invalid() {
            let report = SummationEngine::sum(["abc", "xyz"]);
            assert_eq!(report.total().to_string(), "0");
            assert_eq!(report.failures().len(), 2);
            assert_eq!(
                report.failure_message().unwrap(),
                "Ошибочные строки: abc Ошибка: can't convert abc to decimal \
                 xyz Ошибка: can't convert xyz to decimal. \
                 Они не включены в подсчёт суммы."
            );
        }

        #[test]
        fn empty_input() {
            let report = SummationEngine::sum(Vec::<String>::new());
            assert_eq!(report.total().to_string(), "0");
            assert!(report.failures().is_empty());
        }

        #[test]
        fn failures_keep_input_order() {
            let report = SummationEngine::sum(["z", "1", "", "a"]);
            let lines: Vec<&str> = report.failures().iter().map(LineFailure::line).collect();
            assert_eq!(lines, vec!["z", "", "a"]);
            assert_eq!(report.total().to_string(), "1");
        }
    }

    mod magnitudes {
        use super::*;

        #[test]
        fn large_positive() {
            assert_eq!(
                total_of(&[
                    "999999999999999999999999999999.123456789",
                    "888888888888888888888888888888.123456789"
                ]),
                "1888888888888888888888888888887.246913578"
            );
        }

        #[test]
        fn small_positive() {
            assert_eq!(
                total_of(&[
                    "0.000000000000000000000000000001",
                    "0.000000000000000000000000000002"
                ]),
                "0.000000000000000000000000000003"
            );
        }

        #[test]
        fn large_with_small_carries() {
            assert_eq!(
                total_of(&[
                    "999999999999999999999999999999.999999999999999999999999999999",
                    "0.000000000000000000000000000001"
                ]),
                "1000000000000000000000000000000"
            );
            assert_eq!(
                total_of(&[
                    "-999999999999999999999999999999.999999999999999999999999999999",
                    "-0.000000000000000000000000000001"
                ]),
                "-1000000000000000000000000000000"
            );
        }

        #[test]
        fn with_zero() {
            assert_eq!(
                total_of(&["999999999999999999999999999999.123456789", "0"]),
                "999999999999999999999999999999.123456789"
            );
            assert_eq!(
                total_of(&["-0.000000000000000000000000000001", "0"]),
                "-0.000000000000000000000000000001"
            );
            assert_eq!(total_of(&["0", "0"]), "0");
        }

        #[test]
        fn large_negative() {
            assert_eq!(
                total_of(&[
                    "-999999999999999999999999999999.123456789",
                    "-888888888888888888888888888888.123456789"
                ]),
                "-1888888888888888888888888888887.246913578"
            );
        }

        #[test]
        fn mixed_signs() {
            assert_eq!(
                total_of(&[
                    "999999999999999999999999999999.123456789",
                    "-0.000000000000000000000000000001"
                ]),
                "999999999999999999999999999999.123456788999999999999999999999"
            );
            assert_eq!(
                total_of(&[
                    "-999999999999999999999999999999.123456789",
                    "0.000000000000000000000000000001"
                ]),
                "-999999999999999999999999999999.123456788999999999999999999999"
            );
            assert_eq!(
                total_of(&[
                    "-0.000000000000000000000000000001",
                    "0.000000000000000000000000000002"
                ]),
                "0.000000000000000000000000000001"
            );
        }

        #[test]
        fn cancels_to_exact_zero() {
            assert_eq!(
                total_of(&[
                    "-999999999999999999999999999999.123456789",
                    "999999999999999999999999999999.123456789"
                ]),
                "0"
            );
            assert_eq!(
                total_of(&[
                    "-999999999999999999999999999999.123456789",
                    "999999999999999999999999999999.123456789",
                    "-0.000000000000000000000000000001",
                    "0.000000000000000000000000000002",
                    "0"
                ]),
                "0.000000000000000000000000000001"
            );
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let lines = ["1.5", "oops", "-2.25e1"];
        let first = SummationEngine::sum(lines);
        let second = SummationEngine::sum(lines);
        assert_eq!(first, second);
        assert_eq!(first.total().to_string(), second.total().to_string());
        assert_eq!(first.failure_message(), second.failure_message());
    }
}
