//! # Batch Summation
//!
//! Reads a newline-delimited file and feeds its lines to the
//! [`SummationEngine`].

use crate::application::error::ApplicationResult;
use crate::domain::services::{SumReport, SummationEngine};
use std::path::Path;

/// Label printed in front of the total.
pub const TOTAL_LABEL: &str = "Сумма: ";

/// Splits raw file bytes into lines.
///
/// Lines end with `\n` or `\r\n`. A trailing line terminator does not produce
/// an extra empty line. Invalid UTF-8 is replaced, so such a line fails to
/// parse instead of aborting the read.
#[must_use]
pub fn split_lines(bytes: &[u8]) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|b| *b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            String::from_utf8_lossy(line).into_owned()
        })
        .collect()
}

/// File-driven summation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSummation;

impl BatchSummation {
    /// Sums every line of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Io` if the file cannot be read.
    pub fn sum_file(path: impl AsRef<Path>) -> ApplicationResult<SumReport> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let lines = split_lines(&bytes);
        tracing::debug!(path = %path.display(), lines = lines.len(), "summing file");

        let report = SummationEngine::sum(&lines);
        for failure in report.failures() {
            tracing::warn!(line = failure.line(), error = failure.diagnosis(), "line skipped");
        }
        tracing::info!(
            path = %path.display(),
            total = %report.total(),
            failed = report.failures().len(),
            "summation finished"
        );
        Ok(report)
    }

    /// Renders the report as printed by `decimal-sum`: the failure message,
    /// if any, on its own line, then the total.
    #[must_use]
    pub fn render(report: &SumReport) -> String {
        let total = format!("{TOTAL_LABEL}{}", report.total());
        match report.failure_message() {
            Some(message) => format!("{message}\n{total}"),
            None => total,
        }
    }
}
