//! Terminal output formatting for measurement reports.

use colored::Colorize;

use crate::result::BenchmarkResult;
use crate::units::format_nanos;

/// Format a BenchmarkResult for human-readable terminal output.
///
/// Renders the classic one-line summary (mean time with its 99%
/// confidence half-width, then bytes per call) followed by the sampling
/// detail.
pub fn format_result(name: &str, result: &BenchmarkResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}: {} (±{}), {}\n",
        name.bold(),
        format_nanos(result.mean_ns).green(),
        format_nanos(result.confidence_99_ns),
        result.bytes().to_string().cyan()
    ));
    output.push_str(&format!(
        "  {} timing samples, {} memory samples, {} calls per batch\n",
        result.timing_samples, result.memory_samples, result.iterations_per_batch
    ));

    output
}

/// One-line summary without colors, for logs and reports.
pub fn format_summary(result: &BenchmarkResult) -> String {
    result.to_string()
}
