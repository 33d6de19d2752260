//! JSON serialization for measurement reports.

use crate::result::BenchmarkResult;

/// Serialize a BenchmarkResult to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// BenchmarkResult).
pub fn to_json(result: &BenchmarkResult) -> Result<String, serde_json::Error> {
    serde_json::to_string(result)
}

/// Serialize a BenchmarkResult to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// BenchmarkResult).
pub fn to_json_pretty(result: &BenchmarkResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result() -> BenchmarkResult {
        BenchmarkResult {
            mean_ns: 104.5,
            confidence_99_ns: 1.2,
            std_dev_ns: 0.47,
            timing_samples: 12,
            memory_samples: 11,
            bytes_per_call: 48.0,
            iterations_per_batch: 2048,
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&make_result()).unwrap();
        assert!(json.contains("\"mean_ns\":104.5"));
        assert!(json.contains("\"iterations_per_batch\":2048"));
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json_pretty(&make_result()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("bytes_per_call"));
    }
}
