//! Error type shared by the benchmark suite and the report writers.
//!
//! An unavailable energy counter is deliberately absent from this list: it
//! degrades to a zero reading instead.

use std::fmt;
use std::io;

/// Errors a benchmark run can surface
#[derive(Debug, Clone, PartialEq)]
pub enum BenchError {
	/// A working set could not be allocated
	Allocation {
		/// Requested size of the working set in bytes
		bytes: usize,
	},
	/// Rejected runtime configuration
	InvalidConfig(String),
	/// Writing the report failed
	Io(String),
	/// Serializing the JSON report failed
	Json(String),
}

impl fmt::Display for BenchError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BenchError::Allocation { bytes } => {
				write!(f, "failed to allocate a {} byte working set", bytes)
			},
			BenchError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
			BenchError::Io(msg) => write!(f, "I/O error: {}", msg),
			BenchError::Json(msg) => write!(f, "JSON error: {}", msg),
		}
	}
}

impl std::error::Error for BenchError {}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

impl From<io::Error> for BenchError {
	fn from(err: io::Error) -> Self {
		BenchError::Io(err.to_string())
	}
}

impl From<serde_json::Error> for BenchError {
	fn from(err: serde_json::Error) -> Self {
		BenchError::Json(err.to_string())
	}
}
