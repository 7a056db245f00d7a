//! Error types for building and writing mismatch maps.

use std::io;

use thiserror::Error;

/// Result type alias for mismatch map operations
pub type Result<T> = std::result::Result<T, KiteError>;

/// Error type for mismatch map operations
#[derive(Error, Debug)]
pub enum KiteError {
	/// A sequence is shorter than the barcode length set by the first feature
	#[error("Feature '{name}' has {actual} bases but the barcode length is {expected}")]
	MalformedInput {
		/// The feature name
		name: String,
		/// Barcode length taken from the first feature
		expected: usize,
		/// Length of this feature's sequence
		actual: usize,
	},

	/// Positions are byte offsets, so sequences must be ASCII
	#[error("Feature '{name}' has a sequence with non-ASCII symbols")]
	NonAsciiSequence {
		/// The feature name
		name: String,
	},

	/// Two entries would be written under the same record id
	#[error("Record id '{record_id}' is produced by both {first} and {second}")]
	AmbiguousRecordId {
		/// The colliding record id
		record_id: String,
		/// Key that produced the id first
		first: String,
		/// Key that produced it again
		second: String,
	},

	/// A feature name appears on more than one row of a barcode file
	#[error("Feature '{name}' is listed more than once in '{path}'")]
	DuplicateFeature {
		/// The repeated name
		name: String,
		/// Path to the barcode file
		path: String,
	},

	/// A barcode file row does not have exactly a name and a sequence
	#[error("Invalid feature barcode file '{path}': line {line} has {fields} fields, expected 2")]
	InvalidRecord {
		/// Path to the barcode file
		path: String,
		/// One-based line number
		line: u64,
		/// Number of fields found
		fields: usize,
	},

	/// The barcode file could not be parsed
	#[error("Invalid feature barcode file '{path}': {source}")]
	Csv {
		/// Path to the barcode file
		path: String,
		/// Underlying parser error
		source: csv::Error,
	},

	/// A file could not be opened, written or moved into place
	#[error("I/O error on '{path}': {source}")]
	Io {
		/// The path being read or written
		path: String,
		/// Underlying file-system error
		source: io::Error,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_malformed_input() {
		let error = KiteError::MalformedInput { name: "CD4".to_string(), expected: 15, actual: 12 };
		let msg = format!("{}", error);
		assert!(msg.contains("'CD4'"));
		assert!(msg.contains("12 bases"));
		assert!(msg.contains("barcode length is 15"));
	}

	#[test]
	fn test_ambiguous_record_id() {
		let error = KiteError::AmbiguousRecordId {
			record_id: "X-0-1".to_string(),
			first: "X-0-1-*-*".to_string(),
			second: "X-0-1".to_string(),
		};
		let msg = format!("{}", error);
		assert!(msg.contains("'X-0-1'"));
		assert!(msg.contains("X-0-1-*-*"));
	}

	#[test]
	fn test_io_keeps_source() {
		use std::error::Error;

		let error = KiteError::Io {
			path: "/missing/out.t2g".to_string(),
			source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
		};
		assert!(format!("{}", error).contains("/missing/out.t2g"));
		assert!(error.source().is_some());
	}
}
