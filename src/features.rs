//! The input side: named feature barcodes, in the order they were given.

use std::fs::File;
use std::iter::FromIterator;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::error::{KiteError, Result};

/// Ordered mapping from feature name to barcode sequence.
///
/// Names are unique. Re-inserting a name replaces its sequence but keeps its
/// original position, so iteration order is always first-insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureBarcodeSet {
	features: Vec<(String, String)>,
}

impl FeatureBarcodeSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a feature, returning the previous sequence if the name was present.
	pub fn insert<N, S>(&mut self, name: N, sequence: S) -> Option<String>
	where
		N: Into<String>,
		S: Into<String>,
	{
		let name = name.into();
		let sequence = sequence.into();
		match self.features.iter_mut().find(|(n, _)| *n == name) {
			Some((_, old)) => Some(std::mem::replace(old, sequence)),
			None => {
				self.features.push((name, sequence));
				None
			}
		}
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.features
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, seq)| seq.as_str())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn len(&self) -> usize {
		self.features.len()
	}

	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	/// Iterates `(name, sequence)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.features.iter().map(|(n, s)| (n.as_str(), s.as_str()))
	}
}

impl<N, S> FromIterator<(N, S)> for FeatureBarcodeSet
where
	N: Into<String>,
	S: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
		let mut features = FeatureBarcodeSet::new();
		for (name, sequence) in iter {
			features.insert(name, sequence);
		}
		features
	}
}

/// Loads a headerless `name,sequence` file.
///
/// Fields are trimmed and blank lines skipped. A name listed twice is an
/// error rather than a silent overwrite.
pub fn load_features<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<FeatureBarcodeSet> {
	let path = path.as_ref();
	let display = path.display().to_string();
	let file = File::open(path).map_err(|source| KiteError::Io { path: display.clone(), source })?;

	let mut rdr = ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.trim(Trim::All)
		.delimiter(delimiter)
		.from_reader(file);

	let mut features = FeatureBarcodeSet::new();
	for record in rdr.records() {
		let record = record.map_err(|source| KiteError::Csv { path: display.clone(), source })?;
		if record.len() != 2 {
			return Err(KiteError::InvalidRecord {
				path: display,
				line: record.position().map_or(0, |p| p.line()),
				fields: record.len(),
			});
		}
		if features.insert(&record[0], &record[1]).is_some() {
			return Err(KiteError::DuplicateFeature { name: record[0].to_string(), path: display });
		}
	}

	Ok(features)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn barcode_file(contents: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file.flush().unwrap();
		file
	}

	#[test]
	fn test_insert_keeps_first_position() {
		let mut features = FeatureBarcodeSet::new();
		assert_eq!(features.insert("HTO1", "AAAA"), None);
		features.insert("HTO2", "CCCC");
		assert_eq!(features.insert("HTO1", "GGGG"), Some("AAAA".to_string()));

		let pairs: Vec<_> = features.iter().collect();
		assert_eq!(pairs, vec![("HTO1", "GGGG"), ("HTO2", "CCCC")]);
	}

	#[test]
	fn test_from_iter_preserves_order() {
		let features: FeatureBarcodeSet =
			vec![("b", "TTTT"), ("a", "AAAA"), ("c", "CCCC")].into_iter().collect();
		let names: Vec<_> = features.iter().map(|(n, _)| n).collect();
		assert_eq!(names, vec!["b", "a", "c"]);
		assert_eq!(features.get("a"), Some("AAAA"));
		assert!(!features.contains("d"));
	}

	#[test]
	fn test_load_features() {
		let file = barcode_file("CD3, ACGTACGT\n\nCD4,TTGGCCAA\n");
		let features = load_features(file.path(), b',').unwrap();
		assert_eq!(features.len(), 2);
		assert_eq!(features.get("CD3"), Some("ACGTACGT"));
		assert_eq!(features.get("CD4"), Some("TTGGCCAA"));
	}

	#[test]
	fn test_load_features_tab_delimited() {
		let file = barcode_file("CD3\tACGT\n");
		let features = load_features(file.path(), b'\t').unwrap();
		assert_eq!(features.get("CD3"), Some("ACGT"));
	}

	#[test]
	fn test_load_features_duplicate_name() {
		let file = barcode_file("CD3,ACGT\nCD3,TTTT\n");
		let err = load_features(file.path(), b',').unwrap_err();
		assert!(matches!(err, KiteError::DuplicateFeature { ref name, .. } if name == "CD3"));
	}

	#[test]
	fn test_load_features_wrong_field_count() {
		let file = barcode_file("CD3,ACGT\nCD4,ACGT,extra\n");
		let err = load_features(file.path(), b',').unwrap_err();
		assert!(matches!(err, KiteError::InvalidRecord { line: 2, fields: 3, .. }));
	}

	#[test]
	fn test_load_features_missing_file() {
		let err = load_features("/no/such/dir/barcodes.csv", b',').unwrap_err();
		assert!(matches!(err, KiteError::Io { .. }));
	}
}
