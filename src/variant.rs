//! Expansion of feature barcodes into every single-position substitution.

use std::collections::HashMap;
use std::fmt;

use itertools::{izip, Itertools};
use log::info;

use crate::error::{KiteError, Result};
use crate::features::FeatureBarcodeSet;

/// Suffix marking the unmutated barcode in the textual key form.
pub const CANONICAL_SUFFIX: &str = "-*-*";

/// Identifies one entry of a [`VariantMap`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VariantKey {
	/// The unmutated barcode of a feature
	Canonical { name: String },
	/// `index` (1..=3) picks the substitute at `position`, a zero-based offset
	Mismatch { name: String, position: usize, index: u8 },
}

impl VariantKey {
	pub fn canonical<S: Into<String>>(name: S) -> Self {
		VariantKey::Canonical { name: name.into() }
	}

	pub fn mismatch<S: Into<String>>(name: S, position: usize, index: u8) -> Self {
		VariantKey::Mismatch { name: name.into(), position, index }
	}

	pub fn name(&self) -> &str {
		match self {
			VariantKey::Canonical { name } | VariantKey::Mismatch { name, .. } => name,
		}
	}

	/// Group the record is counted toward: always the feature name.
	pub fn group(&self) -> &str {
		self.name()
	}

	pub fn is_canonical(&self) -> bool {
		matches!(self, VariantKey::Canonical { .. })
	}

	/// Identifier written to the t2g and FASTA files.
	pub fn record_id(&self) -> String {
		match self {
			VariantKey::Canonical { name } => name.clone(),
			VariantKey::Mismatch { name, position, index } => format!("{}-{}-{}", name, position, index),
		}
	}
}

impl fmt::Display for VariantKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VariantKey::Canonical { name } => write!(f, "{}{}", name, CANONICAL_SUFFIX),
			VariantKey::Mismatch { name, position, index } => write!(f, "{}-{}-{}", name, position, index),
		}
	}
}

/// Substitutes for `symbol`, in index order 1, 2, 3.
///
/// Anything other than `A`, `G` or `C` (including `T`, `N` and lowercase
/// bases) gets `A`, `G`, `C`, even when that repeats the original symbol.
pub fn substitutes(symbol: u8) -> [u8; 3] {
	match symbol {
		b'A' => *b"TGC",
		b'G' => *b"TAC",
		b'C' => *b"TGA",
		_ => *b"AGC",
	}
}

/// Offsets at which two sequences differ, compared over the shorter length.
pub fn mismatch_positions(x: &[u8], y: &[u8]) -> Vec<usize> {
	izip!(x, y).positions(|(xi, yi)| xi != yi).collect()
}

/// Ordered variant keys and their barcode sequences.
#[derive(Clone, Debug, Default)]
pub struct VariantMap {
	barcode_length: Option<usize>,
	entries: Vec<(VariantKey, Vec<u8>)>,
	by_record_id: HashMap<String, usize>,
}

impl VariantMap {
	/// Length fixed by the first feature, `None` when there were no features.
	pub fn barcode_length(&self) -> Option<usize> {
		self.barcode_length
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&VariantKey, &[u8])> {
		self.entries.iter().map(|(k, seq)| (k, seq.as_slice()))
	}

	pub fn get(&self, key: &VariantKey) -> Option<&[u8]> {
		self.by_record_id
			.get(&key.record_id())
			.map(|&i| &self.entries[i])
			.filter(|(k, _)| k == key)
			.map(|(_, seq)| seq.as_slice())
	}

	/// Looks an entry up by the identifier it is written under.
	pub fn get_record(&self, record_id: &str) -> Option<(&VariantKey, &[u8])> {
		self.by_record_id
			.get(record_id)
			.map(|&i| (&self.entries[i].0, self.entries[i].1.as_slice()))
	}

	fn insert(&mut self, key: VariantKey, sequence: Vec<u8>) -> Result<()> {
		let record_id = key.record_id();
		if let Some(&i) = self.by_record_id.get(&record_id) {
			return Err(KiteError::AmbiguousRecordId {
				record_id,
				first: self.entries[i].0.to_string(),
				second: key.to_string(),
			});
		}
		self.by_record_id.insert(record_id, self.entries.len());
		self.entries.push((key, sequence));
		Ok(())
	}
}

/// Receives progress while a [`VariantMap`] is generated.
pub trait GenerationObserver {
	fn barcode_length(&mut self, _length: usize) {}
	fn feature(&mut self, _name: &str, _sequence: &str) {}
}

/// Forwards progress to the `log` facade at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl GenerationObserver for LogObserver {
	fn barcode_length(&mut self, length: usize) {
		info!("Feature Barcode Length: {}", length);
		info!("Read the following Feature Barcodes:");
	}

	fn feature(&mut self, name: &str, sequence: &str) {
		info!("{}\t{}", name, sequence);
	}
}

/// Discards progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}

/// Generates the mismatch map, logging progress through [`LogObserver`].
pub fn generate(features: &FeatureBarcodeSet) -> Result<VariantMap> {
	generate_with(features, &mut LogObserver)
}

/// Generates the mismatch map for `features`.
///
/// The barcode length comes from the first feature. Longer sequences are
/// truncated to it; shorter ones are an error.
pub fn generate_with<O: GenerationObserver>(
	features: &FeatureBarcodeSet,
	observer: &mut O,
) -> Result<VariantMap> {
	let mut variants = VariantMap::default();

	for (name, sequence) in features.iter() {
		if !sequence.is_ascii() {
			return Err(KiteError::NonAsciiSequence { name: name.to_string() });
		}

		let length = match variants.barcode_length {
			Some(length) => length,
			None => {
				observer.barcode_length(sequence.len());
				*variants.barcode_length.insert(sequence.len())
			}
		};
		observer.feature(name, sequence);

		if sequence.len() < length {
			return Err(KiteError::MalformedInput {
				name: name.to_string(),
				expected: length,
				actual: sequence.len(),
			});
		}

		let canonical = &sequence.as_bytes()[..length];
		variants.insert(VariantKey::canonical(name), canonical.to_vec())?;

		for (position, &letter) in canonical.iter().enumerate() {
			for (index, &substitute) in (1..).zip(substitutes(letter).iter()) {
				let mut barcode = canonical.to_vec();
				barcode[position] = substitute;
				debug_assert_eq!(mismatch_positions(&barcode, canonical), [position]);
				variants.insert(VariantKey::mismatch(name, position, index), barcode)?;
			}
		}
	}

	Ok(variants)
}
