//! Mismatch maps for Feature Barcoding experiments.
//!
//! Every feature barcode is expanded into itself plus each single-position
//! substitution, and written as a t2g table and a FASTA file for
//! pseudoalignment-based quantification.

use std::path::Path;

use log::info;

pub mod error;
pub mod features;
pub mod variant;
pub mod writer;

pub use error::{KiteError, Result};
pub use features::{load_features, FeatureBarcodeSet};
pub use variant::{
	generate, generate_with, GenerationObserver, LogObserver, NoopObserver, VariantKey, VariantMap,
};
pub use writer::write;

/// Generates the mismatch map for `features` and writes both output files.
pub fn mismatch_maps<P, Q>(features: &FeatureBarcodeSet, t2g_path: P, fasta_path: Q) -> Result<VariantMap>
where
	P: AsRef<Path>,
	Q: AsRef<Path>,
{
	let variants = generate(features)?;
	write(&variants, t2g_path, fasta_path)?;
	info!("The t2g and fasta files are now ready");
	Ok(variants)
}
