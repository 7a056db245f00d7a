use anyhow::{bail, Context, Result};
use clap::{App, Arg, ArgMatches};
use env_logger::Env;
use log::info;

use rust_kite::{load_features, mismatch_maps};

fn main() -> Result<()> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
	let args = parse_args();

	let barcodes = args.value_of("barcodes").context("Could not find barcode file")?;
	let t2g = args.value_of("t2g").context("Could not find t2g path")?;
	let fasta = args.value_of("fasta").context("Could not find fasta path")?;
	let delimiter = parse_delimiter(args.value_of("delimiter").unwrap_or(","))?;

	let features = load_features(barcodes, delimiter)
		.with_context(|| format!("Failed to load feature barcodes: {}", barcodes))?;
	info!("Loaded {} feature barcodes from {}", features.len(), barcodes);

	let variants = mismatch_maps(&features, t2g, fasta)
		.with_context(|| format!("Failed to write mismatch maps: {} {}", t2g, fasta))?;
	info!("Wrote {} records", variants.len());

	Ok(())
}

fn parse_args() -> ArgMatches<'static> {
	App::new("rust_kite")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Mismatch t2g and fasta files for Feature Barcoding")
		.arg(Arg::with_name("barcodes")
			.short("b")
			.long("barcodes")
			.value_name("BARCODE")
			.help("Feature barcode csv file (name,sequence)")
			.takes_value(true)
			.required(true))
		.arg(Arg::with_name("t2g")
			.short("t")
			.long("t2g")
			.value_name("T2G")
			.help("Output mismatch t2g file")
			.default_value("FeatureBarcodes_mismatch.t2g"))
		.arg(Arg::with_name("fasta")
			.short("f")
			.long("fasta")
			.value_name("FASTA")
			.help("Output mismatch fasta file")
			.default_value("FeatureBarcodes_mismatch.fa"))
		.arg(Arg::with_name("delimiter")
			.short("d")
			.long("delimiter")
			.value_name("CHAR")
			.help("Field delimiter of the barcode file ('\\t' for tab)")
			.default_value(","))
		.get_matches()
}

fn parse_delimiter(value: &str) -> Result<u8> {
	match value {
		"\\t" | "tab" => Ok(b'\t'),
		v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
		v => bail!("Delimiter must be a single ASCII character, got '{}'", v),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_delimiter() {
		assert_eq!(parse_delimiter(",").unwrap(), b',');
		assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
		assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
		assert!(parse_delimiter(";;").is_err());
	}
}
