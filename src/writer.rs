//! Serialization of a [`VariantMap`] to the t2g table and FASTA file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::{debug, warn};
use seq_io::fasta;
use tempfile::{Builder, NamedTempFile, TempPath};

use crate::error::{KiteError, Result};
use crate::variant::VariantMap;

/// Writes `record_id<TAB>group<TAB>group` per entry, no header.
pub fn write_t2g<W: Write>(variants: &VariantMap, out: W) -> io::Result<()> {
	let mut wtr = WriterBuilder::new()
		.has_headers(false)
		.delimiter(b'\t')
		.quote_style(QuoteStyle::Never)
		.terminator(Terminator::Any(b'\n'))
		.from_writer(out);

	for (key, _) in variants.iter() {
		let record_id = key.record_id();
		wtr.write_record(&[record_id.as_str(), key.group(), key.group()])?;
	}
	wtr.flush()
}

/// Writes `>record_id` and the unwrapped sequence per entry.
pub fn write_fasta<W: Write>(variants: &VariantMap, mut out: W) -> io::Result<()> {
	for (key, seq) in variants.iter() {
		fasta::write_to(&mut out, key.record_id().as_bytes(), seq)?;
	}
	out.flush()
}

/// Writes both files, creating or overwriting them.
///
/// Each file is staged next to its destination and only renamed into place
/// once both have been written completely. The previous t2g file is set
/// aside until the FASTA file is in place and restored if that fails, so
/// either both outputs are replaced or neither is.
pub fn write<P, Q>(variants: &VariantMap, t2g_path: P, fasta_path: Q) -> Result<()>
where
	P: AsRef<Path>,
	Q: AsRef<Path>,
{
	let t2g_path = t2g_path.as_ref();
	let fasta_path = fasta_path.as_ref();

	check_destination(t2g_path)?;
	check_destination(fasta_path)?;

	let t2g = stage(t2g_path, |out| write_t2g(variants, out))?;
	let fa = stage(fasta_path, |out| write_fasta(variants, out))?;

	let backup = set_aside(t2g_path)?;
	let result = persist(t2g, t2g_path).and_then(|()| persist(fa, fasta_path));
	if result.is_err() {
		restore(backup, t2g_path);
	}
	result?;

	debug!(
		"Wrote {} records to {} and {}",
		variants.len(),
		t2g_path.display(),
		fasta_path.display()
	);
	Ok(())
}

fn io_error(path: &Path, source: io::Error) -> KiteError {
	KiteError::Io { path: path.display().to_string(), source }
}

fn parent_dir(path: &Path) -> &Path {
	match path.parent() {
		Some(dir) if !dir.as_os_str().is_empty() => dir,
		_ => Path::new("."),
	}
}

/// Fails early when a destination exists but cannot be replaced by a file.
fn check_destination(path: &Path) -> Result<()> {
	match fs::symlink_metadata(path) {
		Ok(meta) if meta.is_dir() => Err(io_error(
			path,
			io::Error::new(io::ErrorKind::Other, "destination is a directory"),
		)),
		_ => Ok(()),
	}
}

/// Moves an existing file at `path` to a temporary name in the same directory.
fn set_aside(path: &Path) -> Result<Option<TempPath>> {
	if !path.is_file() {
		return Ok(None);
	}
	let backup = NamedTempFile::new_in(parent_dir(path))
		.map_err(|e| io_error(path, e))?
		.into_temp_path();
	fs::rename(path, &backup).map_err(|e| io_error(path, e))?;
	Ok(Some(backup))
}

/// Puts a set-aside file back, or removes the new file if there was none.
fn restore(backup: Option<TempPath>, path: &Path) {
	let result = match backup {
		Some(backup) => backup.persist(path).map_err(|e| e.error),
		None => match fs::remove_file(path) {
			Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
			_ => Ok(()),
		},
	};
	if let Err(e) = result {
		warn!("Could not restore {}: {}", path.display(), e);
	}
}

fn stage<F>(path: &Path, fill: F) -> Result<NamedTempFile>
where
	F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
	let mut tmp = staging_file(path).map_err(|e| io_error(path, e))?;
	{
		let mut out = BufWriter::new(tmp.as_file_mut());
		fill(&mut out).map_err(|e| io_error(path, e))?;
		out.flush().map_err(|e| io_error(path, e))?;
	}
	Ok(tmp)
}

/// Temp file with the permissions the destination has, or would get from
/// `File::create`.
fn staging_file(path: &Path) -> io::Result<NamedTempFile> {
	let mut builder = Builder::new();
	#[cfg(unix)]
	{
		use std::os::unix::fs::PermissionsExt;
		// the umask applies on creation, as it does for File::create
		builder.permissions(fs::Permissions::from_mode(0o666));
	}
	let tmp = builder.tempfile_in(parent_dir(path))?;
	if let Ok(meta) = fs::metadata(path) {
		tmp.as_file().set_permissions(meta.permissions())?;
	}
	Ok(tmp)
}

fn persist(tmp: NamedTempFile, path: &Path) -> Result<()> {
	tmp.persist(path).map_err(|e| io_error(path, e.error))?;
	Ok(())
}
