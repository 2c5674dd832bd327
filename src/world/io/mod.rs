pub mod region;

use std::{
	fs,
	io::ErrorKind,
	path::Path,
};

use crate::McResult;

/// Reads the whole file into memory. A missing file is `None`.
pub fn read_optional<P: AsRef<Path>>(path: P) -> McResult<Option<Vec<u8>>> {
	match fs::read(path) {
		Ok(bytes) => Ok(Some(bytes)),
		Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
		Err(err) => Err(err.into()),
	}
}

/// Removes a file. Returns false if there was nothing to remove.
pub fn remove_optional<P: AsRef<Path>>(path: P) -> McResult<bool> {
	match fs::remove_file(path) {
		Ok(()) => Ok(true),
		Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
		Err(err) => Err(err.into()),
	}
}

/// Writes `bytes` to a temporary file next to `path`, then renames it over
/// `path`. Missing parent directories are created.
pub fn write_replace<P: AsRef<Path>>(path: P, bytes: &[u8]) -> McResult<()> {
	let path = path.as_ref();
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	let mut temp = path.as_os_str().to_owned();
	temp.push(".tmp");
	fs::write(&temp, bytes)?;
	fs::rename(&temp, path)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_files_are_not_errors() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("r.0.0.mca");
		assert!(read_optional(&path).unwrap().is_none());
		assert!(!remove_optional(&path).unwrap());
		write_replace(&path, b"abc").unwrap();
		assert_eq!(read_optional(&path).unwrap(), Some(b"abc".to_vec()));
		assert!(remove_optional(&path).unwrap());
	}
}
