use std::{
	collections::BTreeSet,
	fs,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use crate::{
	McResult, McError,
	math::coord::RegionPos,
};

use super::{
	io::read_optional,
	FileKind,
	Triad,
};

/// The name of the file holding region `pos`: `r.<x>.<z>.mca`.
pub fn region_file_name(pos: RegionPos) -> String {
	format!("r.{}.{}.mca", pos.x, pos.z)
}

/// Parses a file name of the form `r.<x>.<z>.mca`.
pub fn parse_region_file_name(name: &str) -> Option<RegionPos> {
	let mut parts = name.strip_prefix("r.")?.strip_suffix(".mca")?.split('.');
	let x = parts.next()?.parse().ok()?;
	let z = parts.next()?.parse().ok()?;
	if parts.next().is_some() {
		return None;
	}
	Some(RegionPos::new(x, z))
}

/// The directories of a world, one per [FileKind].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
	dirs: [PathBuf; 3],
}

impl World {
	/// Opens an existing world directory.
	pub fn open<P: AsRef<Path>>(root: P) -> McResult<Self> {
		let root = root.as_ref();
		if !root.is_dir() {
			return Err(McError::WorldDirectoryNotFound(root.to_owned()));
		}
		Ok(Self::at(root))
	}

	/// A world rooted at `root`, which does not need to exist yet.
	pub fn at<P: AsRef<Path>>(root: P) -> Self {
		let root = root.as_ref();
		Self {
			dirs: FileKind::ALL.map(|kind| root.join(kind.dir_name())),
		}
	}

	pub fn dir(&self, kind: FileKind) -> &Path {
		&self.dirs[kind.index()]
	}

	pub fn region_path(&self, kind: FileKind, pos: RegionPos) -> PathBuf {
		self.dir(kind).join(region_file_name(pos))
	}

	pub fn region_files(&self, pos: RegionPos) -> RegionFiles {
		RegionFiles {
			pos,
			paths: FileKind::ALL.map(|kind| self.region_path(kind, pos)),
		}
	}

	pub fn create_dirs(&self) -> McResult<()> {
		for dir in self.dirs.iter() {
			fs::create_dir_all(dir)?;
		}
		Ok(())
	}

	/// Every region that has a file of any kind, sorted.
	/// Missing directories count as empty.
	pub fn list_regions(&self) -> McResult<Vec<RegionPos>> {
		let mut found = BTreeSet::new();
		for dir in self.dirs.iter() {
			let entries = match fs::read_dir(dir) {
				Ok(entries) => entries,
				Err(err) if err.kind() == ErrorKind::NotFound => continue,
				Err(err) => return Err(err.into()),
			};
			for entry in entries {
				let entry = entry?;
				if !entry.file_type()?.is_file() {
					continue;
				}
				if let Some(pos) = entry.file_name().to_str().and_then(parse_region_file_name) {
					found.insert(pos);
				}
			}
		}
		Ok(found.into_iter().collect())
	}
}

/// The up-to-three files of one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFiles {
	pos: RegionPos,
	paths: [PathBuf; 3],
}

impl RegionFiles {
	pub fn pos(&self) -> RegionPos {
		self.pos
	}

	pub fn path(&self, kind: FileKind) -> &Path {
		&self.paths[kind.index()]
	}

	/// Reads every file that exists into memory. Missing files are left out.
	pub fn read(&self) -> McResult<Triad<Vec<u8>>> {
		let mut triad = Triad::new();
		for kind in FileKind::ALL {
			if let Some(bytes) = read_optional(self.path(kind))? {
				triad.insert(kind, bytes);
			}
		}
		Ok(triad)
	}
}
