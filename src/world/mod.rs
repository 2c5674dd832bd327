//! World directories, the three region file kinds, and per-chunk records.

pub mod io;
pub mod layout;
pub mod chunk;

pub use chunk::ChunkRecord;
pub use layout::{World, RegionFiles};

use std::str::FromStr;

use crate::McError;

/// The three parallel region file kinds that share one coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileKind {
	Region,
	Poi,
	Entities,
}

impl FileKind {
	pub const ALL: [FileKind; 3] = [FileKind::Region, FileKind::Poi, FileKind::Entities];

	/// The directory under the world root holding files of this kind.
	pub const fn dir_name(self) -> &'static str {
		match self {
			FileKind::Region => "region",
			FileKind::Poi => "poi",
			FileKind::Entities => "entities",
		}
	}

	#[inline(always)]
	pub const fn index(self) -> usize {
		self as usize
	}
}

impl std::fmt::Display for FileKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.dir_name())
	}
}

impl FromStr for FileKind {
	type Err = McError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		FileKind::ALL.into_iter()
			.find(|kind| kind.dir_name().eq_ignore_ascii_case(s))
			.ok_or_else(|| McError::InvalidConfig(format!("unknown file kind: {s}")))
	}
}

/// One optional value per [FileKind].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triad<T>([Option<T>; 3]);

impl<T> Default for Triad<T> {
	fn default() -> Self {
		Self([None, None, None])
	}
}

impl<T> Triad<T> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, kind: FileKind) -> Option<&T> {
		self.0[kind.index()].as_ref()
	}

	pub fn get_mut(&mut self, kind: FileKind) -> Option<&mut T> {
		self.0[kind.index()].as_mut()
	}

	/// Gets the value for `kind`, inserting one made by `init` if missing.
	pub fn get_or_insert_with<F: FnOnce() -> T>(&mut self, kind: FileKind, init: F) -> &mut T {
		self.0[kind.index()].get_or_insert_with(init)
	}

	pub fn insert(&mut self, kind: FileKind, value: T) -> Option<T> {
		self.0[kind.index()].replace(value)
	}

	pub fn take(&mut self, kind: FileKind) -> Option<T> {
		self.0[kind.index()].take()
	}

	pub fn contains(&self, kind: FileKind) -> bool {
		self.0[kind.index()].is_some()
	}

	pub fn is_empty(&self) -> bool {
		self.0.iter().all(Option::is_none)
	}

	pub fn len(&self) -> usize {
		self.0.iter().filter(|value| value.is_some()).count()
	}

	/// Present values with their kinds.
	pub fn iter(&self) -> impl Iterator<Item = (FileKind, &T)> {
		FileKind::ALL.into_iter()
			.zip(self.0.iter())
			.filter_map(|(kind, value)| value.as_ref().map(|value| (kind, value)))
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = (FileKind, &mut T)> {
		FileKind::ALL.into_iter()
			.zip(self.0.iter_mut())
			.filter_map(|(kind, value)| value.as_mut().map(|value| (kind, value)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn kinds_parse() {
		assert_eq!("poi".parse::<FileKind>().unwrap(), FileKind::Poi);
		assert_eq!("Entities".parse::<FileKind>().unwrap(), FileKind::Entities);
		assert!("level".parse::<FileKind>().is_err());
	}

	#[test]
	fn triad_slots() {
		let mut triad = Triad::new();
		assert!(triad.is_empty());
		triad.insert(FileKind::Entities, 3);
		triad.insert(FileKind::Region, 1);
		let kinds: Vec<_> = triad.iter().map(|(kind, &v)| (kind, v)).collect();
		assert_eq!(kinds, vec![(FileKind::Region, 1), (FileKind::Entities, 3)]);
		assert_eq!(triad.take(FileKind::Region), Some(1));
		assert_eq!(triad.len(), 1);
		*triad.get_or_insert_with(FileKind::Entities, || 0) *= 2;
		assert_eq!(triad.get(FileKind::Entities), Some(&6));
	}
}
