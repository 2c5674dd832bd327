//! Sparse selections of chunks across a world.
//!
//! A region is either absent from a [SelectionMap], selected as a whole
//! ([RegionSelection::All]), or selected chunk by chunk
//! ([RegionSelection::Chunks]).

pub mod chunkset;
pub mod map;
pub mod text;

pub use chunkset::ChunkSet;
pub use map::SelectionMap;
pub use text::{read_selection, write_selection, load_selection, save_selection};

use crate::world::io::region::coord::ChunkOffset;

use chunkset::ChunkSetIter;

/// The chunks selected in one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSelection {
	/// Every chunk of the region.
	All,
	/// An explicit subset, possibly empty.
	Chunks(ChunkSet),
}

impl RegionSelection {
	pub fn contains(&self, offset: ChunkOffset) -> bool {
		match self {
			RegionSelection::All => true,
			RegionSelection::Chunks(set) => set.contains(offset),
		}
	}

	pub fn len(&self) -> usize {
		match self {
			RegionSelection::All => ChunkOffset::COUNT,
			RegionSelection::Chunks(set) => set.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			RegionSelection::All => false,
			RegionSelection::Chunks(set) => set.is_empty(),
		}
	}

	/// True for [RegionSelection::All] and for explicit sets of every chunk.
	pub fn is_full(&self) -> bool {
		match self {
			RegionSelection::All => true,
			RegionSelection::Chunks(set) => set.is_full(),
		}
	}

	/// The selected offsets in ascending index order. `All` yields the same
	/// sequence as a full [ChunkSet].
	pub fn iter(&self) -> SelectionIter<'_> {
		match self {
			RegionSelection::All => SelectionIter::All(0..ChunkOffset::COUNT),
			RegionSelection::Chunks(set) => SelectionIter::Chunks(set.iter()),
		}
	}

	/// The chunks of the region that are not selected, or `None` if every
	/// chunk is selected.
	pub fn complement(&self) -> Option<RegionSelection> {
		match self {
			RegionSelection::All => None,
			RegionSelection::Chunks(set) if set.is_empty() => Some(RegionSelection::All),
			RegionSelection::Chunks(set) => {
				let inverted = set.complement();
				if inverted.is_empty() {
					None
				} else {
					Some(RegionSelection::Chunks(inverted))
				}
			}
		}
	}
}

impl<'a> IntoIterator for &'a RegionSelection {
	type Item = ChunkOffset;
	type IntoIter = SelectionIter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[derive(Clone)]
pub enum SelectionIter<'a> {
	All(std::ops::Range<usize>),
	Chunks(ChunkSetIter<'a>),
}

impl<'a> Iterator for SelectionIter<'a> {
	type Item = ChunkOffset;

	fn next(&mut self) -> Option<Self::Item> {
		match self {
			SelectionIter::All(range) => range.next().map(ChunkOffset::from_index),
			SelectionIter::Chunks(iter) => iter.next(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn all_matches_full_set() {
		let all = RegionSelection::All;
		let full = RegionSelection::Chunks(ChunkSet::full());
		assert!(all.iter().eq(full.iter()));
		assert_eq!(all.len(), 1024);
		assert!(full.is_full());
	}

	#[test]
	fn complements() {
		assert_eq!(RegionSelection::All.complement(), None);
		assert_eq!(RegionSelection::Chunks(ChunkSet::new()).complement(), Some(RegionSelection::All));
		let one: ChunkSet = [ChunkOffset::new(0, 0)].into_iter().collect();
		let inverted = RegionSelection::Chunks(one).complement().unwrap();
		assert_eq!(inverted.len(), 1023);
		assert!(!inverted.contains(ChunkOffset::new(0, 0)));
	}
}
