use crate::{
	math::coord::{ChunkPos, RegionPos},
	world::io::region::coord::ChunkOffset,
};

use super::{ChunkSet, RegionSelection};

#[cfg(feature = "preserve_order")]
type Map<K, V> = indexmap::IndexMap<K, V>;
#[cfg(not(feature = "preserve_order"))]
type Map<K, V> = std::collections::HashMap<K, V>;

/// A world-wide selection: which regions, and which chunks in them.
/// The `inverted` flag is carried along for callers; lookups ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMap {
	regions: Map<RegionPos, RegionSelection>,
	inverted: bool,
}

impl SelectionMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_inverted(&self) -> bool {
		self.inverted
	}

	pub fn set_inverted(&mut self, inverted: bool) {
		self.inverted = inverted;
	}

	/// Selects the whole region, replacing any subset.
	pub fn insert_region(&mut self, pos: RegionPos) {
		self.regions.insert(pos, RegionSelection::All);
	}

	/// Adds `chunks` to the region's selection. Adding to a whole region
	/// does nothing. A set that ends up holding every chunk becomes
	/// [RegionSelection::All].
	pub fn insert_chunks(&mut self, pos: RegionPos, chunks: ChunkSet) {
		let selection = self.regions.entry(pos)
			.or_insert_with(|| RegionSelection::Chunks(ChunkSet::new()));
		let full = match selection {
			RegionSelection::All => false,
			RegionSelection::Chunks(set) => {
				set.union_with(&chunks);
				set.is_full()
			}
		};
		if full {
			*selection = RegionSelection::All;
		}
	}

	pub fn insert_chunk(&mut self, chunk: ChunkPos) {
		let selection = self.regions.entry(chunk.region())
			.or_insert_with(|| RegionSelection::Chunks(ChunkSet::new()));
		let full = match selection {
			RegionSelection::All => false,
			RegionSelection::Chunks(set) => set.add(chunk.offset()) && set.is_full(),
		};
		if full {
			*selection = RegionSelection::All;
		}
	}

	pub fn get(&self, pos: RegionPos) -> Option<&RegionSelection> {
		self.regions.get(&pos)
	}

	pub fn contains_chunk(&self, chunk: ChunkPos) -> bool {
		self.get(chunk.region())
			.map(|selection| selection.contains(chunk.offset()))
			.unwrap_or(false)
	}

	/// Number of regions present, including ones with an empty subset.
	pub fn len(&self) -> usize {
		self.regions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.regions.is_empty()
	}

	/// Number of selected chunks across all regions.
	pub fn chunk_count(&self) -> usize {
		self.regions.values().map(RegionSelection::len).sum()
	}

	pub fn iter(&self) -> impl Iterator<Item = (RegionPos, &RegionSelection)> {
		self.regions.iter().map(|(&pos, selection)| (pos, selection))
	}

	/// Regions sorted by position.
	pub fn sorted(&self) -> Vec<(RegionPos, &RegionSelection)> {
		let mut regions: Vec<_> = self.iter().collect();
		regions.sort_by_key(|(pos, _)| *pos);
		regions
	}

	/// Every selected chunk position.
	pub fn chunks(&self) -> impl Iterator<Item = ChunkPos> + '_ {
		self.iter().flat_map(|(pos, selection)| {
			selection.iter().map(move |offset| pos.chunk(offset))
		})
	}

	/// Adds every chunk within `radius` chunks (Chebyshev distance) of a
	/// selected chunk, crossing region boundaries.
	pub fn expand_radius(&mut self, radius: u32) {
		if radius == 0 {
			return;
		}
		let radius = radius.min(i32::MAX as u32 / 2) as i32;
		let source = self.clone();
		for (pos, selection) in source.iter() {
			for offset in selection.iter() {
				if matches!(selection, RegionSelection::All) && Self::is_interior(offset, radius) {
					continue;
				}
				let center = pos.chunk(offset);
				for dz in -radius..=radius {
					for dx in -radius..=radius {
						self.insert_chunk(center.add(dx, dz));
					}
				}
			}
		}
	}

	/// True if every chunk within `radius` of `offset` is in the same region.
	fn is_interior(offset: ChunkOffset, radius: i32) -> bool {
		let lo = radius;
		let hi = 31 - radius;
		(lo..=hi).contains(&offset.x()) && (lo..=hi).contains(&offset.z())
	}
}

impl FromIterator<ChunkPos> for SelectionMap {
	fn from_iter<T: IntoIterator<Item = ChunkPos>>(iter: T) -> Self {
		let mut map = SelectionMap::new();
		iter.into_iter().for_each(|chunk| map.insert_chunk(chunk));
		map
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn three_states() {
		let mut map = SelectionMap::new();
		map.insert_region(RegionPos::new(0, 0));
		map.insert_chunk(ChunkPos::new(0, 0));
		map.insert_chunks(RegionPos::new(1, 0), ChunkSet::new());
		map.insert_chunk(ChunkPos::new(-1, -1));
		assert_eq!(map.get(RegionPos::new(0, 0)), Some(&RegionSelection::All));
		assert_eq!(map.get(RegionPos::new(1, 0)).map(RegionSelection::len), Some(0));
		assert!(map.contains_chunk(ChunkPos::new(-1, -1)));
		assert!(!map.contains_chunk(ChunkPos::new(-2, -1)));
		assert!(map.get(RegionPos::new(5, 5)).is_none());
		assert_eq!(map.len(), 3);
		assert_eq!(map.chunk_count(), 1025);
	}

	#[test]
	fn full_subset_becomes_all() {
		let mut map = SelectionMap::new();
		for offset in ChunkOffset::all() {
			map.insert_chunk(RegionPos::new(2, 3).chunk(offset));
		}
		assert_eq!(map.get(RegionPos::new(2, 3)), Some(&RegionSelection::All));
	}

	#[test]
	fn radius_crosses_regions() {
		let mut map: SelectionMap = [ChunkPos::new(0, 0)].into_iter().collect();
		map.expand_radius(1);
		assert_eq!(map.chunk_count(), 9);
		assert!(map.contains_chunk(ChunkPos::new(-1, -1)));
		assert!(map.contains_chunk(ChunkPos::new(1, 1)));
		assert_eq!(map.len(), 4);
	}

	#[test]
	fn radius_around_whole_region() {
		let mut map = SelectionMap::new();
		map.insert_region(RegionPos::new(0, 0));
		map.expand_radius(2);
		// 36x36 chunks centred on the region.
		assert_eq!(map.chunk_count(), 36 * 36);
	}
}
