use crate::{
	McResult, McError,
};

use super::{
	header::SectorTable,
	managedsector::ManagedSector,
	sector::RegionSector,
};

pub trait SectorAllocator {
	fn free(&mut self, sector: RegionSector);
	#[must_use]
	fn allocate(&mut self, size: u8) -> Option<RegionSector>;
	#[must_use]
	fn reallocate(&mut self, free: RegionSector, new_size: u8) -> Option<RegionSector>;

	#[inline(always)]
	fn reallocate_err(&mut self, free: RegionSector, new_size: u8) -> McResult<RegionSector> {
		self.reallocate(free, new_size).ok_or(McError::RegionAllocationFailure)
	}
}

/// Manages unused sectors in a region file so that chunks can be
/// rewritten without intersecting each other. Freed space is reused
/// before the file grows.
#[derive(Debug, Clone)]
pub struct SectorManager {
	/// Gaps between used sectors, kept sorted by start.
	unused_sectors: Vec<ManagedSector>,
	/// All space beyond the last used sector.
	end_sector: ManagedSector,
}

impl SectorAllocator for SectorManager {
	/// Frees a sector, merging it with neighbouring unused space.
	/// Only free sectors handed out by (or loaded into) this manager.
	fn free(&mut self, sector: RegionSector) {
		if sector.is_empty() {
			return;
		}
		let mut freed = ManagedSector::from(sector);
		// Absorb every neighbour that touches the freed range.
		self.unused_sectors.retain(|unused| {
			if unused.adjacent(&freed) {
				freed.absorb(*unused);
				false
			} else {
				true
			}
		});
		if freed.end >= self.end_sector.start {
			self.end_sector.absorb(freed);
		} else {
			let index = self.unused_sectors.partition_point(|unused| unused.start < freed.start);
			self.unused_sectors.insert(index, freed);
		}
	}

	/// First fit from the unused sectors, otherwise from the end of the file.
	fn allocate(&mut self, size: u8) -> Option<RegionSector> {
		if size == 0 {
			return None;
		}
		let found = self.unused_sectors.iter()
			.position(|sector| sector.size() >= size as u32);
		match found {
			Some(index) => {
				let allocation = self.unused_sectors[index].allocate(size);
				if self.unused_sectors[index].is_empty() {
					self.unused_sectors.remove(index);
				}
				allocation
			}
			None => self.end_sector.allocate(size),
		}
	}

	/// Keeps the chunk where it is when it still fits, otherwise frees the
	/// old sector and allocates a new one.
	fn reallocate(&mut self, free: RegionSector, new_size: u8) -> Option<RegionSector> {
		if new_size == 0 {
			self.free(free);
			return None;
		}
		if !free.is_empty() && free.sector_count() >= new_size as u64 {
			let (kept, rest) = free.split_left(new_size)?;
			self.free(rest);
			return Some(kept);
		}
		let previous = self.clone();
		self.free(free);
		let allocation = self.allocate(new_size);
		if allocation.is_none() {
			*self = previous;
		}
		allocation
	}
}

impl SectorManager {
	/// A manager for an empty region file.
	pub fn new() -> Self {
		Self {
			unused_sectors: Vec::new(),
			end_sector: ManagedSector::end_sector(ManagedSector::HEADER.end),
		}
	}

	/// Finds the gaps between the used sectors in a [SectorTable].
	/// The table must not contain overlapping sectors.
	pub fn from_table(table: &SectorTable) -> Self {
		let mut used = table.iter()
			.filter(|sector| !sector.is_empty())
			.map(|&sector| ManagedSector::from(sector))
			.collect::<Vec<ManagedSector>>();
		used.sort();
		let mut unused_sectors = Vec::new();
		let mut cursor = ManagedSector::HEADER.end;
		for sector in used {
			if sector.start > cursor {
				unused_sectors.push(ManagedSector::new(cursor, sector.start));
			}
			cursor = cursor.max(sector.end);
		}
		Self {
			unused_sectors,
			end_sector: ManagedSector::end_sector(cursor),
		}
	}

	pub fn unused_sectors(&self) -> &[ManagedSector] {
		&self.unused_sectors
	}

	/// The first sector past all used space. Files are truncated here.
	pub fn end_offset(&self) -> u32 {
		self.end_sector.start
	}

	/// Counts the number of unused 4KiB blocks below the end of the file.
	pub fn count_unused_blocks(&self) -> u32 {
		self.unused_sectors.iter()
			.map(|sector| sector.size())
			.sum()
	}
}

impl Default for SectorManager {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::world::io::region::coord::ChunkOffset;

	fn table(sectors: &[(u16, RegionSector)]) -> SectorTable {
		let mut table = SectorTable::default();
		for &(index, sector) in sectors {
			table[ChunkOffset::from_index(index as usize)] = sector;
		}
		table
	}

	#[test]
	fn finds_gaps() {
		let manager = SectorManager::from_table(&table(&[
			(0, RegionSector::new(2, 1)),
			(1, RegionSector::new(5, 2)),
		]));
		assert_eq!(manager.unused_sectors(), &[ManagedSector::new(3, 5)]);
		assert_eq!(manager.end_offset(), 7);
		assert_eq!(manager.count_unused_blocks(), 2);
	}

	#[test]
	fn reuses_freed_space_first() {
		let mut manager = SectorManager::from_table(&table(&[
			(0, RegionSector::new(2, 3)),
			(1, RegionSector::new(5, 1)),
		]));
		manager.free(RegionSector::new(2, 3));
		assert_eq!(manager.allocate(2), Some(RegionSector::new(2, 2)));
		assert_eq!(manager.allocate(2), Some(RegionSector::new(6, 2)));
		assert_eq!(manager.allocate(1), Some(RegionSector::new(4, 1)));
		assert!(manager.unused_sectors().is_empty());
	}

	#[test]
	fn freeing_last_sector_shrinks_file() {
		let mut manager = SectorManager::from_table(&table(&[
			(0, RegionSector::new(2, 1)),
			(1, RegionSector::new(3, 4)),
		]));
		manager.free(RegionSector::new(3, 4));
		assert_eq!(manager.end_offset(), 3);
		manager.free(RegionSector::new(2, 1));
		assert_eq!(manager.end_offset(), 2);
	}

	#[test]
	fn reallocate_in_place_when_it_fits() {
		let mut manager = SectorManager::from_table(&table(&[
			(0, RegionSector::new(2, 3)),
			(1, RegionSector::new(5, 1)),
		]));
		assert_eq!(manager.reallocate(RegionSector::new(2, 3), 1), Some(RegionSector::new(2, 1)));
		assert_eq!(manager.unused_sectors(), &[ManagedSector::new(3, 5)]);
		assert_eq!(manager.reallocate(RegionSector::new(5, 1), 3), Some(RegionSector::new(3, 3)));
	}
}
