//! World coordinates for regions and chunks.
//!
//! A region is a 32x32 tile of chunks. Region coordinates are the chunk
//! coordinates floor-divided by 32, so negative chunks belong to negative
//! regions (chunk `-1` lives in region `-1` at offset `31`).

use crate::world::io::region::coord::ChunkOffset;

/// Number of chunks along one side of a region.
pub const REGION_SIZE: i32 = 32;

/// The position of a region in the world grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionPos {
	pub x: i32,
	pub z: i32,
}

/// The absolute position of a chunk in the world grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkPos {
	pub x: i32,
	pub z: i32,
}

impl RegionPos {
	#[inline(always)]
	pub const fn new(x: i32, z: i32) -> Self {
		Self { x, z }
	}

	/// The region that contains `chunk`.
	#[inline(always)]
	pub const fn of_chunk(chunk: ChunkPos) -> Self {
		// Arithmetic shift floors toward negative infinity.
		Self::new(chunk.x >> 5, chunk.z >> 5)
	}

	/// The chunk at offset `(0, 0)` of this region.
	#[inline(always)]
	pub const fn chunk_origin(self) -> ChunkPos {
		ChunkPos::new(self.x << 5, self.z << 5)
	}

	/// The absolute position of the chunk at `offset` inside this region.
	#[inline(always)]
	pub fn chunk(self, offset: ChunkOffset) -> ChunkPos {
		ChunkPos::from_parts(self, offset)
	}
}

impl ChunkPos {
	#[inline(always)]
	pub const fn new(x: i32, z: i32) -> Self {
		Self { x, z }
	}

	/// Inverse of [ChunkPos::region] + [ChunkPos::offset].
	#[inline(always)]
	pub fn from_parts(region: RegionPos, offset: ChunkOffset) -> Self {
		let origin = region.chunk_origin();
		Self::new(
			origin.x + offset.x(),
			origin.z + offset.z(),
		)
	}

	#[inline(always)]
	pub const fn region(self) -> RegionPos {
		RegionPos::of_chunk(self)
	}

	/// The offset of this chunk within its region. Both components are in `[0, 32)`.
	#[inline(always)]
	pub fn offset(self) -> ChunkOffset {
		ChunkOffset::of(self)
	}

	#[inline(always)]
	pub fn add(self, dx: i32, dz: i32) -> Self {
		Self::new(self.x + dx, self.z + dz)
	}
}

impl From<(i32, i32)> for RegionPos {
	fn from(value: (i32, i32)) -> Self {
		RegionPos::new(value.0, value.1)
	}
}

impl From<(i32, i32)> for ChunkPos {
	fn from(value: (i32, i32)) -> Self {
		ChunkPos::new(value.0, value.1)
	}
}

impl std::fmt::Display for RegionPos {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "r.{}.{}", self.x, self.z)
	}
}

impl std::fmt::Display for ChunkPos {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}, {}]", self.x, self.z)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn negative_chunks_floor() {
		assert_eq!(RegionPos::of_chunk(ChunkPos::new(-1, -33)), RegionPos::new(-1, -2));
		assert_eq!(ChunkPos::new(-1, -33).offset(), ChunkOffset::new(31, 31));
		assert_eq!(RegionPos::of_chunk(ChunkPos::new(31, 32)), RegionPos::new(0, 1));
	}

	#[test]
	fn region_offset_round_trip() {
		let regions = [
			RegionPos::new(0, 0),
			RegionPos::new(-1, 0),
			RegionPos::new(5, -7),
			RegionPos::new(-1000, 1000),
			RegionPos::new(i32::MAX >> 5, i32::MIN >> 5),
		];
		for region in regions {
			for offset in ChunkOffset::all() {
				let chunk = ChunkPos::from_parts(region, offset);
				assert_eq!(RegionPos::of_chunk(chunk), region);
				assert_eq!(ChunkOffset::of(chunk), offset);
			}
		}
	}
}
