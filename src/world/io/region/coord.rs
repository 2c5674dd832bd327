use crate::math::coord::ChunkPos;

/// A region file contains up to 1024 chunks, which is 32x32 chunks.
/// This struct represents a chunk coordinate within a region file.
/// The coordinate is packed as `x | z << 5`, which is also the index of
/// the chunk in the header tables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct ChunkOffset(u16);

impl ChunkOffset {
	/// Number of chunks in a region.
	pub const COUNT: usize = 1024;

	/// Create a new ChunkOffset.
	/// The x and z are wrapped into `[0, 32)`, so `(32, 33)` becomes `(0, 1)`.
	pub const fn new(x: u16, z: u16) -> Self {
		let xmod = x & 31;
		let zmod = z & 31;
		Self(xmod | (zmod << 5))
	}

	/// Panics in debug builds if `index` is not below 1024.
	#[inline(always)]
	pub const fn from_index(index: usize) -> Self {
		debug_assert!(index < Self::COUNT);
		Self((index & 1023) as u16)
	}

	/// The offset of an absolute chunk within its region.
	#[inline(always)]
	pub const fn of(chunk: ChunkPos) -> Self {
		Self::new((chunk.x & 31) as u16, (chunk.z & 31) as u16)
	}

	#[inline(always)]
	pub const fn index(&self) -> usize {
		self.0 as usize
	}

	#[inline(always)]
	pub const fn x(&self) -> i32 {
		(self.0 & 31) as i32
	}

	#[inline(always)]
	pub const fn z(&self) -> i32 {
		((self.0 >> 5) & 31) as i32
	}

	/// All 1024 offsets in ascending index order (rows of x for each z).
	pub fn all() -> impl Iterator<Item = ChunkOffset> + Clone {
		(0..Self::COUNT).map(ChunkOffset::from_index)
	}
}

impl From<(u16, u16)> for ChunkOffset {
	fn from(value: (u16, u16)) -> Self {
		Self::new(value.0, value.1)
	}
}

impl From<ChunkPos> for ChunkOffset {
	fn from(value: ChunkPos) -> Self {
		Self::of(value)
	}
}

impl From<ChunkOffset> for (i32, i32) {
	fn from(value: ChunkOffset) -> Self {
		(value.x(), value.z())
	}
}

impl std::fmt::Display for ChunkOffset {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "({}, {})", self.x(), self.z())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn packing() {
		let offset = ChunkOffset::new(3, 2);
		assert_eq!(offset.index(), 3 + 2 * 32);
		assert_eq!((offset.x(), offset.z()), (3, 2));
		assert_eq!(ChunkOffset::new(35, 33), ChunkOffset::new(3, 1));
		assert_eq!(ChunkOffset::from_index(1023), ChunkOffset::new(31, 31));
	}

	#[test]
	fn all_is_row_major() {
		let all: Vec<ChunkOffset> = ChunkOffset::all().collect();
		assert_eq!(all.len(), 1024);
		assert_eq!(all[1], ChunkOffset::new(1, 0));
		assert_eq!(all[32], ChunkOffset::new(0, 1));
		assert!(all.windows(2).all(|w| w[0] < w[1]));
	}
}
