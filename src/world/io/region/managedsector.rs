use super::sector::*;

/// Similar to a RegionSector, but not constrained
/// to 255 blocks. Used to track free space in a region file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ManagedSector {
	pub start: u32,
	pub end: u32,
}

impl From<RegionSector> for ManagedSector {
	fn from(value: RegionSector) -> Self {
		ManagedSector::new(
			value.sector_offset() as u32,
			value.sector_end_offset() as u32
		)
	}
}

impl std::fmt::Display for ManagedSector {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "(start: {}, end: {})", self.start, self.end)
	}
}

impl ManagedSector {
	/// The 8KiB header at the start of every region file.
	pub const HEADER: Self = Self::new(0, 2);
	/// Sector offsets are stored in 24 bits.
	pub const MAX_OFFSET: u32 = 0xFF_FFFF;

	/// Create a new [ManagedSector] from the start and end offsets.
	/// Ensure that `start` <= `end`.
	pub const fn new(start: u32, end: u32) -> Self {
		Self {
			start,
			end
		}
	}

	/// Creates the open-ended sector that starts at `end_offset`.
	pub const fn end_sector(end_offset: u32) -> Self {
		Self::new(end_offset, Self::MAX_OFFSET)
	}

	pub const fn size(&self) -> u32 {
		self.end - self.start
	}

	pub const fn is_empty(&self) -> bool {
		self.start >= self.end
	}

	/// Returns true if the two sectors touch or overlap.
	pub const fn adjacent(&self, other: &Self) -> bool {
		self.start <= other.end && other.start <= self.end
	}

	/// Absorbs the other [ManagedSector] and all space in between into
	/// this [ManagedSector].
	pub fn absorb(&mut self, other: Self) {
		self.start = self.start.min(other.start);
		self.end = self.end.max(other.end);
	}

	/// Allocates a [RegionSector] from the start of this [ManagedSector],
	/// reducing the size in the process. Returns `None` if there isn't
	/// enough space.
	pub fn allocate(&mut self, size: u8) -> Option<RegionSector> {
		let new_start = self.start.checked_add(size as u32)?;
		if new_start > self.end {
			return None
		}
		let start = self.start;
		self.start = new_start;
		Some(RegionSector::new(start, size))
	}
}
