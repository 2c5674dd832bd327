use std::io::{
	Read, Write,
	SeekFrom,
};

use crate::{
	ioext::*,
	McResult,
};

/// Offset and size are packed together.
/// |Offset:3|Size:1|
/// Offset and size are both measured in 4KiB sectors.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct RegionSector(u32);

impl RegionSector {
	/// Provide offset and size in 4KiB chunks.
	pub const fn new(offset: u32, size: u8) -> Self {
		Self((offset << 8) | size as u32)
	}

	/// Creates a new empty RegionSector.
	pub const fn empty() -> Self {
		Self(0)
	}

	/// The 4KiB sector offset.
	/// Multiply this by `4096` to get the seek offset.
	pub const fn sector_offset(&self) -> u64 {
		(self.0 >> 8) as u64
	}

	/// The 4KiB sector offset that marks the end of this sector and the start of
	/// the next.
	pub const fn sector_end_offset(&self) -> u64 {
		self.sector_offset() + self.sector_count()
	}

	/// The 4KiB sector count.
	pub const fn sector_count(&self) -> u64 {
		(self.0 & 0xFF) as u64
	}

	/// The offset in bytes that this sector begins at in the region file.
	pub const fn offset(&self) -> u64 {
		self.sector_offset() * 4096
	}

	/// The offset in bytes that this sector ends at in the region file.
	pub const fn end_offset(&self) -> u64 {
		self.sector_end_offset() * 4096
	}

	/// The size in bytes that this sector occupies.
	pub const fn size(&self) -> u64 {
		self.sector_count() * 4096
	}

	/// A sector with a count of zero holds no chunk, regardless of its offset.
	pub const fn is_empty(&self) -> bool {
		self.sector_count() == 0
	}

	/// Tests if two sectors intersect. Empty sectors never intersect.
	pub const fn intersects(self, rhs: Self) -> bool {
		!self.is_empty()
		&& !rhs.is_empty()
		&& self.sector_offset() < rhs.sector_end_offset()
		&& rhs.sector_offset() < self.sector_end_offset()
	}

	/// Splits this sector into a sector of `sector_count` blocks taken from
	/// the start, and the remainder.
	pub fn split_left(&self, sector_count: u8) -> Option<(Self, Self)> {
		if (sector_count as u64) <= self.sector_count() {
			let lhs_start = self.sector_offset();
			let rhs_start = lhs_start + (sector_count as u64);
			let rhs_count = (self.sector_count() as u8) - sector_count;
			Some((
				RegionSector::new(lhs_start as u32, sector_count),
				RegionSector::new(rhs_start as u32, rhs_count)
			))
		} else {
			None
		}
	}
}

impl Readable for RegionSector {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		Ok(Self(reader.read_value()?))
	}
}

impl Writable for RegionSector {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		writer.write_value(self.0)
	}
}

impl Seekable for RegionSector {
	/// A [SeekFrom] that points to this [RegionSector]
	fn seeker(&self) -> SeekFrom {
		SeekFrom::Start(self.offset())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn packing() {
		let sector = RegionSector::new(5, 3);
		assert_eq!(sector.sector_offset(), 5);
		assert_eq!(sector.sector_count(), 3);
		assert_eq!(sector.offset(), 5 * 4096);
		assert_eq!(sector.end_offset(), 8 * 4096);
	}

	#[test]
	fn intersection() {
		let a = RegionSector::new(2, 2);
		assert!(a.intersects(RegionSector::new(3, 1)));
		assert!(!a.intersects(RegionSector::new(4, 1)));
		assert!(!a.intersects(RegionSector::new(3, 0)));
	}

	#[test]
	fn split() {
		let (left, right) = RegionSector::new(10, 4).split_left(1).unwrap();
		assert_eq!(left, RegionSector::new(10, 1));
		assert_eq!(right, RegionSector::new(11, 3));
		assert!(RegionSector::new(10, 1).split_left(2).is_none());
	}
}
