use crate::{
	ioext::*,
	McResult, McError,
};

use super::sector::*;
use super::timestamp::*;
use super::coord::*;

use std::{
	fmt::Debug,
	io::{
		Read, Write,
		SeekFrom,
	},
	ops::{
		Index, IndexMut,
	},
};

/// This trait defines the offset in a file where
/// a table can be found for a specific type.
/// It is implemented for [RegionSector] and [Timestamp].
pub trait RegionTableItem {
	/// The offset in the file that this type's table begins.
	const OFFSET: u64;
}

impl RegionTableItem for RegionSector {
	const OFFSET: u64 = 0;
}

impl RegionTableItem for Timestamp {
	const OFFSET: u64 = 4096;
}

/// A table of 1024 elements that contain information related to
/// a Minecraft chunk within a Region file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTable<T: RegionTableItem>(Box<[T; 1024]>);

/// A table of 1024 [RegionSector] elements for each potential chunk in
/// a 32x32 chunk region file.
pub type SectorTable = RegionTable<RegionSector>;

/// A table of 1024 [Timestamp] elements for each potential chunk in a
/// 32x32 chunk region file.
pub type TimestampTable = RegionTable<Timestamp>;

/// The header at the beginning of every region file.
/// It contains 1024 [RegionSector] elements and 1024 [Timestamp] elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionHeader {
	/// Where chunks live in the file.
	pub sectors: SectorTable,
	/// Last modification time of each chunk.
	pub timestamps: TimestampTable,
}

impl<T: RegionTableItem> RegionTable<T> {
	pub const OFFSET: u64 = T::OFFSET;

	/// Returns a [SeekFrom] value that will seek to the
	/// beginning of the table.
	pub const fn seeker() -> SeekFrom {
		SeekFrom::Start(Self::OFFSET)
	}

	pub fn iter(&self) -> std::slice::Iter<T> {
		self.0.iter()
	}

	/// Pairs each element with the [ChunkOffset] it belongs to.
	pub fn entries(&self) -> impl Iterator<Item = (ChunkOffset, &T)> {
		self.0.iter()
			.enumerate()
			.map(|(index, item)| (ChunkOffset::from_index(index), item))
	}
}

impl<T: Default + Copy + RegionTableItem> Default for RegionTable<T> {
	fn default() -> Self {
		Self(Box::new([T::default(); 1024]))
	}
}

impl<T: RegionTableItem> Index<ChunkOffset> for RegionTable<T> {
	type Output = T;

	fn index(&self, index: ChunkOffset) -> &Self::Output {
		&self.0[index.index()]
	}
}

impl<T: RegionTableItem> IndexMut<ChunkOffset> for RegionTable<T> {
	fn index_mut(&mut self, index: ChunkOffset) -> &mut Self::Output {
		&mut self.0[index.index()]
	}
}

impl<T: Readable + Debug + RegionTableItem> Readable for RegionTable<T> {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		let table: Box<[T]> = (0..1024).map(|_| {
			T::read_from(reader)
		}).collect::<McResult<Box<[T]>>>()?;
		let table: Box<[T; 1024]> = table.try_into()
			.map_err(|_| McError::InvalidRegionFile)?;
		Ok(Self(table))
	}
}

impl<T: Writable + RegionTableItem> Writable for RegionTable<T> {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		let mut write_size: usize = 0;
		for item in self.0.iter() {
			write_size += item.write_to(writer)?;
		}
		Ok(write_size)
	}
}

impl Readable for RegionHeader {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		Ok(Self {
			sectors: SectorTable::read_from(reader)?,
			timestamps: TimestampTable::read_from(reader)?,
		})
	}
}

impl Writable for RegionHeader {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		Ok(
			self.sectors.write_to(writer)? + self.timestamps.write_to(writer)?
		)
	}
}
