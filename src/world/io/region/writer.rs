use std::io::{
	Write,
	Seek,
};

use crate::{
	ioext::*,
	McResult, McError,
};

use super::{
	header::*,
	reader::RawChunk,
	sector::*,
	required_sectors,
};

/// An abstraction for writing Region files.
/// You pass a writer over to this struct, then you write the header and
/// whatever chunks you need to write. When you're done writing, you can
/// call `.finish()` to take the writer back.
pub struct RegionWriter<W: Write + Seek> {
	writer: W,
}

impl<W: Write + Seek> RegionWriter<W> {
	pub fn new(writer: W) -> Self {
		Self {
			writer,
		}
	}

	/// Seeks to the beginning of the stream and writes a header.
	pub fn write_header(&mut self, header: &RegionHeader) -> McResult<()> {
		let ret = self.writer.seek_return()?;
		self.writer.seek(SectorTable::seeker())?;
		header.write_to(&mut self.writer)?;
		self.writer.seek(ret)?;
		Ok(())
	}

	/// Writes a chunk into `sector`, followed by pad zeroes up to the end
	/// of the sector. The sector must be large enough to hold the chunk.
	pub fn write_raw_chunk(&mut self, sector: RegionSector, chunk: &RawChunk) -> McResult<()> {
		let stored = chunk.stored_len();
		if required_sectors(stored) > sector.sector_count() {
			return Err(McError::RegionAllocationFailure);
		}
		self.writer.seek(sector.seeker())?;
		// The length covers the compression byte and the data.
		self.writer.write_value((chunk.data.len() + 1) as u32)?;
		self.writer.write_value(chunk.scheme)?;
		self.writer.write_all(&chunk.data)?;
		self.writer.write_zeroes(sector.size() - stored)?;
		Ok(())
	}

	/// Returns the inner writer.
	pub fn finish(self) -> W {
		self.writer
	}
}
