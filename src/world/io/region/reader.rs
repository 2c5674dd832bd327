use std::io::{
	Read,
	Seek,
};

use crate::{
	McResult, McError,
	ioext::*,
};

use super::{
	coord::*,
	sector::*,
	header::*,
	compressionscheme::*,
};

/// A chunk payload exactly as it is stored in a region file:
/// the compression scheme and the compressed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
	pub scheme: CompressionScheme,
	pub data: Vec<u8>,
}

impl RawChunk {
	/// Compresses `payload` with `scheme`.
	pub fn compress(scheme: CompressionScheme, payload: &[u8]) -> McResult<Self> {
		Ok(Self {
			scheme,
			data: scheme.compress(payload)?,
		})
	}

	pub fn decompress(&self) -> McResult<Vec<u8>> {
		self.scheme.decompress(&self.data)
	}

	/// Bytes this chunk occupies in a sector: length prefix, scheme byte, data.
	pub fn stored_len(&self) -> u64 {
		self.data.len() as u64 + 5
	}
}

/// An abstraction for reading Region files.
/// You pass a reader over to this struct, then you read the
/// header/chunks that you need. When you're done reading, you can
/// call `.finish()` to take the reader back.
pub struct RegionReader<R: Read + Seek> {
	reader: R,
}

impl<R: Read + Seek> RegionReader<R> {
	pub fn new(reader: R) -> Self {
		Self {
			reader,
		}
	}

	/// Read the 8KiB header from the start of the stream.
	pub fn read_header(&mut self) -> McResult<RegionHeader> {
		self.reader.seek(SectorTable::seeker())?;
		let sectors = SectorTable::read_from(&mut self.reader)?;
		self.reader.seek(TimestampTable::seeker())?;
		let timestamps = TimestampTable::read_from(&mut self.reader)?;
		Ok(RegionHeader {
			sectors,
			timestamps,
		})
	}

	/// Read the raw chunk stored in `sector`.
	/// Returns `None` if the sector is empty or the stored length is zero.
	/// `coord` is only used to label errors.
	pub fn read_raw_chunk(&mut self, coord: ChunkOffset, sector: RegionSector) -> McResult<Option<RawChunk>> {
		if sector.is_empty() {
			return Ok(None);
		}
		self.reader.seek(sector.seeker())?;
		let length = self.reader.read_value::<u32>()? as u64;
		if length == 0 {
			return Ok(None);
		}
		// The length includes the compression byte but not itself.
		if length + 4 > sector.size() {
			return Err(McError::ChunkLengthOutOfRange(coord));
		}
		let scheme_id = self.reader.read_value::<u8>()?;
		if scheme_id & EXTERNAL_FLAG != 0 {
			return Err(McError::ExternalChunk(coord));
		}
		let scheme = CompressionScheme::from_u8(scheme_id)?;
		let mut data = Vec::with_capacity((length - 1) as usize);
		(&mut self.reader).take(length - 1).read_to_end(&mut data)?;
		if data.len() as u64 != length - 1 {
			return Err(McError::ChunkLengthOutOfRange(coord));
		}
		Ok(Some(RawChunk {
			scheme,
			data,
		}))
	}

	/// Finish reading and return the contained reader.
	pub fn finish(self) -> R {
		self.reader
	}
}
