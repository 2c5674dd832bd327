use std::{
	collections::BTreeMap,
	io::{Cursor, ErrorKind},
	path::Path,
};

use crate::{
	McResult, McError,
	world::io::{read_optional, remove_optional, write_replace},
};

use super::{
	coord::*,
	compressionscheme::CompressionScheme,
	header::*,
	reader::*,
	sector::*,
	sectormanager::*,
	timestamp::*,
	writer::*,
	required_sectors,
	HEADER_SIZE,
};

/// A pending change to a chunk, applied by [RegionFile::encode].
#[derive(Debug, Clone)]
enum Edit {
	Write(RawChunk),
	Remove,
}

/// The result of encoding a [RegionFile].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
	/// The file contents, a multiple of 4096 bytes long.
	Bytes(Vec<u8>),
	/// No chunk remains; the file can be deleted.
	Empty,
}

/// An in-memory region file.
/// Chunks are decompressed lazily. Edits are kept aside until the file is
/// encoded, which reuses freed sectors before growing the file.
#[derive(Debug, Clone, Default)]
pub struct RegionFile {
	header: RegionHeader,
	bytes: Vec<u8>,
	edits: BTreeMap<ChunkOffset, Edit>,
}

impl RegionFile {
	/// An empty region file with no chunks.
	pub fn new() -> Self {
		Self::default()
	}

	/// Validates the sector table of `bytes`.
	/// A zero-length file decodes as an empty region. Sectors that start
	/// inside the header, end past the file, or overlap each other make the
	/// whole file corrupt. Individual payloads are only checked when read.
	pub fn decode(bytes: Vec<u8>) -> McResult<Self> {
		if bytes.is_empty() {
			return Ok(Self::new());
		}
		if (bytes.len() as u64) < HEADER_SIZE {
			return Err(McError::InvalidRegionFile);
		}
		let header = RegionReader::new(Cursor::new(bytes.as_slice())).read_header()?;
		let file_sectors = required_sectors(bytes.len() as u64);
		let mut used = Vec::new();
		for (offset, &sector) in header.sectors.entries() {
			if sector.is_empty() {
				continue;
			}
			if sector.sector_offset() < 2 || sector.sector_end_offset() > file_sectors {
				return Err(McError::SectorOutOfRange(offset));
			}
			used.push((sector, offset));
		}
		used.sort_by_key(|(sector, _)| sector.sector_offset());
		for pair in used.windows(2) {
			let ((lhs, lhs_offset), (rhs, rhs_offset)) = (pair[0], pair[1]);
			if lhs.intersects(rhs) {
				return Err(McError::SectorOverlap(lhs_offset, rhs_offset));
			}
		}
		Ok(Self {
			header,
			bytes,
			edits: BTreeMap::new(),
		})
	}

	/// Reads and decodes the file at `path`. A missing file is `None`.
	pub fn load(path: impl AsRef<Path>) -> McResult<Option<Self>> {
		match read_optional(path)? {
			Some(bytes) => Ok(Some(Self::decode(bytes)?)),
			None => Ok(None),
		}
	}

	/// The header as it was decoded, without pending edits.
	pub fn header(&self) -> &RegionHeader {
		&self.header
	}

	pub fn timestamp(&self, offset: ChunkOffset) -> Timestamp {
		self.header.timestamps[offset]
	}

	/// True if the chunk is present, taking pending edits into account.
	pub fn has_chunk(&self, offset: ChunkOffset) -> bool {
		match self.edits.get(&offset) {
			Some(Edit::Write(_)) => true,
			Some(Edit::Remove) => false,
			None => !self.header.sectors[offset].is_empty(),
		}
	}

	/// Offsets of all present chunks in ascending order.
	pub fn chunks(&self) -> impl Iterator<Item = ChunkOffset> + '_ {
		ChunkOffset::all().filter(move |&offset| self.has_chunk(offset))
	}

	pub fn chunk_count(&self) -> usize {
		self.chunks().count()
	}

	pub fn is_dirty(&self) -> bool {
		!self.edits.is_empty()
	}

	/// The compressed chunk at `offset`, or `None` if it is absent.
	pub fn raw_chunk(&self, offset: ChunkOffset) -> McResult<Option<RawChunk>> {
		match self.edits.get(&offset) {
			Some(Edit::Write(raw)) => return Ok(Some(raw.clone())),
			Some(Edit::Remove) => return Ok(None),
			None => (),
		}
		let mut reader = RegionReader::new(Cursor::new(self.bytes.as_slice()));
		match reader.read_raw_chunk(offset, self.header.sectors[offset]) {
			// A stream that ends early means the declared length is wrong.
			Err(McError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => {
				Err(McError::ChunkLengthOutOfRange(offset))
			}
			result => result,
		}
	}

	/// The decompressed chunk at `offset`, or `None` if it is absent.
	pub fn chunk_data(&self, offset: ChunkOffset) -> McResult<Option<Vec<u8>>> {
		match self.raw_chunk(offset)? {
			Some(raw) => Ok(Some(raw.decompress()?)),
			None => Ok(None),
		}
	}

	/// Stores `payload` at `offset`, compressed with ZLib.
	pub fn set_chunk(&mut self, offset: ChunkOffset, payload: &[u8]) -> McResult<()> {
		let raw = RawChunk::compress(CompressionScheme::ZLib, payload)?;
		self.set_raw_chunk(offset, raw)
	}

	pub fn set_raw_chunk(&mut self, offset: ChunkOffset, raw: RawChunk) -> McResult<()> {
		if required_sectors(raw.stored_len()) > 255 {
			return Err(McError::ChunkTooLarge);
		}
		self.edits.insert(offset, Edit::Write(raw));
		Ok(())
	}

	/// Copies the compressed chunk from `source` without recompressing it.
	/// Returns false if the chunk is absent in `source`.
	pub fn copy_chunk_from(&mut self, source: &RegionFile, offset: ChunkOffset) -> McResult<bool> {
		match source.raw_chunk(offset)? {
			Some(raw) => {
				self.set_raw_chunk(offset, raw)?;
				Ok(true)
			}
			None => Ok(false),
		}
	}

	pub fn remove_chunk(&mut self, offset: ChunkOffset) {
		self.edits.insert(offset, Edit::Remove);
	}

	/// Applies pending edits and produces the bytes of the new file.
	/// Unchanged chunks stay where they are. Returns [Encoded::Empty]
	/// when no chunk remains.
	pub fn encode(&self) -> McResult<Encoded> {
		if self.chunks().next().is_none() {
			return Ok(Encoded::Empty);
		}
		let mut header = self.header.clone();
		let mut manager = SectorManager::from_table(&header.sectors);
		let now = Timestamp::utc_now();
		let mut writes = Vec::with_capacity(self.edits.len());
		for (&offset, edit) in self.edits.iter() {
			let old = header.sectors[offset];
			match edit {
				Edit::Remove => {
					manager.free(old);
					header.sectors[offset] = RegionSector::empty();
					header.timestamps[offset] = Timestamp::default();
				}
				Edit::Write(raw) => {
					let needed = required_sectors(raw.stored_len());
					if needed > 255 {
						return Err(McError::ChunkTooLarge);
					}
					let sector = manager.reallocate_err(old, needed as u8)?;
					header.sectors[offset] = sector;
					header.timestamps[offset] = now;
					writes.push((sector, raw));
				}
			}
		}
		let mut bytes = self.bytes.clone();
		bytes.resize(manager.end_offset() as usize * 4096, 0);
		let mut writer = RegionWriter::new(Cursor::new(bytes));
		writer.write_header(&header)?;
		for (sector, raw) in writes {
			writer.write_raw_chunk(sector, raw)?;
		}
		Ok(Encoded::Bytes(writer.finish().into_inner()))
	}

	/// Encodes the file and writes it to `path` through a temporary file.
	/// If no chunk remains the file at `path` is deleted instead.
	/// Returns true if a file was written.
	pub fn save(&self, path: impl AsRef<Path>) -> McResult<bool> {
		match self.encode()? {
			Encoded::Bytes(bytes) => {
				write_replace(path, &bytes)?;
				Ok(true)
			}
			Encoded::Empty => {
				remove_optional(path)?;
				Ok(false)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ioext::*;

	fn payload(seed: usize) -> Vec<u8> {
		(0..(seed * 37 % 900 + 10)).map(|i| (i * seed) as u8).collect()
	}

	fn encode_bytes(file: &RegionFile) -> Vec<u8> {
		match file.encode().unwrap() {
			Encoded::Bytes(bytes) => bytes,
			Encoded::Empty => panic!("expected bytes"),
		}
	}

	#[test]
	fn round_trip() {
		let mut file = RegionFile::new();
		let offsets = [0usize, 1, 31, 32, 500, 1023];
		for &index in &offsets {
			file.set_chunk(ChunkOffset::from_index(index), &payload(index + 1)).unwrap();
		}
		let bytes = encode_bytes(&file);
		assert_eq!(bytes.len() % 4096, 0);
		let decoded = RegionFile::decode(bytes).unwrap();
		assert_eq!(decoded.chunk_count(), offsets.len());
		for &index in &offsets {
			let offset = ChunkOffset::from_index(index);
			assert_eq!(decoded.chunk_data(offset).unwrap(), Some(payload(index + 1)));
			assert!(decoded.timestamp(offset).seconds() > 0);
		}
		assert_eq!(decoded.chunk_data(ChunkOffset::new(2, 0)).unwrap(), None);
	}

	#[test]
	fn removing_every_chunk_is_empty() {
		let mut file = RegionFile::new();
		file.set_chunk(ChunkOffset::new(4, 4), b"data").unwrap();
		let mut decoded = RegionFile::decode(encode_bytes(&file)).unwrap();
		decoded.remove_chunk(ChunkOffset::new(4, 4));
		assert_eq!(decoded.encode().unwrap(), Encoded::Empty);
		assert_eq!(RegionFile::new().encode().unwrap(), Encoded::Empty);
	}

	#[test]
	fn rewrite_reuses_space() {
		let mut file = RegionFile::new();
		for index in 0..4 {
			file.set_chunk(ChunkOffset::from_index(index), &payload(index + 3)).unwrap();
		}
		let original = encode_bytes(&file);
		let mut decoded = RegionFile::decode(original.clone()).unwrap();
		decoded.remove_chunk(ChunkOffset::from_index(1));
		decoded.set_chunk(ChunkOffset::from_index(2), b"small").unwrap();
		let rewritten = encode_bytes(&decoded);
		assert!(rewritten.len() <= original.len());
		let again = RegionFile::decode(rewritten).unwrap();
		assert_eq!(again.chunk_count(), 3);
		assert_eq!(again.chunk_data(ChunkOffset::from_index(0)).unwrap(), Some(payload(3)));
		assert_eq!(again.chunk_data(ChunkOffset::from_index(2)).unwrap(), Some(b"small".to_vec()));
		assert_eq!(again.chunk_data(ChunkOffset::from_index(3)).unwrap(), Some(payload(6)));
	}

	#[test]
	fn raw_copy_keeps_bytes() {
		let mut source = RegionFile::new();
		source.set_raw_chunk(
			ChunkOffset::new(1, 1),
			RawChunk::compress(CompressionScheme::GZip, b"gzip payload").unwrap(),
		).unwrap();
		let source = RegionFile::decode(encode_bytes(&source)).unwrap();
		let mut target = RegionFile::new();
		assert!(target.copy_chunk_from(&source, ChunkOffset::new(1, 1)).unwrap());
		assert!(!target.copy_chunk_from(&source, ChunkOffset::new(2, 1)).unwrap());
		let target = RegionFile::decode(encode_bytes(&target)).unwrap();
		let raw = target.raw_chunk(ChunkOffset::new(1, 1)).unwrap().unwrap();
		assert_eq!(raw.scheme, CompressionScheme::GZip);
		assert_eq!(raw.decompress().unwrap(), b"gzip payload");
	}

	#[test]
	fn short_file_is_corrupt() {
		assert!(matches!(RegionFile::decode(vec![0; 100]), Err(McError::InvalidRegionFile)));
		assert_eq!(RegionFile::decode(Vec::new()).unwrap().chunk_count(), 0);
	}

	#[test]
	fn sector_past_end_is_corrupt() {
		let mut header = RegionHeader::default();
		header.sectors[ChunkOffset::new(0, 0)] = RegionSector::new(2, 1);
		header.sectors[ChunkOffset::new(1, 0)] = RegionSector::new(9, 1);
		let mut bytes = Vec::new();
		header.write_to(&mut bytes).unwrap();
		bytes.write_zeroes(4096).unwrap();
		assert!(matches!(
			RegionFile::decode(bytes),
			Err(McError::SectorOutOfRange(offset)) if offset == ChunkOffset::new(1, 0)
		));
	}

	#[test]
	fn overlapping_sectors_are_corrupt() {
		let mut header = RegionHeader::default();
		header.sectors[ChunkOffset::new(0, 0)] = RegionSector::new(2, 2);
		header.sectors[ChunkOffset::new(1, 0)] = RegionSector::new(3, 1);
		let mut bytes = Vec::new();
		header.write_to(&mut bytes).unwrap();
		bytes.write_zeroes(4096 * 2).unwrap();
		assert!(matches!(RegionFile::decode(bytes), Err(McError::SectorOverlap(..))));
	}

	#[test]
	fn bad_chunk_only_affects_that_chunk() {
		let mut file = RegionFile::new();
		file.set_chunk(ChunkOffset::new(0, 0), b"good").unwrap();
		file.set_chunk(ChunkOffset::new(1, 0), b"bad").unwrap();
		let mut bytes = encode_bytes(&file);
		let decoded = RegionFile::decode(bytes.clone()).unwrap();
		let bad = decoded.header().sectors[ChunkOffset::new(1, 0)];
		// Corrupt the compression byte.
		bytes[bad.offset() as usize + 4] = 42;
		let decoded = RegionFile::decode(bytes).unwrap();
		assert_eq!(decoded.chunk_data(ChunkOffset::new(0, 0)).unwrap(), Some(b"good".to_vec()));
		assert!(matches!(
			decoded.chunk_data(ChunkOffset::new(1, 0)),
			Err(McError::InvalidCompressionScheme(42))
		));
	}

	#[test]
	fn save_and_delete() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("region").join("r.0.0.mca");
		let mut file = RegionFile::new();
		file.set_chunk(ChunkOffset::new(3, 3), b"saved").unwrap();
		assert!(file.save(&path).unwrap());
		let mut loaded = RegionFile::load(&path).unwrap().unwrap();
		assert_eq!(loaded.chunk_data(ChunkOffset::new(3, 3)).unwrap(), Some(b"saved".to_vec()));
		loaded.remove_chunk(ChunkOffset::new(3, 3));
		assert!(!loaded.save(&path).unwrap());
		assert!(!path.exists());
		assert!(RegionFile::load(&path).unwrap().is_none());
	}
}
