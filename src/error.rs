use std::path::PathBuf;

use thiserror::Error;

use crate::world::io::region::coord::ChunkOffset;

/// The master error type.
#[derive(Debug, Error)]
pub enum McError {
	#[error("IO Error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Invalid Compression value: {0}")]
	InvalidCompressionScheme(u8),
	#[error("Chunk {0} is stored in an external file.")]
	ExternalChunk(ChunkOffset),
	#[error("Region file is too small to contain a header.")]
	InvalidRegionFile,
	#[error("Sector for chunk {0} lies outside of the region file.")]
	SectorOutOfRange(ChunkOffset),
	#[error("Sectors for chunks {0} and {1} overlap.")]
	SectorOverlap(ChunkOffset, ChunkOffset),
	#[error("Chunk {0} declares a length that does not fit its sector.")]
	ChunkLengthOutOfRange(ChunkOffset),
	#[error("Malformed chunk payload: {0}")]
	MalformedPayload(String),
	#[error("Attempted to write chunk data that takes up more that 255 4KiB blocks.")]
	ChunkTooLarge,
	#[error("Failed to allocate RegionSector.")]
	RegionAllocationFailure,
	#[error("Counter overflow.")]
	Overflow,
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	#[error("Selection line {line}: {message}")]
	SelectionParse {
		line: usize,
		message: String,
	},
	#[error("World Directory not found. {0}")]
	WorldDirectoryNotFound(PathBuf),
	#[error("Job panicked.")]
	JobPanicked,
}

impl McError {
	/// Corruption errors are scoped to a single file or chunk. They are
	/// logged and the data is treated as absent.
	pub fn is_corruption(&self) -> bool {
		matches!(self,
			McError::InvalidCompressionScheme(_)
			| McError::ExternalChunk(_)
			| McError::InvalidRegionFile
			| McError::SectorOutOfRange(_)
			| McError::SectorOverlap(..)
			| McError::ChunkLengthOutOfRange(_)
			| McError::MalformedPayload(_)
		)
	}

	pub(crate) fn parse<S: Into<String>>(line: usize, message: S) -> Self {
		McError::SelectionParse {
			line,
			message: message.into(),
		}
	}
}

pub type McResult<T> = Result<T,McError>;
