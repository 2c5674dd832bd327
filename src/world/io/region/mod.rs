//! The Anvil region container: an 8KiB header (sector table and timestamp
//! table) followed by 4KiB sectors of length-prefixed compressed chunks.

pub mod coord;
pub mod sector;
pub mod timestamp;
pub mod header;
pub mod compressionscheme;
pub mod managedsector;
pub mod sectormanager;
pub mod reader;
pub mod writer;
pub mod regionfile;

pub use coord::ChunkOffset;
pub use compressionscheme::CompressionScheme;
pub use reader::RawChunk;
pub use regionfile::{RegionFile, Encoded};

/// Size of the sector table plus the timestamp table.
pub const HEADER_SIZE: u64 = 8192;

/// Tests if a value is a multiple of 4096.
pub const fn is_multiple_of_4096(n: u64) -> bool {
	(n & 4095) == 0
}

/// Counts the number of 4KiB sectors required to accomodate `size` bytes.
pub const fn required_sectors(size: u64) -> u64 {
	let sub = size >> 12;
	// true => 1 | false => 0
	let overflow = !is_multiple_of_4096(size) as u64;
	sub + overflow
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sector_math() {
		assert_eq!(required_sectors(0), 0);
		assert_eq!(required_sectors(1), 1);
		assert_eq!(required_sectors(4096), 1);
		assert_eq!(required_sectors(4097), 2);
	}
}
