use std::io::{Read, Write};

use flate2::{
	Compression,
	read::{GzDecoder, ZlibDecoder},
	write::{GzEncoder, ZlibEncoder},
};

use crate::{
	McResult, McError,
	ioext::*,
};

/// Set on the compression byte when the chunk is stored in a separate `.mcc` file.
pub const EXTERNAL_FLAG: u8 = 0x80;

/// Compression scheme used for writing or reading.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
	/// GZip compression is used.
	GZip = 1,
	/// ZLib compression is used.
	ZLib = 2,
	/// Data is uncompressed.
	Uncompressed = 3,
}

impl CompressionScheme {
	pub fn from_u8(value: u8) -> McResult<Self> {
		match value {
			1 => Ok(Self::GZip),
			2 => Ok(Self::ZLib),
			3 => Ok(Self::Uncompressed),
			unexpected => Err(McError::InvalidCompressionScheme(unexpected)),
		}
	}

	pub const fn id(self) -> u8 {
		self as u8
	}

	pub fn compress(self, data: &[u8]) -> McResult<Vec<u8>> {
		Ok(match self {
			CompressionScheme::GZip => {
				let mut enc = GzEncoder::new(Vec::new(), Compression::default());
				enc.write_all(data)?;
				enc.finish()?
			}
			CompressionScheme::ZLib => {
				let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
				enc.write_all(data)?;
				enc.finish()?
			}
			CompressionScheme::Uncompressed => data.to_vec(),
		})
	}

	/// A broken stream is reported as a malformed payload rather than an IO error.
	pub fn decompress(self, data: &[u8]) -> McResult<Vec<u8>> {
		let mut out = Vec::with_capacity(data.len() * 4);
		let result = match self {
			CompressionScheme::GZip => GzDecoder::new(data).read_to_end(&mut out),
			CompressionScheme::ZLib => ZlibDecoder::new(data).read_to_end(&mut out),
			CompressionScheme::Uncompressed => return Ok(data.to_vec()),
		};
		match result {
			Ok(_) => Ok(out),
			Err(err) => Err(McError::MalformedPayload(format!("{self:?} stream: {err}"))),
		}
	}
}

impl Writable for CompressionScheme {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		writer.write_value(self.id())
	}
}

impl Readable for CompressionScheme {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		Self::from_u8(reader.read_value::<u8>()?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn schemes_round_trip() {
		let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
		for scheme in [CompressionScheme::GZip, CompressionScheme::ZLib, CompressionScheme::Uncompressed] {
			let packed = scheme.compress(&data).unwrap();
			assert_eq!(scheme.decompress(&packed).unwrap(), data);
		}
	}

	#[test]
	fn broken_stream_is_malformed() {
		let err = CompressionScheme::ZLib.decompress(&[1, 2, 3, 4]).unwrap_err();
		assert!(matches!(err, McError::MalformedPayload(_)));
		assert!(matches!(CompressionScheme::from_u8(9), Err(McError::InvalidCompressionScheme(9))));
	}
}
