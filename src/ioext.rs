//! Big-endian binary reading and writing used by the region format.

use std::io::{
	self,
	Read, Write,
	Seek, SeekFrom,
};

use byteorder::{
	BigEndian,
	ReadBytesExt,
	WriteBytesExt,
};

use crate::McResult;

/// A value that can be read from a big-endian stream.
pub trait Readable: Sized {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self>;
}

/// A value that can be written to a big-endian stream.
/// Returns the number of bytes written.
pub trait Writable {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize>;
}

impl Readable for u8 {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		Ok(reader.read_u8()?)
	}
}

impl Writable for u8 {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		writer.write_u8(*self)?;
		Ok(1)
	}
}

impl Readable for u32 {
	fn read_from<R: Read>(reader: &mut R) -> McResult<Self> {
		Ok(reader.read_u32::<BigEndian>()?)
	}
}

impl Writable for u32 {
	fn write_to<W: Write>(&self, writer: &mut W) -> McResult<usize> {
		writer.write_u32::<BigEndian>(*self)?;
		Ok(4)
	}
}

pub trait ReadExt: Read + Sized {
	fn read_value<T: Readable>(&mut self) -> McResult<T> {
		T::read_from(self)
	}
}

impl<R: Read> ReadExt for R {}

pub trait WriteExt: Write + Sized {
	fn write_value<T: Writable>(&mut self, value: T) -> McResult<usize> {
		value.write_to(self)
	}

	/// Writes `count` zeroes to the writer.
	fn write_zeroes(&mut self, count: u64) -> io::Result<u64> {
		const ZEROES: &'static [u8; 4096] = &[0u8; 4096];
		let mut remainder = count;
		while remainder >= ZEROES.len() as u64 {
			self.write_all(ZEROES)?;
			remainder -= ZEROES.len() as u64;
		}
		if remainder != 0 {
			self.write_all(&ZEROES[0..remainder as usize])?;
		}
		Ok(count)
	}
}

impl<W: Write> WriteExt for W {}

/// Something that has a location in a stream.
pub trait Seekable {
	fn seeker(&self) -> SeekFrom;
}

pub trait SeekReturn: Seek {
	/// A [SeekFrom] that returns the stream to its current position.
	fn seek_return(&mut self) -> io::Result<SeekFrom> {
		Ok(SeekFrom::Start(self.stream_position()?))
	}
}

impl<S: Seek> SeekReturn for S {}
