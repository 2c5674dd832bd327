//! Plain text persistence for [SelectionMap].
//!
//! One record per line, fields separated by `;`:
//! - `rx;rz` selects the whole region.
//! - `rx;rz;cx;cz` selects one chunk by absolute chunk coordinates, which
//!   must lie inside region `rx;rz`.
//! - `inverted` marks the selection as inverted.
//!
//! Blank lines are ignored.

use std::{
	fs::File,
	io::{BufRead, BufReader, BufWriter, Write},
	path::Path,
};

use crate::{
	McResult, McError,
	math::coord::{ChunkPos, RegionPos},
};

use super::{RegionSelection, SelectionMap};

const INVERTED: &str = "inverted";

pub fn read_selection<R: BufRead>(reader: R) -> McResult<SelectionMap> {
	let mut map = SelectionMap::new();
	for (index, line) in reader.lines().enumerate() {
		let line = line?;
		let number = index + 1;
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		if line.eq_ignore_ascii_case(INVERTED) {
			map.set_inverted(true);
			continue;
		}
		let fields = line.split(';')
			.map(|field| {
				field.trim().parse::<i32>()
					.map_err(|err| McError::parse(number, format!("{field:?}: {err}")))
			})
			.collect::<McResult<Vec<i32>>>()?;
		match fields[..] {
			[rx, rz] => map.insert_region(RegionPos::new(rx, rz)),
			[rx, rz, cx, cz] => {
				let region = RegionPos::new(rx, rz);
				let chunk = ChunkPos::new(cx, cz);
				if chunk.region() != region {
					return Err(McError::parse(number, format!("chunk {chunk} is not in region {region}")));
				}
				map.insert_chunk(chunk);
			}
			_ => return Err(McError::parse(number, format!("expected 2 or 4 fields, found {}", fields.len()))),
		}
	}
	Ok(map)
}

/// Writes regions in sorted order. Regions with an empty subset have no
/// records and are not written.
pub fn write_selection<W: Write>(mut writer: W, map: &SelectionMap) -> McResult<()> {
	if map.is_inverted() {
		writeln!(writer, "{INVERTED}")?;
	}
	for (pos, selection) in map.sorted() {
		match selection {
			RegionSelection::All => writeln!(writer, "{};{}", pos.x, pos.z)?,
			RegionSelection::Chunks(set) => {
				for offset in set.iter() {
					let chunk = pos.chunk(offset);
					writeln!(writer, "{};{};{};{}", pos.x, pos.z, chunk.x, chunk.z)?;
				}
			}
		}
	}
	writer.flush()?;
	Ok(())
}

pub fn load_selection<P: AsRef<Path>>(path: P) -> McResult<SelectionMap> {
	read_selection(BufReader::new(File::open(path)?))
}

pub fn save_selection<P: AsRef<Path>>(path: P, map: &SelectionMap) -> McResult<()> {
	write_selection(BufWriter::new(File::create(path)?), map)
}
