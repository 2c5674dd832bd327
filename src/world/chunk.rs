use crate::math::coord::ChunkPos;

use super::{FileKind, Triad};

/// The decompressed payloads of one chunk, one per file kind that holds it.
/// Payloads replaced through [ChunkRecord::set_data] or
/// [ChunkRecord::remove_data] are marked dirty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
	pos: ChunkPos,
	payloads: Triad<Vec<u8>>,
	dirty: [bool; 3],
}

impl ChunkRecord {
	pub fn new(pos: ChunkPos, payloads: Triad<Vec<u8>>) -> Self {
		Self {
			pos,
			payloads,
			dirty: [false; 3],
		}
	}

	/// Absolute chunk position.
	pub fn pos(&self) -> ChunkPos {
		self.pos
	}

	pub fn data(&self, kind: FileKind) -> Option<&[u8]> {
		self.payloads.get(kind).map(Vec::as_slice)
	}

	pub fn has(&self, kind: FileKind) -> bool {
		self.payloads.contains(kind)
	}

	/// Sum of the decompressed payload sizes.
	pub fn total_len(&self) -> usize {
		self.payloads.iter().map(|(_, data)| data.len()).sum()
	}

	pub fn set_data(&mut self, kind: FileKind, data: Vec<u8>) {
		self.payloads.insert(kind, data);
		self.dirty[kind.index()] = true;
	}

	pub fn remove_data(&mut self, kind: FileKind) -> Option<Vec<u8>> {
		let old = self.payloads.take(kind);
		if old.is_some() {
			self.dirty[kind.index()] = true;
		}
		old
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty.iter().any(|&dirty| dirty)
	}

	pub fn dirty_kinds(&self) -> impl Iterator<Item = FileKind> + '_ {
		FileKind::ALL.into_iter().filter(|kind| self.dirty[kind.index()])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edits_mark_dirty() {
		let mut payloads = Triad::new();
		payloads.insert(FileKind::Region, vec![1, 2, 3]);
		payloads.insert(FileKind::Poi, vec![4]);
		let mut record = ChunkRecord::new(ChunkPos::new(-3, 7), payloads);
		assert_eq!(record.total_len(), 4);
		assert!(!record.is_dirty());
		assert_eq!(record.remove_data(FileKind::Entities), None);
		assert!(!record.is_dirty());
		record.remove_data(FileKind::Poi);
		record.set_data(FileKind::Entities, vec![9, 9]);
		assert_eq!(
			record.dirty_kinds().collect::<Vec<_>>(),
			vec![FileKind::Poi, FileKind::Entities]
		);
		assert_eq!(record.data(FileKind::Entities), Some(&[9u8, 9][..]));
	}
}
