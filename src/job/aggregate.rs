use crate::{
	McResult, McError,
	math::coord::{ChunkPos, RegionPos},
	progress::Progress,
	selection::RegionSelection,
	transform::{Outcome, Transform},
	world::{
		io::region::{required_sectors, ChunkOffset, CompressionScheme, RawChunk, RegionFile},
		ChunkRecord,
		FileKind,
		RegionFiles,
		Triad,
	},
};

/// Counts from one pass of [ChunkAggregator::for_each].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
	/// Chunks handed to the transform.
	pub visited: usize,
	/// Chunks that failed to decode or whose transform failed.
	pub skipped: usize,
	/// True if iteration stopped because the operation was cancelled.
	pub cancelled: bool,
}

/// Joins the decoded files of one region so each chunk can be seen as a
/// single [ChunkRecord] across all file kinds.
#[derive(Debug, Default)]
pub struct ChunkAggregator {
	region: RegionPos,
	files: Triad<RegionFile>,
	/// Kinds whose file exists but could not be decoded. They are never
	/// written to.
	unreadable: [bool; 3],
}

impl ChunkAggregator {
	pub fn new(region: RegionPos, files: Triad<RegionFile>) -> Self {
		Self {
			region,
			files,
			unreadable: [false; 3],
		}
	}

	/// Decodes raw file contents. A corrupt file is logged and treated as
	/// absent.
	pub fn decode(region: RegionPos, mut raw: Triad<Vec<u8>>) -> Self {
		let mut aggregator = Self::new(region, Triad::new());
		for kind in FileKind::ALL {
			let Some(bytes) = raw.take(kind) else {
				continue;
			};
			match RegionFile::decode(bytes) {
				Ok(file) => {
					aggregator.files.insert(kind, file);
				}
				Err(err) => {
					log::warn!("skipping corrupt {kind} file for region {region}: {err}");
					aggregator.unreadable[kind.index()] = true;
				}
			}
		}
		aggregator
	}

	pub fn region(&self) -> RegionPos {
		self.region
	}

	pub fn files(&self) -> &Triad<RegionFile> {
		&self.files
	}

	pub fn into_files(self) -> Triad<RegionFile> {
		self.files
	}

	pub fn is_unreadable(&self, kind: FileKind) -> bool {
		self.unreadable[kind.index()]
	}

	/// True if any kind holds the chunk.
	pub fn has_chunk(&self, offset: ChunkOffset) -> bool {
		self.files.iter().any(|(_, file)| file.has_chunk(offset))
	}

	/// Builds the record for `offset`, or `None` if no kind holds the chunk.
	pub fn record(&self, offset: ChunkOffset) -> McResult<Option<ChunkRecord>> {
		let mut payloads = Triad::new();
		for (kind, file) in self.files.iter() {
			if let Some(data) = file.chunk_data(offset)? {
				payloads.insert(kind, data);
			}
		}
		if payloads.is_empty() {
			return Ok(None);
		}
		Ok(Some(ChunkRecord::new(self.region.chunk(offset), payloads)))
	}

	/// Runs `transform` on every selected chunk that exists and hands the
	/// outcome to `sink`.
	///
	/// Cancellation is checked before each chunk. A chunk that fails to
	/// decode, or whose transform fails, is logged and skipped. Dirty
	/// payloads from a mutating transform are written back into the files.
	/// An error from `sink` stops iteration and is returned.
	pub fn for_each<F>(
		&mut self,
		selection: &RegionSelection,
		progress: &Progress,
		transform: &Transform,
		mut sink: F,
	) -> McResult<Visit>
	where F: FnMut(ChunkPos, Outcome) -> McResult<()> {
		let mut visit = Visit::default();
		for offset in selection.iter() {
			if progress.task_cancelled() {
				visit.cancelled = true;
				break;
			}
			let chunk = self.region.chunk(offset);
			match self.record(offset) {
				Ok(None) => (),
				Ok(Some(mut record)) => match transform.apply(&mut record) {
					Ok(outcome) => {
						let dirty = matches!(outcome, Outcome::Mutated(true)) && record.is_dirty();
						if dirty {
							if let Err(err) = self.apply(&record) {
								log::warn!("not writing chunk {chunk}: {err}");
								visit.skipped += 1;
								progress.increment("chunk", 1);
								continue;
							}
						}
						visit.visited += 1;
						sink(chunk, outcome)?;
					}
					Err(err) => {
						log::warn!("transform failed for chunk {chunk}: {err}");
						visit.skipped += 1;
					}
				},
				Err(err) => {
					log::warn!("skipping chunk {chunk}: {err}");
					visit.skipped += 1;
				}
			}
			progress.increment("chunk", 1);
		}
		Ok(visit)
	}

	/// Writes the dirty payloads of `record` into the files, creating a file
	/// for a kind that had none. Payloads are compressed before any file is
	/// touched, so on error no kind of the chunk is changed.
	pub fn apply(&mut self, record: &ChunkRecord) -> McResult<()> {
		let offset = record.pos().offset();
		let mut staged = Vec::new();
		for kind in record.dirty_kinds() {
			if self.is_unreadable(kind) {
				log::warn!("not writing chunk {} into corrupt {kind} file", record.pos());
				continue;
			}
			let raw = match record.data(kind) {
				Some(data) => {
					let raw = RawChunk::compress(CompressionScheme::ZLib, data)?;
					if required_sectors(raw.stored_len()) > 255 {
						return Err(McError::ChunkTooLarge);
					}
					Some(raw)
				}
				None => None,
			};
			staged.push((kind, raw));
		}
		for (kind, raw) in staged {
			match raw {
				Some(raw) => self.files.get_or_insert_with(kind, RegionFile::new).set_raw_chunk(offset, raw)?,
				None => {
					if let Some(file) = self.files.get_mut(kind) {
						file.remove_chunk(offset);
					}
				}
			}
		}
		Ok(())
	}

	/// Removes the chunk from every readable file.
	pub fn remove_chunk(&mut self, offset: ChunkOffset) {
		for (_, file) in self.files.iter_mut() {
			if file.has_chunk(offset) {
				file.remove_chunk(offset);
			}
		}
	}

	pub fn is_dirty(&self) -> bool {
		self.files.iter().any(|(_, file)| file.is_dirty())
	}

	/// Writes every dirty file to its path in `paths`. Files left without
	/// chunks are deleted. Returns the number of files touched.
	pub fn save(&self, paths: &RegionFiles) -> McResult<usize> {
		let mut touched = 0;
		for (kind, file) in self.files.iter() {
			if !file.is_dirty() {
				continue;
			}
			let path = paths.path(kind);
			if file.save(path)? {
				log::debug!("wrote {}", path.display());
			} else {
				log::debug!("deleted empty {}", path.display());
			}
			touched += 1;
		}
		Ok(touched)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::{rngs::StdRng, Rng, SeedableRng};
	use crate::{
		selection::ChunkSet,
		world::io::region::Encoded,
	};

	fn encoded(file: &RegionFile) -> Vec<u8> {
		match file.encode().unwrap() {
			Encoded::Bytes(bytes) => bytes,
			Encoded::Empty => Vec::new(),
		}
	}

	fn aggregator() -> ChunkAggregator {
		let mut region = RegionFile::new();
		let mut entities = RegionFile::new();
		for index in 0..4 {
			region.set_chunk(ChunkOffset::from_index(index), &[index as u8; 8]).unwrap();
		}
		entities.set_chunk(ChunkOffset::from_index(1), &[9; 3]).unwrap();
		let mut raw = Triad::new();
		raw.insert(FileKind::Region, encoded(&region));
		raw.insert(FileKind::Entities, encoded(&entities));
		raw.insert(FileKind::Poi, vec![1, 2, 3]);
		ChunkAggregator::decode(RegionPos::new(0, 0), raw)
	}

	#[test]
	fn joins_kinds() {
		let aggregator = aggregator();
		assert!(aggregator.is_unreadable(FileKind::Poi));
		let record = aggregator.record(ChunkOffset::from_index(1)).unwrap().unwrap();
		assert_eq!(record.total_len(), 11);
		assert!(record.has(FileKind::Entities));
		assert!(aggregator.record(ChunkOffset::from_index(500)).unwrap().is_none());
	}

	#[test]
	fn sums_selected_chunks() {
		let mut aggregator = aggregator();
		let progress = Progress::new();
		let transform = Transform::value(|record| Ok(record.total_len() as i64));
		let mut total = 0;
		let selection = RegionSelection::Chunks([0, 1, 2, 900].into_iter().map(ChunkOffset::from_index).collect::<ChunkSet>());
		let visit = aggregator.for_each(&selection, &progress, &transform, |_, outcome| {
			if let Outcome::Value(value) = outcome {
				total += value;
			}
			Ok(())
		}).unwrap();
		assert_eq!(visit, Visit { visited: 3, skipped: 0, cancelled: false });
		assert_eq!(total, 8 + 11 + 8);
		assert_eq!(progress.current(), 4);
	}

	#[test]
	fn mutations_are_written_back() {
		let mut aggregator = aggregator();
		let progress = Progress::new();
		let transform = Transform::mutate(|record| {
			record.remove_data(FileKind::Entities);
			record.set_data(FileKind::Poi, vec![5]);
			Ok(true)
		});
		aggregator.for_each(&RegionSelection::All, &progress, &transform, |_, _| Ok(())).unwrap();
		assert!(aggregator.is_dirty());
		assert!(!aggregator.files().get(FileKind::Entities).unwrap().has_chunk(ChunkOffset::from_index(1)));
		// The corrupt poi file is left alone.
		assert!(aggregator.files().get(FileKind::Poi).is_none());
	}

	#[test]
	fn stops_when_cancelled() {
		let mut aggregator = aggregator();
		let progress = Progress::new();
		progress.cancel();
		let transform = Transform::filter(|_| Ok(true));
		let visit = aggregator.for_each(&RegionSelection::All, &progress, &transform, |_, _| Ok(())).unwrap();
		assert!(visit.cancelled);
		assert_eq!(visit.visited, 0);
	}

	#[test]
	fn oversized_mutation_skips_only_that_chunk() {
		let mut aggregator = aggregator();
		let mut big = vec![0u8; 1_200_000];
		StdRng::seed_from_u64(1).fill(big.as_mut_slice());
		let transform = Transform::mutate(move |record| {
			let data = if record.pos().offset().index() == 0 { big.clone() } else { vec![7; 4] };
			record.set_data(FileKind::Region, data);
			Ok(true)
		});
		let progress = Progress::new();
		let visit = aggregator.for_each(&RegionSelection::All, &progress, &transform, |_, _| Ok(())).unwrap();
		assert_eq!(visit, Visit { visited: 3, skipped: 1, cancelled: false });
		assert_eq!(progress.current(), 1024);
		let region = aggregator.files().get(FileKind::Region).unwrap();
		assert_eq!(region.chunk_data(ChunkOffset::from_index(0)).unwrap(), Some(vec![0u8; 8]));
		assert_eq!(region.chunk_data(ChunkOffset::from_index(1)).unwrap(), Some(vec![7; 4]));
	}
}
