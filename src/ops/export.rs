use std::{fs, sync::Arc};

use crate::{
	McResult, McError,
	config::PipelineConfig,
	job::{ChunkAggregator, RegionTask, RegionWork},
	math::coord::RegionPos,
	progress::Progress,
	selection::{RegionSelection, SelectionMap},
	transform::{Outcome, Transform},
	world::{
		io::region::{ChunkOffset, RegionFile},
		FileKind,
		Triad,
		World,
	},
};

use super::execute;

struct ExportTask {
	filter: Option<Transform>,
	output: World,
	progress: Arc<Progress>,
}

#[derive(Default)]
pub(super) struct ExportState {
	/// Output files with the copied chunks, merged into whatever the output
	/// world already held.
	pub(super) outputs: Triad<RegionFile>,
}

/// Copies `offsets` from the decoded source files into the files of `target`
/// at `pos`, as they are on disk. Chunks the target already holds are kept
/// unless `overwrite` is set. Returns the target files that changed.
pub(super) fn merge_chunks(
	source: &ChunkAggregator,
	target: &World,
	pos: RegionPos,
	offsets: &[ChunkOffset],
	overwrite: bool,
) -> McResult<Triad<RegionFile>> {
	let mut merged = Triad::new();
	for (kind, file) in source.files().iter() {
		let path = target.region_path(kind, pos);
		let mut output = match RegionFile::load(&path) {
			Ok(output) => output.unwrap_or_default(),
			Err(err) if err.is_corruption() => {
				log::warn!("not writing into corrupt {}: {err}", path.display());
				continue;
			}
			Err(err) => return Err(err),
		};
		for &offset in offsets {
			if !overwrite && output.has_chunk(offset) {
				continue;
			}
			match output.copy_chunk_from(file, offset) {
				Ok(_) => (),
				Err(err) if err.is_corruption() => {
					log::warn!("not copying chunk {}: {err}", pos.chunk(offset));
				}
				Err(err) => return Err(err),
			}
		}
		if output.is_dirty() {
			merged.insert(kind, output);
		}
	}
	Ok(merged)
}

impl ExportTask {
	/// Whole regions without a filter are copied file by file.
	fn whole_region(&self, selection: &RegionSelection) -> bool {
		self.filter.is_none() && selection.is_full()
	}

	fn matching_chunks(&self, work: &mut RegionWork<ExportState>) -> McResult<Vec<ChunkOffset>> {
		let mut matched = Vec::new();
		match &self.filter {
			None => {
				for offset in work.selection.iter() {
					if self.progress.task_cancelled() {
						break;
					}
					if work.aggregator.has_chunk(offset) {
						matched.push(offset);
					}
					self.progress.increment("chunk", 1);
				}
			}
			Some(filter) => {
				work.aggregator.for_each(&work.selection, &self.progress, filter, |chunk, outcome| {
					if outcome == Outcome::Matched(true) {
						matched.push(chunk.offset());
					}
					Ok(())
				})?;
			}
		}
		Ok(matched)
	}
}

impl RegionTask for ExportTask {
	type State = ExportState;

	fn needs_files(&self, selection: &RegionSelection) -> bool {
		!self.whole_region(selection)
	}

	fn process(&self, work: &mut RegionWork<ExportState>) -> McResult<bool> {
		if self.progress.task_cancelled() {
			return Ok(false);
		}
		if self.whole_region(&work.selection) {
			self.progress.increment("region", work.selection.len() as u64);
			return Ok(true);
		}
		let matched = self.matching_chunks(work)?;
		if matched.is_empty() {
			return Ok(false);
		}
		work.state.outputs = merge_chunks(&work.aggregator, &self.output, work.pos, &matched, true)?;
		Ok(!work.state.outputs.is_empty())
	}

	fn write(&self, work: &mut RegionWork<ExportState>) -> McResult<()> {
		if self.whole_region(&work.selection) {
			for kind in FileKind::ALL {
				let source = work.files.path(kind);
				if !source.is_file() {
					continue;
				}
				let target = self.output.region_path(kind, work.pos);
				fs::create_dir_all(self.output.dir(kind))?;
				fs::copy(source, &target)?;
				log::debug!("copied {} to {}", source.display(), target.display());
			}
			return Ok(());
		}
		for (kind, output) in work.state.outputs.iter() {
			output.save(self.output.region_path(kind, work.pos))?;
		}
		Ok(())
	}
}

/// Copies the selected chunks, or only those matching `filter`, into the
/// matching files of `output`. Payloads are copied without recompression.
pub fn export(
	world: &World,
	selection: Option<&SelectionMap>,
	filter: Option<Transform>,
	output: &World,
	config: PipelineConfig,
	progress: Arc<Progress>,
) -> McResult<()> {
	if FileKind::ALL.iter().any(|&kind| world.dir(kind) == output.dir(kind)) {
		let err = McError::InvalidConfig("export output must differ from the source world".into());
		progress.fail(err.to_string());
		return Err(err);
	}
	let task = Arc::new(ExportTask {
		filter,
		output: output.clone(),
		progress: progress.clone(),
	});
	execute(world, selection, task, config, &progress, |_| None)
}
