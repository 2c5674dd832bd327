use std::sync::Arc;

use crate::{
	McResult,
	config::PipelineConfig,
	job::{RegionTask, RegionWork},
	progress::Progress,
	selection::{RegionSelection, SelectionMap},
	transform::{Outcome, Transform},
	world::{io::remove_optional, FileKind, World},
};

use super::execute;

struct DeleteTask {
	filter: Option<Transform>,
	progress: Arc<Progress>,
}

impl DeleteTask {
	/// Whole regions without a filter are deleted file by file.
	fn whole_region(&self, selection: &RegionSelection) -> bool {
		self.filter.is_none() && selection.is_full()
	}
}

impl RegionTask for DeleteTask {
	type State = ();

	fn needs_files(&self, selection: &RegionSelection) -> bool {
		!self.whole_region(selection)
	}

	fn process(&self, work: &mut RegionWork<()>) -> McResult<bool> {
		if self.progress.task_cancelled() {
			return Ok(false);
		}
		if self.whole_region(&work.selection) {
			self.progress.increment("region", work.selection.len() as u64);
			return Ok(true);
		}
		match &self.filter {
			None => {
				for offset in work.selection.iter() {
					if self.progress.task_cancelled() {
						break;
					}
					work.aggregator.remove_chunk(offset);
					self.progress.increment("chunk", 1);
				}
			}
			Some(filter) => {
				let mut matched = Vec::new();
				work.aggregator.for_each(&work.selection, &self.progress, filter, |chunk, outcome| {
					if outcome == Outcome::Matched(true) {
						matched.push(chunk.offset());
					}
					Ok(())
				})?;
				for offset in matched {
					work.aggregator.remove_chunk(offset);
				}
			}
		}
		Ok(work.aggregator.is_dirty())
	}

	fn write(&self, work: &mut RegionWork<()>) -> McResult<()> {
		if self.whole_region(&work.selection) {
			for kind in FileKind::ALL {
				if remove_optional(work.files.path(kind))? {
					log::debug!("deleted {}", work.files.path(kind).display());
				}
			}
			return Ok(());
		}
		work.aggregator.save(&work.files)?;
		Ok(())
	}
}

/// Removes the selected chunks, or only those matching `filter`.
/// Files left without chunks are deleted.
pub fn delete(
	world: &World,
	selection: Option<&SelectionMap>,
	filter: Option<Transform>,
	config: PipelineConfig,
	progress: Arc<Progress>,
) -> McResult<()> {
	let task = Arc::new(DeleteTask {
		filter,
		progress: progress.clone(),
	});
	execute(world, selection, task, config, &progress, |_| None)
}
