use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
	McResult,
	config::PipelineConfig,
	job::{RegionTask, RegionWork},
	progress::Progress,
	selection::{ChunkSet, SelectionMap},
	transform::{Outcome, Transform},
	world::World,
};

use super::execute;

struct SelectTask {
	filter: Transform,
	progress: Arc<Progress>,
	found: Mutex<SelectionMap>,
}

impl RegionTask for SelectTask {
	type State = ();

	fn process(&self, work: &mut RegionWork<()>) -> McResult<bool> {
		let mut matched = ChunkSet::new();
		work.aggregator.for_each(&work.selection, &self.progress, &self.filter, |chunk, outcome| {
			if outcome == Outcome::Matched(true) {
				matched.add(chunk.offset());
			}
			Ok(())
		})?;
		if !matched.is_empty() {
			self.found.lock().insert_chunks(work.pos, matched);
		}
		Ok(false)
	}
}

/// Collects the chunks for which `filter` matches, then grows the result by
/// `radius` chunks in every direction.
pub fn select(
	world: &World,
	selection: Option<&SelectionMap>,
	filter: Transform,
	radius: u32,
	config: PipelineConfig,
	progress: Arc<Progress>,
) -> McResult<SelectionMap> {
	let task = Arc::new(SelectTask {
		filter,
		progress: progress.clone(),
		found: Mutex::new(SelectionMap::new()),
	});
	execute(world, selection, task.clone(), config, &progress, |_| None)?;
	let mut found = std::mem::take(&mut *task.found.lock());
	found.expand_radius(radius);
	log::info!("selected {} chunks in {} regions", found.chunk_count(), found.len());
	Ok(found)
}
