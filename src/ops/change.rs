use std::sync::Arc;

use crate::{
	McResult,
	config::PipelineConfig,
	job::{RegionTask, RegionWork},
	progress::Progress,
	selection::SelectionMap,
	transform::Transform,
	world::World,
};

use super::execute;

struct ChangeTask {
	mutator: Transform,
	progress: Arc<Progress>,
}

impl RegionTask for ChangeTask {
	type State = ();

	fn process(&self, work: &mut RegionWork<()>) -> McResult<bool> {
		work.aggregator.for_each(&work.selection, &self.progress, &self.mutator, |_, _| Ok(()))?;
		Ok(work.aggregator.is_dirty())
	}
}

/// Applies `mutator` to every selected chunk and rewrites the regions it
/// changed.
pub fn change(
	world: &World,
	selection: Option<&SelectionMap>,
	mutator: Transform,
	config: PipelineConfig,
	progress: Arc<Progress>,
) -> McResult<()> {
	let task = Arc::new(ChangeTask {
		mutator,
		progress: progress.clone(),
	});
	execute(world, selection, task, config, &progress, |_| None)
}
