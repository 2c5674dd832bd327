use std::sync::Arc;

use crate::{
	McResult, McError,
	accumulator::Accumulator,
	config::PipelineConfig,
	job::{ErrorHandler, RegionTask, RegionWork},
	progress::Progress,
	selection::SelectionMap,
	transform::{Outcome, Transform},
	world::World,
};

use super::execute;

struct SumTask {
	value: Transform,
	progress: Arc<Progress>,
	total: Accumulator,
}

impl RegionTask for SumTask {
	type State = ();

	fn process(&self, work: &mut RegionWork<()>) -> McResult<bool> {
		work.aggregator.for_each(&work.selection, &self.progress, &self.value, |_, outcome| {
			match outcome {
				Outcome::Value(value) => {
					self.total.add(value)?;
				}
				Outcome::Matched(true) => {
					self.total.add(1)?;
				}
				_ => (),
			}
			Ok(())
		})?;
		Ok(false)
	}
}

/// Adds up `value` over every selected chunk. A filter counts its matches.
///
/// Overflow fails the whole operation: queued jobs are discarded and the
/// progress completes with an error.
pub fn sum(
	world: &World,
	selection: Option<&SelectionMap>,
	value: Transform,
	config: PipelineConfig,
	progress: Arc<Progress>,
) -> McResult<i64> {
	let task = Arc::new(SumTask {
		value,
		progress: progress.clone(),
		total: Accumulator::new(),
	});
	let failed = progress.clone();
	execute(world, selection, task.clone(), config, &progress, move |scheduler| {
		let handler: ErrorHandler = Arc::new(move |pos, err| match err {
			McError::Overflow => {
				log::error!("sum overflowed in region {pos}");
				failed.fail(err.to_string());
				scheduler.clear_queues();
			}
			err => log::error!("sum failed for region {pos}: {err}"),
		});
		Some(handler)
	})?;
	if task.total.overflowed() {
		return Err(McError::Overflow);
	}
	Ok(task.total.get())
}
