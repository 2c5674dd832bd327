//! World-wide operations built on the job pipeline.
//!
//! Every operation takes the world, an optional selection (`None` means
//! every region found on disk), the pipeline configuration and a shared
//! [Progress]. It blocks until its jobs drain and leaves the progress in a
//! terminal state.

pub mod select;
pub mod sum;
pub mod delete;
pub mod export;
pub mod import;
pub mod change;

pub use select::select;
pub use sum::sum;
pub use delete::delete;
pub use export::export;
pub use import::import;
pub use change::change;

use std::sync::Arc;

use crate::{
	McResult,
	config::PipelineConfig,
	job::{ErrorHandler, Priority, RegionJob, RegionTask, Scheduler, SchedulerHandle},
	math::coord::RegionPos,
	progress::Progress,
	selection::{RegionSelection, SelectionMap},
	world::World,
};

/// The regions an operation visits and the chunks selected in each.
///
/// An inverted selection covers every region on disk minus the selected
/// chunks. Regions left with no chunks are not visited.
pub fn plan(world: &World, selection: Option<&SelectionMap>) -> McResult<Vec<(RegionPos, RegionSelection)>> {
	let Some(map) = selection else {
		return Ok(world.list_regions()?
			.into_iter()
			.map(|pos| (pos, RegionSelection::All))
			.collect());
	};
	if map.is_inverted() {
		let mut regions = Vec::new();
		for pos in world.list_regions()? {
			let remaining = match map.get(pos) {
				None => Some(RegionSelection::All),
				Some(selection) => selection.complement(),
			};
			if let Some(remaining) = remaining {
				regions.push((pos, remaining));
			}
		}
		return Ok(regions);
	}
	Ok(map.sorted()
		.into_iter()
		.filter(|(_, selection)| !selection.is_empty())
		.map(|(pos, selection)| (pos, selection.clone()))
		.collect())
}

/// Runs one job per planned region and waits for all of them.
/// `handler` builds the error handler from the scheduler's handle; `None`
/// logs failures.
pub(crate) fn execute<T, H>(
	world: &World,
	selection: Option<&SelectionMap>,
	task: Arc<T>,
	config: PipelineConfig,
	progress: &Arc<Progress>,
	handler: H,
) -> McResult<()>
where
	T: RegionTask,
	H: FnOnce(SchedulerHandle) -> Option<ErrorHandler>,
{
	let prepared = Scheduler::new(config)
		.and_then(|scheduler| Ok((scheduler, plan(world, selection)?)));
	let (scheduler, regions) = match prepared {
		Ok(prepared) => prepared,
		Err(err) => {
			progress.fail(err.to_string());
			return Err(err);
		}
	};
	let handler = handler(scheduler.handle());
	let total: u64 = regions.iter().map(|(_, selection)| selection.len() as u64).sum();
	log::info!("visiting {} regions, {total} chunks", regions.len());
	progress.set_max(total);
	for (pos, selection) in regions {
		let job = RegionJob::new(task.clone(), world.region_files(pos), selection)
			.with_cancellation(progress.clone(), scheduler.handle());
		scheduler.submit_with(job, Priority::Normal, handler.clone());
	}
	scheduler.wait_idle();
	scheduler.shutdown();
	progress.finish();
	Ok(())
}
