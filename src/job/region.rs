use std::sync::Arc;

use crate::{
	McResult,
	math::coord::RegionPos,
	progress::Progress,
	selection::RegionSelection,
	world::{RegionFiles, Triad},
};

use super::{
	aggregate::ChunkAggregator,
	scheduler::SchedulerHandle,
	ProcessJob,
};

/// The per-region state handed to a [RegionTask].
pub struct RegionWork<S> {
	pub pos: RegionPos,
	pub selection: RegionSelection,
	pub files: RegionFiles,
	/// The decoded files. Empty until the process stage.
	pub aggregator: ChunkAggregator,
	/// Task specific state carried from process to write.
	pub state: S,
}

/// Region-level logic shared by every job of one operation.
pub trait RegionTask: Send + Sync + 'static {
	type State: Default + Send + 'static;

	/// Whether the region's files must be read before processing.
	fn needs_files(&self, _selection: &RegionSelection) -> bool {
		true
	}

	/// Returns true if the region needs to be written.
	fn process(&self, work: &mut RegionWork<Self::State>) -> McResult<bool>;

	/// Writes the dirty files back to where they were read from.
	fn write(&self, work: &mut RegionWork<Self::State>) -> McResult<()> {
		work.aggregator.save(&work.files)?;
		Ok(())
	}
}

/// A [ProcessJob] that reads a region's files at load, decodes them at
/// process, and hands them to a [RegionTask].
pub struct RegionJob<T: RegionTask> {
	task: Arc<T>,
	raw: Triad<Vec<u8>>,
	work: RegionWork<T::State>,
	cancel: Option<(Arc<Progress>, SchedulerHandle)>,
}

impl<T: RegionTask> RegionJob<T> {
	pub fn new(task: Arc<T>, files: RegionFiles, selection: RegionSelection) -> Self {
		Self {
			task,
			raw: Triad::new(),
			work: RegionWork {
				pos: files.pos(),
				selection,
				files,
				aggregator: ChunkAggregator::default(),
				state: T::State::default(),
			},
			cancel: None,
		}
	}

	/// Once `progress` is cancelled the job skips its remaining stages and
	/// discards every job still queued on `scheduler`.
	pub fn with_cancellation(mut self, progress: Arc<Progress>, scheduler: SchedulerHandle) -> Self {
		self.cancel = Some((progress, scheduler));
		self
	}

	fn cancelled(&self) -> bool {
		match &self.cancel {
			Some((progress, scheduler)) if progress.task_cancelled() => {
				scheduler.clear_queues();
				true
			}
			_ => false,
		}
	}
}

impl<T: RegionTask> ProcessJob for RegionJob<T> {
	fn region(&self) -> RegionPos {
		self.work.pos
	}

	/// Files are read whole so that no handle stays open past this stage.
	fn load(&mut self) -> McResult<()> {
		if self.cancelled() {
			return Ok(());
		}
		if self.task.needs_files(&self.work.selection) {
			self.raw = self.work.files.read()?;
		}
		Ok(())
	}

	fn process(&mut self) -> McResult<bool> {
		if self.cancelled() {
			return Ok(false);
		}
		let raw = std::mem::take(&mut self.raw);
		self.work.aggregator = ChunkAggregator::decode(self.work.pos, raw);
		self.task.process(&mut self.work)
	}

	fn write(&mut self) -> McResult<()> {
		self.task.write(&mut self.work)
	}
}
