//! The three-stage load, process, write pipeline.
//!
//! Each job covers one region. A job moves through the stages in order and
//! holds a loaded-file permit from the start of its load stage until it is
//! dropped, which caps how many regions are in memory at once.

pub mod queue;
pub mod permit;
pub mod scheduler;
pub mod aggregate;
pub mod region;

pub use scheduler::{Scheduler, SchedulerHandle};
pub use aggregate::{ChunkAggregator, Visit};
pub use region::{RegionJob, RegionTask, RegionWork};

use std::sync::Arc;

use crate::{
	McError, McResult,
	math::coord::RegionPos,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
	Low,
	#[default]
	Normal,
	High,
}

/// A unit of work bound to one region.
pub trait ProcessJob: Send + 'static {
	fn region(&self) -> RegionPos;

	/// Reads whatever the job needs from disk. Runs on a load worker while
	/// holding a loaded-file permit.
	fn load(&mut self) -> McResult<()> {
		Ok(())
	}

	/// Returns true if the job needs to be written.
	fn process(&mut self) -> McResult<bool>;

	fn write(&mut self) -> McResult<()> {
		Ok(())
	}
}

/// Called with the region and error of a failed job.
pub type ErrorHandler = Arc<dyn Fn(RegionPos, &McError) + Send + Sync>;
