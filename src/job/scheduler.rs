use std::{
	panic::{catch_unwind, AssertUnwindSafe},
	sync::Arc,
	thread::{self, JoinHandle},
};

use parking_lot::{Condvar, Mutex};

use crate::{
	McError, McResult,
	config::PipelineConfig,
	math::coord::RegionPos,
};

use super::{
	permit::{LoadPermit, LoadPermits},
	queue::JobQueue,
	ErrorHandler,
	Priority,
	ProcessJob,
};

/// Counts jobs that were submitted but not yet dropped.
struct Idle {
	pending: Mutex<usize>,
	drained: Condvar,
}

/// Held by every job. Dropping it marks the job as finished.
struct Ticket(Arc<Idle>);

impl Ticket {
	fn new(idle: &Arc<Idle>) -> Self {
		*idle.pending.lock() += 1;
		Ticket(idle.clone())
	}
}

impl Drop for Ticket {
	fn drop(&mut self) {
		let mut pending = self.0.pending.lock();
		*pending -= 1;
		if *pending == 0 {
			self.0.drained.notify_all();
		}
	}
}

struct Job {
	inner: Box<dyn ProcessJob>,
	region: RegionPos,
	priority: Priority,
	handler: Option<ErrorHandler>,
	/// Released when the job is dropped, on every path.
	permit: Option<LoadPermit>,
	_ticket: Ticket,
}

impl Job {
	/// Runs one stage, turning a panic into [McError::JobPanicked].
	fn run<R, F>(&mut self, stage: F) -> McResult<R>
	where F: FnOnce(&mut dyn ProcessJob) -> McResult<R> {
		let inner = &mut *self.inner;
		match catch_unwind(AssertUnwindSafe(|| stage(inner))) {
			Ok(result) => result,
			Err(_) => Err(McError::JobPanicked),
		}
	}

	fn fail(self, stage: &str, err: McError) {
		match &self.handler {
			Some(handler) => handler(self.region, &err),
			None => log::error!("{stage} failed for region {}: {err}", self.region),
		}
	}
}

struct Shared {
	load: JobQueue<Job>,
	process: JobQueue<Job>,
	write: JobQueue<Job>,
	permits: LoadPermits,
	idle: Arc<Idle>,
}

impl Shared {
	fn clear_queues(&self) -> usize {
		// Collected first so the jobs drop outside of the queue locks.
		let mut discarded = self.load.clear();
		discarded.extend(self.process.clear());
		discarded.extend(self.write.clear());
		let count = discarded.len();
		drop(discarded);
		if count > 0 {
			log::debug!("discarded {count} queued jobs");
		}
		count
	}
}

/// Runs [ProcessJob]s through the load, process and write stages on
/// dedicated worker pools. Dropping the scheduler waits for the queues to
/// drain and joins every worker.
pub struct Scheduler {
	shared: Arc<Shared>,
	config: PipelineConfig,
	default_handler: Option<ErrorHandler>,
	load_workers: Vec<JoinHandle<()>>,
	process_workers: Vec<JoinHandle<()>>,
	write_workers: Vec<JoinHandle<()>>,
}

/// A cloneable handle for clearing a [Scheduler]'s queues from inside jobs
/// and error handlers.
#[derive(Clone)]
pub struct SchedulerHandle {
	shared: Arc<Shared>,
}

impl SchedulerHandle {
	/// Discards every job that has not started its current stage.
	/// Returns the number of discarded jobs.
	pub fn clear_queues(&self) -> usize {
		self.shared.clear_queues()
	}
}

impl Scheduler {
	pub fn new(config: PipelineConfig) -> McResult<Self> {
		config.validate()?;
		let shared = Arc::new(Shared {
			load: JobQueue::new(),
			process: JobQueue::new(),
			write: JobQueue::new(),
			permits: LoadPermits::new(config.max_loaded_files),
			idle: Arc::new(Idle {
				pending: Mutex::new(0),
				drained: Condvar::new(),
			}),
		});
		let mut scheduler = Self {
			shared,
			config,
			default_handler: None,
			load_workers: Vec::with_capacity(config.read_threads),
			process_workers: Vec::with_capacity(config.process_threads),
			write_workers: Vec::with_capacity(config.write_threads),
		};
		for id in 0..config.read_threads {
			let handle = scheduler.spawn("load", id, load_worker)?;
			scheduler.load_workers.push(handle);
		}
		for id in 0..config.process_threads {
			let handle = scheduler.spawn("process", id, process_worker)?;
			scheduler.process_workers.push(handle);
		}
		for id in 0..config.write_threads {
			let handle = scheduler.spawn("write", id, write_worker)?;
			scheduler.write_workers.push(handle);
		}
		log::debug!(
			"scheduler started: {} load, {} process, {} write workers, {} loaded files",
			config.read_threads,
			config.process_threads,
			config.write_threads,
			config.max_loaded_files,
		);
		Ok(scheduler)
	}

	fn spawn(&self, stage: &str, id: usize, worker: fn(&Shared)) -> McResult<JoinHandle<()>> {
		let shared = self.shared.clone();
		let handle = thread::Builder::new()
			.name(format!("mcapipe-{stage}-{id}"))
			.spawn(move || worker(&shared))?;
		Ok(handle)
	}

	/// Sets the handler used for jobs submitted without one.
	/// Without a handler, failures are logged.
	pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
		self.default_handler = Some(handler);
		self
	}

	pub fn config(&self) -> &PipelineConfig {
		&self.config
	}

	pub fn handle(&self) -> SchedulerHandle {
		SchedulerHandle {
			shared: self.shared.clone(),
		}
	}

	pub fn submit<J: ProcessJob>(&self, job: J) {
		self.submit_with(job, Priority::Normal, None);
	}

	pub fn submit_with<J: ProcessJob>(&self, job: J, priority: Priority, handler: Option<ErrorHandler>) {
		let job = Job {
			region: job.region(),
			inner: Box::new(job),
			priority,
			handler: handler.or_else(|| self.default_handler.clone()),
			permit: None,
			_ticket: Ticket::new(&self.shared.idle),
		};
		if let Err(job) = self.shared.load.push(job, priority) {
			log::warn!("scheduler is shutting down, dropping job for region {}", job.region);
		}
	}

	/// Discards every job that has not started its current stage.
	pub fn clear_queues(&self) -> usize {
		self.shared.clear_queues()
	}

	/// Blocks until every submitted job has finished or been discarded.
	pub fn wait_idle(&self) {
		let mut pending = self.shared.idle.pending.lock();
		while *pending > 0 {
			self.shared.idle.drained.wait(&mut pending);
		}
	}

	/// Drains the queues stage by stage and joins the workers.
	pub fn shutdown(mut self) {
		self.stop();
	}

	fn stop(&mut self) {
		// Earlier stages feed later ones, so they must finish first.
		let stages = [
			(&self.shared.load, &mut self.load_workers),
			(&self.shared.process, &mut self.process_workers),
			(&self.shared.write, &mut self.write_workers),
		];
		for (queue, workers) in stages {
			queue.close();
			for worker in workers.drain(..) {
				if worker.join().is_err() {
					log::error!("pipeline worker panicked");
				}
			}
		}
	}
}

impl Drop for Scheduler {
	fn drop(&mut self) {
		self.stop();
	}
}

fn load_worker(shared: &Shared) {
	while let Some(mut job) = shared.load.pop() {
		job.permit = shared.permits.acquire();
		match job.run(|inner| inner.load()) {
			Ok(()) => {
				let priority = job.priority;
				if let Err(job) = shared.process.push(job, priority) {
					log::warn!("process queue closed, dropping job for region {}", job.region);
				}
			}
			Err(err) => job.fail("load", err),
		}
	}
}

fn process_worker(shared: &Shared) {
	while let Some(mut job) = shared.process.pop() {
		match job.run(|inner| inner.process()) {
			Ok(true) => {
				let priority = job.priority;
				if let Err(job) = shared.write.push(job, priority) {
					log::warn!("write queue closed, dropping job for region {}", job.region);
				}
			}
			Ok(false) => (),
			Err(err) => job.fail("process", err),
		}
	}
}

fn write_worker(shared: &Shared) {
	while let Some(mut job) = shared.write.pop() {
		if let Err(err) = job.run(|inner| inner.write()) {
			job.fail("write", err);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	struct Counting {
		region: RegionPos,
		stages: Arc<AtomicUsize>,
		write: bool,
	}

	impl ProcessJob for Counting {
		fn region(&self) -> RegionPos {
			self.region
		}

		fn load(&mut self) -> McResult<()> {
			self.stages.fetch_add(1, Ordering::SeqCst);
			Ok(())
		}

		fn process(&mut self) -> McResult<bool> {
			self.stages.fetch_add(1, Ordering::SeqCst);
			Ok(self.write)
		}

		fn write(&mut self) -> McResult<()> {
			self.stages.fetch_add(1, Ordering::SeqCst);
			Ok(())
		}
	}

	struct Failing;

	impl ProcessJob for Failing {
		fn region(&self) -> RegionPos {
			RegionPos::new(7, 7)
		}

		fn process(&mut self) -> McResult<bool> {
			panic!("failing job");
		}
	}

	#[test]
	fn runs_every_stage() {
		let scheduler = Scheduler::new(PipelineConfig::new(2, 2, 2, 2)).unwrap();
		let stages = Arc::new(AtomicUsize::new(0));
		for i in 0..10 {
			scheduler.submit(Counting {
				region: RegionPos::new(i, 0),
				stages: stages.clone(),
				write: i % 2 == 0,
			});
		}
		scheduler.wait_idle();
		// Every job loads and processes, half of them write.
		assert_eq!(stages.load(Ordering::SeqCst), 10 * 2 + 5);
		scheduler.shutdown();
	}

	#[test]
	fn panics_reach_the_handler() {
		let scheduler = Scheduler::new(PipelineConfig::single_threaded()).unwrap();
		let failed = Arc::new(Mutex::new(Vec::new()));
		let seen = failed.clone();
		let handler: ErrorHandler = Arc::new(move |region, err| {
			seen.lock().push((region, matches!(err, McError::JobPanicked)));
		});
		scheduler.submit_with(Failing, Priority::High, Some(handler));
		let stages = Arc::new(AtomicUsize::new(0));
		scheduler.submit(Counting {
			region: RegionPos::new(0, 0),
			stages: stages.clone(),
			write: false,
		});
		scheduler.wait_idle();
		assert_eq!(*failed.lock(), vec![(RegionPos::new(7, 7), true)]);
		assert_eq!(stages.load(Ordering::SeqCst), 2);
		assert_eq!(scheduler.shared.permits.available(), 1);
	}

	#[test]
	fn invalid_config_is_rejected() {
		assert!(matches!(
			Scheduler::new(PipelineConfig::new(1, 0, 1, 1)),
			Err(McError::InvalidConfig(_))
		));
	}
}
