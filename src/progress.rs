//! Progress reporting and cooperative cancellation for one operation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressStatus {
	Pending,
	Running,
	Done,
	Cancelled,
	Errored(String),
}

impl ProgressStatus {
	pub fn is_terminal(&self) -> bool {
		matches!(self, ProgressStatus::Done | ProgressStatus::Cancelled | ProgressStatus::Errored(_))
	}
}

impl std::fmt::Display for ProgressStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ProgressStatus::Pending => write!(f, "pending"),
			ProgressStatus::Running => write!(f, "running"),
			ProgressStatus::Done => write!(f, "done"),
			ProgressStatus::Cancelled => write!(f, "cancelled"),
			ProgressStatus::Errored(message) => write!(f, "error: {message}"),
		}
	}
}

type DoneCallback = Box<dyn FnOnce(&ProgressStatus) + Send>;

struct State {
	status: ProgressStatus,
	callback: Option<DoneCallback>,
}

/// A progress counter shared between an operation, its jobs and the caller.
///
/// The completion callback runs exactly once, on the first of: the counter
/// reaching `max`, [Progress::fail], or [Progress::finish].
pub struct Progress {
	max: AtomicU64,
	current: AtomicU64,
	cancelled: AtomicBool,
	/// Set by cancellation or failure; polled between chunks.
	halted: AtomicBool,
	state: Mutex<State>,
	signal: Condvar,
}

impl Progress {
	pub fn new() -> Self {
		Self {
			max: AtomicU64::new(0),
			current: AtomicU64::new(0),
			cancelled: AtomicBool::new(false),
			halted: AtomicBool::new(false),
			state: Mutex::new(State {
				status: ProgressStatus::Pending,
				callback: None,
			}),
			signal: Condvar::new(),
		}
	}

	/// Sets the completion callback. If the progress already finished, the
	/// callback runs immediately.
	pub fn on_done<F: FnOnce(&ProgressStatus) + Send + 'static>(&self, callback: F) {
		let mut state = self.state.lock();
		if state.status.is_terminal() {
			let status = state.status.clone();
			drop(state);
			callback(&status);
		} else {
			state.callback = Some(Box::new(callback));
		}
	}

	pub fn set_max(&self, max: u64) {
		self.max.store(max, Ordering::SeqCst);
		let mut state = self.state.lock();
		if state.status == ProgressStatus::Pending {
			state.status = ProgressStatus::Running;
		}
	}

	/// Adds `weight` units of completed work. `label` names what was done.
	pub fn increment(&self, label: &str, weight: u64) {
		if weight == 0 {
			return;
		}
		let current = self.current.fetch_add(weight, Ordering::SeqCst) + weight;
		log::trace!("progress {current}/{}: {label}", self.max());
		let max = self.max();
		if max != 0 && current >= max {
			self.complete(self.finished_status());
		}
	}

	/// Requests cancellation. Jobs stop before their next chunk.
	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
		self.halted.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}

	/// True once the operation was cancelled or failed.
	pub fn task_cancelled(&self) -> bool {
		self.halted.load(Ordering::SeqCst)
	}

	/// Marks the operation as failed.
	pub fn fail<S: Into<String>>(&self, message: S) {
		self.halted.store(true, Ordering::SeqCst);
		self.complete(ProgressStatus::Errored(message.into()));
	}

	/// Called once all jobs have drained. Completes as done or cancelled
	/// if nothing else completed the progress first.
	pub fn finish(&self) {
		self.complete(self.finished_status());
	}

	fn finished_status(&self) -> ProgressStatus {
		if self.is_cancelled() {
			ProgressStatus::Cancelled
		} else {
			ProgressStatus::Done
		}
	}

	/// Returns false if the progress had already completed.
	fn complete(&self, status: ProgressStatus) -> bool {
		let mut state = self.state.lock();
		if state.status.is_terminal() {
			return false;
		}
		state.status = status.clone();
		let callback = state.callback.take();
		self.signal.notify_all();
		drop(state);
		if let Some(callback) = callback {
			callback(&status);
		}
		true
	}

	pub fn status(&self) -> ProgressStatus {
		self.state.lock().status.clone()
	}

	/// Blocks until the progress completes.
	pub fn wait(&self) -> ProgressStatus {
		let mut state = self.state.lock();
		while !state.status.is_terminal() {
			self.signal.wait(&mut state);
		}
		state.status.clone()
	}

	pub fn current(&self) -> u64 {
		self.current.load(Ordering::SeqCst)
	}

	pub fn max(&self) -> u64 {
		self.max.load(Ordering::SeqCst)
	}
}

impl Default for Progress {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Progress {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Progress")
			.field("current", &self.current())
			.field("max", &self.max())
			.field("status", &self.status())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::{Arc, atomic::AtomicUsize};

	#[test]
	fn completes_once_at_max() {
		let progress = Progress::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		progress.on_done(move |status| {
			assert_eq!(status, &ProgressStatus::Done);
			counter.fetch_add(1, Ordering::SeqCst);
		});
		progress.set_max(4);
		assert_eq!(progress.status(), ProgressStatus::Running);
		progress.increment("a", 3);
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		progress.increment("b", 1);
		progress.increment("c", 1);
		progress.finish();
		progress.fail("late");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(progress.wait().to_string(), "done");
	}

	#[test]
	fn cancel_then_finish() {
		let progress = Progress::new();
		progress.set_max(10);
		progress.increment("a", 2);
		assert!(!progress.task_cancelled());
		progress.cancel();
		assert!(progress.task_cancelled());
		progress.finish();
		assert_eq!(progress.status().to_string(), "cancelled");
	}

	#[test]
	fn failure_halts() {
		let progress = Progress::new();
		progress.set_max(10);
		progress.fail("boom");
		assert!(progress.task_cancelled());
		assert!(!progress.is_cancelled());
		assert_eq!(progress.status().to_string(), "error: boom");
		let seen = Arc::new(Mutex::new(None));
		let slot = seen.clone();
		progress.on_done(move |status| *slot.lock() = Some(status.clone()));
		assert_eq!(*seen.lock(), Some(ProgressStatus::Errored("boom".into())));
	}

	#[test]
	fn increments_from_many_threads() {
		let progress = Arc::new(Progress::new());
		progress.set_max(8 * 1000);
		let handles: Vec<_> = (0..8).map(|_| {
			let progress = progress.clone();
			std::thread::spawn(move || {
				for _ in 0..1000 {
					progress.increment("chunk", 1);
				}
			})
		}).collect();
		for handle in handles {
			handle.join().unwrap();
		}
		assert_eq!(progress.current(), 8000);
		assert_eq!(progress.wait(), ProgressStatus::Done);
	}
}
