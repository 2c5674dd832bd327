use std::{
	cmp::Ordering,
	collections::BinaryHeap,
};

use parking_lot::{Condvar, Mutex};

use super::Priority;

struct Entry<T> {
	priority: Priority,
	seq: u64,
	item: T,
}

impl<T> PartialEq for Entry<T> {
	fn eq(&self, other: &Self) -> bool {
		self.priority == other.priority && self.seq == other.seq
	}
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T> Ord for Entry<T> {
	/// Higher priority first, then earlier submission first.
	fn cmp(&self, other: &Self) -> Ordering {
		self.priority.cmp(&other.priority)
			.then_with(|| other.seq.cmp(&self.seq))
	}
}

struct Inner<T> {
	heap: BinaryHeap<Entry<T>>,
	next_seq: u64,
	closed: bool,
}

/// A blocking priority queue shared by the workers of one stage.
pub struct JobQueue<T> {
	inner: Mutex<Inner<T>>,
	ready: Condvar,
}

impl<T> JobQueue<T> {
	pub fn new() -> Self {
		Self {
			inner: Mutex::new(Inner {
				heap: BinaryHeap::new(),
				next_seq: 0,
				closed: false,
			}),
			ready: Condvar::new(),
		}
	}

	/// Queues `item`. Hands it back if the queue was closed.
	pub fn push(&self, item: T, priority: Priority) -> Result<(), T> {
		let mut inner = self.inner.lock();
		if inner.closed {
			return Err(item);
		}
		let seq = inner.next_seq;
		inner.next_seq += 1;
		inner.heap.push(Entry {
			priority,
			seq,
			item,
		});
		drop(inner);
		self.ready.notify_one();
		Ok(())
	}

	/// Blocks until an item is available. Returns `None` once the queue is
	/// closed and empty.
	pub fn pop(&self) -> Option<T> {
		let mut inner = self.inner.lock();
		loop {
			if let Some(entry) = inner.heap.pop() {
				return Some(entry.item);
			}
			if inner.closed {
				return None;
			}
			self.ready.wait(&mut inner);
		}
	}

	/// Takes the next item without blocking.
	pub fn try_pop(&self) -> Option<T> {
		self.inner.lock().heap.pop().map(|entry| entry.item)
	}

	/// Rejects further pushes and wakes every waiting worker. Items already
	/// queued are still handed out.
	pub fn close(&self) {
		self.inner.lock().closed = true;
		self.ready.notify_all();
	}

	/// Removes every queued item and returns them.
	pub fn clear(&self) -> Vec<T> {
		let mut inner = self.inner.lock();
		std::mem::take(&mut inner.heap)
			.into_vec()
			.into_iter()
			.map(|entry| entry.item)
			.collect()
	}

	pub fn len(&self) -> usize {
		self.inner.lock().heap.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<T> Default for JobQueue<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::{sync::Arc, thread, time::Duration};

	#[test]
	fn priority_then_fifo() {
		let queue = JobQueue::new();
		queue.push("low-1", Priority::Low).unwrap();
		queue.push("normal-1", Priority::Normal).unwrap();
		queue.push("high-1", Priority::High).unwrap();
		queue.push("low-2", Priority::Low).unwrap();
		queue.push("high-2", Priority::High).unwrap();
		let order: Vec<_> = std::iter::from_fn(|| queue.try_pop()).collect();
		assert_eq!(order, vec!["high-1", "high-2", "normal-1", "low-1", "low-2"]);
	}

	#[test]
	fn close_wakes_waiters() {
		let queue = Arc::new(JobQueue::<u32>::new());
		let waiter = {
			let queue = queue.clone();
			thread::spawn(move || queue.pop())
		};
		thread::sleep(Duration::from_millis(20));
		queue.close();
		assert_eq!(waiter.join().unwrap(), None);
		assert_eq!(queue.push(1, Priority::Normal), Err(1));
	}

	#[test]
	fn clear_drains() {
		let queue = JobQueue::new();
		for i in 0..5 {
			queue.push(i, Priority::Normal).unwrap();
		}
		assert_eq!(queue.clear().len(), 5);
		assert!(queue.is_empty());
	}
}
