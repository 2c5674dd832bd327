use crossbeam_channel::{bounded, Receiver, Sender};

/// A pool of tokens limiting how many regions are held in memory at once.
/// The pool is a bounded channel pre-filled with one token per permit.
pub struct LoadPermits {
	give: Sender<()>,
	take: Receiver<()>,
	capacity: usize,
}

/// A token from [LoadPermits]. Dropping it returns the token.
#[derive(Debug)]
pub struct LoadPermit {
	give: Sender<()>,
}

impl LoadPermits {
	pub fn new(capacity: usize) -> Self {
		let capacity = capacity.max(1);
		let (give, take) = bounded(capacity);
		for _ in 0..capacity {
			// The channel has room for exactly `capacity` tokens.
			let _ = give.try_send(());
		}
		Self {
			give,
			take,
			capacity,
		}
	}

	/// Blocks until a permit is free.
	pub fn acquire(&self) -> Option<LoadPermit> {
		self.take.recv().ok()?;
		Some(LoadPermit {
			give: self.give.clone(),
		})
	}

	pub fn try_acquire(&self) -> Option<LoadPermit> {
		self.take.try_recv().ok()?;
		Some(LoadPermit {
			give: self.give.clone(),
		})
	}

	pub fn available(&self) -> usize {
		self.take.len()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}
}

impl Drop for LoadPermit {
	fn drop(&mut self) {
		let _ = self.give.try_send(());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn permits_return_on_drop() {
		let permits = LoadPermits::new(2);
		let a = permits.try_acquire().unwrap();
		let b = permits.try_acquire().unwrap();
		assert!(permits.try_acquire().is_none());
		drop(a);
		assert_eq!(permits.available(), 1);
		let c = permits.acquire().unwrap();
		drop((b, c));
		assert_eq!(permits.available(), permits.capacity());
	}
}
