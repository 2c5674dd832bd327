use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::{McResult, McError};

/// A signed total shared between worker threads. Overflow in either
/// direction is an error and leaves the total unchanged. After an overflow
/// every further add fails.
#[derive(Debug, Default)]
pub struct Accumulator {
	value: AtomicI64,
	overflowed: AtomicBool,
}

impl Accumulator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `delta` and returns the new total.
	pub fn add(&self, delta: i64) -> McResult<i64> {
		if self.overflowed() {
			return Err(McError::Overflow);
		}
		let result = self.value.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |value| {
			value.checked_add(delta)
		});
		match result {
			Ok(previous) => Ok(previous + delta),
			Err(_) => {
				self.overflowed.store(true, Ordering::SeqCst);
				Err(McError::Overflow)
			}
		}
	}

	pub fn get(&self) -> i64 {
		self.value.load(Ordering::SeqCst)
	}

	pub fn overflowed(&self) -> bool {
		self.overflowed.load(Ordering::SeqCst)
	}
}
