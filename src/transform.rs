//! Per-chunk logic supplied by the caller of an operation.

use std::sync::Arc;

use crate::{
	McResult,
	world::ChunkRecord,
};

pub type FilterFn = dyn Fn(&ChunkRecord) -> McResult<bool> + Send + Sync;
pub type ValueFn = dyn Fn(&ChunkRecord) -> McResult<i64> + Send + Sync;
pub type MutateFn = dyn Fn(&mut ChunkRecord) -> McResult<bool> + Send + Sync;

/// What to do with each visited chunk.
#[derive(Clone)]
pub enum Transform {
	/// Decides whether the chunk matches.
	Filter(Arc<FilterFn>),
	/// Computes the chunk's contribution to a sum.
	Value(Arc<ValueFn>),
	/// Edits the chunk's payloads. Returns true if anything changed.
	Mutate(Arc<MutateFn>),
}

/// The result of applying a [Transform] to one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Matched(bool),
	Value(i64),
	Mutated(bool),
}

impl Transform {
	pub fn filter<F>(f: F) -> Self
	where F: Fn(&ChunkRecord) -> McResult<bool> + Send + Sync + 'static {
		Transform::Filter(Arc::new(f))
	}

	pub fn value<F>(f: F) -> Self
	where F: Fn(&ChunkRecord) -> McResult<i64> + Send + Sync + 'static {
		Transform::Value(Arc::new(f))
	}

	pub fn mutate<F>(f: F) -> Self
	where F: Fn(&mut ChunkRecord) -> McResult<bool> + Send + Sync + 'static {
		Transform::Mutate(Arc::new(f))
	}

	pub fn apply(&self, record: &mut ChunkRecord) -> McResult<Outcome> {
		Ok(match self {
			Transform::Filter(f) => Outcome::Matched(f(record)?),
			Transform::Value(f) => Outcome::Value(f(record)?),
			Transform::Mutate(f) => Outcome::Mutated(f(record)?),
		})
	}
}

impl std::fmt::Debug for Transform {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Transform::Filter(_) => write!(f, "Transform::Filter"),
			Transform::Value(_) => write!(f, "Transform::Value"),
			Transform::Mutate(_) => write!(f, "Transform::Mutate"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		math::coord::ChunkPos,
		world::{FileKind, Triad},
	};

	fn record() -> ChunkRecord {
		let mut payloads = Triad::new();
		payloads.insert(FileKind::Region, vec![0; 16]);
		ChunkRecord::new(ChunkPos::new(1, 2), payloads)
	}

	#[test]
	fn outcomes() {
		let mut record = record();
		let filter = Transform::filter(|record| Ok(record.pos().x == 1));
		assert_eq!(filter.apply(&mut record).unwrap(), Outcome::Matched(true));
		let value = Transform::value(|record| Ok(record.total_len() as i64));
		assert_eq!(value.apply(&mut record).unwrap(), Outcome::Value(16));
		let mutate = Transform::mutate(|record| Ok(record.remove_data(FileKind::Region).is_some()));
		assert_eq!(mutate.apply(&mut record).unwrap(), Outcome::Mutated(true));
		assert!(record.is_dirty());
	}
}
