use crate::{
	math::bit::{GetBit, SetBit},
	world::io::region::coord::ChunkOffset,
};

/// A set of the 1024 chunks in a region, stored as a 1024-bit mask.
/// Iteration is in ascending [ChunkOffset] index order.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ChunkSet(Box<[u32; 32]>);

impl ChunkSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self(Box::new([0; 32]))
	}

	/// Creates a set holding every chunk of the region.
	pub fn full() -> Self {
		Self(Box::new([u32::MAX; 32]))
	}

	#[inline(always)]
	fn split(offset: ChunkOffset) -> (usize, usize) {
		let index = offset.index();
		(index / 32, index % 32)
	}

	pub fn contains(&self, offset: ChunkOffset) -> bool {
		let (word, bit) = Self::split(offset);
		self.0[word].get_bit(bit)
	}

	/// Adds `offset`. Returns true if it was not present.
	pub fn add(&mut self, offset: ChunkOffset) -> bool {
		let (word, bit) = Self::split(offset);
		let was = self.0[word].get_bit(bit);
		self.0[word] = self.0[word].set_bit(bit, true);
		!was
	}

	/// Removes `offset`. Returns true if it was present.
	pub fn remove(&mut self, offset: ChunkOffset) -> bool {
		let (word, bit) = Self::split(offset);
		let was = self.0[word].get_bit(bit);
		self.0[word] = self.0[word].set_bit(bit, false);
		was
	}

	pub fn len(&self) -> usize {
		self.0.iter().map(|word| word.count_ones() as usize).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.0.iter().all(|&word| word == 0)
	}

	pub fn is_full(&self) -> bool {
		self.0.iter().all(|&word| word == u32::MAX)
	}

	/// Adds every chunk of `other`.
	pub fn union_with(&mut self, other: &ChunkSet) {
		self.0.iter_mut()
			.zip(other.0.iter())
			.for_each(|(lhs, rhs)| *lhs |= *rhs);
	}

	/// The chunks of the region that are not in this set.
	pub fn complement(&self) -> ChunkSet {
		let mut inverted = self.clone();
		inverted.0.iter_mut().for_each(|word| *word = !*word);
		inverted
	}

	pub fn iter(&self) -> ChunkSetIter<'_> {
		ChunkSetIter {
			words: &self.0,
			word: 0,
			bits: self.0[0],
		}
	}
}

impl Default for ChunkSet {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ChunkSet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

impl From<[u32; 32]> for ChunkSet {
	fn from(value: [u32; 32]) -> Self {
		ChunkSet(Box::new(value))
	}
}

impl From<&ChunkSet> for [u32; 32] {
	fn from(value: &ChunkSet) -> Self {
		*value.0
	}
}

impl FromIterator<ChunkOffset> for ChunkSet {
	fn from_iter<T: IntoIterator<Item = ChunkOffset>>(iter: T) -> Self {
		let mut set = ChunkSet::new();
		set.extend(iter);
		set
	}
}

impl Extend<ChunkOffset> for ChunkSet {
	fn extend<T: IntoIterator<Item = ChunkOffset>>(&mut self, iter: T) {
		iter.into_iter().for_each(|offset| {
			self.add(offset);
		});
	}
}

impl<'a> IntoIterator for &'a ChunkSet {
	type Item = ChunkOffset;
	type IntoIter = ChunkSetIter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Iterates the set bits of a [ChunkSet] in ascending order.
#[derive(Clone)]
pub struct ChunkSetIter<'a> {
	words: &'a [u32; 32],
	word: usize,
	/// Bits of the current word not yet yielded.
	bits: u32,
}

impl<'a> Iterator for ChunkSetIter<'a> {
	type Item = ChunkOffset;

	fn next(&mut self) -> Option<Self::Item> {
		while self.bits == 0 {
			self.word += 1;
			if self.word >= self.words.len() {
				return None;
			}
			self.bits = self.words[self.word];
		}
		let bit = self.bits.trailing_zeros() as usize;
		// Clear the lowest set bit.
		self.bits &= self.bits - 1;
		Some(ChunkOffset::from_index(self.word * 32 + bit))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_and_remove() {
		let mut set = ChunkSet::new();
		assert!(set.add(ChunkOffset::new(3, 4)));
		assert!(!set.add(ChunkOffset::new(3, 4)));
		assert!(set.contains(ChunkOffset::new(3, 4)));
		assert_eq!(set.len(), 1);
		assert!(set.remove(ChunkOffset::new(3, 4)));
		assert!(!set.remove(ChunkOffset::new(3, 4)));
		assert!(set.is_empty());
	}

	#[test]
	fn iterates_in_index_order() {
		let offsets = [ChunkOffset::new(31, 31), ChunkOffset::new(0, 1), ChunkOffset::new(5, 0), ChunkOffset::new(31, 0)];
		let set: ChunkSet = offsets.into_iter().collect();
		let found: Vec<usize> = set.iter().map(|offset| offset.index()).collect();
		assert_eq!(found, vec![5, 31, 32, 1023]);
	}

	#[test]
	fn full_set_matches_all_offsets() {
		let full = ChunkSet::full();
		assert!(full.is_full());
		assert_eq!(full.len(), 1024);
		assert!(full.iter().eq(ChunkOffset::all()));
	}

	#[test]
	fn complement() {
		let set: ChunkSet = [ChunkOffset::new(1, 1)].into_iter().collect();
		let inverted = set.complement();
		assert_eq!(inverted.len(), 1023);
		assert!(!inverted.contains(ChunkOffset::new(1, 1)));
		assert!(inverted.complement() == set);
	}
}
