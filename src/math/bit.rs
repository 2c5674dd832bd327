//! Module for bit level manipulation.

pub trait SetBit {
	fn set_bit(self, index: usize, on: bool) -> Self;
}

pub trait GetBit {
	fn get_bit(self, index: usize) -> bool;
}

macro_rules! __get_set_impl {
	($type:ty) => {

		impl SetBit for $type {
			#[inline(always)]
			fn set_bit(self, index: usize, on: bool) -> Self {
				if on {
					self | (1 << index)
				} else {
					self & !(1 << index)
				}
			}
		}

		impl GetBit for $type {
			#[inline(always)]
			fn get_bit(self, index: usize) -> bool {
				(self & (1 << index)) != 0
			}
		}

	};
}

__get_set_impl!(u32);
__get_set_impl!(u64);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_and_get() {
		let bits = 0u32.set_bit(3, true).set_bit(31, true);
		assert!(bits.get_bit(3));
		assert!(bits.get_bit(31));
		assert!(!bits.get_bit(4));
		assert_eq!(bits.set_bit(3, false), 1 << 31);
	}
}
