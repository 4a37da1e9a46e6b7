use std::collections::BTreeSet;
use std::ops::Bound;

/// Entries assumed for a pointer array with no known structure after it.
pub const POINTER_ARRAY_FALLBACK: usize = 100;
/// Entries assumed for a frame array with no known structure after it.
pub const FRAME_ARRAY_FALLBACK: usize = 20;
/// Hard cap on frame array entries.
pub const MAX_FRAME_ENTRIES: usize = 100;

/// Owned set of load addresses known to start some structure.
///
/// An unbounded array starting at `A` ends at the smallest known address strictly greater than `A`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressRegistry {
	addrs: BTreeSet<u32>,
}

impl AddressRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a structure start; returns whether it was new.
	pub fn insert(&mut self, addr: u32) -> bool {
		self.addrs.insert(addr)
	}

	/// Whether a structure is known to start at `addr`.
	pub fn contains(&self, addr: u32) -> bool {
		self.addrs.contains(&addr)
	}

	/// Smallest known address strictly greater than `addr`.
	pub fn next_after(&self, addr: u32) -> Option<u32> {
		self.addrs.range((Bound::Excluded(addr), Bound::Unbounded)).next().copied()
	}

	/// Copy restricted to addresses strictly greater than `floor`.
	pub fn above(&self, floor: u32) -> Self {
		Self {
			addrs: self.addrs.range((Bound::Excluded(floor), Bound::Unbounded)).copied().collect(),
		}
	}

	/// Inferred 4-byte entry capacity of an array at `start`, never below one entry.
	pub fn capacity(&self, start: u32, fallback: usize) -> usize {
		match self.next_after(start) {
			Some(next) => ((next - start) as usize / 4).max(1),
			None => fallback,
		}
	}

	/// Known addresses in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
		self.addrs.iter().copied()
	}

	/// Number of known addresses.
	pub fn len(&self) -> usize {
		self.addrs.len()
	}

	/// Whether no address is known.
	pub fn is_empty(&self) -> bool {
		self.addrs.is_empty()
	}
}

impl FromIterator<u32> for AddressRegistry {
	fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
		Self {
			addrs: iter.into_iter().collect(),
		}
	}
}

impl Extend<u32> for AddressRegistry {
	fn extend<T: IntoIterator<Item = u32>>(&mut self, iter: T) {
		self.addrs.extend(iter);
	}
}

#[cfg(test)]
mod tests;
