mod unit_boundary_inference {

	use crate::model::{AddressRegistry, FRAME_ARRAY_FALLBACK, POINTER_ARRAY_FALLBACK};

	#[test]
	fn capacity_stops_at_next_known_structure() {
		let registry: AddressRegistry = [0x8020_0000, 0x8020_0040, 0x8020_0100].into_iter().collect();
		assert_eq!(registry.capacity(0x8020_0000, POINTER_ARRAY_FALLBACK), 16);
		assert_eq!(registry.next_after(0x8020_0040), Some(0x8020_0100));
		assert_eq!(registry.next_after(0x8020_0100), None);
	}

	#[test]
	fn fallback_applies_when_nothing_follows() {
		let registry: AddressRegistry = [0x8020_0000].into_iter().collect();
		assert_eq!(registry.capacity(0x8020_0000, POINTER_ARRAY_FALLBACK), 100);
		assert_eq!(registry.capacity(0x8020_0010, FRAME_ARRAY_FALLBACK), 20);
	}

	#[test]
	fn nearer_structure_only_shrinks_capacity() {
		let start = 0x8020_0000;
		let mut registry: AddressRegistry = [0x8020_0080].into_iter().collect();
		let before = registry.capacity(start, POINTER_ARRAY_FALLBACK);
		registry.insert(0x8020_0100);
		assert_eq!(registry.capacity(start, POINTER_ARRAY_FALLBACK), before);
		registry.insert(0x8020_0020);
		let after = registry.capacity(start, POINTER_ARRAY_FALLBACK);
		assert!(after < before);
		assert_eq!(after, 8);
	}

	#[test]
	fn capacity_never_ends_before_first_entry() {
		let registry: AddressRegistry = [0x8020_0002].into_iter().collect();
		assert_eq!(registry.capacity(0x8020_0000, POINTER_ARRAY_FALLBACK), 1);
	}

	#[test]
	fn above_drops_back_references() {
		let registry: AddressRegistry = [0x8010_0000, 0x8020_0000, 0x8020_0040].into_iter().collect();
		let local = registry.above(0x8020_0000);
		assert_eq!(local.iter().collect::<Vec<_>>(), vec![0x8020_0040]);
		assert_eq!(local.capacity(0x8020_0000, POINTER_ARRAY_FALLBACK), 16);
	}
}
