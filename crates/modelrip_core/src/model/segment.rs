/// High byte carried by every address inside the model's segment.
pub const SEGMENT_TAG: u32 = 0x80;

/// Linear mapping between load addresses and file offsets for one contiguous region.
///
/// `file_offset = file_base + (load_addr - load_base)`, with the low 16 bits of `load_base` always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
	/// Load address at the start of the 64 KiB page containing the anchor.
	pub load_base: u32,
	/// File offset corresponding to `load_base`.
	pub file_base: i64,
}

impl Segment {
	/// Derive the mapping from one known `(load_addr, file_offset)` pair.
	pub fn from_anchor(load_addr: u32, file_offset: u64) -> Self {
		Self {
			load_base: load_addr & 0xFFFF_0000,
			file_base: file_offset as i64 - i64::from(load_addr & 0xFFFF),
		}
	}

	/// Translate a load address to a file offset.
	pub fn to_file(&self, load_addr: u32) -> i64 {
		self.file_base + (i64::from(load_addr) - i64::from(self.load_base))
	}

	/// Translate a file offset back to a load address.
	pub fn to_load(&self, file_offset: i64) -> u32 {
		(i64::from(self.load_base) + (file_offset - self.file_base)) as u32
	}
}

/// Whether `addr` carries the segment's high byte.
pub fn is_segment_address(addr: u32) -> bool {
	addr >> 24 == SEGMENT_TAG
}

/// Whether `addr` is a usable data pointer: inside the segment and not the bare segment base.
pub fn is_valid_pointer(addr: u32) -> bool {
	is_segment_address(addr) && addr != 0x8000_0000
}
