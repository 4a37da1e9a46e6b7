/// Native (`z64`) cartridge magic.
pub const Z64_MAGIC: [u8; 4] = [0x80, 0x37, 0x12, 0x40];
/// 16-bit byte-swapped (`v64`) cartridge magic.
pub const V64_MAGIC: [u8; 4] = [0x37, 0x80, 0x40, 0x12];
/// 32-bit word-swapped (`n64`) cartridge magic.
pub const N64_MAGIC: [u8; 4] = [0x40, 0x12, 0x37, 0x80];

/// Byte order detected for a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteLayout {
	/// Big-endian cartridge image.
	Native,
	/// Every 16-bit half swapped.
	ByteSwapped,
	/// Every 32-bit word reversed.
	WordSwapped,
	/// No cartridge header; bytes used as-is.
	Raw,
}

impl ByteLayout {
	/// Render layout as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Native => "z64",
			Self::ByteSwapped => "v64",
			Self::WordSwapped => "n64",
			Self::Raw => "raw",
		}
	}
}

/// Detect the byte order and normalize to big-endian, returning `(layout, bytes)`.
pub fn normalize_bytes(mut raw: Vec<u8>) -> (ByteLayout, Vec<u8>) {
	let layout = match first4(&raw) {
		Z64_MAGIC => ByteLayout::Native,
		V64_MAGIC => ByteLayout::ByteSwapped,
		N64_MAGIC => ByteLayout::WordSwapped,
		_ => ByteLayout::Raw,
	};

	match layout {
		ByteLayout::ByteSwapped => {
			for pair in raw.chunks_exact_mut(2) {
				pair.swap(0, 1);
			}
		}
		ByteLayout::WordSwapped => {
			for word in raw.chunks_exact_mut(4) {
				word.reverse();
			}
		}
		ByteLayout::Native | ByteLayout::Raw => {}
	}

	(layout, raw)
}

fn first4(bytes: &[u8]) -> [u8; 4] {
	let mut magic = [0_u8; 4];
	let take = bytes.len().min(4);
	magic[..take].copy_from_slice(&bytes[..take]);
	magic
}
