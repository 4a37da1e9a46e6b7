use std::fs;
use std::path::Path;

use crate::model::layout::normalize_bytes;
use crate::model::{ByteLayout, ModelError, Result};

/// Whole cartridge image held in memory, normalized to big-endian.
#[derive(Debug, Clone)]
pub struct RomImage {
	/// Byte order the image was stored in.
	pub layout: ByteLayout,
	bytes: Vec<u8>,
}

impl RomImage {
	/// Read and normalize an image from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let raw = fs::read(path)?;
		Ok(Self::from_bytes(raw))
	}

	/// Normalize an in-memory image.
	pub fn from_bytes(raw: Vec<u8>) -> Self {
		let (layout, bytes) = normalize_bytes(raw);
		Self { layout, bytes }
	}

	/// Return the normalized image bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Image length in bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether the image holds no bytes.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Validate a caller-supplied starting offset.
	pub fn check_offset(&self, offset: u64) -> Result<()> {
		if offset >= self.bytes.len() as u64 {
			return Err(ModelError::OffsetOutOfRange {
				offset,
				len: self.bytes.len(),
			});
		}
		Ok(())
	}

	/// Validate that a `need`-byte record starting at `offset` lies fully inside the image.
	pub fn check_record(&self, offset: u64, need: usize) -> Result<()> {
		self.check_offset(offset)?;
		if offset + need as u64 > self.bytes.len() as u64 {
			return Err(ModelError::RecordTruncated {
				offset,
				need,
				len: self.bytes.len(),
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests;
