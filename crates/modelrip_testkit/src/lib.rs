//! Shared test helpers for workspace crates.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Write `bytes` to a per-process scratch file under the target directory and return its path.
pub fn write_temp_image(name: &str, bytes: &[u8]) -> PathBuf {
	let dir = target_dir().join("modelrip-testkit");
	fs::create_dir_all(&dir).expect("scratch dir is creatable");
	let path = dir.join(format!("{name}-{}.bin", std::process::id()));
	fs::write(&path, bytes).expect("scratch image is writable");
	path
}

/// Parse a successful command's stdout as JSON.
pub fn stdout_json(output: &Output) -> serde_json::Value {
	assert!(
		output.status.success(),
		"command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

/// Synthetic big-endian image addressed by load address.
///
/// File offset 0 corresponds to `load_base`; the buffer grows to fit every write.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
	load_base: u32,
	bytes: Vec<u8>,
}

impl ImageBuilder {
	/// Create an image of `len` zero bytes whose first byte loads at `load_base`.
	pub fn new(load_base: u32, len: usize) -> Self {
		Self {
			load_base,
			bytes: vec![0; len],
		}
	}

	/// File offset of a load address.
	pub fn offset(&self, addr: u32) -> u64 {
		u64::from(addr - self.load_base)
	}

	/// Write raw bytes at a load address.
	pub fn put_bytes(&mut self, addr: u32, data: &[u8]) -> &mut Self {
		let start = (addr - self.load_base) as usize;
		let end = start + data.len();
		if self.bytes.len() < end {
			self.bytes.resize(end, 0);
		}
		self.bytes[start..end].copy_from_slice(data);
		self
	}

	/// Write a big-endian `u8`.
	pub fn put_u8(&mut self, addr: u32, value: u8) -> &mut Self {
		self.put_bytes(addr, &[value])
	}

	/// Write a big-endian `u16`.
	pub fn put_u16(&mut self, addr: u32, value: u16) -> &mut Self {
		self.put_bytes(addr, &value.to_be_bytes())
	}

	/// Write a big-endian `u32`.
	pub fn put_u32(&mut self, addr: u32, value: u32) -> &mut Self {
		self.put_bytes(addr, &value.to_be_bytes())
	}

	/// Write consecutive big-endian `u32` words.
	pub fn put_words(&mut self, addr: u32, words: &[u32]) -> &mut Self {
		for (idx, word) in words.iter().enumerate() {
			self.put_u32(addr + idx as u32 * 4, *word);
		}
		self
	}

	/// Write a big-endian `f32`.
	pub fn put_f32(&mut self, addr: u32, value: f32) -> &mut Self {
		self.put_bytes(addr, &value.to_be_bytes())
	}

	/// Write one 8-byte command word `opcode << 24 | low`, `operand`.
	pub fn put_cmd(&mut self, addr: u32, opcode: u8, operand: u32) -> &mut Self {
		self.put_u32(addr, u32::from(opcode) << 24).put_u32(addr + 4, operand)
	}

	/// Write a sequence of `(opcode, operand)` command words.
	pub fn put_stream(&mut self, addr: u32, commands: &[(u8, u32)]) -> &mut Self {
		for (idx, (opcode, operand)) in commands.iter().enumerate() {
			self.put_cmd(addr + idx as u32 * 8, *opcode, *operand);
		}
		self
	}

	/// Write one 44-byte instance record.
	pub fn put_instance(&mut self, addr: u32, index: u32, pointer: u32, position: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> &mut Self {
		self.put_u32(addr, index).put_u32(addr + 4, pointer);
		for (base, vec) in [(8, position), (20, rotation), (32, scale)] {
			for (idx, value) in vec.iter().enumerate() {
				self.put_f32(addr + base + idx as u32 * 4, *value);
			}
		}
		self
	}

	/// Borrow the image bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Finish and return the image bytes.
	pub fn build(&self) -> Vec<u8> {
		self.bytes.clone()
	}
}
