use log::debug;

use crate::model::bytes::Cursor;

/// Size of one instance-transform record in bytes.
pub const INSTANCE_RECORD_SIZE: usize = 44;
/// Hard cap on instance records read per table.
pub const MAX_INSTANCE_RECORDS: usize = 100;

/// One element of the top-level instance-transform table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceEntry {
	/// Informational index field.
	pub index: u32,
	/// Payload or command-stream address, `None` when null.
	pub pointer: Option<u32>,
	/// Translation.
	pub position: [f32; 3],
	/// Rotation.
	pub rotation: [f32; 3],
	/// Scale.
	pub scale: [f32; 3],
}

impl InstanceEntry {
	/// Read one record at `offset`.
	pub fn read(bytes: &[u8], offset: i64) -> Self {
		let mut cursor = Cursor::at(bytes, offset);
		let index = cursor.read_u32();
		let pointer = cursor.read_u32();
		Self {
			index,
			pointer: (pointer != 0).then_some(pointer),
			position: cursor.read_vec3(),
			rotation: cursor.read_vec3(),
			scale: cursor.read_vec3(),
		}
	}

	/// Null pointer with every vector exactly zero.
	pub fn is_terminator(&self) -> bool {
		self.pointer.is_none() && [self.position, self.rotation, self.scale].iter().flatten().all(|value| *value == 0.0)
	}
}

/// Read instance records from `offset` until a terminator follows at least one record.
///
/// Stops early when the next record would overrun the image or the record cap is reached. The terminator is kept.
pub fn scan_instances(bytes: &[u8], offset: u64) -> Vec<InstanceEntry> {
	let mut out = Vec::new();
	let mut at = offset;

	while out.len() < MAX_INSTANCE_RECORDS && at + INSTANCE_RECORD_SIZE as u64 <= bytes.len() as u64 {
		let entry = InstanceEntry::read(bytes, at as i64);
		out.push(entry);
		at += INSTANCE_RECORD_SIZE as u64;

		if entry.is_terminator() && out.len() > 1 {
			break;
		}
	}

	debug!("scanned {} instance records at 0x{offset:X}", out.len());
	out
}

/// Non-null instance pointers in table order, duplicates included.
pub fn instance_pointers(entries: &[InstanceEntry]) -> Vec<u32> {
	entries.iter().filter_map(|entry| entry.pointer).collect()
}
