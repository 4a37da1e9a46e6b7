use crate::model::INSTANCE_RECORD_SIZE;
use crate::model::bytes::read_u32_at;
use crate::model::segment::is_segment_address;

/// Shortest run reported as an instance table.
pub const MIN_TABLE_RECORDS: usize = 3;

/// Possible instance table found by [`find_instance_tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCandidate {
	/// File offset of record 0.
	pub offset: u64,
	/// Records matched.
	pub count: usize,
}

impl TableCandidate {
	fn end(&self) -> u64 {
		self.offset + (self.count * INSTANCE_RECORD_SIZE) as u64
	}

	fn overlaps(&self, other: &TableCandidate) -> bool {
		self.offset < other.end() && other.offset < self.end()
	}
}

fn pointer_fits(pointer: u32) -> bool {
	pointer == 0 || is_segment_address(pointer)
}

fn header_at(bytes: &[u8], offset: u64) -> (u32, u32) {
	(read_u32_at(bytes, offset as i64), read_u32_at(bytes, offset as i64 + 4))
}

fn match_run(bytes: &[u8], offset: u64) -> Option<TableCandidate> {
	let len = bytes.len() as u64;
	let record = INSTANCE_RECORD_SIZE as u64;
	let mut count = 0usize;
	let mut at = offset;

	while at + record <= len {
		let (index, pointer) = header_at(bytes, at);
		if index as usize != count {
			break;
		}
		if (count == 0 && pointer != 0) || (count > 0 && !pointer_fits(pointer)) {
			break;
		}
		count += 1;
		at += record;
		if count >= 2 && pointer == 0 {
			return (count >= MIN_TABLE_RECORDS).then_some(TableCandidate { offset, count });
		}
	}

	if count < MIN_TABLE_RECORDS || at + record > len {
		return None;
	}
	let (index, pointer) = header_at(bytes, at);
	(index as usize != count || !pointer_fits(pointer)).then_some(TableCandidate { offset, count })
}

/// Scan 4-byte aligned offsets for runs of instance records with counting indices.
///
/// Record 0 must carry a null pointer and later records a null or segment pointer. Overlapping runs are reduced to
/// the longest one, earlier runs winning ties.
pub fn find_instance_tables(bytes: &[u8]) -> Vec<TableCandidate> {
	let last = (bytes.len() as u64).saturating_sub(INSTANCE_RECORD_SIZE as u64);
	let mut kept: Vec<TableCandidate> = Vec::new();

	for offset in (0..last).step_by(4) {
		let Some(candidate) = match_run(bytes, offset) else {
			continue;
		};

		match kept.iter().position(|existing| existing.overlaps(&candidate)) {
			Some(idx) if candidate.count > kept[idx].count => {
				kept.remove(idx);
				kept.push(candidate);
			}
			Some(_) => {}
			None => kept.push(candidate),
		}
	}

	kept
}
