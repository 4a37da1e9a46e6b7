use std::collections::HashSet;
use std::str::FromStr;

use log::info;

use crate::model::bytes::read_u32_at;
use crate::model::naming::{LAST, draw_name, pre_name, tagged_draw_name};
use crate::model::{DiagnosticKind, Discovery, EntryTag, ModelError, StreamWalker};

/// Intermediate payload record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
	/// `{ pre, draw }`
	I,
	/// `{ id, draw }`
	C,
	/// `{ id, ptr_a, ptr_b }`
	J,
}

impl PayloadShape {
	/// Record size in bytes.
	pub fn record_size(self) -> usize {
		match self {
			Self::I | Self::C => 8,
			Self::J => 12,
		}
	}

	/// Single-letter shape label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::I => "I",
			Self::C => "C",
			Self::J => "J",
		}
	}
}

/// How instance pointers reach command streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
	/// Instance pointers reference command streams directly.
	Direct,
	/// Instance pointers reference an intermediate table of the given shape.
	Table(PayloadShape),
}

impl FromStr for PayloadMode {
	type Err = ModelError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.to_ascii_lowercase().as_str() {
			"direct" => Ok(Self::Direct),
			"i" => Ok(Self::Table(PayloadShape::I)),
			"c" => Ok(Self::Table(PayloadShape::C)),
			"j" => Ok(Self::Table(PayloadShape::J)),
			_ => Err(ModelError::UnknownPayloadShape { value: value.to_owned() }),
		}
	}
}

/// One decoded payload record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
	/// Optional pre-draw stream and draw stream.
	I {
		/// Stream run before drawing.
		pre: Option<u32>,
		/// Draw stream.
		draw: Option<u32>,
	},
	/// Numeric id and draw stream.
	C {
		/// Stream id.
		id: u32,
		/// Draw stream.
		draw: Option<u32>,
	},
	/// Numeric id and two streams.
	J {
		/// Stream id.
		id: u32,
		/// First stream, the pre stream for regular parts.
		ptr_a: Option<u32>,
		/// Second stream, the draw stream.
		ptr_b: Option<u32>,
	},
}

fn non_null(word: u32) -> Option<u32> {
	(word != 0).then_some(word)
}

impl Payload {
	/// Read a record of `shape` at `offset`.
	pub fn read(bytes: &[u8], offset: i64, shape: PayloadShape) -> Self {
		let w0 = read_u32_at(bytes, offset);
		let w1 = read_u32_at(bytes, offset + 4);
		match shape {
			PayloadShape::I => Self::I {
				pre: non_null(w0),
				draw: non_null(w1),
			},
			PayloadShape::C => Self::C { id: w0, draw: non_null(w1) },
			PayloadShape::J => Self::J {
				id: w0,
				ptr_a: non_null(w1),
				ptr_b: non_null(read_u32_at(bytes, offset + 8)),
			},
		}
	}

	/// Record shape.
	pub fn shape(&self) -> PayloadShape {
		match self {
			Self::I { .. } => PayloadShape::I,
			Self::C { .. } => PayloadShape::C,
			Self::J { .. } => PayloadShape::J,
		}
	}

	/// Raw record words.
	pub fn words(&self) -> Vec<u32> {
		let raw = |ptr: &Option<u32>| ptr.unwrap_or(0);
		match self {
			Self::I { pre, draw } => vec![raw(pre), raw(draw)],
			Self::C { id, draw } => vec![*id, raw(draw)],
			Self::J { id, ptr_a, ptr_b } => vec![*id, raw(ptr_a), raw(ptr_b)],
		}
	}

	/// Null-to-terminator sentinel: first word 4, every other word zero.
	pub fn is_padding(&self) -> bool {
		let words = self.words();
		words[0] == 4 && words[1..].iter().all(|word| *word == 0)
	}

	/// Stream fields probed for sub-stream calls during discovery.
	pub fn stream_fields(&self) -> Vec<u32> {
		match self {
			Self::I { pre, draw } => [*pre, *draw].into_iter().flatten().collect(),
			Self::C { draw, .. } => draw.iter().copied().collect(),
			Self::J { ptr_a, ptr_b, .. } => [*ptr_a, *ptr_b].into_iter().flatten().collect(),
		}
	}
}

/// Naming role of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSlot {
	/// Referenced by an instance pointer; `part` is its ordinal among referenced rows.
	Referenced {
		/// Position-based part number.
		part: usize,
	},
	/// Not referenced, decoded with the running part counter to keep numbering dense.
	Unreferenced {
		/// Running counter value used for its names.
		part: usize,
	},
	/// Sentinel row, skipped entirely.
	Padding,
}

/// One row of the intermediate payload table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRecord {
	/// Row index inside the table.
	pub index: usize,
	/// Row load address.
	pub load_addr: u32,
	/// Row file offset.
	pub file_offset: i64,
	/// Decoded fields.
	pub payload: Payload,
	/// Earliest referenced row whose streams call sub-streams.
	pub is_first: bool,
	/// Latest referenced row whose streams call sub-streams.
	pub is_last: bool,
	/// Naming role.
	pub slot: RecordSlot,
}

impl PayloadRecord {
	/// Whether the row is referenced by an instance pointer.
	pub fn is_referenced(&self) -> bool {
		matches!(self.slot, RecordSlot::Referenced { .. })
	}
}

/// Intermediate payload table spanning `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadTable {
	/// Record layout.
	pub shape: PayloadShape,
	/// Load address of row 0.
	pub start: u32,
	/// Exclusive end, the instance table's load address.
	pub end: u32,
	/// Every row, referenced or not.
	pub records: Vec<PayloadRecord>,
}

impl PayloadTable {
	/// Table size in bytes.
	pub fn size_bytes(&self) -> usize {
		self.records.len() * self.shape.record_size()
	}

	/// Row index addressed by an instance pointer.
	pub fn row_of(&self, pointer: u32) -> Option<usize> {
		let rel = pointer.checked_sub(self.start)? as usize;
		let size = self.shape.record_size();
		(rel % size == 0 && rel / size < self.records.len()).then_some(rel / size)
	}
}

/// Classify the intermediate table referenced by `pointers` and register every stream it names.
///
/// The first pass probes referenced rows for sub-stream calls to pick `first`/`last`; the second pass names
/// streams by position.
pub fn classify_table(walker: &mut StreamWalker<'_>, pointers: &[u32], shape: PayloadShape, model_start: u32) -> PayloadTable {
	let size = shape.record_size();
	let start = pointers.iter().copied().min().unwrap_or(model_start);
	let mut table = PayloadTable {
		shape,
		start,
		end: model_start,
		records: Vec::new(),
	};

	if start >= model_start {
		walker.diagnostics_mut().report("gfxdata", model_start, DiagnosticKind::EmptyPayloadSpan);
		return table;
	}

	let count = (model_start - start) as usize / size;
	let referenced: HashSet<u32> = pointers.iter().copied().collect();
	let row_addr = |idx: usize| start + (idx * size) as u32;

	let probe: &StreamWalker<'_> = walker;
	let with_calls: Vec<usize> = (0..count)
		.filter(|idx| referenced.contains(&row_addr(*idx)))
		.filter(|idx| {
			let (_, payload) = read_row(probe, row_addr(*idx), shape);
			payload.stream_fields().into_iter().any(|field| probe.probe_calls(field))
		})
		.collect();
	let first = with_calls.first().copied();
	let last = with_calls.last().copied();

	let mut next_part = 0;
	let mut counter = usize::from(first.is_some());

	for idx in 0..count {
		let load_addr = row_addr(idx);
		let (file_offset, payload) = read_row(walker, load_addr, shape);
		let is_first = first == Some(idx);
		let is_last = last == Some(idx);

		let slot = if referenced.contains(&load_addr) {
			let part = next_part;
			next_part += 1;
			name_referenced(walker, &payload, part, is_first, is_last);
			if !(is_first || is_last) {
				counter += 1;
			}
			RecordSlot::Referenced { part }
		} else if payload.is_padding() {
			RecordSlot::Padding
		} else {
			let part = counter;
			if name_unreferenced(walker, &payload, part) {
				counter += 1;
			}
			RecordSlot::Unreferenced { part }
		};

		table.records.push(PayloadRecord {
			index: idx,
			load_addr,
			file_offset,
			payload,
			is_first,
			is_last,
			slot,
		});
	}

	info!(
		"payload table {} at 0x{start:08X}: {} rows, {} referenced",
		shape.as_str(),
		table.records.len(),
		next_part
	);
	table
}

fn read_row(walker: &StreamWalker<'_>, load_addr: u32, shape: PayloadShape) -> (i64, Payload) {
	let offset = walker.segment().to_file(load_addr);
	(offset, Payload::read(walker.bytes(), offset, shape))
}

fn fresh(walker: &StreamWalker<'_>, ptr: Option<u32>) -> Option<u32> {
	ptr.filter(|addr| !walker.contains(*addr))
}

fn name_referenced(walker: &mut StreamWalker<'_>, payload: &Payload, part: usize, is_first: bool, is_last: bool) {
	let tag = EntryTag::from_flags(is_first, is_last);
	match *payload {
		Payload::I { pre: None, draw } => name_stream(walker, draw, tagged_draw_name(tag, part), tag.is_special().then_some(part)),
		Payload::I { pre, draw } if is_last => {
			name_stream(walker, draw, LAST.to_owned(), Some(part));
			name_stream(walker, pre, pre_name(part), None);
		}
		Payload::I { pre, draw } => {
			name_stream(walker, pre, pre_name(part), None);
			name_stream(walker, draw, draw_name(part), None);
		}
		Payload::C { draw, .. } => name_stream(walker, draw, tagged_draw_name(tag, part), tag.is_special().then_some(part)),
		Payload::J { ptr_b, .. } if tag.is_special() => name_stream(walker, ptr_b, tagged_draw_name(tag, part), Some(part)),
		Payload::J { ptr_a, ptr_b, .. } => {
			name_stream(walker, ptr_a, pre_name(part), None);
			name_stream(walker, ptr_b, draw_name(part), None);
		}
	}
}

/// Name an unreferenced row's streams with the running counter; returns whether the counter advances.
fn name_unreferenced(walker: &mut StreamWalker<'_>, payload: &Payload, part: usize) -> bool {
	match *payload {
		Payload::I { pre: first, draw: second } | Payload::J { ptr_a: first, ptr_b: second, .. } => {
			let pre = fresh(walker, first);
			name_stream(walker, pre, pre_name(part), None);
			let draw = fresh(walker, second);
			name_stream(walker, draw, draw_name(part), None);
			true
		}
		Payload::C { draw, .. } => {
			let Some(draw) = fresh(walker, draw) else {
				return false;
			};
			name_stream(walker, Some(draw), draw_name(part), None);
			true
		}
	}
}

/// Register `ptr` as `name`, following sub-stream calls from `call_base` when the stream is `first`/`last`.
fn name_stream(walker: &mut StreamWalker<'_>, ptr: Option<u32>, name: String, call_base: Option<usize>) {
	let Some(addr) = ptr else {
		return;
	};
	if walker.discover(addr, name) != Discovery::Unresolved
		&& let Some(base) = call_base
	{
		walker.resolve_calls(addr, base);
	}
}

/// One instance pointer classified in direct mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectEntry {
	/// Ordinal among non-null instance pointers.
	pub position: usize,
	/// Command stream address.
	pub load_addr: u32,
	/// Naming role.
	pub tag: EntryTag,
}

/// Classify instance pointers that reference command streams directly.
///
/// Pointers that do not decode are skipped and do not advance the part counter.
pub fn classify_direct(walker: &mut StreamWalker<'_>, pointers: &[u32]) -> Vec<DirectEntry> {
	let with_calls: Vec<u32> = pointers.iter().copied().filter(|ptr| walker.probe_calls(*ptr)).collect();
	let first = with_calls.first().copied();
	let last = with_calls.last().copied();

	let mut counter = usize::from(first.is_some());
	let mut out = Vec::new();

	for (position, ptr) in pointers.iter().copied().enumerate() {
		if walker.decode(ptr, "probe").is_none() {
			continue;
		}

		let tag = if first == Some(ptr) {
			EntryTag::First
		} else if last == Some(ptr) {
			EntryTag::Last
		} else {
			EntryTag::Regular
		};
		let name = tagged_draw_name(tag, counter);
		if tag != EntryTag::First {
			counter += 1;
		}

		name_stream(walker, Some(ptr), name, tag.is_special().then_some(position));
		out.push(DirectEntry {
			position,
			load_addr: ptr,
			tag,
		});
	}

	info!("direct mode: {} of {} pointers decoded", out.len(), pointers.len());
	out
}
