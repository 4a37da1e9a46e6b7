use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use log::debug;

use crate::model::bytes::{read_u32_at, slice_at};
use crate::model::gfx::{COMMAND_SIZE, Command};
use crate::model::naming::{call_target_name, variant_name};
use crate::model::{DiagnosticKind, Diagnostics, LodSlot, Segment};

/// Maximum bytes read for one stream's primary decode.
pub const STREAM_WINDOW: usize = 0x1000;
/// Maximum bytes read per hop of the vertex sweep.
pub const SWEEP_WINDOW: usize = 0x200;
/// LOD branch targets kept per stream.
pub const MAX_LOD_BRANCHES: usize = 2;

/// A decoded graphics command stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandStream {
	/// Assigned identifier.
	pub name: String,
	/// Load address; the stream's identity.
	pub load_addr: u32,
	/// File offset of the first command.
	pub file_offset: i64,
	/// Bytes up to and including the terminator, or the whole window when none was found.
	pub length_bytes: usize,
	/// Kept LOD branch targets, at most two.
	pub lod_branch_count: usize,
	/// LOD branch targets seen before clamping.
	pub lod_branches_found: usize,
	/// First LOD branch target.
	pub lod_near: Option<u32>,
	/// Second LOD branch target.
	pub lod_far: Option<u32>,
	/// Sub-stream call targets in command order.
	pub calls: Vec<u32>,
	/// Vertex buffer addresses referenced by this stream or its branch targets.
	pub vertex_refs: BTreeSet<u32>,
	/// Parent stream and slot when discovered as a LOD variant.
	pub variant_of: Option<(u32, LodSlot)>,
	/// Raw command bytes.
	pub bytes: Vec<u8>,
}

impl CommandStream {
	/// LOD branch target for `slot`.
	pub fn lod_target(&self, slot: LodSlot) -> Option<u32> {
		match slot {
			LodSlot::Near => self.lod_near,
			LodSlot::Far => self.lod_far,
		}
	}

	/// Whether the stream calls any sub-stream.
	pub fn has_calls(&self) -> bool {
		!self.calls.is_empty()
	}
}

/// Decode the stream at `load_addr` without registering it.
///
/// Returns `None` when the address translates outside the image.
pub fn decode_stream(bytes: &[u8], segment: &Segment, load_addr: u32, name: &str) -> Option<CommandStream> {
	let offset = segment.to_file(load_addr);
	let remaining = window_len(bytes, offset, STREAM_WINDOW)?;
	let window = remaining.next_multiple_of(COMMAND_SIZE);

	let mut length_bytes = window;
	let mut lod_targets = Vec::new();
	let mut sweep_roots = Vec::new();
	let mut calls = Vec::new();
	let mut vertex_refs = BTreeSet::new();

	for at in (0..window).step_by(COMMAND_SIZE) {
		let word = offset + at as i64;
		match Command::decode(read_u32_at(bytes, word), read_u32_at(bytes, word + 4)) {
			Command::End => {
				length_bytes = at + COMMAND_SIZE;
				break;
			}
			Command::Vertex(addr) => {
				vertex_refs.insert(addr);
			}
			Command::LodBranch(target) => {
				lod_targets.push(target);
				sweep_roots.push(target);
			}
			Command::Call(target) => calls.push(target),
			Command::Tag(target) => sweep_roots.push(target),
			Command::Other => {}
		}
	}

	sweep_vertices(bytes, segment, sweep_roots, &mut vertex_refs);

	Some(CommandStream {
		name: name.to_owned(),
		load_addr,
		file_offset: offset,
		length_bytes,
		lod_branch_count: lod_targets.len().min(MAX_LOD_BRANCHES),
		lod_branches_found: lod_targets.len(),
		lod_near: lod_targets.first().copied(),
		lod_far: lod_targets.get(1).copied(),
		calls,
		vertex_refs,
		variant_of: None,
		bytes: slice_at(bytes, offset, length_bytes),
	})
}

/// Union vertex references reachable through branch targets, breadth-first with a revisit guard.
fn sweep_vertices(bytes: &[u8], segment: &Segment, roots: Vec<u32>, vertex_refs: &mut BTreeSet<u32>) {
	let mut visited = HashSet::new();
	let mut queue = VecDeque::from(roots);

	while let Some(addr) = queue.pop_front() {
		if !visited.insert(addr) {
			continue;
		}

		let offset = segment.to_file(addr);
		let Some(hop) = window_len(bytes, offset, SWEEP_WINDOW) else {
			continue;
		};

		for at in (0..hop).step_by(COMMAND_SIZE) {
			let word = offset + at as i64;
			match Command::decode(read_u32_at(bytes, word), read_u32_at(bytes, word + 4)) {
				Command::End => break,
				Command::Vertex(vtx) => {
					vertex_refs.insert(vtx);
				}
				Command::LodBranch(target) | Command::Tag(target) if !visited.contains(&target) => queue.push_back(target),
				_ => {}
			}
		}
	}
}

fn window_len(bytes: &[u8], offset: i64, cap: usize) -> Option<usize> {
	let start = usize::try_from(offset).ok().filter(|start| *start < bytes.len())?;
	Some((bytes.len() - start).min(cap))
}

/// Outcome of asking the walker for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
	/// Newly decoded and registered.
	Inserted,
	/// Already registered; the first identifier is kept.
	Existing,
	/// Not decodable, or already being decoded further up the recursion.
	Unresolved,
}

/// Memoizing command-stream graph walker for one segment.
#[derive(Debug)]
pub struct StreamWalker<'a> {
	bytes: &'a [u8],
	segment: Segment,
	streams: IndexMap<u32, CommandStream>,
	in_progress: HashSet<u32>,
	owners: HashMap<String, u32>,
	diagnostics: Diagnostics,
}

impl<'a> StreamWalker<'a> {
	/// Create an empty walker over `bytes`.
	pub fn new(bytes: &'a [u8], segment: Segment) -> Self {
		Self {
			bytes,
			segment,
			streams: IndexMap::new(),
			in_progress: HashSet::new(),
			owners: HashMap::new(),
			diagnostics: Diagnostics::default(),
		}
	}

	/// Image being walked.
	pub fn bytes(&self) -> &'a [u8] {
		self.bytes
	}

	/// Segment used for address translation.
	pub fn segment(&self) -> &Segment {
		&self.segment
	}

	/// Decode a stream under a throwaway name without registering it or reporting anything.
	pub fn decode(&self, load_addr: u32, name: &str) -> Option<CommandStream> {
		if self.in_progress.contains(&load_addr) {
			return None;
		}
		decode_stream(self.bytes, &self.segment, load_addr, name)
	}

	/// Whether the stream at `load_addr` decodes and calls any sub-stream.
	pub fn probe_calls(&self, load_addr: u32) -> bool {
		self.decode(load_addr, "probe").is_some_and(|stream| stream.has_calls())
	}

	/// Whether `load_addr` is registered.
	pub fn contains(&self, load_addr: u32) -> bool {
		self.streams.contains_key(&load_addr)
	}

	/// Registered stream at `load_addr`.
	pub fn get(&self, load_addr: u32) -> Option<&CommandStream> {
		self.streams.get(&load_addr)
	}

	/// Register the stream at `load_addr` as `name` and resolve its LOD branches.
	///
	/// Undecodable streams are reported and left unregistered.
	pub fn discover(&mut self, load_addr: u32, name: impl Into<String>) -> Discovery {
		let name = name.into();
		let outcome = self.register(load_addr, &name, None);
		if outcome == Discovery::Unresolved {
			self.diagnostics.report(name, load_addr, DiagnosticKind::UnresolvedStream);
		}
		outcome
	}

	fn register(&mut self, load_addr: u32, name: &str, variant_of: Option<(u32, LodSlot)>) -> Discovery {
		if self.streams.contains_key(&load_addr) {
			return Discovery::Existing;
		}
		if !self.in_progress.insert(load_addr) {
			return Discovery::Unresolved;
		}

		let Some(mut stream) = decode_stream(self.bytes, &self.segment, load_addr, name) else {
			self.in_progress.remove(&load_addr);
			return Discovery::Unresolved;
		};
		stream.variant_of = variant_of;

		if stream.lod_branches_found > MAX_LOD_BRANCHES {
			self.diagnostics.report(
				name,
				load_addr,
				DiagnosticKind::LodBranchesClamped {
					found: stream.lod_branches_found,
				},
			);
		}

		debug!(
			"stream {name} at 0x{load_addr:08X}: {} bytes, {} vertex refs, {} calls, {} lod",
			stream.length_bytes,
			stream.vertex_refs.len(),
			stream.calls.len(),
			stream.lod_branch_count
		);

		match self.owners.get(name) {
			Some(&first) => self.diagnostics.report(name, load_addr, DiagnosticKind::DuplicateIdentifier { first }),
			None => {
				self.owners.insert(name.to_owned(), load_addr);
			}
		}

		self.streams.insert(load_addr, stream);
		self.resolve_lod_branches(load_addr);
		self.in_progress.remove(&load_addr);
		Discovery::Inserted
	}

	/// Decode unregistered LOD targets of a registered stream as `<name>_near` / `<name>_far`, recursively.
	pub fn resolve_lod_branches(&mut self, load_addr: u32) {
		let Some(parent) = self.streams.get(&load_addr) else {
			return;
		};
		let parent_name = parent.name.clone();
		let slots = [LodSlot::Near, LodSlot::Far].map(|slot| (slot, parent.lod_target(slot)));

		for (slot, target) in slots {
			let Some(target) = target else {
				continue;
			};
			if self.streams.contains_key(&target) {
				continue;
			}

			let name = variant_name(&parent_name, slot);
			if self.register(target, &name, Some((load_addr, slot))) == Discovery::Unresolved {
				self.diagnostics.report(parent_name.clone(), target, DiagnosticKind::UnresolvedLodBranch { slot });
			}
		}
	}

	/// Name and register unregistered call targets of a `first`/`last` stream as `part<base + i>_draw`.
	pub fn resolve_calls(&mut self, load_addr: u32, part_base: usize) {
		let Some(stream) = self.streams.get(&load_addr) else {
			return;
		};
		let calls = stream.calls.clone();

		for (idx, target) in calls.into_iter().enumerate() {
			if self.streams.contains_key(&target) {
				continue;
			}
			self.discover(target, call_target_name(part_base + idx));
		}
	}

	/// Mutable access to the run's diagnostic sink.
	pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
		&mut self.diagnostics
	}

	/// Consume the walker, returning the stream table and diagnostics.
	pub fn finish(self) -> (IndexMap<u32, CommandStream>, Diagnostics) {
		(self.streams, self.diagnostics)
	}
}

/// Streams to emit, in emission order: top-level streams by load address, each preceded by its resolved LOD variants.
///
/// Variants are emitted only when every kept branch of the parent resolved to a stream discovered as that parent's
/// variant.
pub fn emitted_streams(streams: &IndexMap<u32, CommandStream>) -> Vec<&CommandStream> {
	let mut roots: Vec<_> = streams.values().filter(|stream| stream.variant_of.is_none()).collect();
	roots.sort_by_key(|stream| stream.load_addr);

	let mut out = Vec::new();
	let mut seen = HashSet::new();
	for root in roots {
		push_with_variants(streams, root, &mut out, &mut seen);
	}
	out
}

fn push_with_variants<'s>(streams: &'s IndexMap<u32, CommandStream>, stream: &'s CommandStream, out: &mut Vec<&'s CommandStream>, seen: &mut HashSet<u32>) {
	if !seen.insert(stream.load_addr) {
		return;
	}

	let variant = |slot: LodSlot| {
		stream
			.lod_target(slot)
			.and_then(|target| streams.get(&target))
			.filter(|child| child.variant_of == Some((stream.load_addr, slot)))
	};

	let variants = match (stream.lod_branch_count, variant(LodSlot::Near), variant(LodSlot::Far)) {
		(1, Some(near), _) => vec![near],
		(2, Some(near), Some(far)) => vec![near, far],
		_ => Vec::new(),
	};

	for child in variants {
		push_with_variants(streams, child, out, seen);
	}
	out.push(stream);
}
