use std::collections::HashSet;

use indexmap::IndexMap;
use log::info;

use crate::model::bytes::read_u32_at;
use crate::model::{
	CommandStream, Diagnostic, DiagnosticKind, DirectEntry, INSTANCE_RECORD_SIZE, InstanceEntry, NameRegistry, PayloadMode, PayloadTable, Result, RomImage,
	Segment, StreamWalker, classify_direct, classify_table, emitted_streams, instance_pointers, scan_instances,
};

/// Bytes per vertex; the span covers one vertex past the highest reference.
pub const VERTEX_SIZE: usize = 0x10;
/// Span size assumed when no vertex reference was found.
pub const VERTEX_FALLBACK_SIZE: usize = 0x2350;
/// Distance below the lowest stream assumed for the estimated span start.
pub const VERTEX_STREAM_GAP: u32 = 0x2800;
/// Distance below the instance table assumed when there are no streams either.
pub const VERTEX_MODEL_GAP: u32 = 0x3000;

/// Where the instance table lives and how its pointers are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRequest {
	/// Load address of the instance table.
	pub model_load: u32,
	/// File offset of the instance table.
	pub model_offset: u64,
	/// Payload layout selector.
	pub mode: PayloadMode,
}

/// Vertex buffer region shared by every stream of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexSpan {
	/// Load address of the first vertex.
	pub start: u32,
	/// Size in bytes.
	pub size_bytes: usize,
	/// Whether the span is a fixed-size estimate.
	pub estimated: bool,
}

impl VertexSpan {
	/// Span covering every vertex reference across `streams`, or the fixed-size estimate when there are none.
	pub fn infer(streams: &IndexMap<u32, CommandStream>, model_load: u32) -> Self {
		let refs = streams.values().flat_map(|stream| stream.vertex_refs.iter().copied());
		let (min, max) = refs.fold((None::<u32>, None::<u32>), |(lo, hi), addr| {
			(Some(lo.map_or(addr, |lo| lo.min(addr))), Some(hi.map_or(addr, |hi| hi.max(addr))))
		});

		if let (Some(start), Some(end)) = (min, max) {
			return Self {
				start,
				size_bytes: (end - start) as usize + VERTEX_SIZE,
				estimated: false,
			};
		}

		let start = match streams.keys().min() {
			Some(lowest) => lowest.wrapping_sub(VERTEX_STREAM_GAP),
			None => model_load.wrapping_sub(VERTEX_MODEL_GAP),
		};
		Self {
			start,
			size_bytes: VERTEX_FALLBACK_SIZE,
			estimated: true,
		}
	}
}

/// What an instance pointer resolves to in the reconstructed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceRef<'g> {
	/// Null pointer.
	Null,
	/// Row of the payload table.
	Row(usize),
	/// Command stream referenced directly.
	Stream(&'g str),
	/// Non-null pointer that matched nothing.
	Unresolved(u32),
}

/// Everything recovered for one model.
#[derive(Debug, Clone)]
pub struct ModelGraph {
	/// Segment every address was translated with.
	pub segment: Segment,
	/// Load address of the instance table.
	pub model_load: u32,
	/// File offset of the instance table.
	pub model_offset: u64,
	/// Payload selector the graph was built with.
	pub mode: PayloadMode,
	/// Instance records, terminator included.
	pub instances: Vec<InstanceEntry>,
	/// Payload table in table mode.
	pub payloads: Option<PayloadTable>,
	/// Classified pointers in direct mode.
	pub direct: Vec<DirectEntry>,
	/// Registered command streams in discovery order.
	pub streams: IndexMap<u32, CommandStream>,
	/// Shared vertex buffer region.
	pub vertex_span: VertexSpan,
	/// Recovered ambiguities, in the order they were found.
	pub diagnostics: Vec<Diagnostic>,
}

impl ModelGraph {
	/// Streams to emit, variants before their base.
	pub fn emitted_streams(&self) -> Vec<&CommandStream> {
		emitted_streams(&self.streams)
	}

	/// Instance table size in bytes.
	pub fn instance_table_size(&self) -> usize {
		self.instances.len() * INSTANCE_RECORD_SIZE
	}

	/// Payload table with at least one row.
	pub fn payload_table(&self) -> Option<&PayloadTable> {
		self.payloads.as_ref().filter(|table| !table.records.is_empty())
	}

	/// Identifier of every emitted object: vertex span, streams, payload table, instance table.
	pub fn names(&self) -> NameRegistry {
		let mut names = NameRegistry::default();
		names.assign(self.vertex_span.start, "vtx");
		for stream in self.emitted_streams() {
			names.assign(stream.load_addr, stream.name.as_str());
		}
		if let Some(table) = self.payload_table() {
			names.assign(table.start, "gfxdata");
		}
		names.assign(self.model_load, "model");
		names
	}

	/// Resolve an instance pointer against the payload table or the stream table.
	pub fn instance_ref(&self, entry: &InstanceEntry) -> InstanceRef<'_> {
		let Some(pointer) = entry.pointer else {
			return InstanceRef::Null;
		};

		match &self.payloads {
			Some(table) => table.row_of(pointer).map_or(InstanceRef::Unresolved(pointer), InstanceRef::Row),
			None => self
				.streams
				.get(&pointer)
				.map_or(InstanceRef::Unresolved(pointer), |stream| InstanceRef::Stream(&stream.name)),
		}
	}
}

/// Reconstruct the asset graph hanging off the instance table described by `request`.
///
/// The starting offset must lie inside the image; every later out-of-range read yields zero.
pub fn extract_model(image: &RomImage, request: &ModelRequest) -> Result<ModelGraph> {
	let ModelRequest {
		model_load,
		model_offset,
		mode,
	} = *request;
	image.check_offset(model_offset)?;

	let bytes = image.bytes();
	let segment = Segment::from_anchor(model_load, model_offset);
	let instances = scan_instances(bytes, model_offset);
	let pointers = instance_pointers(&instances);
	info!("model 0x{model_load:08X}: {} instance records, {} pointers", instances.len(), pointers.len());

	let mut walker = StreamWalker::new(bytes, segment);
	let mut payloads = None;
	let mut direct = Vec::new();
	if pointers.is_empty() {
		info!("no instance pointers, nothing to classify");
	} else {
		match mode {
			PayloadMode::Direct => direct = classify_direct(&mut walker, &pointers),
			PayloadMode::Table(shape) => payloads = Some(classify_table(&mut walker, &pointers, shape, model_load)),
		}
	}

	let (streams, mut diagnostics) = walker.finish();
	let vertex_span = VertexSpan::infer(&streams, model_load);
	if vertex_span.estimated {
		diagnostics.report("vtx", vertex_span.start, DiagnosticKind::VertexSpanFallback);
	}
	if segment.to_file(vertex_span.start) < 0 {
		diagnostics.report("vtx", vertex_span.start, DiagnosticKind::VertexSpanBeforeImage);
	}
	info!(
		"{} streams, vertex span 0x{:08X} size 0x{:X}, {} diagnostics",
		streams.len(),
		vertex_span.start,
		vertex_span.size_bytes,
		diagnostics.len()
	);

	Ok(ModelGraph {
		segment,
		model_load,
		model_offset,
		mode,
		instances,
		payloads,
		direct,
		streams,
		vertex_span,
		diagnostics: diagnostics.into_vec(),
	})
}

/// One word of the candidate payload region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionWord {
	/// Load address.
	pub addr: u32,
	/// Offset from the region start.
	pub offset: u32,
	/// Word value.
	pub word: u32,
	/// Whether an instance pointer targets this word.
	pub referenced: bool,
}

/// Words between the lowest instance pointer and the instance table, for choosing a payload shape by eye.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRegion {
	/// Lowest instance pointer.
	pub start: u32,
	/// Instance table load address.
	pub end: u32,
	/// Every word in `[start, end)`.
	pub words: Vec<RegionWord>,
}

/// Dump the candidate payload region of a model, or `None` when the instance table has no pointers.
pub fn inspect_candidate_region(image: &RomImage, model_load: u32, model_offset: u64) -> Result<Option<CandidateRegion>> {
	image.check_offset(model_offset)?;

	let bytes = image.bytes();
	let segment = Segment::from_anchor(model_load, model_offset);
	let pointers = instance_pointers(&scan_instances(bytes, model_offset));
	let Some(start) = pointers.iter().copied().min() else {
		return Ok(None);
	};

	let referenced: HashSet<u32> = pointers.into_iter().collect();
	let count = model_load.saturating_sub(start) / 4;
	let words = (0..count)
		.map(|idx| {
			let addr = start + idx * 4;
			RegionWord {
				addr,
				offset: idx * 4,
				word: read_u32_at(bytes, segment.to_file(addr)),
				referenced: referenced.contains(&addr),
			}
		})
		.collect();

	Ok(Some(CandidateRegion {
		start,
		end: model_load,
		words,
	}))
}
