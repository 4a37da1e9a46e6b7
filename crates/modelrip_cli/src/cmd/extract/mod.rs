use std::path::PathBuf;

use log::info;
use modelrip::model::{
	ArtifactNaming, CandidateRegion, InstanceEntry, InstanceRef, ModelGraph, ModelRequest, NameRegistry, Payload, PayloadMode, PayloadRecord, RecordSlot,
	Result, RomImage, extract_model, inspect_candidate_region,
};

use crate::cmd::util::{c_float, emit_json, hex32, parse_hex, parse_load_addr, print_section};

#[derive(clap::Args)]
pub struct Args {
	pub image: PathBuf,
	/// Asset folder, e.g. `volcano`.
	pub folder: String,
	/// Load address of the instance table (hex).
	pub load_addr: String,
	/// File offset of the instance table (hex).
	pub file_offset: String,
	/// Model name, e.g. `moltres`.
	pub name: String,
	/// `direct`, `i`, `c` or `j`; omit to inspect the candidate payload region.
	pub mode: Option<String>,
	#[arg(long)]
	pub variant: Option<String>,
	#[arg(long)]
	pub segment: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// Reconstruct one model and print its source tail, segmentation entries and symbols.
pub fn run(args: Args) -> Result<()> {
	let Args {
		image: path,
		folder,
		load_addr,
		file_offset,
		name,
		mode,
		variant,
		segment,
		json,
	} = args;

	let model_load = parse_load_addr(&load_addr)?;
	let model_offset = parse_hex(&file_offset)?;
	let mode = mode.as_deref().map(str::parse::<PayloadMode>).transpose()?;
	let image = RomImage::open(&path)?;
	info!("{}: {} layout, 0x{:X} bytes", path.display(), image.layout.as_str(), image.len());

	let Some(mode) = mode else {
		let region = inspect_candidate_region(&image, model_load, model_offset)?;
		if json {
			emit_json(&InspectJson {
				path: path.display().to_string(),
				layout: image.layout.as_str().to_owned(),
				region: region.as_ref().map(region_json),
			});
		} else {
			print_region(region.as_ref());
		}
		return Ok(());
	};

	let request = ModelRequest {
		model_load,
		model_offset,
		mode,
	};
	let graph = extract_model(&image, &request)?;
	let naming = ArtifactNaming::new(name, folder, variant, segment);

	if json {
		emit_json(&graph_json(&path, &image, &graph, &naming));
		return Ok(());
	}

	print_section("MODEL.C TAIL:", &render_c_tail(&graph, &naming));
	print_section("SPLAT CONFIG:", &render_splat(&graph, &naming));
	print_section("SYMBOL DEFINITIONS:", &render_symbols(&graph, &naming));
	Ok(())
}

fn print_region(region: Option<&CandidateRegion>) {
	let Some(region) = region else {
		println!("no candidate region");
		return;
	};

	println!(
		"candidate region: 0x{:08X} - 0x{:08X} (0x{:X} bytes)",
		region.start,
		region.end,
		region.end.saturating_sub(region.start)
	);
	println!();
	for word in &region.words {
		let marker = if word.referenced { '*' } else { ' ' };
		println!("{marker} +0x{:04X} (0x{:08X}): 0x{:08X}", word.offset, word.addr, word.word);
	}
}

/// Symbol for a stream reference, `NULL` when null, an annotated `NULL` when it names nothing emitted.
fn stream_ref(names: &NameRegistry, naming: &ArtifactNaming, ptr: Option<u32>) -> String {
	match ptr {
		None => "NULL".to_owned(),
		Some(addr) => match names.get(addr) {
			Some(name) => naming.symbol(name),
			None => format!("NULL /* unresolved: 0x{addr:08X} */"),
		},
	}
}

fn payload_row(record: &PayloadRecord, names: &NameRegistry, naming: &ArtifactNaming) -> String {
	let refer = |ptr| stream_ref(names, naming, ptr);
	let special = record.is_first || record.is_last;
	let tag = if record.is_first { "first" } else { "last" };

	match (record.slot, record.payload) {
		(RecordSlot::Padding, Payload::I { .. }) => "{ NULL, NULL }".to_owned(),
		(_, payload) if special && payload.words()[0] == 0 => match payload {
			Payload::I { .. } => format!("{{ NULL, {} }}", naming.symbol(tag)),
			Payload::C { .. } => format!("{{ 0, {} }}", naming.symbol(tag)),
			Payload::J { .. } => format!("{{ 0, NULL, {} }}", naming.symbol(tag)),
		},
		(_, Payload::I { pre, draw }) => format!("{{ {}, {} }}", refer(pre), refer(draw)),
		(_, Payload::C { id, draw }) => format!("{{ {id}, {} }}", refer(draw)),
		(_, Payload::J { id, ptr_a, ptr_b }) => format!("{{ {id}, {}, {} }}", refer(ptr_a), refer(ptr_b)),
	}
}

fn instance_rows(graph: &ModelGraph, names: &NameRegistry, naming: &ArtifactNaming, entry: &InstanceEntry) -> [String; 5] {
	let target = match graph.instance_ref(entry) {
		InstanceRef::Null => "NULL".to_owned(),
		InstanceRef::Row(row) => format!("&{}[{row}]", naming.symbol("gfxdata")),
		InstanceRef::Stream(_) | InstanceRef::Unresolved(_) => stream_ref(names, naming, entry.pointer),
	};
	let vec3 = |[x, y, z]: [f32; 3]| format!("{{ {}, {}, {} }}", c_float(x), c_float(y), c_float(z));

	[
		format!("    {{ {},", entry.index),
		format!("      {target},"),
		format!("      {},", vec3(entry.position)),
		format!("      {},", vec3(entry.rotation)),
		format!("      {} }},", vec3(entry.scale)),
	]
}

/// Tail of the model source: includes, payload table, instance table.
pub(crate) fn render_c_tail(graph: &ModelGraph, naming: &ArtifactNaming) -> String {
	let names = graph.names();
	let mut out = vec!["\n".to_owned(), format!("#include \"{}\"", naming.include_path("model", "vtx"))];

	for stream in graph.emitted_streams() {
		out.push(format!("#include \"{}\"", naming.include_path(&stream.name, "gfx")));
	}

	if let Some(table) = graph.payload_table() {
		out.push(String::new());
		out.push(format!("DObjPayloadType{} {}[] = {{", table.shape.as_str(), naming.symbol("gfxdata")));
		for record in &table.records {
			out.push(format!("    {},", payload_row(record, &names, naming)));
		}
		out.push("};".to_owned());
	}

	out.push(String::new());
	out.push(format!("UnkEC64Arg3 {}[] = {{", naming.symbol("model")));
	for entry in &graph.instances {
		out.extend(instance_rows(graph, &names, naming, entry));
	}
	out.push("};".to_owned());
	out.push(String::new());
	out.join("\n")
}

/// Segmentation entries for the vertex span and every emitted stream, ascending by file offset.
pub(crate) fn render_splat(graph: &ModelGraph, naming: &ArtifactNaming) -> String {
	let vtx_offset = graph.segment.to_file(graph.vertex_span.start);
	let mut entries: Vec<_> = graph.emitted_streams().into_iter().map(|stream| (stream.file_offset, "gfx", naming.file(&stream.name))).collect();
	if vtx_offset >= 0 {
		entries.push((vtx_offset, "vtx", naming.file("model")));
	}
	entries.sort_by_key(|(offset, _, _)| *offset);

	// A span estimated before the image has no file position; start at the first stream instead.
	let start = if vtx_offset >= 0 { vtx_offset } else { entries.first().map_or(0, |(offset, _, _)| *offset) };
	let mut out = vec![
		format!("    - start: 0x{start:X}"),
		"      type: .data".to_owned(),
		format!("      dir: {}", naming.model),
		format!("      name: {}/model", naming.model),
		"      linker_section_order: .rodata".to_owned(),
		"      subsegments:".to_owned(),
	];
	for (offset, kind, file) in entries {
		out.push(format!("      - [0x{offset:X}, {kind}, {file}]"));
	}
	out.join("\n")
}

/// Address/size symbol records: vertex span, streams by load address, payload table, instance table.
pub(crate) fn render_symbols(graph: &ModelGraph, naming: &ArtifactNaming) -> String {
	let line = |base: &str, addr: u32, size: usize| format!("{} = 0x{addr:08X}; // segment:{} size:0x{size:X}", naming.symbol(base), naming.segment);

	let mut out = vec![String::new(), line("vtx", graph.vertex_span.start, graph.vertex_span.size_bytes)];

	let mut streams = graph.emitted_streams();
	streams.sort_by_key(|stream| stream.load_addr);
	out.extend(streams.into_iter().map(|stream| line(&stream.name, stream.load_addr, stream.length_bytes)));

	if let Some(table) = graph.payload_table() {
		out.push(line("gfxdata", table.start, table.size_bytes()));
	}
	out.push(line("model", graph.model_load, graph.instance_table_size()));
	out.join("\n")
}

fn region_json(region: &CandidateRegion) -> RegionJson {
	RegionJson {
		start: hex32(region.start),
		end: hex32(region.end),
		words: region
			.words
			.iter()
			.map(|word| RegionWordJson {
				offset: word.offset,
				addr: hex32(word.addr),
				word: hex32(word.word),
				referenced: word.referenced,
			})
			.collect(),
	}
}

fn graph_json(path: &std::path::Path, image: &RomImage, graph: &ModelGraph, naming: &ArtifactNaming) -> ExtractJson {
	let emitted: Vec<u32> = graph.emitted_streams().iter().map(|stream| stream.load_addr).collect();

	ExtractJson {
		path: path.display().to_string(),
		layout: image.layout.as_str().to_owned(),
		model: naming.symbol("model"),
		model_load: hex32(graph.model_load),
		model_offset: format!("0x{:X}", graph.model_offset),
		instances: graph
			.instances
			.iter()
			.map(|entry| InstanceJson {
				index: entry.index,
				pointer: entry.pointer.map(hex32),
				target: match graph.instance_ref(entry) {
					InstanceRef::Null => None,
					InstanceRef::Row(row) => Some(format!("gfxdata[{row}]")),
					InstanceRef::Stream(name) => Some(name.to_owned()),
					InstanceRef::Unresolved(_) => Some("unresolved".to_owned()),
				},
				position: entry.position,
				rotation: entry.rotation,
				scale: entry.scale,
			})
			.collect(),
		payloads: graph.payloads.as_ref().map(|table| PayloadTableJson {
			shape: table.shape.as_str().to_owned(),
			start: hex32(table.start),
			end: hex32(table.end),
			rows: table
				.records
				.iter()
				.map(|record| {
					let (slot, part) = match record.slot {
						RecordSlot::Referenced { part } => ("referenced", Some(part)),
						RecordSlot::Unreferenced { part } => ("unreferenced", Some(part)),
						RecordSlot::Padding => ("padding", None),
					};
					PayloadRowJson {
						index: record.index,
						addr: hex32(record.load_addr),
						words: record.payload.words().into_iter().map(hex32).collect(),
						slot: slot.to_owned(),
						referenced: record.is_referenced(),
						part,
						is_first: record.is_first,
						is_last: record.is_last,
					}
				})
				.collect(),
		}),
		streams: graph
			.streams
			.values()
			.map(|stream| StreamJson {
				name: stream.name.clone(),
				symbol: naming.symbol(&stream.name),
				addr: hex32(stream.load_addr),
				file_offset: format!("0x{:X}", stream.file_offset),
				length_bytes: stream.length_bytes,
				lod_branches: stream.lod_branch_count,
				lod_near: stream.lod_near.map(hex32),
				lod_far: stream.lod_far.map(hex32),
				calls: stream.calls.iter().copied().map(hex32).collect(),
				vertex_refs: stream.vertex_refs.iter().copied().map(hex32).collect(),
				variant_of: stream.variant_of.map(|(parent, slot)| format!("{}:{}", hex32(parent), slot.suffix())),
				emitted: emitted.contains(&stream.load_addr),
			})
			.collect(),
		vertex_span: VertexSpanJson {
			start: hex32(graph.vertex_span.start),
			size: format!("0x{:X}", graph.vertex_span.size_bytes),
			estimated: graph.vertex_span.estimated,
		},
		diagnostics: graph.diagnostics.iter().map(ToString::to_string).collect(),
	}
}

#[derive(serde::Serialize)]
struct InspectJson {
	path: String,
	layout: String,
	region: Option<RegionJson>,
}

#[derive(serde::Serialize)]
struct RegionJson {
	start: String,
	end: String,
	words: Vec<RegionWordJson>,
}

#[derive(serde::Serialize)]
struct RegionWordJson {
	offset: u32,
	addr: String,
	word: String,
	referenced: bool,
}

#[derive(serde::Serialize)]
struct ExtractJson {
	path: String,
	layout: String,
	model: String,
	model_load: String,
	model_offset: String,
	instances: Vec<InstanceJson>,
	payloads: Option<PayloadTableJson>,
	streams: Vec<StreamJson>,
	vertex_span: VertexSpanJson,
	diagnostics: Vec<String>,
}

#[derive(serde::Serialize)]
struct InstanceJson {
	index: u32,
	pointer: Option<String>,
	target: Option<String>,
	position: [f32; 3],
	rotation: [f32; 3],
	scale: [f32; 3],
}

#[derive(serde::Serialize)]
struct PayloadTableJson {
	shape: String,
	start: String,
	end: String,
	rows: Vec<PayloadRowJson>,
}

#[derive(serde::Serialize)]
struct PayloadRowJson {
	index: usize,
	addr: String,
	words: Vec<String>,
	slot: String,
	referenced: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	part: Option<usize>,
	is_first: bool,
	is_last: bool,
}

#[derive(serde::Serialize)]
struct StreamJson {
	name: String,
	symbol: String,
	addr: String,
	file_offset: String,
	length_bytes: usize,
	lod_branches: usize,
	lod_near: Option<String>,
	lod_far: Option<String>,
	calls: Vec<String>,
	vertex_refs: Vec<String>,
	variant_of: Option<String>,
	emitted: bool,
}

#[derive(serde::Serialize)]
struct VertexSpanJson {
	start: String,
	size: String,
	estimated: bool,
}

#[cfg(test)]
mod tests;
