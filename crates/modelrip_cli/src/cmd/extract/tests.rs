use modelrip::model::{
	ArtifactNaming, ModelGraph, ModelRequest, NameRegistry, Payload, PayloadMode, PayloadRecord, PayloadShape, RecordSlot, RomImage, extract_model,
};
use modelrip_testkit::ImageBuilder;

use super::{payload_row, render_c_tail, render_splat, render_symbols};
use crate::cmd::test_support::{
	LOD_BASE, LOD_MODEL, OP_ENDDL, image_path, lod_model_image, put_instance_run, run_modelrip, run_modelrip_json, run_modelrip_stdout,
};

const BASE: u32 = LOD_BASE;
const MODEL: u32 = LOD_MODEL;

fn lod_model_graph() -> ModelGraph {
	let image = lod_model_image();
	let request = ModelRequest {
		model_load: MODEL,
		model_offset: image.offset(MODEL),
		mode: PayloadMode::Table(PayloadShape::I),
	};
	extract_model(&RomImage::from_bytes(image.build()), &request).expect("model extracts")
}

fn moltres() -> ArtifactNaming {
	ArtifactNaming::new("moltres", "volcano", None, None)
}

#[test]
fn c_tail_includes_variants_before_base_and_indexes_rows() {
	let text = render_c_tail(&lod_model_graph(), &moltres());
	let lines: Vec<_> = text.lines().collect();

	let includes: Vec<_> = lines.iter().filter(|line| line.starts_with("#include")).copied().collect();
	assert_eq!(
		includes,
		vec![
			"#include \"assets/volcano/moltres/model.vtx.inc.c\"",
			"#include \"assets/volcano/moltres/part0_draw.gfx.inc.c\"",
			"#include \"assets/volcano/moltres/part1_pre.gfx.inc.c\"",
			"#include \"assets/volcano/moltres/part1_draw_near.gfx.inc.c\"",
			"#include \"assets/volcano/moltres/part1_draw.gfx.inc.c\"",
		]
	);

	let table_at = lines.iter().position(|line| *line == "DObjPayloadTypeI moltres_gfxdata[] = {").expect("payload table emitted");
	assert_eq!(lines[table_at + 1], "    { NULL, moltres_part0_draw },");
	assert_eq!(lines[table_at + 2], "    { moltres_part1_pre, moltres_part1_draw },");
	assert_eq!(lines[table_at + 3], "};");

	let model_at = lines.iter().position(|line| *line == "UnkEC64Arg3 moltres_model[] = {").expect("instance table emitted");
	assert_eq!(
		&lines[model_at + 1..model_at + 11],
		&[
			"    { 0,",
			"      NULL,",
			"      { 0.0, 0.5, -2.0 },",
			"      { 0.0, 0.0, 0.0 },",
			"      { 1.0, 1.0, 1.0 } },",
			"    { 1,",
			"      &moltres_gfxdata[0],",
			"      { 10.0, 0.0, 0.0 },",
			"      { 0.0, 0.0, 0.0 },",
			"      { 1.0, 1.0, 1.0 } },",
		]
	);
	assert!(text.contains("      &moltres_gfxdata[1],\n      { 0.0, 0.0, 0.0 },\n      { -0.0, 0.25, 0.0 },"));
	assert!(text.trim_end().ends_with("};"));
}

#[test]
fn symbols_carry_sizes_and_sort_streams_by_address() {
	let text = render_symbols(&lod_model_graph(), &moltres());
	let lines: Vec<_> = text.lines().filter(|line| !line.is_empty()).collect();
	assert_eq!(
		lines,
		vec![
			"moltres_vtx = 0x80101000; // segment:volcano_code size:0x310",
			"moltres_part0_draw = 0x80100100; // segment:volcano_code size:0x10",
			"moltres_part1_pre = 0x80100200; // segment:volcano_code size:0x10",
			"moltres_part1_draw = 0x80100300; // segment:volcano_code size:0x18",
			"moltres_part1_draw_near = 0x80100400; // segment:volcano_code size:0x10",
			"moltres_gfxdata = 0x80100700; // segment:volcano_code size:0x10",
			"moltres_model = 0x80100710; // segment:volcano_code size:0xB0",
		]
	);
}

#[test]
fn splat_entries_sort_by_file_offset_with_variant_files() {
	let naming = ArtifactNaming::new("moltres", "volcano", Some("hd".to_owned()), None);
	let text = render_splat(&lod_model_graph(), &naming);
	let lines: Vec<_> = text.lines().collect();
	assert_eq!(
		lines,
		vec![
			"    - start: 0x1000",
			"      type: .data",
			"      dir: moltres",
			"      name: moltres/model",
			"      linker_section_order: .rodata",
			"      subsegments:",
			"      - [0x100, gfx, hd_part0_draw]",
			"      - [0x200, gfx, hd_part1_pre]",
			"      - [0x300, gfx, hd_part1_draw]",
			"      - [0x400, gfx, hd_part1_draw_near]",
			"      - [0x1000, vtx, hd_model]",
		]
	);
}

#[test]
fn splat_skips_vertex_span_before_image() {
	let model = BASE + 0x110;
	let mut image = ImageBuilder::new(BASE, 0x400);
	put_instance_run(&mut image, model, &[0x8010_0100]);
	image.put_stream(0x8010_0100, &[(OP_ENDDL, 0)]);
	let request = ModelRequest {
		model_load: model,
		model_offset: image.offset(model),
		mode: PayloadMode::Direct,
	};
	let graph = extract_model(&RomImage::from_bytes(image.build()), &request).expect("model extracts");

	let text = render_splat(&graph, &moltres());
	assert!(text.starts_with("    - start: 0x100\n"));
	assert!(text.ends_with("      subsegments:\n      - [0x100, gfx, part0_draw]"));
	assert!(!text.contains("0xFFFF"));
}

fn record(payload: Payload, is_first: bool, is_last: bool, slot: RecordSlot) -> PayloadRecord {
	PayloadRecord {
		index: 0,
		load_addr: BASE,
		file_offset: 0,
		payload,
		is_first,
		is_last,
		slot,
	}
}

#[test]
fn payload_rows_per_shape() {
	let naming = moltres();
	let mut names = NameRegistry::default();
	names.assign(0x8010_0100, "first");
	names.assign(0x8010_0200, "part0_pre");
	let referenced = RecordSlot::Referenced { part: 0 };

	let first_c = record(Payload::C { id: 0, draw: Some(0x8010_0100) }, true, true, referenced);
	assert_eq!(payload_row(&first_c, &names, &naming), "{ 0, moltres_first }");

	let last_j = record(Payload::J { id: 0, ptr_a: None, ptr_b: Some(0x8010_0100) }, false, true, referenced);
	assert_eq!(payload_row(&last_j, &names, &naming), "{ 0, NULL, moltres_last }");

	let tagged_i = record(Payload::I { pre: Some(0x8010_0200), draw: Some(0x8010_0100) }, true, false, referenced);
	assert_eq!(payload_row(&tagged_i, &names, &naming), "{ moltres_part0_pre, moltres_first }");

	let missing_c = record(Payload::C { id: 3, draw: Some(0x8010_0900) }, false, false, referenced);
	assert_eq!(payload_row(&missing_c, &names, &naming), "{ 3, NULL /* unresolved: 0x80100900 */ }");

	let null_c = record(Payload::C { id: 5, draw: None }, false, false, RecordSlot::Unreferenced { part: 2 });
	assert_eq!(payload_row(&null_c, &names, &naming), "{ 5, NULL }");

	let regular_j = record(Payload::J { id: 7, ptr_a: Some(0x8010_0200), ptr_b: None }, false, false, referenced);
	assert_eq!(payload_row(&regular_j, &names, &naming), "{ 7, moltres_part0_pre, NULL }");

	let padding = record(Payload::I { pre: Some(4), draw: None }, false, false, RecordSlot::Padding);
	assert_eq!(payload_row(&padding, &names, &naming), "{ NULL, NULL }");
}

#[test]
fn cli_prints_sections_in_order() {
	let path = image_path("extract-sections", lod_model_image().bytes());
	let path = path.to_string_lossy();
	let stdout = run_modelrip_stdout(&["extract", &path, "volcano", "80100710", "0x710", "moltres", "i"]);

	let tail = stdout.find("MODEL.C TAIL:").expect("tail section");
	let splat = stdout.find("SPLAT CONFIG:").expect("splat section");
	let symbols = stdout.find("SYMBOL DEFINITIONS:").expect("symbol section");
	assert!(tail < splat && splat < symbols);
	assert!(stdout.contains(&"=".repeat(80)));
	assert!(stdout.contains("moltres_part1_draw_near = 0x80100400;"));
}

#[test]
fn cli_inspection_marks_referenced_words() {
	let path = image_path("extract-inspect", lod_model_image().bytes());
	let path = path.to_string_lossy();
	let stdout = run_modelrip_stdout(&["extract", &path, "volcano", "80100710", "710", "moltres"]);

	assert!(stdout.contains("candidate region: 0x80100700 - 0x80100710 (0x10 bytes)"));
	assert!(stdout.contains("* +0x0000 (0x80100700): 0x00000000"));
	assert!(stdout.contains("  +0x0004 (0x80100704): 0x80100100"));
	assert!(stdout.contains("* +0x0008 (0x80100708): 0x80100200"));
	assert!(!stdout.contains("MODEL.C TAIL:"));
}

#[test]
fn cli_json_reports_graph() {
	let path = image_path("extract-json", lod_model_image().bytes());
	let path = path.to_string_lossy();
	let json = run_modelrip_json(&["extract", &path, "volcano", "80100710", "710", "moltres", "I", "--json"]);

	assert_eq!(json["layout"], "raw");
	assert_eq!(json["model"], "moltres_model");
	assert_eq!(json["instances"].as_array().map(Vec::len), Some(4));
	assert_eq!(json["instances"][1]["target"], "gfxdata[0]");
	assert_eq!(json["payloads"]["shape"], "I");
	assert_eq!(json["payloads"]["rows"][1]["slot"], "referenced");
	assert_eq!(json["payloads"]["rows"][1]["referenced"], true);
	assert_eq!(json["streams"].as_array().map(Vec::len), Some(4));
	assert_eq!(json["vertex_span"]["size"], "0x310");
	assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(0));
}

#[test]
fn cli_rejects_bad_inputs() {
	let path = image_path("extract-bad", lod_model_image().bytes());
	let path = path.to_string_lossy();

	let output = run_modelrip(&["extract", &path, "volcano", "8010071G", "710", "moltres", "i"]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("invalid address literal: 8010071G"));

	let output = run_modelrip(&["extract", &path, "volcano", "80100710", "710", "moltres", "k"]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("unknown payload shape: k"));

	let output = run_modelrip(&["extract", &path, "volcano", "80100710", "0x2000", "moltres", "i"]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("offset 0x2000 is beyond image length 0x1400"));
}
