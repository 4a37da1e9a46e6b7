use modelrip::model::{RomImage, extract_materials};
use modelrip_testkit::ImageBuilder;

use super::render_header;
use crate::cmd::test_support::{image_path, put_texture, run_modelrip, run_modelrip_json, run_modelrip_stdout};

const BASE: u32 = 0x8030_0000;

fn shared_arrays_image() -> ImageBuilder {
	let mut image = ImageBuilder::new(BASE, 0x200);
	image
		.put_words(BASE, &[0x8030_0010, 0, 0x8030_0018, 0x8030_0010])
		.put_words(0x8030_0010, &[0x8030_0024, 0])
		.put_words(0x8030_0018, &[0x8030_0024, 0x8030_009C, 0])
		.put_words(0x8030_0114, &[0x8040_0000, 0x8040_1000, 0]);
	put_texture(&mut image, 0x8030_0024, 32, 0x8030_0114);
	put_texture(&mut image, 0x8030_009C, 16, 0);
	image
}

fn header_text() -> String {
	let set = extract_materials(&RomImage::from_bytes(shared_arrays_image().build()), BASE, 0).expect("materials parse");
	render_header(&set, "moltres")
}

fn block<'a>(lines: &[&'a str], opener: &str) -> Vec<&'a str> {
	let start = lines.iter().position(|line| *line == opener).unwrap_or_else(|| panic!("missing block {opener}"));
	let len = lines[start..].iter().position(|line| *line == "};").expect("block is closed");
	lines[start + 1..start + len].to_vec()
}

#[test]
fn header_sections_follow_placement_order() {
	let text = header_text();
	let lines: Vec<_> = text.lines().collect();

	assert_eq!(&lines[..3], &["extern u8 moltres_tex_80400000[];", "extern u8 moltres_tex_80401000[];", ""]);

	let order: Vec<_> = [
		"Texture** moltres_materials[] = {",
		"u8* moltres_part0_mat0_textures[] = {",
		"Texture moltres_part0_mat0 = {",
		"Texture moltres_part2_mat1 = {",
		"Texture* moltres_part0_mat[] = {",
		"Texture* moltres_part2_mat[] = {",
	]
	.iter()
	.map(|opener| lines.iter().position(|line| line == opener).unwrap_or_else(|| panic!("missing {opener}")))
	.collect();
	assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "sections out of order: {order:?}");
}

#[test]
fn materials_and_pointer_arrays_reference_part_names() {
	let text = header_text();
	let lines: Vec<_> = text.lines().collect();

	assert_eq!(
		block(&lines, "Texture** moltres_materials[] = {"),
		vec!["    moltres_part0_mat,", "    NULL,", "    moltres_part2_mat,", "    moltres_part0_mat,"]
	);
	assert_eq!(
		block(&lines, "u8* moltres_part0_mat0_textures[] = {"),
		vec!["    moltres_tex_80400000,", "    moltres_tex_80401000,"]
	);
	assert_eq!(block(&lines, "Texture* moltres_part0_mat[] = {"), vec!["    &moltres_part0_mat0,", "    NULL,"]);
	assert_eq!(
		block(&lines, "Texture* moltres_part2_mat[] = {"),
		vec!["    &moltres_part2_mat0,", "    &moltres_part2_mat1,", "    NULL,"]
	);
}

#[test]
fn texture_records_render_every_field() {
	let text = header_text();
	let lines: Vec<_> = text.lines().collect();

	let framed = block(&lines, "Texture moltres_part0_mat0 = {");
	assert_eq!(framed.len(), 41);
	assert_eq!(&framed[..8], &["    0,", "    G_IM_FMT_CI,", "    G_IM_SIZ_4b,", "    moltres_part0_mat0_textures,", "    0,", "    0,", "    32,", "    32,"]);
	assert_eq!(framed[9], "    0.0,");
	assert_eq!(framed[15], "    NULL,");
	assert_eq!(framed[16], "    0x0,");
	assert_eq!(framed[26], "    { 0, 0, 0, 0 },");
	assert_eq!(framed[40], "    0,");

	let plain = block(&lines, "Texture moltres_part2_mat1 = {");
	assert_eq!(plain[3], "    NULL,");
	assert_eq!(plain[6], "    16,");
}

#[test]
fn cli_prints_generated_code_section() {
	let path = image_path("header-sections", shared_arrays_image().bytes());
	let path = path.to_string_lossy();
	let stdout = run_modelrip_stdout(&["header", &path, "80300000", "0", "moltres"]);

	let banner = stdout.find("GENERATED C CODE:").expect("section title");
	let externs = stdout.find("extern u8 moltres_tex_80400000[];").expect("externs");
	assert!(banner < externs);
}

#[test]
fn cli_json_lists_arrays_and_frames() {
	let path = image_path("header-json", shared_arrays_image().bytes());
	let path = path.to_string_lossy();
	let json = run_modelrip_json(&["header", &path, "0x80300000", "0x0", "moltres", "--json"]);

	assert_eq!(json["materials"], "moltres_materials");
	assert_eq!(json["slots"][1], serde_json::Value::Null);
	assert_eq!(json["arrays"].as_array().map(Vec::len), Some(2));
	assert_eq!(json["arrays"][1]["name"], "moltres_part2_mat");
	assert_eq!(json["textures"][0]["frames"][1], "0x80401000");
	assert_eq!(json["images"].as_array().map(Vec::len), Some(2));
}

#[test]
fn cli_rejects_offset_past_end() {
	let path = image_path("header-bad", shared_arrays_image().bytes());
	let path = path.to_string_lossy();
	let output = run_modelrip(&["header", &path, "80300000", "200", "moltres"]);
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("offset 0x200 is beyond image length 0x200"));
}
