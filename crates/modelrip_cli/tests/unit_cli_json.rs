#![allow(missing_docs)]

use std::path::PathBuf;
use std::process::Command;

use modelrip_testkit::{ImageBuilder, stdout_json, write_temp_image};
use serde_json::Value;

const BASE: u32 = 0x8010_0000;
const OP_VTX: u8 = 0x01;
const OP_DL: u8 = 0xDE;
const OP_ENDDL: u8 = 0xDF;

#[test]
fn extract_direct_json_names_streams_by_position() {
	let path = direct_model_image("json-direct");
	let json = run_json(&["extract", &path, "volcano", "80100800", "800", "mew", "direct", "--variant", "hd", "--json"]);

	assert_eq!(json["model"], "mew_hd_model");
	assert_eq!(json["payloads"], Value::Null);
	assert_eq!(json["instances"][0]["target"], "first");
	assert_eq!(json["instances"][1]["target"], "part1_draw");
	assert_eq!(json["instances"][2]["target"], Value::Null);

	let streams = json["streams"].as_array().expect("streams array");
	let symbols: Vec<_> = streams.iter().filter_map(|stream| stream["symbol"].as_str()).collect();
	assert!(symbols.contains(&"mew_hd_first"));
	assert!(symbols.contains(&"mew_hd_part0_draw"));
	assert_eq!(json["vertex_span"]["start"], "0x80101000");
	assert_eq!(json["vertex_span"]["estimated"], false);
}

#[test]
fn extract_without_pointers_reports_estimated_span() {
	let mut image = ImageBuilder::new(BASE, 0x4000);
	image
		.put_instance(BASE + 0x3800, 0, 0, [1.0; 3], [0.0; 3], [1.0; 3])
		.put_instance(BASE + 0x3800 + 44, 1, 0, [0.0; 3], [0.0; 3], [0.0; 3]);
	let path = write_temp_image("json-empty", image.bytes());
	let path = path.display().to_string();

	let json = run_json(&["extract", &path, "volcano", "80103800", "3800", "mew", "c", "--json"]);
	assert_eq!(json["instances"].as_array().map(Vec::len), Some(2));
	assert_eq!(json["payloads"], Value::Null);
	assert_eq!(json["vertex_span"]["start"], "0x80100800");
	assert_eq!(json["vertex_span"]["size"], "0x2350");
	assert_eq!(json["vertex_span"]["estimated"], true);
	assert!(json["diagnostics"].as_array().is_some_and(|items| items.len() == 1));
}

#[test]
fn inspect_json_lists_region_words() {
	let path = direct_model_image("json-inspect");
	let json = run_json(&["extract", &path, "volcano", "80100800", "800", "mew", "--json"]);

	assert_eq!(json["region"]["start"], "0x80100100");
	assert_eq!(json["region"]["end"], "0x80100800");
	let words = json["region"]["words"].as_array().expect("words array");
	assert_eq!(words.len(), 0x700 / 4);
	assert_eq!(words[0]["referenced"], true);
	assert_eq!(words[1]["referenced"], false);
}

fn direct_model_image(name: &str) -> String {
	let model = BASE + 0x800;
	let mut image = ImageBuilder::new(BASE, 0x1100);
	image
		.put_instance(model, 0, 0x8010_0100, [0.0; 3], [0.0; 3], [1.0; 3])
		.put_instance(model + 44, 1, 0x8010_0200, [4.0, 0.0, 0.0], [0.0; 3], [1.0; 3])
		.put_instance(model + 88, 2, 0, [0.0; 3], [0.0; 3], [0.0; 3]);
	image
		.put_stream(0x8010_0100, &[(OP_DL, 0x8010_0300), (OP_ENDDL, 0)])
		.put_stream(0x8010_0200, &[(OP_VTX, 0x8010_1040), (OP_ENDDL, 0)])
		.put_stream(0x8010_0300, &[(OP_VTX, 0x8010_1000), (OP_ENDDL, 0)]);
	write_temp_image(name, image.bytes()).display().to_string()
}

fn run_json(args: &[&str]) -> Value {
	let output = Command::new(modelrip_bin()).args(args).env("RUST_LOG", "off").output().expect("command executes");
	stdout_json(&output)
}

fn modelrip_bin() -> PathBuf {
	PathBuf::from(env!("CARGO_BIN_EXE_modelrip"))
}
