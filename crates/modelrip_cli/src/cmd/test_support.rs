use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use modelrip_testkit::{ImageBuilder, stdout_json, target_dir as workspace_target_dir, write_temp_image};

static MODELRIP_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) const OP_VTX: u8 = 0x01;
pub(crate) const OP_ENDDL: u8 = 0xDF;
pub(crate) const OP_BRANCH_Z: u8 = 0xE1;

/// Load address of segment offset 0 in [`lod_model_image`].
pub(crate) const LOD_BASE: u32 = 0x8010_0000;
/// Instance table of [`lod_model_image`].
pub(crate) const LOD_MODEL: u32 = LOD_BASE + 0x710;

/// Instance records for `pointers` at `addr`, with a distinct position per record, then a terminator.
pub(crate) fn put_instance_run(image: &mut ImageBuilder, addr: u32, pointers: &[u32]) {
	for (idx, pointer) in pointers.iter().enumerate() {
		image.put_instance(addr + idx as u32 * 44, idx as u32, *pointer, [idx as f32, 0.0, 0.0], [0.0; 3], [1.0; 3]);
	}
	image.put_instance(addr + pointers.len() as u32 * 44, pointers.len() as u32, 0, [0.0; 3], [0.0; 3], [0.0; 3]);
}

/// Two-row type I table: one draw-only part and one pre/draw part whose draw stream branches to a near variant.
pub(crate) fn lod_model_image() -> ImageBuilder {
	let mut image = ImageBuilder::new(LOD_BASE, 0x1400);
	image.put_words(LOD_BASE + 0x700, &[0, 0x8010_0100, 0x8010_0200, 0x8010_0300]);
	image
		.put_instance(LOD_MODEL, 0, 0, [0.0, 0.5, -2.0], [0.0; 3], [1.0; 3])
		.put_instance(LOD_MODEL + 44, 1, 0x8010_0700, [10.0, 0.0, 0.0], [0.0; 3], [1.0; 3])
		.put_instance(LOD_MODEL + 88, 2, 0x8010_0708, [0.0; 3], [-0.0, 0.25, 0.0], [2.0; 3])
		.put_instance(LOD_MODEL + 132, 3, 0, [0.0; 3], [0.0; 3], [0.0; 3]);
	image
		.put_stream(0x8010_0100, &[(OP_VTX, 0x8010_1000), (OP_ENDDL, 0)])
		.put_stream(0x8010_0200, &[(OP_VTX, 0x8010_1100), (OP_ENDDL, 0)])
		.put_stream(0x8010_0300, &[(OP_BRANCH_Z, 0x8010_0400), (OP_VTX, 0x8010_1200), (OP_ENDDL, 0)])
		.put_stream(0x8010_0400, &[(OP_VTX, 0x8010_1300), (OP_ENDDL, 0)]);
	image
}

/// Minimal texture record: CI format, square `width`, frame array at `images` (0 for none).
pub(crate) fn put_texture(image: &mut ImageBuilder, addr: u32, width: u16, images: u32) {
	image.put_u8(addr + 0x02, 2).put_u32(addr + 0x04, images).put_u16(addr + 0x0C, width).put_u16(addr + 0x0E, width);
}

pub(crate) fn image_path(name: &str, bytes: &[u8]) -> PathBuf {
	write_temp_image(name, bytes)
}

pub(crate) fn run_modelrip(args: &[&str]) -> Output {
	Command::new(modelrip_bin()).args(args).env("RUST_LOG", "off").output().expect("modelrip command executes")
}

pub(crate) fn run_modelrip_stdout(args: &[&str]) -> String {
	let output = run_modelrip(args);
	assert!(
		output.status.success(),
		"modelrip command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	String::from_utf8(output.stdout).expect("stdout should be utf-8")
}

pub(crate) fn run_modelrip_json(args: &[&str]) -> serde_json::Value {
	stdout_json(&run_modelrip(args))
}

fn modelrip_bin() -> &'static PathBuf {
	MODELRIP_BIN.get_or_init(resolve_modelrip_bin)
}

fn resolve_modelrip_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_modelrip") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "modelrip.exe" } else { "modelrip" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "modelrip"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build modelrip binary at {}", bin.display());

	bin
}
