use std::path::PathBuf;

use modelrip::model::{Result, RomImage, TextureInfo, read_texture_at};

use crate::cmd::util::{emit_json, hex32, image_format, image_size, parse_hex, texture_initializer};

#[derive(clap::Args)]
pub struct Args {
	pub image: PathBuf,
	/// File offset of the texture record (hex).
	pub file_offset: String,
	/// Variable name of the emitted initializer.
	#[arg(long, default_value = "texture_name")]
	pub name: String,
	#[arg(long)]
	pub json: bool,
}

pub fn run(args: Args) -> Result<()> {
	let Args {
		image: path,
		file_offset,
		name,
		json,
	} = args;

	let offset = parse_hex(&file_offset)?;
	let image = RomImage::open(&path)?;
	let texture = read_texture_at(&image, offset)?;

	if json {
		emit_json(&texture_json(&name, offset, &texture));
		return Ok(());
	}

	println!("{}", render_texture(&name, &texture));
	Ok(())
}

fn raw_pointer(ptr: u32) -> String {
	if ptr == 0 { "NULL".to_owned() } else { format!("0x{ptr:08X}") }
}

fn render_texture(name: &str, texture: &TextureInfo) -> String {
	texture_initializer(name, texture, raw_pointer(texture.images), raw_pointer).join("\n")
}

fn texture_json(name: &str, offset: u64, texture: &TextureInfo) -> TextureJson {
	TextureJson {
		name: name.to_owned(),
		file_offset: format!("0x{offset:X}"),
		format: image_format(texture.format),
		palette_bit_depth: image_size(texture.palette_bit_depth),
		images: hex32(texture.images),
		palettes: hex32(texture.palettes),
		width: texture.width_main,
		height: texture.height_main,
		block_width: texture.block_width,
		block_height: texture.block_height,
		scale_s: texture.scale_s,
		scale_t: texture.scale_t,
		flags: format!("0x{:X}", texture.flags),
		prim_rgba: texture.prim_rgba,
		env_rgba: texture.env_rgba,
		blend_rgba: texture.blend_rgba,
	}
}

#[derive(serde::Serialize)]
struct TextureJson {
	name: String,
	file_offset: String,
	format: String,
	palette_bit_depth: String,
	images: String,
	palettes: String,
	width: u16,
	height: u16,
	block_width: u16,
	block_height: u16,
	scale_s: f32,
	scale_t: f32,
	flags: String,
	prim_rgba: [u8; 4],
	env_rgba: [u8; 4],
	blend_rgba: [u8; 4],
}
