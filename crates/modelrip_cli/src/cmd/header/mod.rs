use std::path::PathBuf;

use log::info;
use modelrip::model::{MaterialSet, NameRegistry, Result, RomImage, extract_materials, frames_name, texture_name};

use crate::cmd::util::{emit_json, hex32, parse_hex, parse_load_addr, print_section, texture_initializer};

#[derive(clap::Args)]
pub struct Args {
	pub image: PathBuf,
	/// Load address of the materials array (hex).
	pub load_addr: String,
	/// File offset of the materials array (hex).
	pub file_offset: String,
	/// Model name used as the symbol prefix.
	pub name: String,
	#[arg(long)]
	pub json: bool,
}

pub fn run(args: Args) -> Result<()> {
	let Args {
		image: path,
		load_addr,
		file_offset,
		name,
		json,
	} = args;

	let start = parse_load_addr(&load_addr)?;
	let offset = parse_hex(&file_offset)?;
	let image = RomImage::open(&path)?;
	info!("{}: {} layout, 0x{:X} bytes", path.display(), image.layout.as_str(), image.len());

	let set = extract_materials(&image, start, offset)?;
	if json {
		emit_json(&materials_json(&set, &name));
		return Ok(());
	}

	print_section("GENERATED C CODE:", &render_header(&set, &name));
	Ok(())
}

fn texture_pointer(ptr: u32) -> String {
	if ptr == 0 { "NULL".to_owned() } else { format!("(u8*)0x{ptr:08X}") }
}

/// Header source in placement order: image externs, materials array, frame arrays, texture records, texture-pointer arrays.
pub(crate) fn render_header(set: &MaterialSet, model: &str) -> String {
	let names = set.names(model);
	let mut out = Vec::new();

	let images = set.image_pointers();
	if !images.is_empty() {
		out.extend(images.iter().map(|addr| format!("extern u8 {}[];", symbol_or_pointer(&names, *addr))));
		out.push(String::new());
	}

	out.push(format!("Texture** {}[] = {{", names.get(set.start).unwrap_or("materials")));
	for slot in &set.materials {
		out.push(match slot.map(|addr| (addr, names.get(addr))) {
			None => "    NULL,".to_owned(),
			Some((_, Some(array))) => format!("    {array},"),
			Some((addr, None)) => format!("    NULL, // TODO: 0x{addr:08X}"),
		});
	}
	out.push("};".to_owned());
	out.push(String::new());

	let slotted: Vec<_> = set
		.textures
		.iter()
		.filter_map(|(addr, texture)| set.texture_slot(*addr).map(|(part, mat)| (part, mat, texture)))
		.collect();

	for (part, mat, texture) in &slotted {
		if texture.frames.is_empty() {
			continue;
		}
		out.push(format!("u8* {}[] = {{", frames_name(model, *part, *mat)));
		out.extend(texture.frames.iter().map(|frame| format!("    {},", symbol_or_pointer(&names, *frame))));
		out.push("};".to_owned());
		out.push(String::new());
	}

	for (part, mat, texture) in &slotted {
		let images = if texture.frames.is_empty() { texture_pointer(texture.images) } else { frames_name(model, *part, *mat) };
		out.extend(texture_initializer(&texture_name(model, *part, *mat), texture, images, texture_pointer));
		out.push(String::new());
	}

	for (array_addr, entries) in &set.ptr_arrays {
		let Some(part) = set.part_of(*array_addr) else {
			continue;
		};
		out.push(format!("Texture* {}[] = {{", names.get(*array_addr).unwrap_or("mat")));
		for (mat, entry) in entries.iter().enumerate() {
			out.push(match entry {
				Some(_) => format!("    &{},", texture_name(model, part, mat)),
				None => "    NULL,".to_owned(),
			});
		}
		out.push("};".to_owned());
		out.push(String::new());
	}

	out.join("\n")
}

fn symbol_or_pointer(names: &NameRegistry, addr: u32) -> String {
	names.get(addr).map_or_else(|| texture_pointer(addr), str::to_owned)
}

fn materials_json(set: &MaterialSet, model: &str) -> MaterialsJson {
	let names = set.names(model);
	let name_of = |addr: u32| names.get(addr).map(str::to_owned);

	MaterialsJson {
		materials: name_of(set.start),
		start: hex32(set.start),
		slots: set.materials.iter().map(|slot| slot.map(hex32)).collect(),
		arrays: set
			.ptr_arrays
			.iter()
			.map(|(addr, entries)| ArrayJson {
				name: name_of(*addr),
				addr: hex32(*addr),
				entries: entries.iter().map(|entry| entry.map(hex32)).collect(),
			})
			.collect(),
		textures: set
			.textures
			.iter()
			.map(|(addr, texture)| TextureJson {
				name: name_of(*addr),
				addr: hex32(*addr),
				width: texture.width_main,
				height: texture.height_main,
				images: hex32(texture.images),
				palettes: hex32(texture.palettes),
				frames: texture.frames.iter().copied().map(hex32).collect(),
			})
			.collect(),
		images: set.image_pointers().into_iter().map(hex32).collect(),
	}
}

#[derive(serde::Serialize)]
struct MaterialsJson {
	materials: Option<String>,
	start: String,
	slots: Vec<Option<String>>,
	arrays: Vec<ArrayJson>,
	textures: Vec<TextureJson>,
	images: Vec<String>,
}

#[derive(serde::Serialize)]
struct ArrayJson {
	name: Option<String>,
	addr: String,
	entries: Vec<Option<String>>,
}

#[derive(serde::Serialize)]
struct TextureJson {
	name: Option<String>,
	addr: String,
	width: u16,
	height: u16,
	images: String,
	palettes: String,
	frames: Vec<String>,
}

#[cfg(test)]
mod tests;
