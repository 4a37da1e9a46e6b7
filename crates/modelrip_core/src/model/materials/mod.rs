use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::{debug, info};

use crate::model::bytes::read_u32_at;
use crate::model::naming::{frames_name, image_name, materials_name, ptr_array_name, texture_name};
use crate::model::segment::is_valid_pointer;
use crate::model::{AddressRegistry, NameRegistry, POINTER_ARRAY_FALLBACK, Result, RomImage, Segment, TextureInfo};

/// Words read ahead of the materials start when locating its end.
pub const MATERIALS_LOOKAHEAD: usize = 1000;

/// Materials array, texture-pointer arrays and textures reachable from one materials start.
#[derive(Debug, Clone)]
pub struct MaterialSet {
	/// Segment the materials region was translated with.
	pub segment: Segment,
	/// Load address of the materials array.
	pub start: u32,
	/// Materials slots; `None` is a hole.
	pub materials: Vec<Option<u32>>,
	/// Texture-pointer arrays keyed by load address, in materials order.
	pub ptr_arrays: IndexMap<u32, Vec<Option<u32>>>,
	/// Textures keyed by load address, in discovery order.
	pub textures: IndexMap<u32, TextureInfo>,
}

impl MaterialSet {
	/// First materials index holding `array_addr`.
	pub fn part_of(&self, array_addr: u32) -> Option<usize> {
		self.materials.iter().position(|slot| *slot == Some(array_addr))
	}

	/// `(part, mat)` of a texture: the part of the first array listing it and its position there.
	pub fn texture_slot(&self, texture_addr: u32) -> Option<(usize, usize)> {
		self.ptr_arrays.iter().find_map(|(array_addr, entries)| {
			let mat = entries.iter().position(|entry| *entry == Some(texture_addr))?;
			Some((self.part_of(*array_addr)?, mat))
		})
	}

	/// Distinct image-data pointers across every frame array, ascending.
	pub fn image_pointers(&self) -> Vec<u32> {
		let unique: BTreeSet<u32> = self.textures.values().flat_map(|texture| texture.frames.iter().copied()).filter(|ptr| *ptr != 0).collect();
		unique.into_iter().collect()
	}

	/// Identifiers for every named object under `model`; objects with no part are left unnamed.
	pub fn names(&self, model: &str) -> NameRegistry {
		let mut names = NameRegistry::default();
		names.assign(self.start, materials_name(model));
		for array_addr in self.ptr_arrays.keys() {
			if let Some(part) = self.part_of(*array_addr) {
				names.assign(*array_addr, ptr_array_name(model, part));
			}
		}
		for (addr, texture) in &self.textures {
			let Some((part, mat)) = self.texture_slot(*addr) else {
				continue;
			};
			names.assign(*addr, texture_name(model, part, mat));
			if !texture.frames.is_empty() {
				names.assign(texture.images, frames_name(model, part, mat));
			}
		}
		for image in self.image_pointers() {
			names.assign(image, image_name(model, image));
		}
		names
	}

	/// Structure starts used to bound frame arrays.
	pub fn frame_boundaries(&self) -> AddressRegistry {
		let mut known = AddressRegistry::new();
		known.extend(self.textures.values().map(|texture| texture.images).filter(|images| is_valid_pointer(*images)));
		known.extend(self.textures.keys().copied().filter(|addr| *addr > self.start));
		known.extend(self.ptr_arrays.keys().copied().filter(|addr| *addr > self.start));
		known
	}

	fn read_materials(&mut self, bytes: &[u8], known: &mut AddressRegistry) {
		let base = self.segment.to_file(self.start);
		let lookahead: Vec<u32> = (0..MATERIALS_LOOKAHEAD).map(|idx| read_u32_at(bytes, base + idx as i64 * 4)).collect();
		let in_segment: AddressRegistry = lookahead.iter().copied().filter(|ptr| is_valid_pointer(*ptr) && *ptr > self.start).collect();
		if in_segment.is_empty() {
			debug!("no in-segment pointers after materials start 0x{:08X}", self.start);
			return;
		}

		let capacity = in_segment.capacity(self.start, MATERIALS_LOOKAHEAD).min(MATERIALS_LOOKAHEAD);
		for ptr in &lookahead[..capacity] {
			if is_valid_pointer(*ptr) {
				if *ptr > self.start {
					known.insert(*ptr);
				}
				self.materials.push(Some(*ptr));
			} else {
				self.materials.push(None);
			}
		}
	}

	fn read_texture_array(&mut self, bytes: &[u8], addr: u32, capacity: usize, known: &mut AddressRegistry) -> Vec<Option<u32>> {
		let base = self.segment.to_file(addr);
		let mut entries = Vec::new();

		for idx in 0..capacity {
			let ptr = read_u32_at(bytes, base + idx as i64 * 4);
			if ptr == 0 {
				entries.push(None);
				let next_slot = addr.wrapping_add((idx as u32 + 1) * 4);
				let next_offset = base + (idx as i64 + 1) * 4;
				if idx + 1 >= capacity || next_offset + 4 > bytes.len() as i64 || known.contains(next_slot) {
					break;
				}
			} else if is_valid_pointer(ptr) {
				entries.push(Some(ptr));
				if !self.textures.contains_key(&ptr) {
					self.textures.insert(ptr, TextureInfo::parse(bytes, self.segment.to_file(ptr), ptr));
					known.insert(ptr);
				}
			} else {
				break;
			}
		}

		entries
	}
}

/// Recover the materials sub-graph starting at `start`, anchored at `file_offset`.
///
/// Texture records are parsed in two passes: fixed fields while the arrays are walked, frame arrays once every structure start is known.
pub fn extract_materials(image: &RomImage, start: u32, file_offset: u64) -> Result<MaterialSet> {
	image.check_offset(file_offset)?;
	let bytes = image.bytes();
	let mut set = MaterialSet {
		segment: Segment::from_anchor(start, file_offset),
		start,
		materials: Vec::new(),
		ptr_arrays: IndexMap::new(),
		textures: IndexMap::new(),
	};

	let mut known = AddressRegistry::new();
	set.read_materials(bytes, &mut known);

	let snapshot = known.clone();
	let arrays: Vec<u32> = set.materials.iter().flatten().copied().collect();
	for array_addr in arrays {
		if set.ptr_arrays.contains_key(&array_addr) {
			continue;
		}
		let capacity = if array_addr > start { snapshot.capacity(array_addr, POINTER_ARRAY_FALLBACK) } else { POINTER_ARRAY_FALLBACK };
		let entries = set.read_texture_array(bytes, array_addr, capacity, &mut known);
		set.ptr_arrays.insert(array_addr, entries);
	}

	let boundaries = set.frame_boundaries();
	let segment = set.segment;
	for texture in set.textures.values_mut() {
		texture.resolve_frames(bytes, &segment, &boundaries);
	}

	info!(
		"materials 0x{start:08X}: {} slots, {} texture arrays, {} textures",
		set.materials.len(),
		set.ptr_arrays.len(),
		set.textures.len()
	);
	Ok(set)
}
