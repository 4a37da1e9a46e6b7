use crate::model::bytes::{Cursor, read_u32_at};
use crate::model::segment::is_valid_pointer;
use crate::model::{AddressRegistry, FRAME_ARRAY_FALLBACK, MAX_FRAME_ENTRIES, Result, RomImage, Segment};

/// Size of one texture record in bytes.
pub const TEXTURE_RECORD_SIZE: usize = 0x78;

/// Fixed-layout texture record plus its resolved frame pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
	/// Record load address.
	pub load_addr: u32,
	/// Record file offset.
	pub file_offset: i64,
	/// Leading padding half-word.
	pub pad00: u16,
	/// Image format.
	pub format: u8,
	/// Palette bit depth.
	pub palette_bit_depth: u8,
	/// Frame array pointer.
	pub images: u32,
	/// Scale.
	pub scale: u16,
	/// Unknown at 0x0A.
	pub unk_0a: u16,
	/// Main width.
	pub width_main: u16,
	/// Main height.
	pub height_main: u16,
	/// Unknown at 0x10.
	pub unk_10: i32,
	/// Unknown at 0x14.
	pub unk_14: f32,
	/// Unknown at 0x18.
	pub unk_18: f32,
	/// S scale factor.
	pub scale_s: f32,
	/// T scale factor.
	pub scale_t: f32,
	/// Unknown at 0x24.
	pub unk_24: f32,
	/// Unknown at 0x28.
	pub unk_28: f32,
	/// Palette pointer.
	pub palettes: u32,
	/// Flags.
	pub flags: u16,
	/// Auxiliary image format.
	pub unk_32: u8,
	/// Auxiliary image size.
	pub unk_33: u8,
	/// Block width.
	pub block_width: u16,
	/// Block height.
	pub block_height: u16,
	/// Auxiliary width.
	pub width_aux: u16,
	/// Auxiliary height.
	pub height_aux: u16,
	/// Unknown at 0x3C.
	pub unk_3c: f32,
	/// Unknown at 0x40.
	pub unk_40: f32,
	/// Unknown at 0x44.
	pub unk_44: f32,
	/// Unknown bytes at 0x48.
	pub unk_48: [u8; 4],
	/// Unknown at 0x4C.
	pub unk_4c: u32,
	/// Primitive color.
	pub prim_rgba: [u8; 4],
	/// Unknown at 0x54.
	pub unk_54: u8,
	/// Minimum LOD value.
	pub min_lod_value: u8,
	/// Unknown at 0x56.
	pub unk_56: u8,
	/// Unknown at 0x57.
	pub unk_57: u8,
	/// Environment color.
	pub env_rgba: [u8; 4],
	/// Blend color.
	pub blend_rgba: [u8; 4],
	/// First light color.
	pub light_color1: [u8; 4],
	/// Second light color.
	pub light_color2: [u8; 4],
	/// Unknown at 0x68.
	pub unk_68: i32,
	/// Unknown at 0x6C.
	pub unk_6c: i32,
	/// Unknown at 0x70.
	pub unk_70: i32,
	/// Unknown at 0x74.
	pub unk_74: i32,
	/// Frame pointers, filled by the second pass.
	pub frames: Vec<u32>,
}

impl TextureInfo {
	/// First pass: read the fixed fields at `file_offset`, leaving `frames` empty.
	pub fn parse(bytes: &[u8], file_offset: i64, load_addr: u32) -> Self {
		let mut cur = Cursor::at(bytes, file_offset);
		Self {
			load_addr,
			file_offset,
			pad00: cur.read_u16(),
			format: cur.read_u8(),
			palette_bit_depth: cur.read_u8(),
			images: cur.read_u32(),
			scale: cur.read_u16(),
			unk_0a: cur.read_u16(),
			width_main: cur.read_u16(),
			height_main: cur.read_u16(),
			unk_10: cur.read_i32(),
			unk_14: cur.read_f32(),
			unk_18: cur.read_f32(),
			scale_s: cur.read_f32(),
			scale_t: cur.read_f32(),
			unk_24: cur.read_f32(),
			unk_28: cur.read_f32(),
			palettes: cur.read_u32(),
			flags: cur.read_u16(),
			unk_32: cur.read_u8(),
			unk_33: cur.read_u8(),
			block_width: cur.read_u16(),
			block_height: cur.read_u16(),
			width_aux: cur.read_u16(),
			height_aux: cur.read_u16(),
			unk_3c: cur.read_f32(),
			unk_40: cur.read_f32(),
			unk_44: cur.read_f32(),
			unk_48: cur.read_array(),
			unk_4c: cur.read_u32(),
			prim_rgba: cur.read_array(),
			unk_54: cur.read_u8(),
			min_lod_value: cur.read_u8(),
			unk_56: cur.read_u8(),
			unk_57: cur.read_u8(),
			env_rgba: cur.read_array(),
			blend_rgba: cur.read_array(),
			light_color1: cur.read_array(),
			light_color2: cur.read_array(),
			unk_68: cur.read_i32(),
			unk_6c: cur.read_i32(),
			unk_70: cur.read_i32(),
			unk_74: cur.read_i32(),
			frames: Vec::new(),
		}
	}

	/// Second pass: read frame pointers until null or the capacity inferred from `known`.
	pub fn resolve_frames(&mut self, bytes: &[u8], segment: &Segment, known: &AddressRegistry) {
		self.frames.clear();
		if !is_valid_pointer(self.images) {
			return;
		}

		let capacity = known.capacity(self.images, FRAME_ARRAY_FALLBACK).min(MAX_FRAME_ENTRIES);
		let start = segment.to_file(self.images);
		for idx in 0..capacity {
			let ptr = read_u32_at(bytes, start + idx as i64 * 4);
			if ptr == 0 {
				break;
			}
			self.frames.push(ptr);
		}
	}
}

/// Read one texture record at a caller-supplied file offset; the whole record must lie inside the image.
pub fn read_texture_at(image: &RomImage, file_offset: u64) -> Result<TextureInfo> {
	image.check_record(file_offset, TEXTURE_RECORD_SIZE)?;
	Ok(TextureInfo::parse(image.bytes(), file_offset as i64, 0))
}
