use modelrip::model::{ModelError, Result, TextureInfo};

/// Parse a hex literal, with or without a `0x` prefix.
pub(crate) fn parse_hex(value: &str) -> Result<u64> {
	let digits = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")).unwrap_or(value);
	u64::from_str_radix(digits, 16).map_err(|_| ModelError::InvalidAddressLiteral { value: value.to_owned() })
}

/// Parse a hex load address that must fit in 32 bits.
pub(crate) fn parse_load_addr(value: &str) -> Result<u32> {
	let parsed = parse_hex(value)?;
	u32::try_from(parsed).map_err(|_| ModelError::InvalidAddressLiteral { value: value.to_owned() })
}

/// `0xAAAAAAAA`
pub(crate) fn hex32(value: u32) -> String {
	format!("0x{value:08X}")
}

/// Print a pretty JSON document to stdout.
pub(crate) fn emit_json<T: serde::Serialize>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: json: {err}"),
	}
}

/// Print a banner-delimited output section.
pub(crate) fn print_section(title: &str, body: &str) {
	let rule = "=".repeat(80);
	println!();
	println!("{rule}");
	println!("{title}");
	println!("{rule}");
	println!("{body}");
}

/// Shortest round-trip rendering of the widened value.
///
/// Exponents carry a sign and at least two digits (`1e-07`, `1e+16`); non-finite values are `nan`, `inf`, `-inf`.
pub(crate) fn c_float(value: f32) -> String {
	let wide = f64::from(value);
	if wide.is_nan() {
		return "nan".to_owned();
	}

	let text = format!("{wide:?}");
	let Some((mantissa, exponent)) = text.split_once('e') else {
		return text;
	};
	let (sign, digits) = match exponent.strip_prefix('-') {
		Some(digits) => ('-', digits),
		None => ('+', exponent),
	};
	format!("{mantissa}e{sign}{digits:0>2}")
}

/// Texture float: integral values as `N.0`, everything else round-trip.
pub(crate) fn texture_float(value: f32) -> String {
	let wide = f64::from(value);
	if wide == 0.0 {
		"0.0".to_owned()
	} else if wide.fract() == 0.0 && wide.abs() < 1e16 {
		format!("{wide:.1}")
	} else {
		c_float(value)
	}
}

/// `G_IM_FMT_*` name of an image format.
pub(crate) fn image_format(value: u8) -> String {
	match value {
		0 => "G_IM_FMT_RGBA".to_owned(),
		1 => "G_IM_FMT_YUV".to_owned(),
		2 => "G_IM_FMT_CI".to_owned(),
		3 => "G_IM_FMT_IA".to_owned(),
		4 => "G_IM_FMT_I".to_owned(),
		other => format!("0x{other:X}"),
	}
}

/// `G_IM_SIZ_*` name of a texel size.
pub(crate) fn image_size(value: u8) -> String {
	match value {
		0 => "G_IM_SIZ_4b".to_owned(),
		1 => "G_IM_SIZ_8b".to_owned(),
		2 => "G_IM_SIZ_16b".to_owned(),
		3 => "G_IM_SIZ_32b".to_owned(),
		5 => "G_IM_SIZ_DD".to_owned(),
		other => format!("0x{other:X}"),
	}
}

/// `{ r, g, b, a }`
pub(crate) fn color_pack(color: [u8; 4]) -> String {
	let [r, g, b, a] = color;
	format!("{{ {r}, {g}, {b}, {a} }}")
}

/// C initializer body of a texture record, one field per line, without the closing brace.
///
/// `images` renders the frame array field; `pointer` renders every other pointer field.
pub(crate) fn texture_initializer(name: &str, texture: &TextureInfo, images: String, pointer: fn(u32) -> String) -> Vec<String> {
	let [b0, b1, b2, b3] = texture.unk_48;
	let fields = [
		texture.pad00.to_string(),
		image_format(texture.format),
		image_size(texture.palette_bit_depth),
		images,
		texture.scale.to_string(),
		texture.unk_0a.to_string(),
		texture.width_main.to_string(),
		texture.height_main.to_string(),
		texture.unk_10.to_string(),
		texture_float(texture.unk_14),
		texture_float(texture.unk_18),
		texture_float(texture.scale_s),
		texture_float(texture.scale_t),
		texture_float(texture.unk_24),
		texture_float(texture.unk_28),
		pointer(texture.palettes),
		format!("0x{:X}", texture.flags),
		image_format(texture.unk_32),
		image_size(texture.unk_33),
		texture.block_width.to_string(),
		texture.block_height.to_string(),
		texture.width_aux.to_string(),
		texture.height_aux.to_string(),
		texture_float(texture.unk_3c),
		texture_float(texture.unk_40),
		texture_float(texture.unk_44),
		format!("{{ {b0}, {b1}, {b2}, {b3} }}"),
		texture.unk_4c.to_string(),
		color_pack(texture.prim_rgba),
		texture.unk_54.to_string(),
		texture.min_lod_value.to_string(),
		texture.unk_56.to_string(),
		texture.unk_57.to_string(),
		color_pack(texture.env_rgba),
		color_pack(texture.blend_rgba),
		color_pack(texture.light_color1),
		color_pack(texture.light_color2),
		texture.unk_68.to_string(),
		texture.unk_6c.to_string(),
		texture.unk_70.to_string(),
		texture.unk_74.to_string(),
	];

	let mut lines = vec![format!("Texture {name} = {{")];
	lines.extend(fields.into_iter().map(|field| format!("    {field},")));
	lines.push("};".to_owned());
	lines
}
