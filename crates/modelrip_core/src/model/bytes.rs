/// Big-endian cursor over an immutable image.
///
/// Reads never fail: a field not fully inside the image reads as zero. Offsets are signed so that translated
/// addresses below the segment base stay representable.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: i64,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at `pos`.
	pub fn at(bytes: &'a [u8], pos: i64) -> Self {
		Self { bytes, pos }
	}

	/// Advance by `n` bytes without reading.
	pub fn skip(&mut self, n: usize) {
		self.pos = self.pos.saturating_add(n as i64);
	}

	/// Read a fixed-size big-endian window and advance.
	pub fn read_array<const N: usize>(&mut self) -> [u8; N] {
		let out = read_array_at(self.bytes, self.pos);
		self.skip(N);
		out
	}

	/// Read a `u8`.
	pub fn read_u8(&mut self) -> u8 {
		self.read_array::<1>()[0]
	}

	/// Read a big-endian `u16`.
	pub fn read_u16(&mut self) -> u16 {
		u16::from_be_bytes(self.read_array())
	}

	/// Read a big-endian `u32`.
	pub fn read_u32(&mut self) -> u32 {
		u32::from_be_bytes(self.read_array())
	}

	/// Read a big-endian `i32`.
	pub fn read_i32(&mut self) -> i32 {
		i32::from_be_bytes(self.read_array())
	}

	/// Read a big-endian IEEE-754 `f32`.
	pub fn read_f32(&mut self) -> f32 {
		f32::from_be_bytes(self.read_array())
	}

	/// Read three consecutive `f32` values.
	pub fn read_vec3(&mut self) -> [f32; 3] {
		[self.read_f32(), self.read_f32(), self.read_f32()]
	}
}

/// Read a big-endian `u32` at a signed offset, or zero when the word is not fully inside the image.
pub fn read_u32_at(bytes: &[u8], offset: i64) -> u32 {
	u32::from_be_bytes(read_array_at(bytes, offset))
}

/// Copy `[offset, offset + len)` out of the image, zero-filling outside it.
pub fn slice_at(bytes: &[u8], offset: i64, len: usize) -> Vec<u8> {
	let mut out = vec![0_u8; len];
	for (idx, slot) in out.iter_mut().enumerate() {
		let at = offset.saturating_add(idx as i64);
		if at >= 0
			&& let Some(byte) = bytes.get(at as usize)
		{
			*slot = *byte;
		}
	}
	out
}

fn read_array_at<const N: usize>(bytes: &[u8], offset: i64) -> [u8; N] {
	let mut out = [0_u8; N];
	let Ok(start) = usize::try_from(offset) else {
		return out;
	};
	if let Some(end) = start.checked_add(N)
		&& end <= bytes.len()
	{
		out.copy_from_slice(&bytes[start..end]);
	}
	out
}
