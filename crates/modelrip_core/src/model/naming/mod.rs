use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::model::LodSlot;

/// Identifier of the first stream that calls sub-streams.
pub const FIRST: &str = "first";
/// Identifier of the last stream that calls sub-streams.
pub const LAST: &str = "last";

/// Role of a payload or direct entry in naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTag {
	/// Ordinary part, named by position.
	Regular,
	/// Earliest entry whose streams call sub-streams.
	First,
	/// Latest entry whose streams call sub-streams.
	Last,
}

impl EntryTag {
	/// Pick the tag for an entry; `first` wins when an entry is both.
	pub fn from_flags(is_first: bool, is_last: bool) -> Self {
		if is_first {
			Self::First
		} else if is_last {
			Self::Last
		} else {
			Self::Regular
		}
	}

	/// Whether the entry is `first` or `last`.
	pub fn is_special(self) -> bool {
		self != Self::Regular
	}
}

/// `part<N>_pre`
pub fn pre_name(part: usize) -> String {
	format!("part{part}_pre")
}

/// `part<N>_draw`
pub fn draw_name(part: usize) -> String {
	format!("part{part}_draw")
}

/// Call targets share the draw naming of the part they stand for.
pub fn call_target_name(part: usize) -> String {
	draw_name(part)
}

/// Name of a draw stream carrying `tag`.
pub fn tagged_draw_name(tag: EntryTag, part: usize) -> String {
	match tag {
		EntryTag::First => FIRST.to_owned(),
		EntryTag::Last => LAST.to_owned(),
		EntryTag::Regular => draw_name(part),
	}
}

/// `<parent>_near` or `<parent>_far`.
pub fn variant_name(parent: &str, slot: LodSlot) -> String {
	format!("{parent}_{}", slot.suffix())
}

/// `<model>_materials`
pub fn materials_name(model: &str) -> String {
	format!("{model}_materials")
}

/// `<model>_part<N>_mat`
pub fn ptr_array_name(model: &str, part: usize) -> String {
	format!("{model}_part{part}_mat")
}

/// `<model>_part<N>_mat<M>`
pub fn texture_name(model: &str, part: usize, mat: usize) -> String {
	format!("{model}_part{part}_mat{mat}")
}

/// `<model>_part<N>_mat<M>_textures`
pub fn frames_name(model: &str, part: usize, mat: usize) -> String {
	format!("{model}_part{part}_mat{mat}_textures")
}

/// `<model>_tex_<ADDR>`
pub fn image_name(model: &str, addr: u32) -> String {
	format!("{model}_tex_{addr:08X}")
}

/// Output naming context for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
	/// Model name, the symbol prefix.
	pub model: String,
	/// Asset directory the model lives under.
	pub dir: String,
	/// Optional variant such as `hd`.
	pub variant: Option<String>,
	/// Segment name recorded in symbol comments.
	pub segment: String,
}

impl ArtifactNaming {
	/// Build naming for `model` under `dir`; the segment defaults to `<dir>_code`.
	pub fn new(model: impl Into<String>, dir: impl Into<String>, variant: Option<String>, segment: Option<String>) -> Self {
		let dir = dir.into();
		let segment = segment.unwrap_or_else(|| format!("{dir}_code"));
		Self {
			model: model.into(),
			dir,
			variant,
			segment,
		}
	}

	/// Global symbol for `base`: `<model>_<variant>_<base>` or `<model>_<base>`.
	pub fn symbol(&self, base: &str) -> String {
		match &self.variant {
			Some(variant) => format!("{}_{variant}_{base}", self.model),
			None => format!("{}_{base}", self.model),
		}
	}

	/// File stem for `base`: `<variant>_<base>` or `<base>`.
	pub fn file(&self, base: &str) -> String {
		match &self.variant {
			Some(variant) => format!("{variant}_{base}"),
			None => base.to_owned(),
		}
	}

	/// Include path of a generated asset file.
	pub fn include_path(&self, base: &str, kind: &str) -> String {
		format!("assets/{}/{}/{}.{kind}.inc.c", self.dir, self.model, self.file(base))
	}
}

/// Write-once mapping from load address to identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRegistry {
	names: IndexMap<u32, String>,
}

impl NameRegistry {
	/// Assign `name` to `addr` unless it already has one; returns the identifier in effect.
	pub fn assign(&mut self, addr: u32, name: impl Into<String>) -> &str {
		match self.names.entry(addr) {
			Entry::Occupied(entry) => entry.into_mut().as_str(),
			Entry::Vacant(entry) => entry.insert(name.into()).as_str(),
		}
	}

	/// Identifier assigned to `addr`.
	pub fn get(&self, addr: u32) -> Option<&str> {
		self.names.get(&addr).map(String::as_str)
	}

	/// Iterate `(addr, name)` in assignment order.
	pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
		self.names.iter().map(|(addr, name)| (*addr, name.as_str()))
	}

	/// Number of named addresses.
	pub fn len(&self) -> usize {
		self.names.len()
	}

	/// Whether nothing is named.
	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}
