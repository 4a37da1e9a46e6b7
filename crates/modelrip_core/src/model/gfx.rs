use crate::model::segment::is_segment_address;

/// Size of one command word in bytes.
pub const COMMAND_SIZE: usize = 8;

/// No-op carrying a tag operand.
pub const OP_NOOP: u8 = 0x00;
/// Vertex load, revision 1 encoding.
pub const OP_VTX: u8 = 0x01;
/// Vertex load, revision 0 encoding.
pub const OP_VTX_LEGACY: u8 = 0x04;
/// Sub-list call.
pub const OP_DL: u8 = 0xDE;
/// End of list.
pub const OP_ENDDL: u8 = 0xDF;
/// Conditional branch on depth, used for LOD selection.
pub const OP_BRANCH_Z: u8 = 0xE1;

/// Structural meaning of one command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
	/// List terminator.
	End,
	/// Vertex buffer reference.
	Vertex(u32),
	/// LOD branch target.
	LodBranch(u32),
	/// Sub-list call target.
	Call(u32),
	/// Tagged no-op whose operand looks like a list address.
	Tag(u32),
	/// Anything without graph structure.
	Other,
}

impl Command {
	/// Classify a command from its two words.
	pub fn decode(w0: u32, w1: u32) -> Self {
		let opcode = (w0 >> 24) as u8;
		match opcode {
			OP_ENDDL => Self::End,
			OP_VTX | OP_VTX_LEGACY if is_segment_address(w1) => Self::Vertex(w1),
			OP_BRANCH_Z if is_segment_address(w1) => Self::LodBranch(w1),
			OP_DL if is_segment_address(w1) => Self::Call(w1),
			OP_NOOP if is_segment_address(w1) => Self::Tag(w1),
			_ => Self::Other,
		}
	}
}
