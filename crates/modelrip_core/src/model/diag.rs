use std::fmt;

use log::warn;

/// LOD slot of a branch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LodSlot {
	/// First branch target.
	Near,
	/// Second branch target.
	Far,
}

impl LodSlot {
	/// Identifier suffix for the slot.
	pub fn suffix(self) -> &'static str {
		match self {
			Self::Near => "near",
			Self::Far => "far",
		}
	}
}

/// Recovered structural ambiguity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
	/// More than two LOD branch targets; only the first two were kept.
	LodBranchesClamped {
		/// Branch targets found before clamping.
		found: usize,
	},
	/// A referenced command stream could not be decoded.
	UnresolvedStream,
	/// A LOD branch target could not be decoded; no variants are emitted for the parent.
	UnresolvedLodBranch {
		/// Slot of the unresolved target.
		slot: LodSlot,
	},
	/// Payload table span was empty or inverted.
	EmptyPayloadSpan,
	/// No vertex references were found; the vertex span is a fixed-size estimate.
	VertexSpanFallback,
	/// The identifier already names the stream at `first`; both are emitted under the same symbol.
	DuplicateIdentifier {
		/// Address that took the identifier first.
		first: u32,
	},
	/// The vertex span starts before the image; no segmentation entry is emitted for it.
	VertexSpanBeforeImage,
}

/// One recovered condition, with enough context to diff against reference output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	/// Identifier of the object being processed.
	pub subject: String,
	/// Load address involved.
	pub addr: u32,
	/// Condition kind.
	pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Self { subject, addr, kind } = self;
		match kind {
			DiagnosticKind::LodBranchesClamped { found } => write!(f, "{subject} (0x{addr:08X}): {found} LOD branches, clamped to 2"),
			DiagnosticKind::UnresolvedStream => write!(f, "{subject}: stream at 0x{addr:08X} could not be decoded"),
			DiagnosticKind::UnresolvedLodBranch { slot } => {
				write!(f, "{subject}: {} LOD branch 0x{addr:08X} could not be decoded", slot.suffix())
			}
			DiagnosticKind::EmptyPayloadSpan => write!(f, "{subject}: payload span ending at 0x{addr:08X} is empty"),
			DiagnosticKind::VertexSpanFallback => write!(f, "{subject}: no vertex references, estimated span at 0x{addr:08X}"),
			DiagnosticKind::DuplicateIdentifier { first } => {
				write!(f, "{subject}: stream at 0x{addr:08X} reuses the identifier of 0x{first:08X}")
			}
			DiagnosticKind::VertexSpanBeforeImage => write!(f, "{subject}: span at 0x{addr:08X} starts before the image"),
		}
	}
}

/// Append-only diagnostic sink for one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
	items: Vec<Diagnostic>,
}

impl Diagnostics {
	/// Record and log a diagnostic.
	pub fn report(&mut self, subject: impl Into<String>, addr: u32, kind: DiagnosticKind) {
		let item = Diagnostic {
			subject: subject.into(),
			addr,
			kind,
		};
		warn!("{item}");
		self.items.push(item);
	}

	/// Number of recorded diagnostics.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether nothing was recorded.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Borrow recorded diagnostics.
	pub fn items(&self) -> &[Diagnostic] {
		&self.items
	}

	/// Take ownership of the recorded diagnostics.
	pub fn into_vec(self) -> Vec<Diagnostic> {
		self.items
	}
}
