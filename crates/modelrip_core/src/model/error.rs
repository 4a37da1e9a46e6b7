use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Fatal errors that abort an extraction run.
///
/// Short reads inside the image never surface here: they read as zero and feed the inference heuristics instead.
#[derive(Debug, Error)]
pub enum ModelError {
	/// Filesystem IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Requested starting offset lies beyond the image.
	#[error("offset 0x{offset:X} is beyond image length 0x{len:X}")]
	OffsetOutOfRange {
		/// Requested file offset.
		offset: u64,
		/// Image length in bytes.
		len: usize,
	},
	/// A fixed-size record requested directly did not fit in the image.
	#[error("record at 0x{offset:X} needs {need} bytes, image length 0x{len:X}")]
	RecordTruncated {
		/// Record file offset.
		offset: u64,
		/// Record size in bytes.
		need: usize,
		/// Image length in bytes.
		len: usize,
	},
	/// Address or offset literal could not be parsed.
	#[error("invalid address literal: {value}")]
	InvalidAddressLiteral {
		/// User-provided literal.
		value: String,
	},
	/// Payload mode selector was not one of `direct`, `i`, `c`, `j`.
	#[error("unknown payload shape: {value} (expected direct, i, c or j)")]
	UnknownPayloadShape {
		/// User-provided selector.
		value: String,
	},
}
