mod bounds;
mod bytes;
mod diag;
mod dlist;
mod error;
mod extract;
mod gfx;
mod image;
mod instance;
mod layout;
mod materials;
mod naming;
mod payload;
mod search;
mod segment;
mod texture;

/// Address registry and array boundary inference.
pub use bounds::{AddressRegistry, FRAME_ARRAY_FALLBACK, MAX_FRAME_ENTRIES, POINTER_ARRAY_FALLBACK};
/// Recovered ambiguity records.
pub use diag::{Diagnostic, DiagnosticKind, Diagnostics, LodSlot};
/// Command-stream decoding and graph walking.
pub use dlist::{CommandStream, Discovery, MAX_LOD_BRANCHES, STREAM_WINDOW, SWEEP_WINDOW, StreamWalker, decode_stream, emitted_streams};
/// Error and result aliases.
pub use error::{ModelError, Result};
/// Whole-model extraction entry points and results.
pub use extract::{
	CandidateRegion, InstanceRef, ModelGraph, ModelRequest, RegionWord, VERTEX_FALLBACK_SIZE, VERTEX_MODEL_GAP, VERTEX_SIZE, VERTEX_STREAM_GAP, VertexSpan,
	extract_model, inspect_candidate_region,
};
/// Graphics command words the walker understands.
pub use gfx::{COMMAND_SIZE, Command};
/// Normalized cartridge image.
pub use image::RomImage;
/// Instance-transform records.
pub use instance::{INSTANCE_RECORD_SIZE, InstanceEntry, MAX_INSTANCE_RECORDS, instance_pointers, scan_instances};
/// Stored byte order detection.
pub use layout::ByteLayout;
/// Materials sub-graph.
pub use materials::{MATERIALS_LOOKAHEAD, MaterialSet, extract_materials};
/// Position-based identifiers and artifact naming.
pub use naming::{
	ArtifactNaming, EntryTag, FIRST, LAST, NameRegistry, draw_name, frames_name, image_name, materials_name, pre_name, ptr_array_name, texture_name,
	variant_name,
};
/// Payload table classification.
pub use payload::{DirectEntry, Payload, PayloadMode, PayloadRecord, PayloadShape, PayloadTable, RecordSlot, classify_direct, classify_table};
/// Instance-table search over raw bytes.
pub use search::{MIN_TABLE_RECORDS, TableCandidate, find_instance_tables};
/// Load-address to file-offset translation.
pub use segment::{SEGMENT_TAG, Segment, is_segment_address, is_valid_pointer};
/// Texture records.
pub use texture::{TEXTURE_RECORD_SIZE, TextureInfo, read_texture_at};
