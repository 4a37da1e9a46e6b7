//! Public library API for reconstructing model asset graphs from N64 cartridge images.

/// Image loading, address translation, command-stream walking, and asset naming.
pub mod model;
