/// Model extraction and candidate-region inspection.
pub mod extract;
/// Materials/texture header generation.
pub mod header;
/// Instance-table search.
pub mod scan;
/// Single texture record dump.
pub mod texture;

#[cfg(test)]
mod test_support;
mod util;
