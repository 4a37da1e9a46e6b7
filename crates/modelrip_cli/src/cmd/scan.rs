use std::path::PathBuf;

use log::info;
use modelrip::model::{Result, RomImage, find_instance_tables};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	/// Images or segment dumps to search.
	#[arg(required = true)]
	pub images: Vec<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

pub fn run(args: Args) -> Result<()> {
	let Args { images, json } = args;

	let mut found = Vec::new();
	for path in &images {
		let image = RomImage::open(path)?;
		let tables = find_instance_tables(image.bytes());
		info!("{}: {} layout, {} candidate tables", path.display(), image.layout.as_str(), tables.len());
		found.extend(tables.into_iter().map(|table| CandidateJson {
			path: path.display().to_string(),
			offset: format!("0x{:06X}", table.offset),
			count: table.count,
		}));
	}

	if json {
		emit_json(&found);
		return Ok(());
	}

	if found.is_empty() {
		println!("no instance tables found");
		return Ok(());
	}

	let width = found.iter().map(|candidate| candidate.path.len()).max().unwrap_or(0).max("file".len());
	println!("{:<width$}  {:<10}  count", "file", "offset");
	for candidate in &found {
		println!("{:<width$}  {:<10}  {}", candidate.path, candidate.offset, candidate.count);
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct CandidateJson {
	path: String,
	offset: String,
	count: usize,
}
