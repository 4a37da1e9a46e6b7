#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "modelrip", about = "N64 model asset graph reconstruction tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Reconstruct a model from its instance table, or dump the candidate payload region.
	Extract(cmd::extract::Args),
	/// Emit the materials/texture header of a model.
	Header(cmd::header::Args),
	/// Print one texture record as a C initializer.
	Texture(cmd::texture::Args),
	/// Search an image for instance tables.
	Scan(cmd::scan::Args),
}

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> modelrip::model::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Extract(args) => cmd::extract::run(args),
		Commands::Header(args) => cmd::header::run(args),
		Commands::Texture(args) => cmd::texture::run(args),
		Commands::Scan(args) => cmd::scan::run(args),
	}
}
