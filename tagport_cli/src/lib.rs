use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Convert `<<field>>` template tags into `wr:` field tags.",
	long_about = "tagport converts the `<<field>>` tags of a word processing template into \
	              `wr:` field tags and writes a sample data file shaped like the data the \
	              template reads.\n\nDocuments are read and written in tagport's JSON \
	              document form.\n\nQuick start:\n  tagport convert in.json out.json \
	              data.xml log.txt\n  tagport check in.json"
)]
pub struct TagportCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Enable verbose output. Every conversion line is echoed to stderr.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Convert a template and write the converted document, sample data and
	/// log.
	///
	/// Parent directories of the three outputs are created when missing and
	/// existing files are replaced.
	Convert {
		/// The JSON document to convert.
		source: PathBuf,
		/// Where to write the converted JSON document.
		destination: PathBuf,
		/// Where to write the sample data XML.
		data: PathBuf,
		/// Where to write the conversion log.
		log: PathBuf,
		/// Path to a `tagport.toml`. Defaults to the first config found in the
		/// source document's directory.
		#[arg(long)]
		config: Option<PathBuf>,
	},
	/// Report what a conversion would do without writing anything.
	///
	/// Exits with a non-zero status code when any tag would be left
	/// unconverted or any open marker has no matching close marker.
	Check {
		/// The JSON document to inspect.
		source: PathBuf,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,

		/// Path to a `tagport.toml`.
		#[arg(long)]
		config: Option<PathBuf>,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
