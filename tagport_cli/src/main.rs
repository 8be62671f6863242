use std::path::Path;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use tagport_cli::Commands;
use tagport_cli::OutputFormat;
use tagport_cli::TagportCli;
use tagport_core::AnyEmptyResult;
use tagport_core::AnyResult;
use tagport_core::Conversion;
use tagport_core::Converter;
use tagport_core::config::TagportConfig;
use tagport_core::document::Document;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "TAGPORT_LOG";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TagportCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match args.command {
		Some(Commands::Convert {
			ref source,
			ref destination,
			ref data,
			ref log,
			ref config,
		}) => run_convert(source, destination, data, log, config.as_deref()),
		Some(Commands::Check {
			ref source,
			format,
			ref config,
		}) => run_check(source, format, config.as_deref()),
		None => {
			eprintln!("No subcommand specified. Run `tagport --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<tagport_core::TagportError>() {
			Ok(tagport_err) => {
				let report: miette::Report = (*tagport_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Conversion lines go to stderr. `TAGPORT_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "info" } else { "warn" };
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

/// An explicit `--config` path, else the first config found next to the
/// source document, else defaults.
fn load_config(source: &Path, explicit: Option<&Path>) -> AnyResult<TagportConfig> {
	if let Some(path) = explicit {
		return Ok(TagportConfig::load_from(path)?);
	}

	let root = source
		.parent()
		.filter(|parent| !parent.as_os_str().is_empty())
		.unwrap_or_else(|| Path::new("."));

	Ok(TagportConfig::load(root)?.unwrap_or_default())
}

/// Read, parse and convert `source`. Exits with status 1 when the source is
/// missing. A `header` becomes the first line of the conversion log.
fn convert_source(
	source: &Path,
	config: Option<&Path>,
	header: Option<String>,
) -> AnyResult<(Document, Conversion)> {
	if !source.is_file() {
		println!("File {} does not exist.", source.display());
		process::exit(1);
	}

	let config = load_config(source, config)?;
	let content = std::fs::read_to_string(source)?;
	let mut document = Document::from_json(&content)?;

	let mut converter = Converter::new(&config)?;
	if let Some(header) = header {
		converter.log_mut().info(header);
	}
	converter.process_document(&mut document)?;
	let conversion = converter.finalize()?;

	Ok((document, conversion))
}

fn write_output(path: &Path, content: &str) -> AnyEmptyResult {
	if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;

	Ok(())
}

fn run_convert(
	source: &Path,
	destination: &Path,
	data: &Path,
	log: &Path,
	config: Option<&Path>,
) -> AnyEmptyResult {
	let header = format!(
		"source: {}; destination: {}; data example: {}",
		source.display(),
		destination.display(),
		data.display()
	);
	let (document, conversion) = convert_source(source, config, Some(header))?;

	write_output(destination, &document.to_json()?)?;
	write_output(data, &conversion.sample.to_xml()?)?;
	write_output(log, &conversion.log.to_text())?;

	let warnings = conversion.log.warnings().count();
	if warnings > 0 {
		eprintln!(
			"{} {warnings} warning(s), see {}",
			colored!("warning:", yellow),
			log.display()
		);
	}

	println!(
		"all done, template={}; data={}; log={}",
		destination.display(),
		data.display(),
		log.display()
	);

	Ok(())
}

fn run_check(source: &Path, format: OutputFormat, config: Option<&Path>) -> AnyEmptyResult {
	let (_, conversion) = convert_source(source, config, None)?;
	let is_ok = conversion.skipped.is_empty() && conversion.unmatched.is_empty();

	match format {
		OutputFormat::Json => {
			let skipped: Vec<serde_json::Value> = conversion
				.skipped
				.iter()
				.map(|skipped| {
					serde_json::json!({
						"tag": skipped.tag,
						"reason": skipped.reason.to_string(),
					})
				})
				.collect();
			let unmatched: Vec<serde_json::Value> = conversion
				.unmatched
				.iter()
				.map(|marker| {
					serde_json::json!({
						"part": marker.part,
						"paragraph": marker.paragraph,
						"text": marker.text,
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": is_ok,
				"converted": conversion.stats.converted,
				"skipped": skipped,
				"unmatched": unmatched,
			});
			println!("{output}");
		}
		OutputFormat::Text => print_check_text(&conversion, is_ok),
	}

	if !is_ok {
		process::exit(1);
	}

	Ok(())
}

fn print_check_text(conversion: &Conversion, is_ok: bool) {
	let stats = conversion.stats;
	println!("{}", colored!("Summary", bold));
	println!("  {:<20} {}", "paragraphs:", stats.paragraphs);
	println!("  {:<20} {}", "converted tags:", stats.converted);
	println!("  {:<20} {}", "skipped tags:", stats.skipped);
	println!("  {:<20} {}", "unmatched markers:", conversion.unmatched.len());

	if !conversion.skipped.is_empty() {
		println!();
		println!("{}", colored!("Skipped tags", bold));
		for skipped in &conversion.skipped {
			println!("  {} ({})", skipped.tag, skipped.reason);
		}
	}

	if !conversion.unmatched.is_empty() {
		println!();
		println!("{}", colored!("Unmatched markers", bold));
		for marker in &conversion.unmatched {
			println!(
				"  {} paragraph {}: {}",
				marker.part, marker.paragraph, marker.text
			);
		}
	}

	println!();
	if is_ok {
		println!("{}", colored!("Check passed: every tag converts.", green));
	} else {
		eprintln!("{}", colored!("Check failed.", red));
	}
}
