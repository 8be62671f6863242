use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TagportError {
	#[error(transparent)]
	#[diagnostic(code(tagport::io_error))]
	Io(#[from] std::io::Error),

	#[error("end tag `{tag}` has no open conditional or iteration to close")]
	#[diagnostic(
		code(tagport::scope_underflow),
		help("every `es_` tag needs a preceding `cs_` or `rs_` tag; check the template for a stray end tag")
	)]
	ScopeUnderflow { tag: String },

	#[error("{depth} scope(s) left open at the end of the document: {closers}")]
	#[diagnostic(
		code(tagport::unclosed_scope),
		help("add an `es_` tag for each open `cs_` / `rs_` tag")
	)]
	UnclosedScope { depth: usize, closers: String },

	#[error("a tag starting in `{text}` spans across a `{kind}` node")]
	#[diagnostic(
		code(tagport::span_crosses_boundary),
		help(
			"retype the tag so it does not straddle a hyperlink or other structure, or set \
			 `strict_boundaries = false` in tagport.toml to leave it unconverted"
		)
	)]
	SpanCrossesBoundary { kind: String, text: String },

	#[error("a run inside the tag starting in `{text}` carries no text")]
	#[diagnostic(code(tagport::missing_run_text))]
	MissingRunText { text: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tagport::config_parse),
		help("check that tagport.toml is valid TOML with optional [markers] and [data] sections")
	)]
	ConfigParse(String),

	#[error("invalid tag markers: open `{open}`, close `{close}`")]
	#[diagnostic(
		code(tagport::invalid_markers),
		help("markers must be non-empty and different from each other")
	)]
	InvalidMarkers { open: String, close: String },

	#[error("failed to read document: {0}")]
	#[diagnostic(code(tagport::document_parse))]
	DocumentParse(String),

	#[error("failed to write sample data: {0}")]
	#[diagnostic(code(tagport::xml_write))]
	XmlWrite(String),
}

pub type TagportResult<T> = Result<T, TagportError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
