//! Classification and translation of a single source tag.
//!
//! [`classify`] decides which family a tag belongs to (first match wins, in
//! the order of the [`TagKind`] variants). [`translate`] turns the
//! classified tag into `wr:` markup plus the data path it refers to.

use std::fmt::Display;

use crate::TagportError;
use crate::TagportResult;
use crate::scope::Closer;
use crate::scope::ScopeStack;
use crate::scope::data_path;

const CONDITIONAL_PREFIX: &str = "cs_";
const ELSE_IF_PREFIX: &str = "else_";
const END_PREFIX: &str = "es_";
const ITERATION_PREFIXES: [&str; 2] = ["rs_", "rr_"];
const HTML_PREFIX: &str = "html:";
const IMPORT_PREFIX: &str = "ref:";
const LOOKUP_PREFIX: &str = "refLookup:";
const FORMAT_FUNCTIONS: [&str; 2] = ["{dateFormat(", "{numFormat("];

const UNSUPPORTED_PREFIXES: [&str; 4] = ["cc_", "barcode:", "##", "/*"];
const UNSUPPORTED_TAGS: [&str; 2] = ["noTableRowAlternate", "list:continue"];
const NOT_YET_IMPLEMENTED_PREFIXES: [&str; 6] = ["op:", "link:", "link_", "cr_", "rr_", "er_"];

/// Characters that turn a format function argument into an expression.
const OPERATOR_CHARS: [char; 11] = ['+', '-', '*', '/', '%', '=', '!', '&', '|', '<', '>'];

/// The family a raw tag belongs to. Borrowed payloads are the tag text after
/// the family prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind<'a> {
	/// Empty, or uses `[` or `(` outside of a format function.
	Unexpected,
	/// A family the destination engine has no equivalent for.
	Unsupported,
	/// A family that could be converted but is not yet.
	NotYetImplemented,
	/// `cs_<arg>`
	Conditional(&'a str),
	/// `else`
	Else,
	/// `else_<cond>`
	ElseIf,
	/// `es_`
	End,
	/// `rs_<arg>` or `rr_<arg>`
	Iteration(&'a str),
	/// `html:<field>`
	Html(&'a str),
	/// `ref:<field>`
	Import(&'a str),
	/// `refLookup:<field>`
	Lookup(&'a str),
	/// `$<name>` or `$<name>=<value>`
	Variable(&'a str),
	/// `{<expression>}`, the braces included.
	Formula(&'a str),
	/// A bare field name.
	Field(&'a str),
}

/// Why a tag was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	UnexpectedSyntax,
	Unsupported,
	NotYetImplemented,
	ElseIf,
	MalformedStep,
	MissingValue,
}

impl Display for SkipReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let reason = match self {
			SkipReason::UnexpectedSyntax => "unexpected syntax",
			SkipReason::Unsupported => "unsupported tag",
			SkipReason::NotYetImplemented => "not implemented yet",
			SkipReason::ElseIf => "else-if is not supported",
			SkipReason::MalformedStep => "malformed step clause",
			SkipReason::MissingValue => "missing value",
		};
		write!(f, "{reason}")
	}
}

/// What the tag does to the scope stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeAction {
	None,
	Push(Closer),
	Pop,
}

/// A successfully translated tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTranslation {
	/// Sanitized segments of the sample data node the tag reads, if any.
	pub data_path: Option<Vec<String>>,
	/// The visible placeholder text, `[<tag>]`.
	pub display_text: String,
	/// The `wr:` markup carried in the field instruction.
	pub output_markup: String,
	/// The variable an iteration binds.
	pub loop_variable: Option<String>,
	pub scope_action: ScopeAction,
	/// A line that must be logged for manual review.
	pub notice: Option<String>,
}

impl FieldTranslation {
	fn new(tag: &str, output_markup: String) -> Self {
		Self {
			data_path: None,
			display_text: format!("[{tag}]"),
			output_markup,
			loop_variable: None,
			scope_action: ScopeAction::None,
			notice: None,
		}
	}

	fn reading(mut self, field: &str) -> Self {
		let path = data_path(field);
		self.data_path = (!path.is_empty()).then_some(path);
		self
	}

	fn with_scope(mut self, scope_action: ScopeAction) -> Self {
		self.scope_action = scope_action;
		self
	}

	fn binding(mut self, loop_variable: impl Into<String>) -> Self {
		self.loop_variable = Some(loop_variable.into());
		self
	}
}

/// The outcome of translating one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationResult {
	Skipped(SkipReason),
	Field(FieldTranslation),
}

/// Decide which family `tag` belongs to.
pub fn classify(tag: &str) -> TagKind<'_> {
	let is_format_call = FORMAT_FUNCTIONS.iter().any(|name| tag.starts_with(name));
	if tag.is_empty() || tag.contains('[') || (tag.contains('(') && !is_format_call) {
		return TagKind::Unexpected;
	}

	if UNSUPPORTED_PREFIXES.iter().any(|prefix| tag.starts_with(prefix))
		|| UNSUPPORTED_TAGS.contains(&tag)
	{
		return TagKind::Unsupported;
	}

	if NOT_YET_IMPLEMENTED_PREFIXES
		.iter()
		.any(|prefix| tag.starts_with(prefix))
	{
		return TagKind::NotYetImplemented;
	}

	if let Some(arg) = tag.strip_prefix(CONDITIONAL_PREFIX) {
		return TagKind::Conditional(arg);
	}

	if tag == "else" {
		return TagKind::Else;
	}

	if tag.starts_with(ELSE_IF_PREFIX) {
		return TagKind::ElseIf;
	}

	if tag.starts_with(END_PREFIX) {
		return TagKind::End;
	}

	if let Some(arg) = ITERATION_PREFIXES
		.iter()
		.find_map(|prefix| tag.strip_prefix(prefix))
	{
		return TagKind::Iteration(arg);
	}

	if let Some(field) = tag.strip_prefix(HTML_PREFIX) {
		return TagKind::Html(field);
	}

	if let Some(field) = tag.strip_prefix(IMPORT_PREFIX) {
		return TagKind::Import(field);
	}

	if let Some(field) = tag.strip_prefix(LOOKUP_PREFIX) {
		return TagKind::Lookup(field);
	}

	if let Some(rest) = tag.strip_prefix('$') {
		return TagKind::Variable(rest);
	}

	if tag.starts_with('{') && tag.ends_with('}') {
		return TagKind::Formula(tag);
	}

	TagKind::Field(tag)
}

/// Translate a trimmed tag body in the context of `scope`.
///
/// Only an end tag without an open scope fails; every other tag either
/// translates or is skipped with a reason.
pub fn translate(tag: &str, scope: &ScopeStack) -> TagportResult<TranslationResult> {
	let field = match classify(tag) {
		TagKind::Unexpected => return Ok(TranslationResult::Skipped(SkipReason::UnexpectedSyntax)),
		TagKind::Unsupported => return Ok(TranslationResult::Skipped(SkipReason::Unsupported)),
		TagKind::NotYetImplemented => {
			return Ok(TranslationResult::Skipped(SkipReason::NotYetImplemented));
		}
		TagKind::ElseIf => return Ok(TranslationResult::Skipped(SkipReason::ElseIf)),
		TagKind::Conditional(arg) => translate_conditional(tag, arg, scope),
		TagKind::Else => FieldTranslation::new(tag, "<wr:else/>".to_string()),
		TagKind::End => {
			let closer = scope.pending_closer().ok_or_else(|| {
				TagportError::ScopeUnderflow {
					tag: tag.to_string(),
				}
			})?;
			FieldTranslation::new(tag, closer.markup().to_string()).with_scope(ScopeAction::Pop)
		}
		TagKind::Iteration(arg) => {
			match translate_iteration(tag, arg, scope) {
				Some(field) => field,
				None => return Ok(TranslationResult::Skipped(SkipReason::MalformedStep)),
			}
		}
		TagKind::Html(field) => {
			let query = scope.resolve_query(field);
			FieldTranslation::new(tag, format!("<wr:out select='{query}' type='TEMPLATE'/>"))
				.reading(field)
		}
		TagKind::Import(field) => {
			let query = scope.resolve_query(field);
			FieldTranslation::new(tag, format!("<wr:import select='{query}' type='TEMPLATE'/>"))
				.reading(field)
		}
		TagKind::Lookup(field) => {
			let query = scope.resolve_query(field);
			FieldTranslation::new(tag, format!("<wr:out select='{query}' type='TEMPLATE'/>"))
				.reading(field)
		}
		TagKind::Variable(rest) => {
			match translate_variable(tag, rest, scope) {
				Some(field) => field,
				None => return Ok(TranslationResult::Skipped(SkipReason::MissingValue)),
			}
		}
		TagKind::Formula(formula) => translate_formula(tag, formula, scope),
		TagKind::Field(field) => {
			let query = scope.resolve_query(field);
			FieldTranslation::new(tag, format!("<wr:out select='{query}'/>")).reading(field)
		}
	};

	Ok(TranslationResult::Field(field))
}

fn translate_conditional(tag: &str, arg: &str, scope: &ScopeStack) -> FieldTranslation {
	let push = ScopeAction::Push(Closer::Conditional);

	if let Some(var) = arg.strip_prefix('$') {
		return FieldTranslation::new(tag, format!("<wr:if select='${{{var}}}'>")).with_scope(push);
	}

	if let Some(expression) = braced(arg) {
		return FieldTranslation::new(tag, format!("<wr:if select='={expression}'>"))
			.with_scope(push);
	}

	let query = scope.resolve_query(arg);
	FieldTranslation::new(tag, format!("<wr:if select='{query}'>"))
		.reading(arg)
		.with_scope(push)
}

/// `None` when a step clause is present but malformed.
fn translate_iteration(tag: &str, arg: &str, scope: &ScopeStack) -> Option<FieldTranslation> {
	let push = ScopeAction::Push(Closer::Iteration);

	if let Some(var) = arg.strip_prefix('$') {
		let field = FieldTranslation {
			notice: Some(format!(
				"Check the tag {tag} - it has iterative data in a variable"
			)),
			..FieldTranslation::new(tag, format!("<wr:forEach select='${{{var}}}' var='{var}'>"))
		};
		return Some(field.with_scope(push).binding(var));
	}

	let Some((name, clause)) = arg.split_once(':') else {
		let query = scope.resolve_query(arg);
		let field =
			FieldTranslation::new(tag, format!("<wr:forEach select='{query}' var='{arg}'>"));
		return Some(field.reading(arg).with_scope(push).binding(arg));
	};

	let step = clause.strip_prefix("step")?.trim().parse::<i64>().ok()?;
	let query = scope.resolve_query(name);
	let field = FieldTranslation::new(
		tag,
		format!("<wr:forEach select='{query}' step='{step}' var='{name}'>"),
	);

	Some(field.reading(name).with_scope(push).binding(name))
}

/// `None` for a missing name or an assignment without a value.
fn translate_variable(tag: &str, rest: &str, scope: &ScopeStack) -> Option<FieldTranslation> {
	if rest.trim().is_empty() {
		return None;
	}

	let Some((var, value)) = rest.split_once('=') else {
		return Some(FieldTranslation::new(
			tag,
			format!("<wr:out select='${{{rest}}}'/>"),
		));
	};

	let var = var.trim();
	let value = value.trim();

	if var.is_empty() || value.is_empty() {
		return None;
	}

	if value == "null" {
		return Some(FieldTranslation::new(tag, format!("<wr:set var='{var}'/>")));
	}

	if is_set_literal(value) {
		return Some(FieldTranslation::new(
			tag,
			format!("<wr:set select='{value}' var='{var}'/>"),
		));
	}

	let query = scope.resolve_query(value);
	Some(FieldTranslation::new(tag, format!("<wr:set select='{query}' var='{var}'/>")).reading(value))
}

fn translate_formula(tag: &str, formula: &str, scope: &ScopeStack) -> FieldTranslation {
	if let Some(call) = FormatCall::parse(formula) {
		let format = call
			.format
			.map(|format| format!(" format='{format}'"))
			.unwrap_or_default();

		if is_expression_argument(call.argument) {
			return FieldTranslation::new(
				tag,
				format!("<wr:out select='={}'{format} type='DATE'/>", call.argument),
			);
		}

		let query = scope.resolve_query(call.argument);
		return FieldTranslation::new(tag, format!("<wr:out select='{query}'{format} type='DATE'/>"))
			.reading(call.argument);
	}

	let expression = braced(formula).unwrap_or(formula);
	FieldTranslation::new(tag, format!("<wr:out select='={expression}'/>"))
}

/// A `{dateFormat(arg, format)}` or `{numFormat(arg, format)}` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatCall<'a> {
	argument: &'a str,
	format: Option<&'a str>,
}

impl<'a> FormatCall<'a> {
	fn parse(formula: &'a str) -> Option<Self> {
		if !FORMAT_FUNCTIONS.iter().any(|name| formula.starts_with(name)) {
			return None;
		}

		let open = formula.find('(')?;
		let inner = &formula[open + 1..];
		let inner = inner[..inner.rfind(')')?].trim();
		let (argument, format) = match inner.split_once(',') {
			Some((argument, format)) => (argument.trim(), Some(unquote(format.trim()))),
			None => (inner, None),
		};

		(!argument.is_empty()).then_some(Self { argument, format })
	}
}

/// Strip one pair of matching single or double quotes.
fn unquote(text: &str) -> &str {
	['\'', '"']
		.iter()
		.find_map(|quote| text.strip_prefix(*quote)?.strip_suffix(*quote))
		.unwrap_or(text)
}

fn braced(text: &str) -> Option<&str> {
	text.strip_prefix('{')?.strip_suffix('}')
}

fn starts_with_literal(value: &str) -> bool {
	value.starts_with('\'') || value.starts_with('"') || starts_with_number(value)
}

/// `42`, `-1`, `+3`, `.5` or `-0.25`: an optional sign, an optional leading
/// period, then a digit.
fn starts_with_number(value: &str) -> bool {
	let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
	let digits = unsigned.strip_prefix('.').unwrap_or(unsigned);
	digits.starts_with(|ch: char| ch.is_ascii_digit())
}

fn is_set_literal(value: &str) -> bool {
	value == "true" || value == "false" || starts_with_literal(value)
}

fn is_expression_argument(argument: &str) -> bool {
	starts_with_literal(argument) || argument.contains(OPERATOR_CHARS)
}
