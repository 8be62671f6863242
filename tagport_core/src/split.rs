use crate::TagportResult;
use crate::document::FieldCharKind;
use crate::document::Node;
use crate::document::Paragraph;
use crate::document::Run;
use crate::log::ConversionLog;
use crate::markers::Markers;
use crate::scope::Closer;
use crate::scope::ScopeStack;
use crate::translator::FieldTranslation;
use crate::translator::ScopeAction;
use crate::translator::SkipReason;
use crate::translator::TranslationResult;
use crate::translator::translate;

/// A tag that was left in the document as literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTag {
	pub tag: String,
	pub reason: SkipReason,
}

/// What splitting did to a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
	pub converted: usize,
	pub skipped: Vec<SkippedTag>,
}

/// The field instruction wrapping translated markup.
pub fn field_instruction(markup: &str) -> String {
	format!(" AUTOTEXTLIST   \\t \"{markup}\"  \\* MERGEFORMAT ")
}

/// The five runs that replace one tag: begin, instruction, separator,
/// display text, end.
pub fn field_construct(translation: &FieldTranslation) -> [Node; 5] {
	[
		Run::field_char(FieldCharKind::Begin).into(),
		Run::field_code(field_instruction(&translation.output_markup)).into(),
		Run::field_char(FieldCharKind::Separate).into(),
		Run::text_run(translation.display_text.clone()).into(),
		Run::field_char(FieldCharKind::End).into(),
	]
}

/// Rewrite every run that holds complete tags into literal runs interleaved
/// with field constructs. Expects a coalesced paragraph.
///
/// The children are rebuilt into a new list and swapped in at the end. Runs
/// without tags, and every other node, are carried over untouched.
pub fn split_paragraph(
	paragraph: &mut Paragraph,
	markers: &Markers,
	scope: &mut ScopeStack,
	log: &mut ConversionLog,
) -> TagportResult<SplitOutcome> {
	let children = std::mem::take(&mut paragraph.children);
	let mut output: Vec<Node> = Vec::with_capacity(children.len());
	let mut outcome = SplitOutcome::default();

	for node in children {
		let Node::Run(run) = node else {
			output.push(node);
			continue;
		};

		let has_tag = run
			.text()
			.is_some_and(|text| markers.contains_open(text) && markers.contains_close(text));
		if !has_tag {
			output.push(Node::Run(run));
			continue;
		}

		split_run(run, markers, scope, log, &mut output, &mut outcome)?;
	}

	paragraph.children = output;
	Ok(outcome)
}

fn split_run(
	mut run: Run,
	markers: &Markers,
	scope: &mut ScopeStack,
	log: &mut ConversionLog,
	output: &mut Vec<Node>,
	outcome: &mut SplitOutcome,
) -> TagportResult<()> {
	let text = run.text().unwrap_or_default().to_string();
	let mut offset = 0;

	while let Some(span) = markers.next_tag(&text, offset) {
		if span.start > offset {
			output.push(run.with_text(&text[offset..span.start]).into());
		}

		let tag = text[span.body.clone()].trim();
		match translate(tag, scope)? {
			TranslationResult::Skipped(reason) => {
				log.warn(format!("Not converting field {tag} ({reason})"));
				output.push(run.with_text(&text[span.start..span.end]).into());
				outcome.skipped.push(SkippedTag {
					tag: tag.to_string(),
					reason,
				});
			}
			TranslationResult::Field(field) => {
				log.info(format!(
					"Converting field {tag} to tag {}",
					field.output_markup
				));
				if let Some(notice) = &field.notice {
					log.warn(notice.clone());
				}

				apply_scope(&field, tag, scope)?;
				output.extend(field_construct(&field));
				outcome.converted += 1;
			}
		}

		offset = span.end;
	}

	if offset < text.len() {
		run.set_text(&text[offset..]);
		output.push(run.into());
	}

	Ok(())
}

/// Grow the sample data for `field` and enter or leave a scope.
fn apply_scope(field: &FieldTranslation, tag: &str, scope: &mut ScopeStack) -> TagportResult<()> {
	match field.scope_action {
		ScopeAction::None => {
			if let Some(path) = &field.data_path {
				scope.resolve_node(path);
			}
		}
		ScopeAction::Push(Closer::Conditional) => {
			if let Some(path) = &field.data_path {
				scope.resolve_node(path);
			}
			scope.push_conditional();
		}
		ScopeAction::Push(Closer::Iteration) => {
			let anchor = field.data_path.as_ref().map(|path| scope.resolve_node(path));
			let segment = field.data_path.as_ref().map(|path| path.join("/"));
			scope.push_iteration(anchor, segment, field.loop_variable.clone());
		}
		ScopeAction::Pop => {
			scope.pop(tag)?;
		}
	}

	Ok(())
}
