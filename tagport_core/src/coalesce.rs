use crate::TagportError;
use crate::TagportResult;
use crate::document::Node;
use crate::document::NodeKind;
use crate::document::Paragraph;
use crate::markers::Markers;

/// How a tag that runs into a structural node is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
	/// Abort with [`TagportError::SpanCrossesBoundary`].
	Strict,
	/// Forget the pending tag and leave its text as it is.
	Lenient,
}

/// What coalescing did to a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoalesceOutcome {
	/// Number of runs folded into an earlier run.
	pub merged_runs: usize,
	/// Text of pending tags dropped at a structural node (lenient only).
	pub abandoned: Vec<String>,
}

/// Merge runs so that every tag whose markers were split across runs ends up
/// inside a single run.
///
/// The children are rebuilt into a new list. Runs between the run holding an
/// open marker and the run holding its close marker are folded into the
/// first one, and annotations between them are dropped. Nodes outside a tag
/// keep their identity and order. An open marker that is never closed stays
/// where it is.
///
/// Dropped annotations include bookmark starts and ends. A bookmark that
/// starts inside a tag and ends after it loses its start, leaving the
/// `bookmarkEnd` without a matching `bookmarkStart`.
pub fn coalesce_paragraph(
	paragraph: &mut Paragraph,
	markers: &Markers,
	policy: BoundaryPolicy,
) -> TagportResult<CoalesceOutcome> {
	let children = std::mem::take(&mut paragraph.children);
	let mut output: Vec<Node> = Vec::with_capacity(children.len());
	let mut outcome = CoalesceOutcome::default();
	// Index in `output` of the run holding an unclosed open marker.
	let mut pending: Option<usize> = None;

	for node in children {
		match node.kind() {
			NodeKind::Annotation => output.push(node),
			NodeKind::Structural => {
				if let Some(start) = pending.take() {
					let text = output[start].text().unwrap_or_default().to_string();
					match policy {
						BoundaryPolicy::Strict => {
							return Err(TagportError::SpanCrossesBoundary {
								kind: node.label().to_string(),
								text,
							});
						}
						BoundaryPolicy::Lenient => {
							tracing::warn!(kind = node.label(), %text, "tag crosses a structural node");
							outcome.abandoned.push(text);
						}
					}
				}
				output.push(node);
			}
			NodeKind::Run => {
				let Some(text) = node.text() else {
					output.push(node);
					continue;
				};

				let Some(start) = pending else {
					let opens = markers.pending_open(text).is_some();
					output.push(node);
					if opens {
						pending = Some(output.len() - 1);
					}
					continue;
				};

				if !markers.contains_close(text) {
					output.push(node);
					continue;
				}

				output.push(node);
				outcome.merged_runs += merge_span(&mut output, start)?;
				let merged = output[start].text().unwrap_or_default();
				pending = markers.pending_open(merged).map(|_| start);
			}
		}
	}

	paragraph.children = output;
	Ok(outcome)
}

/// Fold `output[start + 1..]` into the run at `start`. Returns how many runs
/// were folded.
fn merge_span(output: &mut Vec<Node>, start: usize) -> TagportResult<usize> {
	let mut merged = output[start].text().unwrap_or_default().to_string();
	let mut folded = 0;

	for node in output.drain(start + 1..) {
		if node.kind() != NodeKind::Run {
			continue;
		}

		let Some(text) = node.text() else {
			return Err(TagportError::MissingRunText { text: merged });
		};
		merged.push_str(text);
		folded += 1;
	}

	tracing::debug!(runs = folded + 1, text = %merged, "merged split tag");

	if let Some(run) = output[start].as_run_mut() {
		run.set_text(merged);
	}

	Ok(folded)
}
