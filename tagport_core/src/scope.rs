use crate::TagportError;
use crate::TagportResult;
use crate::sample::NodeId;
use crate::sample::SampleTree;

/// The markup a scope emits when its end tag is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closer {
	/// Closes a conditional.
	Conditional,
	/// Closes an iteration.
	Iteration,
}

impl Closer {
	pub fn markup(self) -> &'static str {
		match self {
			Closer::Conditional => "</wr:if>",
			Closer::Iteration => "</wr:forEach>",
		}
	}
}

/// One level of nesting context.
///
/// The closer lives on the frame itself so the closer stack and the data
/// scope stack can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFrame {
	/// New sample nodes are created below this node.
	pub anchor: NodeId,
	/// The path this frame adds to absolute queries, e.g. `Customer/Orders`.
	pub segment: Option<String>,
	/// When set, queries resolve to `${var.field}`.
	pub loop_variable: Option<String>,
	/// `None` only for the root frame.
	pub closer: Option<Closer>,
}

/// Tracks nesting context and owns the sample data tree that the tags imply.
#[derive(Debug, Clone)]
pub struct ScopeStack {
	frames: Vec<ScopeFrame>,
	tree: SampleTree,
}

impl ScopeStack {
	/// A stack holding only the root frame, anchored on the root node named
	/// `root`.
	pub fn new(root: impl Into<String>) -> Self {
		let root = root.into();
		let tree = SampleTree::new(root.clone());
		let frames = vec![ScopeFrame {
			anchor: tree.root(),
			segment: Some(root),
			loop_variable: None,
			closer: None,
		}];

		Self { frames, tree }
	}

	/// Number of frames, root included. Never less than one.
	pub fn depth(&self) -> usize {
		self.frames.len()
	}

	pub fn top(&self) -> &ScopeFrame {
		// The root frame is never popped.
		&self.frames[self.frames.len() - 1]
	}

	pub fn tree(&self) -> &SampleTree {
		&self.tree
	}

	pub fn into_tree(self) -> SampleTree {
		self.tree
	}

	/// The query selecting `field` from the current scope.
	///
	/// Inside an iteration this is `${var.field}`. Otherwise it is the
	/// absolute path built from every frame's segment followed by the dotted
	/// components of `field`, e.g. `/data/Customer/Name`.
	pub fn resolve_query(&self, field: &str) -> String {
		if let Some(var) = &self.top().loop_variable {
			return format!("${{{var}.{field}}}");
		}

		let mut query = String::new();
		for segment in self.frames.iter().filter_map(|frame| frame.segment.as_deref()) {
			query.push('/');
			query.push_str(segment);
		}
		for component in field.split('.').filter(|component| !component.is_empty()) {
			query.push('/');
			query.push_str(component);
		}

		query
	}

	/// The sample node for `path`, created under the current anchor one
	/// level at a time where it does not exist yet.
	pub fn resolve_node<S: AsRef<str>>(&mut self, path: &[S]) -> NodeId {
		let mut node = self.top().anchor;
		for segment in path {
			for name in sanitize_segment(segment.as_ref())
				.split('.')
				.filter(|name| !name.is_empty())
			{
				node = self.tree.child_or_insert(node, name);
			}
		}

		node
	}

	/// Enter a new scope.
	pub fn push(&mut self, frame: ScopeFrame) {
		self.frames.push(frame);
	}

	/// Enter a conditional. It shares the enclosing anchor and loop variable,
	/// so queries inside resolve exactly as they do outside.
	pub fn push_conditional(&mut self) {
		let top = self.top();
		let frame = ScopeFrame {
			anchor: top.anchor,
			segment: None,
			loop_variable: top.loop_variable.clone(),
			closer: Some(Closer::Conditional),
		};
		self.push(frame);
	}

	/// Enter an iteration anchored on `anchor`, or on the current anchor when
	/// the iterated data has no path of its own.
	pub fn push_iteration(
		&mut self,
		anchor: Option<NodeId>,
		segment: Option<String>,
		loop_variable: Option<String>,
	) {
		let frame = ScopeFrame {
			anchor: anchor.unwrap_or(self.top().anchor),
			segment,
			loop_variable,
			closer: Some(Closer::Iteration),
		};
		self.push(frame);
	}

	/// The closer of the innermost open scope.
	pub fn pending_closer(&self) -> Option<Closer> {
		self.top().closer
	}

	/// Leave the innermost scope. `tag` names the end tag for the error.
	pub fn pop(&mut self, tag: &str) -> TagportResult<ScopeFrame> {
		let frame = (self.frames.len() > 1)
			.then(|| self.frames.pop())
			.flatten();

		frame.ok_or_else(|| {
			TagportError::ScopeUnderflow {
				tag: tag.to_string(),
			}
		})
	}

	/// Fail unless every scope has been closed.
	pub fn ensure_balanced(&self) -> TagportResult<()> {
		if self.frames.len() == 1 {
			return Ok(());
		}

		let closers = self.frames[1..]
			.iter()
			.filter_map(|frame| frame.closer)
			.map(|closer| closer.markup())
			.collect::<Vec<_>>()
			.join(", ");

		Err(TagportError::UnclosedScope {
			depth: self.frames.len() - 1,
			closers,
		})
	}
}

/// Replace every character other than ASCII letters, digits, space, hyphen
/// and period with an underscore.
pub fn sanitize_segment(segment: &str) -> String {
	segment
		.chars()
		.map(|ch| {
			if ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '-' | '.') {
				ch
			} else {
				'_'
			}
		})
		.collect()
}

/// Sanitize and split a dotted field name into data path segments.
pub fn data_path(field: &str) -> Vec<String> {
	sanitize_segment(field)
		.split('.')
		.filter(|segment| !segment.is_empty())
		.map(ToString::to_string)
		.collect()
}
