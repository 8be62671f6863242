//! A WordprocessingML-shaped document model: parts hold blocks, blocks are
//! paragraphs or tables, paragraphs hold an ordered list of [`Node`]s.
//!
//! Only what the converter needs is modelled. Formatting is an opaque bag of
//! properties that is copied whenever a run is cloned.

use std::collections::BTreeMap;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde::Serialize;

use crate::TagportError;
use crate::TagportResult;

/// A whole document: the main body and its headers, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
	pub parts: Vec<Part>,
}

impl Document {
	/// Parse a document from its JSON form.
	pub fn from_json(content: &str) -> TagportResult<Self> {
		serde_json::from_str(content).map_err(|e| TagportError::DocumentParse(e.to_string()))
	}

	/// Serialize the document to pretty printed JSON.
	pub fn to_json(&self) -> TagportResult<String> {
		serde_json::to_string_pretty(self).map_err(|e| TagportError::DocumentParse(e.to_string()))
	}
}

/// One independently stored part of a document, e.g. `body` or `header1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
	pub name: String,
	#[serde(default)]
	pub blocks: Vec<Block>,
}

impl Part {
	pub fn new(name: impl Into<String>, blocks: Vec<Block>) -> Self {
		Self {
			name: name.into(),
			blocks,
		}
	}

	/// Every paragraph of the part in document order, including paragraphs
	/// nested inside table cells.
	pub fn paragraphs(&self) -> Vec<&Paragraph> {
		let mut paragraphs = Vec::new();
		collect_paragraphs(&self.blocks, &mut paragraphs);
		paragraphs
	}

	/// Mutable variant of [`Part::paragraphs`].
	pub fn paragraphs_mut(&mut self) -> Vec<&mut Paragraph> {
		let mut paragraphs = Vec::new();
		collect_paragraphs_mut(&mut self.blocks, &mut paragraphs);
		paragraphs
	}
}

fn collect_paragraphs<'a>(blocks: &'a [Block], out: &mut Vec<&'a Paragraph>) {
	for block in blocks {
		match block {
			Block::Paragraph(paragraph) => out.push(paragraph),
			Block::Table(table) => {
				for cell in table.rows.iter().flat_map(|row| &row.cells) {
					collect_paragraphs(&cell.blocks, out);
				}
			}
		}
	}
}

fn collect_paragraphs_mut<'a>(blocks: &'a mut [Block], out: &mut Vec<&'a mut Paragraph>) {
	for block in blocks {
		match block {
			Block::Paragraph(paragraph) => out.push(paragraph),
			Block::Table(table) => {
				for cell in table.rows.iter_mut().flat_map(|row| &mut row.cells) {
					collect_paragraphs_mut(&mut cell.blocks, out);
				}
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
	Paragraph(Paragraph),
	Table(Table),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
	#[serde(default)]
	pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
	#[serde(default)]
	pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
	#[serde(default)]
	pub blocks: Vec<Block>,
}

/// A paragraph and its ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Deref, DerefMut)]
pub struct Paragraph {
	#[deref]
	#[deref_mut]
	#[serde(default)]
	pub children: Vec<Node>,
}

impl Paragraph {
	pub fn new(children: Vec<Node>) -> Self {
		Self { children }
	}

	/// The texts of all text-bearing runs, in order.
	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.children.iter().filter_map(Node::text)
	}

	/// The visible text of the paragraph, fragments concatenated.
	pub fn plain_text(&self) -> String {
		self.texts().collect()
	}
}

/// How the converter treats a paragraph child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	/// A run. It is text-bearing when [`Run::text`] returns `Some`.
	Run,
	/// Proofing marks and bookmarks. Tags may span across them.
	Annotation,
	/// Anything else: paragraph properties, hyperlinks, smart tags, ...
	Structural,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
	Run(Run),
	ProofError,
	BookmarkStart {
		id: String,
		#[serde(default)]
		name: String,
	},
	BookmarkEnd {
		id: String,
	},
	Structural(Structural),
}

impl Node {
	pub fn kind(&self) -> NodeKind {
		match self {
			Node::Run(_) => NodeKind::Run,
			Node::ProofError | Node::BookmarkStart { .. } | Node::BookmarkEnd { .. } => {
				NodeKind::Annotation
			}
			Node::Structural(_) => NodeKind::Structural,
		}
	}

	pub fn as_run(&self) -> Option<&Run> {
		match self {
			Node::Run(run) => Some(run),
			_ => None,
		}
	}

	pub fn as_run_mut(&mut self) -> Option<&mut Run> {
		match self {
			Node::Run(run) => Some(run),
			_ => None,
		}
	}

	/// The text of a text-bearing run.
	pub fn text(&self) -> Option<&str> {
		self.as_run().and_then(Run::text)
	}

	/// A short label used in diagnostics.
	pub fn label(&self) -> &str {
		match self {
			Node::Run(_) => "run",
			Node::ProofError => "proofError",
			Node::BookmarkStart { .. } => "bookmarkStart",
			Node::BookmarkEnd { .. } => "bookmarkEnd",
			Node::Structural(structural) => &structural.kind,
		}
	}
}

impl From<Run> for Node {
	fn from(run: Run) -> Self {
		Node::Run(run)
	}
}

/// A non-run node the converter must not look into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structural {
	pub kind: String,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub attributes: BTreeMap<String, String>,
}

impl Structural {
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			attributes: BTreeMap::new(),
		}
	}
}

/// A run of uniformly formatted content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub properties: BTreeMap<String, String>,
	#[serde(default)]
	pub content: Vec<RunContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RunContent {
	Text(String),
	FieldChar(FieldCharKind),
	FieldCode(String),
	Tab,
	Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldCharKind {
	Begin,
	Separate,
	End,
}

impl Run {
	/// A plain run holding a single text item.
	pub fn text_run(text: impl Into<String>) -> Self {
		Self {
			properties: BTreeMap::new(),
			content: vec![RunContent::Text(text.into())],
		}
	}

	/// A run holding a single field character.
	pub fn field_char(kind: FieldCharKind) -> Self {
		Self {
			properties: BTreeMap::new(),
			content: vec![RunContent::FieldChar(kind)],
		}
	}

	/// A run holding a field instruction.
	pub fn field_code(code: impl Into<String>) -> Self {
		Self {
			properties: BTreeMap::new(),
			content: vec![RunContent::FieldCode(code.into())],
		}
	}

	/// Add a formatting property.
	#[must_use]
	pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.properties.insert(key.into(), value.into());
		self
	}

	/// The first text item of the run.
	pub fn text(&self) -> Option<&str> {
		self.content.iter().find_map(|content| {
			match content {
				RunContent::Text(text) => Some(text.as_str()),
				_ => None,
			}
		})
	}

	/// Replace the first text item. Returns false when the run has none.
	pub fn set_text(&mut self, text: impl Into<String>) -> bool {
		let Some(slot) = self.content.iter_mut().find_map(|content| {
			match content {
				RunContent::Text(text) => Some(text),
				_ => None,
			}
		}) else {
			return false;
		};

		*slot = text.into();
		true
	}

	/// Clone this run, formatting included, with its first text item replaced.
	#[must_use]
	pub fn with_text(&self, text: impl Into<String>) -> Self {
		let mut run = self.clone();
		run.set_text(text);
		run
	}
}
