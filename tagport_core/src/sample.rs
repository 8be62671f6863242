use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;

use crate::TagportError;
use crate::TagportResult;

/// Index of a node inside a [`SampleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
struct SampleNode {
	name: String,
	children: Vec<NodeId>,
}

/// The sample data document. It only grows: nodes are added the first time a
/// path component is referenced and are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleTree {
	nodes: Vec<SampleNode>,
}

impl SampleTree {
	pub fn new(root: impl Into<String>) -> Self {
		Self {
			nodes: vec![SampleNode {
				name: root.into(),
				children: Vec::new(),
			}],
		}
	}

	pub fn root(&self) -> NodeId {
		NodeId(0)
	}

	pub fn name(&self, id: NodeId) -> &str {
		&self.nodes[id.0].name
	}

	pub fn children(&self, id: NodeId) -> &[NodeId] {
		&self.nodes[id.0].children
	}

	/// A direct child of `parent` with the given name.
	pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
		self.children(parent)
			.iter()
			.copied()
			.find(|child| self.name(*child) == name)
	}

	/// The direct child named `name`, appended to `parent` if missing.
	pub fn child_or_insert(&mut self, parent: NodeId, name: &str) -> NodeId {
		if let Some(existing) = self.child(parent, name) {
			return existing;
		}

		let id = NodeId(self.nodes.len());
		self.nodes.push(SampleNode {
			name: name.to_string(),
			children: Vec::new(),
		});
		self.nodes[parent.0].children.push(id);
		id
	}

	/// Follow `path` from the root by child names.
	pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
		path.iter()
			.try_fold(self.root(), |node, name| self.child(node, name.as_ref()))
	}

	/// Total number of nodes, root included.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Render the tree as an indented XML document. Node names are written
	/// through [`xml_name`].
	pub fn to_xml(&self) -> TagportResult<String> {
		let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
		writer
			.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
			.map_err(|e| TagportError::XmlWrite(e.to_string()))?;
		self.write_node(&mut writer, self.root())?;

		let bytes = writer.into_inner().into_inner();
		String::from_utf8(bytes).map_err(|e| TagportError::XmlWrite(e.to_string()))
	}

	fn write_node(&self, writer: &mut Writer<Cursor<Vec<u8>>>, id: NodeId) -> TagportResult<()> {
		let name = xml_name(self.name(id));
		let name = name.as_str();
		let children = self.children(id);

		if children.is_empty() {
			writer
				.write_event(Event::Empty(BytesStart::new(name)))
				.map_err(|e| TagportError::XmlWrite(e.to_string()))?;
			return Ok(());
		}

		writer
			.write_event(Event::Start(BytesStart::new(name)))
			.map_err(|e| TagportError::XmlWrite(e.to_string()))?;
		for child in children {
			self.write_node(writer, *child)?;
		}
		writer
			.write_event(Event::End(BytesEnd::new(name)))
			.map_err(|e| TagportError::XmlWrite(e.to_string()))?;

		Ok(())
	}
}

/// `name` as a well-formed XML element name.
///
/// Node names keep spaces and may start with a digit, hyphen or period, none
/// of which an element name allows. Characters outside ASCII letters,
/// digits, `_`, `-` and `.` become `_`, and a name that does not start with a
/// letter or `_` gets a `_` prefix.
pub fn xml_name(name: &str) -> String {
	let mut element: String = name
		.chars()
		.map(|ch| {
			if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.') {
				ch
			} else {
				'_'
			}
		})
		.collect();

	if !element.starts_with(|ch: char| ch.is_ascii_alphabetic() || ch == '_') {
		element.insert(0, '_');
	}

	element
}
