use std::ops::Range;

use crate::TagportResult;
use crate::config::MarkerConfig;

/// The delimiters around a source tag, e.g. `<<` and `>>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
	open: String,
	close: String,
}

impl Default for Markers {
	fn default() -> Self {
		Self {
			open: crate::config::DEFAULT_OPEN_MARKER.to_string(),
			close: crate::config::DEFAULT_CLOSE_MARKER.to_string(),
		}
	}
}

/// One `open ... close` occurrence inside a text fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
	/// Byte offset of the open marker.
	pub start: usize,
	/// Byte offset just past the close marker.
	pub end: usize,
	/// Byte range of the tag body between the markers.
	pub body: Range<usize>,
}

impl Markers {
	pub fn new(config: &MarkerConfig) -> TagportResult<Self> {
		config.validate()?;

		Ok(Self {
			open: config.open.clone(),
			close: config.close.clone(),
		})
	}

	pub fn open(&self) -> &str {
		&self.open
	}

	pub fn close(&self) -> &str {
		&self.close
	}

	pub fn contains_open(&self, text: &str) -> bool {
		text.contains(self.open.as_str())
	}

	pub fn contains_close(&self, text: &str) -> bool {
		text.contains(self.close.as_str())
	}

	/// Find the next complete tag starting at or after `from`.
	pub fn next_tag(&self, text: &str, from: usize) -> Option<TagSpan> {
		let start = from + text.get(from..)?.find(self.open.as_str())?;
		let body_start = start + self.open.len();
		let body_end = body_start + text[body_start..].find(self.close.as_str())?;

		Some(TagSpan {
			start,
			end: body_end + self.close.len(),
			body: body_start..body_end,
		})
	}

	/// The offset of the first open marker that has no close marker after
	/// it, skipping over every complete tag before it.
	pub fn pending_open(&self, text: &str) -> Option<usize> {
		let mut from = 0;
		loop {
			let start = from + text[from..].find(self.open.as_str())?;
			let body_start = start + self.open.len();
			match text[body_start..].find(self.close.as_str()) {
				Some(close) => from = body_start + close + self.close.len(),
				None => return Some(start),
			}
		}
	}
}
