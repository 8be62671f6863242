use crate::TagportResult;
use crate::coalesce::BoundaryPolicy;
use crate::coalesce::coalesce_paragraph;
use crate::config::TagportConfig;
use crate::document::Document;
use crate::document::Paragraph;
use crate::document::Part;
use crate::log::ConversionLog;
use crate::markers::Markers;
use crate::sample::SampleTree;
use crate::scope::ScopeStack;
use crate::split::SkippedTag;
use crate::split::split_paragraph;

/// An open marker left without a close marker after a full pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedMarker {
	/// Name of the part, e.g. `body`.
	pub part: String,
	/// 0-indexed paragraph number within the part, tables included.
	pub paragraph: usize,
	/// Text of the run holding the marker.
	pub text: String,
}

/// Counters collected across a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
	/// Paragraphs that held an open marker and were processed.
	pub paragraphs: usize,
	/// Tags replaced by a field.
	pub converted: usize,
	/// Tags left as literal text.
	pub skipped: usize,
	/// Runs folded into an earlier run while coalescing.
	pub merged_runs: usize,
}

/// Everything a finished conversion produced besides the mutated document.
#[derive(Debug, Clone)]
pub struct Conversion {
	pub sample: SampleTree,
	pub log: ConversionLog,
	pub unmatched: Vec<UnmatchedMarker>,
	pub skipped: Vec<SkippedTag>,
	pub stats: ConversionStats,
}

/// Converts the tags of one document, paragraph by paragraph, while building
/// the sample data tree.
#[derive(Debug, Clone)]
pub struct Converter {
	markers: Markers,
	policy: BoundaryPolicy,
	scope: ScopeStack,
	log: ConversionLog,
	unmatched: Vec<UnmatchedMarker>,
	skipped: Vec<SkippedTag>,
	stats: ConversionStats,
}

impl Default for Converter {
	fn default() -> Self {
		Self {
			markers: Markers::default(),
			policy: BoundaryPolicy::Strict,
			scope: ScopeStack::new(crate::config::DEFAULT_DATA_ROOT),
			log: ConversionLog::default(),
			unmatched: Vec::new(),
			skipped: Vec::new(),
			stats: ConversionStats::default(),
		}
	}
}

impl Converter {
	pub fn new(config: &TagportConfig) -> TagportResult<Self> {
		config.validate()?;
		let policy = if config.strict_boundaries {
			BoundaryPolicy::Strict
		} else {
			BoundaryPolicy::Lenient
		};

		Ok(Self {
			markers: Markers::new(&config.markers)?,
			policy,
			scope: ScopeStack::new(config.data.root.clone()),
			..Self::default()
		})
	}

	pub fn scope(&self) -> &ScopeStack {
		&self.scope
	}

	pub fn log(&self) -> &ConversionLog {
		&self.log
	}

	pub fn log_mut(&mut self) -> &mut ConversionLog {
		&mut self.log
	}

	pub fn stats(&self) -> ConversionStats {
		self.stats
	}

	/// Coalesce and split one paragraph in place.
	pub fn process_paragraph(&mut self, paragraph: &mut Paragraph) -> TagportResult<()> {
		let coalesced = coalesce_paragraph(paragraph, &self.markers, self.policy)?;
		for text in coalesced.abandoned {
			self.log.warn(format!(
				"Not converting field starting at {text} (crosses a structural node)"
			));
		}

		let split = split_paragraph(paragraph, &self.markers, &mut self.scope, &mut self.log)?;

		self.stats.paragraphs += 1;
		self.stats.merged_runs += coalesced.merged_runs;
		self.stats.converted += split.converted;
		self.stats.skipped += split.skipped.len();
		self.skipped.extend(split.skipped);

		Ok(())
	}

	/// Process every paragraph of `part` that holds an open marker, then
	/// record the markers still left open.
	pub fn process_part(&mut self, part: &mut Part) -> TagportResult<()> {
		for paragraph in part.paragraphs_mut() {
			if paragraph.texts().any(|text| self.markers.contains_open(text)) {
				self.process_paragraph(paragraph)?;
			}
		}

		for (index, paragraph) in part.paragraphs().into_iter().enumerate() {
			for text in paragraph.texts() {
				if self.markers.pending_open(text).is_none() {
					continue;
				}

				self.log.warn(format!(
					"Unmatched {} at location {text}",
					self.markers.open()
				));
				self.unmatched.push(UnmatchedMarker {
					part: part.name.clone(),
					paragraph: index,
					text: text.to_string(),
				});
			}
		}

		Ok(())
	}

	/// Process every part in stored order.
	pub fn process_document(&mut self, document: &mut Document) -> TagportResult<()> {
		for part in &mut document.parts {
			self.process_part(part)?;
		}

		Ok(())
	}

	/// Open markers found unmatched so far.
	pub fn report(&self) -> &[UnmatchedMarker] {
		&self.unmatched
	}

	/// Finish the conversion. Fails if a conditional or iteration was never
	/// closed.
	pub fn finalize(self) -> TagportResult<Conversion> {
		self.scope.ensure_balanced()?;

		Ok(Conversion {
			sample: self.scope.into_tree(),
			log: self.log,
			unmatched: self.unmatched,
			skipped: self.skipped,
			stats: self.stats,
		})
	}
}
