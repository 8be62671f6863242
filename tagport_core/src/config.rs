use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::TagportError;
use crate::TagportResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["tagport.toml", ".tagport.toml", ".config/tagport.toml"];

/// Default marker that opens a source tag.
pub const DEFAULT_OPEN_MARKER: &str = "<<";
/// Default marker that closes a source tag.
pub const DEFAULT_CLOSE_MARKER: &str = ">>";
/// Default element name of the sample data root.
pub const DEFAULT_DATA_ROOT: &str = "data";

/// Configuration loaded from a `tagport.toml` file.
///
/// ```toml
/// [markers]
/// open = "<<"
/// close = ">>"
///
/// [data]
/// root = "data"
///
/// strict_boundaries = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TagportConfig {
	/// The delimiters surrounding a tag in the source document.
	#[serde(default)]
	pub markers: MarkerConfig,
	/// Sample data settings.
	#[serde(default)]
	pub data: DataConfig,
	/// When true (the default), a tag whose text runs into a structural node
	/// such as a hyperlink aborts the conversion. When false the partial tag
	/// is logged and left as literal text.
	#[serde(default = "default_strict_boundaries")]
	pub strict_boundaries: bool,
}

impl Default for TagportConfig {
	fn default() -> Self {
		Self {
			markers: MarkerConfig::default(),
			data: DataConfig::default(),
			strict_boundaries: true,
		}
	}
}

/// The open and close markers of a source tag.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct MarkerConfig {
	#[serde(default = "default_open_marker")]
	pub open: String,
	#[serde(default = "default_close_marker")]
	pub close: String,
}

impl MarkerConfig {
	/// Markers must be non-empty and different from each other.
	pub fn validate(&self) -> TagportResult<()> {
		if self.open.is_empty() || self.close.is_empty() || self.open == self.close {
			return Err(TagportError::InvalidMarkers {
				open: self.open.clone(),
				close: self.close.clone(),
			});
		}

		Ok(())
	}
}

impl Default for MarkerConfig {
	fn default() -> Self {
		Self {
			open: default_open_marker(),
			close: default_close_marker(),
		}
	}
}

/// Settings for the generated sample data document.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct DataConfig {
	/// Name of the root element. Also the first segment of every absolute
	/// query, e.g. `/data/Customer/Name`.
	#[serde(default = "default_data_root")]
	pub root: String,
}

impl Default for DataConfig {
	fn default() -> Self {
		Self {
			root: default_data_root(),
		}
	}
}

fn default_open_marker() -> String {
	DEFAULT_OPEN_MARKER.to_string()
}

fn default_close_marker() -> String {
	DEFAULT_CLOSE_MARKER.to_string()
}

fn default_data_root() -> String {
	DEFAULT_DATA_ROOT.to_string()
}

fn default_strict_boundaries() -> bool {
	true
}

impl TagportConfig {
	/// Returns the first config file found in `root`, if any.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from `root`. Returns `Ok(None)` when no config file
	/// exists.
	pub fn load(root: &Path) -> TagportResult<Option<TagportConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_from(&config_path).map(Some)
	}

	/// Load the config from an explicit file path.
	pub fn load_from(path: &Path) -> TagportResult<TagportConfig> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml(&content)
	}

	/// Parse and validate config text.
	pub fn from_toml(content: &str) -> TagportResult<TagportConfig> {
		let config: TagportConfig =
			toml::from_str(content).map_err(|e| TagportError::ConfigParse(e.to_string()))?;
		config.validate()?;

		Ok(config)
	}

	/// Reject settings the scanner cannot work with.
	pub fn validate(&self) -> TagportResult<()> {
		self.markers.validate()?;

		if self.data.root.trim().is_empty() {
			return Err(TagportError::ConfigParse(
				"`data.root` must not be empty".to_string(),
			));
		}

		Ok(())
	}
}
