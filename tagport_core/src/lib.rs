//! `tagport_core` converts `<<field>>` template tags embedded in a word
//! processing document into `wr:` field tags, and builds a sample data
//! document whose shape mirrors the data the tags read.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document part
//!   → Driver (selects paragraphs holding an open marker)
//!   → Coalescer (merges runs so each tag sits inside one run)
//!   → Splitter (cuts runs into literal text and five-run field constructs)
//!   → Translator (classifies each tag and emits markup + data path)
//!   ↔ Scope stack (resolves queries, grows the sample data tree)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `tagport.toml`.
//! - [`document`]: The paragraph/run document model and its JSON form.
//! - [`translator`]: Tag classification and translation.
//! - [`scope`]: The scope stack and query resolution.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tagport_core::Converter;
//! use tagport_core::document::Document;
//!
//! let source = std::fs::read_to_string("template.json").unwrap();
//! let mut document = Document::from_json(&source).unwrap();
//!
//! let mut converter = Converter::default();
//! converter.process_document(&mut document).unwrap();
//! let conversion = converter.finalize().unwrap();
//!
//! println!("{}", conversion.sample.to_xml().unwrap());
//! ```

pub use coalesce::*;
pub use converter::*;
pub use error::*;
pub use log::*;
pub use markers::*;
pub use sample::*;
pub use split::*;

mod coalesce;
pub mod config;
mod converter;
pub mod document;
#[allow(unused_assignments)]
mod error;
mod log;
mod markers;
mod sample;
pub mod scope;
mod split;
pub mod translator;
