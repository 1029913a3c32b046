//! OpenIOC indicator document parser for Rust.
//!
//! This crate validates OpenIOC 1.0 threat-intelligence documents against an
//! XSD schema and extracts their metadata and indicator items into plain
//! Rust values.
//!
//! # Features
//!
//! - **Schema Validation**: Documents are checked against a caller-supplied
//!   XSD through libxml2, and every violation is reported.
//! - **Extraction**: A single pass over the validated tree collects the
//!   metadata fields and every `IndicatorItem` in document order.
//! - **Serde Support**: Optional serialization with the `serde` feature.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let parsed = openioc_rs::parse("schemas/ioc.xsd", "indicators/evil.ioc").unwrap();
//!
//! println!("IOC {}: {}", parsed.metadata().ioc_id, parsed.metadata().short_description);
//! for item in parsed.definition() {
//!     println!("  {} {} {:?}", item.subcategory, item.condition, item.indicator);
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`objects`] - Parsed IOC data structures
//! - [`validation`] - XSD schema loading and validation
//! - [`extractor`] - Metadata and indicator extraction
//! - [`tree`] - In-memory XML element tree
//! - [`config`] - Parser limits
//! - [`error`] - Error types
//!
//! # Optional Features
//!
//! - `serde` - Enable serde serialization/deserialization support
//! - `cli` - Build the `ioc_parse` command line tool

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod extractor;
pub mod objects;
pub mod tree;
pub mod validation;

use std::path::Path;

use tracing::debug;

// Re-export commonly used types at the crate root
pub use config::ParserConfig;
pub use error::{Error, Result};
pub use extractor::{IndicatorExtractor, IocTag};
pub use objects::{IndicatorItem, Metadata, ParsedDocument, XMLNS_IOC};
pub use validation::{load_schema, Schema, ValidatedDocument};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Validates `document_path` against the schema at `schema_path` and
/// extracts its contents, using the default [`ParserConfig`].
pub fn parse<S: AsRef<Path>, D: AsRef<Path>>(
    schema_path: S,
    document_path: D,
) -> Result<ParsedDocument> {
    parse_with_config(schema_path, document_path, &ParserConfig::default())
}

/// Validates `document_path` against the schema at `schema_path` and
/// extracts its contents.
///
/// Nothing is returned unless both stages succeed.
pub fn parse_with_config<S: AsRef<Path>, D: AsRef<Path>>(
    schema_path: S,
    document_path: D,
    config: &ParserConfig,
) -> Result<ParsedDocument> {
    let mut schema = load_schema(schema_path)?;
    let validated = schema.validate(document_path, config)?;
    debug!(document = %validated.path().display(), "document is valid");
    IndicatorExtractor::extract(&validated)
}
