//! OpenIOC object types.
//!
//! - [`ParsedDocument`] - The result of parsing one IOC document
//! - [`Metadata`] - Descriptive header fields
//! - [`IndicatorItem`] - A single indicator condition
//!
//! Also provides the OpenIOC namespace constants.

mod common;
mod document;
mod indicator;
mod metadata;

pub use common::{parse_ioc_timestamp, XMLNS_IOC};
pub use document::ParsedDocument;
pub use indicator::IndicatorItem;
pub use metadata::Metadata;
