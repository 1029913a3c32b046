//! Error types for the OpenIOC library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while validating or extracting an IOC document.
#[derive(Error, Debug)]
pub enum Error {
    /// The schema file could not be opened or compiled
    #[error("Could not load XSD schema {}: {reason}", path.display())]
    SchemaLoad {
        /// Path of the schema file
        path: PathBuf,
        /// Why loading failed
        reason: String,
    },

    /// The document file could not be opened or is not well-formed XML
    #[error("Could not load IOC document {}: {reason}", path.display())]
    DocumentLoad {
        /// Path of the document file
        path: PathBuf,
        /// Why loading failed
        reason: String,
    },

    /// The document exceeds the configured size ceiling
    #[error("IOC document {} is {size} bytes, larger than the {limit} byte limit", path.display())]
    DocumentTooLarge {
        /// Path of the document file
        path: PathBuf,
        /// Size of the document on disk
        size: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// The document is well-formed but violates the schema
    #[error(
        "IOC document {} failed schema validation with {} violation(s): {}",
        path.display(),
        violations.len(),
        violations.join("; ")
    )]
    SchemaValidation {
        /// Path of the document file
        path: PathBuf,
        /// Every violation reported by the schema engine
        violations: Vec<String>,
    },

    /// A validated element lacks an attribute the extractor relies on
    #[error("Missing attribute '{attribute}' on <{element}> in {}", path.display())]
    MissingAttribute {
        /// Path of the document file
        path: PathBuf,
        /// Local name of the element
        element: String,
        /// Name of the missing attribute
        attribute: String,
    },

    /// An IndicatorItem does not have the expected shape
    #[error(
        "Malformed IndicatorItem '{}' in {}: {reason}",
        id.as_deref().unwrap_or("<unknown id>"),
        path.display()
    )]
    MalformedIndicator {
        /// Path of the document file
        path: PathBuf,
        /// The indicator's `id` attribute, when present
        id: Option<String>,
        /// What was wrong with it
        reason: String,
    },

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute parsing error
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// Structural XML error found while building the element tree
    #[error("Ill-formed XML: {0}")]
    IllFormed(String),
}

impl Error {
    /// Returns true if this error was raised while extracting from an
    /// already validated document.
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            Error::MissingAttribute { .. } | Error::MalformedIndicator { .. }
        )
    }
}

/// Result type alias for OpenIOC operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_path_and_id() {
        let err = Error::MalformedIndicator {
            path: PathBuf::from("/iocs/bad.ioc"),
            id: Some("i1".to_string()),
            reason: "expected 2 child elements, found 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/iocs/bad.ioc"));
        assert!(msg.contains("'i1'"));
        assert!(err.is_extraction_error());

        let err = Error::MalformedIndicator {
            path: PathBuf::from("x.ioc"),
            id: None,
            reason: "no children".to_string(),
        };
        assert!(err.to_string().contains("<unknown id>"));
    }

    #[test]
    fn test_validation_message_lists_all_violations() {
        let err = Error::SchemaValidation {
            path: PathBuf::from("doc.ioc"),
            violations: vec!["first".to_string(), "second".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 violation(s)"));
        assert!(msg.contains("first; second"));
        assert!(!err.is_extraction_error());
    }
}
