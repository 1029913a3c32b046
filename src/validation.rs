//! XSD validation for IOC documents.
//!
//! This module loads an XML Schema Definition and checks candidate IOC
//! documents against it. A document that passes comes back as a
//! [`ValidatedDocument`], the only input the extractor accepts.
//!
//! # Requirements
//!
//! Validation goes through libxml2, which must be installed on the system.
//!
//! **Ubuntu/Debian:**
//! ```bash
//! sudo apt-get install libxml2-dev
//! ```
//!
//! **macOS:**
//! ```bash
//! brew install libxml2
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use openioc_rs::validation::load_schema;
//! use openioc_rs::ParserConfig;
//!
//! let mut schema = load_schema("schemas/ioc.xsd")?;
//! let doc = schema.validate("indicators/evil.ioc", &ParserConfig::default())?;
//! println!("root: {}", doc.root().name.local);
//! # Ok::<(), openioc_rs::Error>(())
//! ```

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use libxml::parser::{Parser, ParserOptions};
use libxml::schemas::{SchemaParserContext, SchemaValidationContext};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::tree::Element;

/// A compiled XSD schema, ready to validate documents.
pub struct Schema {
    path: PathBuf,
    context: SchemaValidationContext,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema").field("path", &self.path).finish()
    }
}

/// An IOC document that has passed schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDocument {
    path: PathBuf,
    root: Element,
}

impl ValidatedDocument {
    pub(crate) fn new(path: impl Into<PathBuf>, root: Element) -> Self {
        Self {
            path: path.into(),
            root,
        }
    }

    /// Path the document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root element of the document tree.
    pub fn root(&self) -> &Element {
        &self.root
    }
}

/// Loads and compiles the XSD schema at `path`.
///
/// Fails with [`Error::SchemaLoad`] if the file cannot be opened or is not
/// a usable schema.
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<Schema> {
    let path = path.as_ref();
    debug!(schema = %path.display(), "loading schema");

    // libxml2 only reports "failed to load" for unreadable files
    File::open(path).map_err(|e| Error::SchemaLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut schema_parser = SchemaParserContext::from_file(&path.to_string_lossy());
    let context = SchemaValidationContext::from_parser(&mut schema_parser).map_err(|errors| {
        Error::SchemaLoad {
            path: path.to_path_buf(),
            reason: join_messages(&errors, "schema engine rejected the file"),
        }
    })?;

    Ok(Schema {
        path: path.to_path_buf(),
        context,
    })
}

impl Schema {
    /// Path the schema was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document at `document_path` and validates it.
    ///
    /// The file is read once. Its bytes are parsed into the element tree
    /// that is returned and, separately, into libxml2's own tree for
    /// validation. Every violation reported is kept. Documents nested deeper
    /// than `config.max_depth` fail with [`Error::DocumentLoad`].
    pub fn validate<P: AsRef<Path>>(
        &mut self,
        document_path: P,
        config: &ParserConfig,
    ) -> Result<ValidatedDocument> {
        let path = document_path.as_ref();
        debug!(document = %path.display(), schema = %self.path.display(), "validating document");

        let bytes = read_document(path, config)?;

        let root = Element::parse_bytes(&bytes, config.max_depth).map_err(|e| {
            Error::DocumentLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        // No network fetches, and no silently repaired documents
        let options = ParserOptions {
            no_net: true,
            recover: false,
            ..Default::default()
        };
        let doc = Parser::default()
            .parse_string_with_options(&bytes, options)
            .map_err(|e| Error::DocumentLoad {
                path: path.to_path_buf(),
                reason: format!("{:?}", e),
            })?;

        if let Err(errors) = self.context.validate_document(&doc) {
            let violations: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_deref())
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            let violations = if violations.is_empty() {
                vec![format!("not valid against {}", self.path.display())]
            } else {
                violations
            };
            warn!(
                document = %path.display(),
                count = violations.len(),
                "document failed schema validation"
            );
            return Err(Error::SchemaValidation {
                path: path.to_path_buf(),
                violations,
            });
        }

        Ok(ValidatedDocument::new(path, root))
    }
}

/// Reads a document into memory, enforcing the configured size ceiling.
///
/// The bytes are left undecoded; both parsers honour the encoding the
/// document declares.
fn read_document(path: &Path, config: &ParserConfig) -> Result<Vec<u8>> {
    let load_error = |reason: String| Error::DocumentLoad {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(limit) = config.max_document_bytes {
        let size = fs::metadata(path).map_err(|e| load_error(e.to_string()))?.len();
        if size > limit {
            return Err(Error::DocumentTooLarge {
                path: path.to_path_buf(),
                size,
                limit,
            });
        }
    }

    fs::read(path).map_err(|e| load_error(e.to_string()))
}

fn join_messages(errors: &[libxml::error::StructuredError], fallback: &str) -> String {
    let msg = errors
        .iter()
        .map(|e| e.message.clone().unwrap_or_default().trim().to_string())
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    if msg.is_empty() {
        fallback.to_string()
    } else {
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn data(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/data")
            .join(name)
    }

    fn temp_doc(xml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(xml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_missing_schema() {
        let err = load_schema("/nonexistent/path/schema.xsd").unwrap_err();
        assert!(matches!(err, Error::SchemaLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/path/schema.xsd"));
    }

    #[test]
    fn test_load_schema_not_xml() {
        let file = temp_doc("this is not a schema");
        let err = load_schema(file.path()).unwrap_err();
        assert!(matches!(err, Error::SchemaLoad { .. }));
    }

    #[test]
    fn test_validate_valid_document() {
        let mut schema = load_schema(data("ioc.xsd")).unwrap();
        let doc = schema
            .validate(data("minimal.ioc"), &ParserConfig::default())
            .unwrap();
        assert_eq!(doc.root().name.local, "ioc");
        assert_eq!(doc.path(), data("minimal.ioc").as_path());
    }

    #[test]
    fn test_validate_missing_document() {
        let mut schema = load_schema(data("ioc.xsd")).unwrap();
        let err = schema
            .validate("/nonexistent/file.ioc", &ParserConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::DocumentLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/file.ioc"));
    }

    #[test]
    fn test_validate_ill_formed_document() {
        let mut schema = load_schema(data("ioc.xsd")).unwrap();
        let file = temp_doc("<ioc><unclosed></ioc>");
        let err = schema
            .validate(file.path(), &ParserConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::DocumentLoad { .. }));
    }

    #[test]
    fn test_validate_size_ceiling() {
        let mut schema = load_schema(data("ioc.xsd")).unwrap();
        let config = ParserConfig::new().with_max_document_bytes(16);
        let err = schema.validate(data("minimal.ioc"), &config).unwrap_err();
        assert!(matches!(err, Error::DocumentTooLarge { limit: 16, .. }));
    }

    #[test]
    fn test_validate_deep_document_fails_cleanly() {
        let mut schema = load_schema(data("ioc.xsd")).unwrap();
        let depth = 500_000;
        let xml = format!(
            "<ioc xmlns=\"http://schemas.mandiant.com/2010/ioc\">{}{}</ioc>",
            "<a>".repeat(depth),
            "</a>".repeat(depth)
        );
        let file = temp_doc(&xml);

        let err = schema
            .validate(file.path(), &ParserConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::DocumentLoad { .. }));
        assert!(err.to_string().contains("deeper than 256"));
    }

    #[test]
    fn test_validate_declared_latin1() {
        let mut schema = load_schema(data("ioc.xsd")).unwrap();
        let doc = schema
            .validate(data("latin1.ioc"), &ParserConfig::default())
            .unwrap();
        let desc = doc.root().child(1).unwrap();
        assert_eq!(desc.text, "Dropper seen on a caf\u{e9} network");
    }

    #[test]
    fn test_validate_never_fetches_external_dtd() {
        let mut schema = load_schema(data("ioc.xsd")).unwrap();
        let file = temp_doc(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ioc SYSTEM "http://127.0.0.1:9/ioc.dtd">
<ioc xmlns="http://schemas.mandiant.com/2010/ioc" id="net" last-modified="2014-01-01"><definition/></ioc>"#,
        );
        let doc = schema
            .validate(file.path(), &ParserConfig::default())
            .unwrap();
        assert_eq!(doc.root().attribute("id"), Some("net"));
    }

    #[test]
    fn test_validate_reports_every_violation() {
        let mut schema = load_schema(data("ioc.xsd")).unwrap();
        let err = schema
            .validate(data("invalid.ioc"), &ParserConfig::default())
            .unwrap_err();
        match err {
            Error::SchemaValidation { violations, .. } => {
                assert!(violations.len() >= 2, "got {:?}", violations);
            }
            other => panic!("expected SchemaValidation, got {:?}", other),
        }
    }
}
