//! Indicator extraction from validated IOC documents.
//!
//! The extractor walks the document tree once, depth-first in document
//! order, and dispatches each element on its qualified name. Metadata
//! elements overwrite their field (the last occurrence wins) and every
//! `IndicatorItem` appends one record. Elements outside the closed set of
//! [`IocTag`]s, such as the `Indicator` grouping elements, are skipped.
//!
//! # Example
//!
//! ```rust,no_run
//! use openioc_rs::extractor::IndicatorExtractor;
//! use openioc_rs::validation::load_schema;
//! use openioc_rs::ParserConfig;
//!
//! let mut schema = load_schema("ioc.xsd")?;
//! let validated = schema.validate("evil.ioc", &ParserConfig::default())?;
//! let parsed = IndicatorExtractor::extract(&validated)?;
//!
//! for item in parsed.definition() {
//!     println!("{} {} {}", item.subcategory, item.condition, item.indicator);
//! }
//! # Ok::<(), openioc_rs::Error>(())
//! ```

use std::path::Path;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::objects::{IndicatorItem, Metadata, ParsedDocument, XMLNS_IOC};
use crate::tree::{Element, QName};
use crate::validation::ValidatedDocument;

/// The OpenIOC elements the extractor acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IocTag {
    /// `<ioc>`, carries `id` and `last-modified`
    Root,
    /// `<short_description>`
    ShortDescription,
    /// `<description>`
    Description,
    /// `<keywords>`
    Keywords,
    /// `<authored_by>`
    AuthoredBy,
    /// `<authored_date>`
    AuthoredDate,
    /// `<IndicatorItem>`
    IndicatorItem,
    /// Anything else, including elements outside the IOC namespace
    Other,
}

impl IocTag {
    /// Classifies an element name.
    pub fn of(name: &QName) -> IocTag {
        if name.namespace.as_deref() != Some(XMLNS_IOC) {
            return IocTag::Other;
        }
        match name.local.as_str() {
            "ioc" => IocTag::Root,
            "short_description" => IocTag::ShortDescription,
            "description" => IocTag::Description,
            "keywords" => IocTag::Keywords,
            "authored_by" => IocTag::AuthoredBy,
            "authored_date" => IocTag::AuthoredDate,
            "IndicatorItem" => IocTag::IndicatorItem,
            _ => IocTag::Other,
        }
    }
}

/// Single-pass builder of a [`ParsedDocument`].
pub struct IndicatorExtractor<'a> {
    path: &'a Path,
    metadata: Metadata,
    definition: Vec<IndicatorItem>,
}

impl<'a> IndicatorExtractor<'a> {
    /// Extracts metadata and indicator items from a validated document.
    ///
    /// All or nothing: any structural fault aborts the whole document.
    pub fn extract(doc: &'a ValidatedDocument) -> Result<ParsedDocument> {
        let mut extractor = IndicatorExtractor {
            path: doc.path(),
            metadata: Metadata::new(),
            definition: Vec::new(),
        };

        for elem in doc.root().descendants() {
            extractor.visit(elem)?;
        }

        debug!(
            document = %extractor.path.display(),
            ioc_id = %extractor.metadata.ioc_id,
            indicators = extractor.definition.len(),
            "extracted IOC"
        );
        Ok(ParsedDocument::new(extractor.metadata, extractor.definition))
    }

    fn visit(&mut self, elem: &Element) -> Result<()> {
        match IocTag::of(&elem.name) {
            IocTag::Root => {
                self.metadata.ioc_id = self.required_attribute(elem, "id")?.to_string();
                self.metadata.last_modified =
                    self.required_attribute(elem, "last-modified")?.to_string();
            }
            IocTag::ShortDescription => self.metadata.short_description = elem.text.clone(),
            IocTag::Description => self.metadata.description = elem.text.clone(),
            IocTag::Keywords => self.metadata.keywords = elem.text.clone(),
            IocTag::AuthoredBy => self.metadata.author = elem.text.clone(),
            IocTag::AuthoredDate => self.metadata.created = elem.text.clone(),
            IocTag::IndicatorItem => {
                let item = self.indicator_item(elem)?;
                trace!(id = %item.indicator_item_id, search = %item.subcategory, "indicator item");
                self.definition.push(item);
            }
            IocTag::Other => {}
        }
        Ok(())
    }

    fn required_attribute<'e>(&self, elem: &'e Element, attribute: &str) -> Result<&'e str> {
        elem.attribute(attribute)
            .ok_or_else(|| Error::MissingAttribute {
                path: self.path.to_path_buf(),
                element: elem.name.local.clone(),
                attribute: attribute.to_string(),
            })
    }

    /// Builds an IndicatorItem from the element and its first two children
    /// (`Context` then `Content`).
    fn indicator_item(&self, elem: &Element) -> Result<IndicatorItem> {
        let id = elem.attribute("id");
        let malformed = |reason: String| Error::MalformedIndicator {
            path: self.path.to_path_buf(),
            id: id.map(str::to_string),
            reason,
        };
        let attribute = |e: &Element, which: &str, name: &str| {
            e.attribute(name)
                .map(str::to_string)
                .ok_or_else(|| malformed(format!("{} has no '{}' attribute", which, name)))
        };

        let (context, content) = match (elem.child(0), elem.child(1)) {
            (Some(context), Some(content)) => (context, content),
            _ => {
                return Err(malformed(format!(
                    "expected at least 2 child elements, found {}",
                    elem.children.len()
                )))
            }
        };

        Ok(IndicatorItem {
            indicator_item_id: attribute(elem, "IndicatorItem", "id")?,
            condition: attribute(elem, "IndicatorItem", "condition")?,
            category: attribute(context, "first child", "document")?,
            subcategory: attribute(context, "first child", "search")?,
            indicator_type: attribute(content, "second child", "type")?,
            indicator: content.text.clone(),
        })
    }
}
