//! In-memory XML element tree.
//!
//! IOC documents are small, so they are loaded whole into a tree of owned
//! [`Element`]s instead of being streamed. The tree is built with
//! `quick-xml`'s namespace-resolving reader, so element names carry their
//! namespace URI rather than whatever prefix the author chose.
//!
//! # Example
//!
//! ```rust
//! use openioc_rs::tree::Element;
//!
//! let root = Element::parse_str(
//!     r#"<ioc xmlns="http://schemas.mandiant.com/2010/ioc" id="abc"><keywords>apt</keywords></ioc>"#,
//! )
//! .unwrap();
//!
//! assert_eq!(root.attribute("id"), Some("abc"));
//! assert_eq!(root.child(0).unwrap().text, "apt");
//! ```

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};
use encoding_rs::Encoding;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::io::BufRead;

/// A namespace-qualified element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, `None` for elements in no namespace
    pub namespace: Option<String>,
    /// Local part of the name
    pub local: String,
}

impl QName {
    /// Returns true if this name is `local` in namespace `namespace`.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local == local
    }
}

/// An XML element with its attributes, leading text and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified element name
    pub name: QName,
    /// Attributes in document order, namespace declarations excluded
    pub attributes: Vec<(String, String)>,
    /// Character data appearing before the first child element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: QName, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Parses a complete XML document and returns its root element.
    ///
    /// Fails on anything that is not well-formed: mismatched or missing
    /// end tags, text outside the root element, or more than one root.
    /// Nesting is limited to [`DEFAULT_MAX_DEPTH`].
    pub fn parse_str(xml: &str) -> Result<Element> {
        TreeBuilder::new(DEFAULT_MAX_DEPTH).build(NsReader::from_str(xml))
    }

    /// Parses a complete XML document from raw bytes.
    ///
    /// A byte order mark selects the encoding; otherwise the encoding named
    /// in the XML declaration is used, defaulting to UTF-8. Elements nested
    /// deeper than `max_depth` are rejected.
    pub fn parse_bytes(bytes: &[u8], max_depth: usize) -> Result<Element> {
        let builder = TreeBuilder::new(max_depth);

        match Encoding::for_bom(bytes) {
            Some((encoding, bom_len)) => {
                let (xml, had_errors) =
                    encoding.decode_without_bom_handling(&bytes[bom_len..]);
                if had_errors {
                    return Err(Error::IllFormed(format!(
                        "invalid {} byte sequence",
                        encoding.name()
                    )));
                }
                builder.build(NsReader::from_str(&xml))
            }
            None => builder.build(NsReader::from_reader(bytes)),
        }
    }

    /// Returns the value of the named attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the child element at `index`, if there is one.
    pub fn child(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    /// Iterates over this element and all its descendants, depth-first in
    /// document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Depth-first, document-order iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.stack.pop()?;
        self.stack.extend(elem.children.iter().rev());
        Some(elem)
    }
}

/// Accumulates elements while reading events.
struct TreeBuilder {
    /// Elements opened but not yet closed
    open: Vec<Element>,
    root: Option<Element>,
    max_depth: usize,
}

impl TreeBuilder {
    fn new(max_depth: usize) -> Self {
        Self {
            open: Vec::new(),
            root: None,
            max_depth,
        }
    }

    fn build<R: BufRead>(mut self, mut reader: NsReader<R>) -> Result<Element> {
        reader.config_mut().trim_text(false);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                XmlEvent::Start(e) => {
                    let elem = Self::element(&reader, &e)?;
                    self.open_element(elem)?;
                }
                XmlEvent::Empty(e) => {
                    let elem = Self::element(&reader, &e)?;
                    self.open_element(elem)?;
                    self.close_element()?;
                }
                XmlEvent::End(_) => {
                    // quick-xml has already matched the end name
                    self.close_element()?;
                }
                XmlEvent::Text(e) => {
                    let text = e.unescape()?;
                    self.push_text(&text)?;
                }
                XmlEvent::CData(e) => {
                    let text = decode(&reader, &e)?;
                    self.push_text(&text)?;
                }
                XmlEvent::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = self.open.last() {
            return Err(Error::IllFormed(format!(
                "unexpected end of document inside <{}>",
                unclosed.name.local
            )));
        }
        self.root
            .ok_or_else(|| Error::IllFormed("document has no root element".to_string()))
    }

    fn element<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<Element> {
        let (ns, local) = reader.resolve_element(e.name());
        let namespace = match ns {
            ResolveResult::Bound(Namespace(uri)) => Some(decode(reader, uri)?),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(prefix) => {
                return Err(Error::IllFormed(format!(
                    "undeclared namespace prefix '{}'",
                    String::from_utf8_lossy(&prefix)
                )))
            }
        };
        let local = decode(reader, local.as_ref())?;

        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = decode(reader, attr.key.as_ref())?;
            let value = attr
                .decode_and_unescape_value(reader.decoder())?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Element::new(QName { namespace, local }, attributes))
    }

    fn open_element(&mut self, elem: Element) -> Result<()> {
        if self.open.is_empty() && self.root.is_some() {
            return Err(Error::IllFormed(format!(
                "second root element <{}>",
                elem.name.local
            )));
        }
        if self.open.len() >= self.max_depth {
            return Err(Error::IllFormed(format!(
                "<{}> is nested deeper than {} elements",
                elem.name.local, self.max_depth
            )));
        }
        self.open.push(elem);
        Ok(())
    }

    fn close_element(&mut self) -> Result<()> {
        let elem = self
            .open
            .pop()
            .ok_or_else(|| Error::IllFormed("end tag without start tag".to_string()))?;
        match self.open.last_mut() {
            Some(parent) => parent.children.push(elem),
            None => self.root = Some(elem),
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) -> Result<()> {
        match self.open.last_mut() {
            Some(elem) => {
                // Only text before the first child belongs to `text`
                if elem.children.is_empty() {
                    elem.text.push_str(text);
                }
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(Error::IllFormed(
                "text content outside the root element".to_string(),
            )),
        }
    }
}

/// Decodes raw bytes with the encoding the reader has settled on.
fn decode<R>(reader: &NsReader<R>, bytes: &[u8]) -> Result<String> {
    let text = reader
        .decoder()
        .decode(bytes)
        .map_err(quick_xml::Error::from)?;
    Ok(text.into_owned())
}
