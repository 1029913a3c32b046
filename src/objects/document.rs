//! ParsedDocument - the result of parsing one IOC document.

use crate::objects::indicator::IndicatorItem;
use crate::objects::metadata::Metadata;

/// Metadata plus the ordered indicator items of one IOC document.
///
/// Built in a single pass by the extractor and not mutated afterwards.
/// `definition` keeps document order and never merges duplicate items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedDocument {
    metadata: Metadata,
    definition: Vec<IndicatorItem>,
}

impl ParsedDocument {
    pub(crate) fn new(metadata: Metadata, definition: Vec<IndicatorItem>) -> Self {
        Self {
            metadata,
            definition,
        }
    }

    /// Returns the document metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the indicator items in document order.
    pub fn definition(&self) -> &[IndicatorItem] {
        &self.definition
    }

    /// Returns the number of indicator items.
    pub fn len(&self) -> usize {
        self.definition.len()
    }

    /// Returns true if the document has no indicator items.
    pub fn is_empty(&self) -> bool {
        self.definition.is_empty()
    }

    /// Returns an iterator over the indicator items.
    pub fn iter(&self) -> impl Iterator<Item = &IndicatorItem> {
        self.definition.iter()
    }

    /// Distinct indicator categories, in the order first seen.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.definition {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    /// Consumes the document, returning its metadata and items.
    pub fn into_parts(self) -> (Metadata, Vec<IndicatorItem>) {
        (self.metadata, self.definition)
    }
}

impl<'a> IntoIterator for &'a ParsedDocument {
    type Item = &'a IndicatorItem;
    type IntoIter = std::slice::Iter<'a, IndicatorItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.definition.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, category: &str) -> IndicatorItem {
        IndicatorItem {
            indicator_item_id: id.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_categories_first_seen_order() {
        let doc = ParsedDocument::new(
            Metadata::new(),
            vec![
                item("a", "ProcessItem"),
                item("b", "FileItem"),
                item("c", "ProcessItem"),
            ],
        );
        assert_eq!(doc.categories(), vec!["ProcessItem", "FileItem"]);
        assert_eq!(doc.len(), 3);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_into_parts_keeps_order() {
        let doc = ParsedDocument::new(Metadata::new(), vec![item("a", "x"), item("b", "x")]);
        let ids: Vec<_> = (&doc).into_iter().map(|i| i.indicator_item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let (meta, items) = doc.into_parts();
        assert_eq!(meta, Metadata::new());
        assert_eq!(items.len(), 2);
    }
}
