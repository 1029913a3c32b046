//! Parser configuration.

/// Default ceiling on the size of an IOC document (16 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 16 * 1024 * 1024;

/// Default ceiling on element nesting, matching libxml2 without `XML_PARSE_HUGE`.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration options for validating and parsing IOC documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Largest document accepted, in bytes. `None` disables the check.
    pub max_document_bytes: Option<u64>,
    /// Deepest element nesting accepted; the root element is depth 1.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: Some(DEFAULT_MAX_DOCUMENT_BYTES),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with no document size ceiling.
    ///
    /// The nesting limit still applies.
    pub fn unlimited() -> Self {
        Self {
            max_document_bytes: None,
            ..Self::default()
        }
    }

    /// Sets the document size ceiling.
    pub fn with_max_document_bytes(mut self, limit: u64) -> Self {
        self.max_document_bytes = Some(limit);
        self
    }

    /// Sets the element nesting limit.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        assert_eq!(
            ParserConfig::default().max_document_bytes,
            Some(DEFAULT_MAX_DOCUMENT_BYTES)
        );
        assert_eq!(ParserConfig::default().max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(ParserConfig::unlimited().max_document_bytes, None);
        assert_eq!(ParserConfig::unlimited().max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(ParserConfig::new().with_max_depth(8).max_depth, 8);
        assert_eq!(
            ParserConfig::new()
                .with_max_document_bytes(10)
                .max_document_bytes,
            Some(10)
        );
    }
}
