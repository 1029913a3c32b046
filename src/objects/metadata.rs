//! Metadata - the descriptive header of an IOC document.

use crate::objects::common::parse_ioc_timestamp;
use chrono::{DateTime, FixedOffset};

/// Descriptive fields of an IOC document.
///
/// Every field defaults to the empty string and is filled in only when the
/// corresponding element or attribute is present in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// `id` attribute of the root `<ioc>` element
    pub ioc_id: String,
    /// `last-modified` attribute of the root `<ioc>` element
    pub last_modified: String,
    /// Text of `<short_description>`
    pub short_description: String,
    /// Text of `<description>`
    pub description: String,
    /// Text of `<keywords>`
    pub keywords: String,
    /// Text of `<authored_by>`
    pub author: String,
    /// Text of `<authored_date>`
    pub created: String,
}

impl Metadata {
    /// Creates an empty Metadata record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `last_modified` as a timestamp, if it is one.
    pub fn last_modified_time(&self) -> Option<DateTime<FixedOffset>> {
        parse_ioc_timestamp(&self.last_modified)
    }

    /// Parses `created` as a timestamp, if it is one.
    pub fn created_time(&self) -> Option<DateTime<FixedOffset>> {
        parse_ioc_timestamp(&self.created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_strings() {
        let meta = Metadata::new();
        assert_eq!(meta.ioc_id, "");
        assert_eq!(meta.keywords, "");
        assert!(meta.last_modified_time().is_none());
        assert!(meta.created_time().is_none());
    }

    #[test]
    fn test_timestamps() {
        let meta = Metadata {
            last_modified: "2014-01-01".to_string(),
            created: "2013-02-21T21:52:21".to_string(),
            ..Default::default()
        };
        assert_eq!(meta.last_modified_time().unwrap().timestamp(), 1388534400);
        assert_eq!(meta.created_time().unwrap().timestamp(), 1361483541);
    }
}
