//! IndicatorItem - a single condition inside an IOC definition.

/// One `<IndicatorItem>` of an IOC definition.
///
/// `category` and `subcategory` come from the item's `<Context>` element
/// (`document` and `search` attributes), `indicator_type` and `indicator`
/// from its `<Content>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorItem {
    /// `id` attribute of the IndicatorItem
    pub indicator_item_id: String,
    /// `condition` attribute (`is`, `contains`, ...)
    pub condition: String,
    /// Context `document` attribute, e.g. `FileItem`
    pub category: String,
    /// Context `search` attribute, e.g. `FileItem/FileName`
    pub subcategory: String,
    /// Content `type` attribute, e.g. `string`
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub indicator_type: String,
    /// Content text, the value being matched
    pub indicator: String,
}
