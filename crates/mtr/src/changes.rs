//! Record of values altered by filters.

use serde::Serialize;

/// What kind of value was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Element text.
    Text,
    /// Attribute value.
    Attribute,
}

/// One value altered by the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Kind of value.
    pub kind: ChangeKind,
    /// Tag the value belongs to, as written. Empty for text outside any element.
    pub tag: String,
    /// Attribute name for attribute changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Value before filtering.
    pub original: String,
    /// Value after filtering.
    pub filtered: String,
}

impl Change {
    /// Text change.
    pub fn text(
        tag: impl Into<String>,
        original: impl Into<String>,
        filtered: impl Into<String>,
    ) -> Self {
        Self {
            kind: ChangeKind::Text,
            tag: tag.into(),
            attribute: None,
            original: original.into(),
            filtered: filtered.into(),
        }
    }

    /// Attribute change.
    pub fn attribute(
        tag: impl Into<String>,
        attribute: impl Into<String>,
        original: impl Into<String>,
        filtered: impl Into<String>,
    ) -> Self {
        Self {
            kind: ChangeKind::Attribute,
            tag: tag.into(),
            attribute: Some(attribute.into()),
            original: original.into(),
            filtered: filtered.into(),
        }
    }
}
