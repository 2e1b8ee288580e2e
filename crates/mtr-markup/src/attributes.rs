//! Attribute extraction from raw opening-tag markup.
//!
//! Only double-quoted `name="value"` pairs are recognized. Single-quoted,
//! unquoted and valueless attributes stay untouched inside the tag markup.
//!
//! Rendering starts from the original markup and splices in only the
//! attributes whose value changed, so everything else in the tag is kept
//! byte for byte.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern for double-quoted attributes.
static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\t\r\n\f/ >"'=]+)="([^"]*)""#).expect("invalid attribute regex")
});

/// A single `name="value"` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    matched_text: String,
    span: Range<usize>,
    name: String,
    value: String,
    modified: bool,
}

impl Attribute {
    /// The original `name="value"` text as found in the tag.
    pub fn matched_text(&self) -> &str {
        &self.matched_text
    }

    /// Attribute name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the value was ever changed.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Set the value. The attribute stays modified from the first change on,
    /// even if a later call restores the original value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value != self.value {
            self.value = value;
            self.modified = true;
        }
    }

    /// Format as `name="value"` with the current value.
    pub fn render(&self) -> String {
        format!(r#"{}="{}""#, self.name, self.value)
    }
}

/// Parsed attributes of one opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeParser {
    markup: String,
    attributes: Vec<Attribute>,
}

impl AttributeParser {
    /// Parse the attributes of an opening tag's markup.
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let attributes = ATTRIBUTE_PATTERN
            .captures_iter(&markup)
            .map(|caps| {
                let whole = caps.get(0).map_or_else(|| 0..0, |m| m.range());
                Attribute {
                    matched_text: markup[whole.clone()].to_owned(),
                    span: whole,
                    name: caps[1].to_owned(),
                    value: caps[2].to_owned(),
                    modified: false,
                }
            })
            .collect();

        Self { markup, attributes }
    }

    /// The original tag markup.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Attributes in source order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Mutable attributes in source order.
    pub fn attributes_mut(&mut self) -> &mut [Attribute] {
        &mut self.attributes
    }

    /// First attribute with the given name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// First attribute with the given name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    /// Whether any attribute was modified.
    pub fn is_modified(&self) -> bool {
        self.attributes.iter().any(Attribute::is_modified)
    }

    /// Render the tag markup with modified attributes replaced.
    pub fn render(&self) -> String {
        if !self.is_modified() {
            return self.markup.clone();
        }

        let mut out = String::with_capacity(self.markup.len() + 16);
        let mut cursor = 0;

        for attribute in self.attributes.iter().filter(|a| a.modified) {
            out.push_str(&self.markup[cursor..attribute.span.start]);
            out.push_str(&attribute.render());
            cursor = attribute.span.end;
        }
        out.push_str(&self.markup[cursor..]);

        out
    }
}
