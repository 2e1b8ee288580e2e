//! Filter traits and closure adapters.

use std::sync::Arc;

/// Names a filter applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every tag (text filters) or every attribute (attribute filters).
    All,
    /// Only the listed tag or attribute names. Attribute filters may also
    /// list `tag:attribute` pairs.
    Names(Vec<String>),
}

impl Scope {
    /// Scope limited to the given names.
    ///
    /// ```
    /// use mtr::Scope;
    ///
    /// assert_eq!(
    ///     Scope::names(["alt", "title"]),
    ///     Scope::Names(vec!["alt".to_owned(), "title".to_owned()])
    /// );
    /// ```
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }
}

/// Filters the text content of elements.
///
/// Filters are shared between every key they are registered under and may
/// be used from several threads, so they take `&self`. Use interior
/// mutability for state.
pub trait TextFilter: Send + Sync {
    /// Tags whose text this filter receives.
    fn scope(&self) -> Scope;

    /// Return the filtered text. `tag` is the parent element as written.
    fn filter_text(&self, tag: &str, text: &str) -> String;

    /// Name used in registration errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Filters attribute values.
pub trait AttributeFilter: Send + Sync {
    /// Attributes whose values this filter receives.
    fn scope(&self) -> Scope;

    /// Return the filtered value.
    fn filter_attribute(&self, tag: &str, attribute: &str, value: &str) -> String;

    /// Name used in registration errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A filter of either kind, ready for registration.
#[derive(Clone)]
pub enum Filter {
    /// Text filter.
    Text(Arc<dyn TextFilter>),
    /// Attribute filter.
    Attribute(Arc<dyn AttributeFilter>),
}

impl Filter {
    /// Wrap a text filter.
    pub fn text<F: TextFilter + 'static>(filter: F) -> Self {
        Self::Text(Arc::new(filter))
    }

    /// Wrap an attribute filter.
    pub fn attribute<F: AttributeFilter + 'static>(filter: F) -> Self {
        Self::Attribute(Arc::new(filter))
    }

    /// Name of the wrapped filter.
    pub fn name(&self) -> &str {
        match self {
            Self::Text(filter) => filter.name(),
            Self::Attribute(filter) => filter.name(),
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(filter) => f.debug_tuple("Text").field(&filter.name()).finish(),
            Self::Attribute(filter) => f.debug_tuple("Attribute").field(&filter.name()).finish(),
        }
    }
}

/// Text filter backed by a closure.
///
/// ```
/// use mtr::{Scope, TextFilter, TextFn};
///
/// let upper = TextFn::new(Scope::names(["h1"]), |_tag, text| text.to_uppercase());
/// assert_eq!(upper.filter_text("h1", "title"), "TITLE");
/// ```
pub struct TextFn<F> {
    scope: Scope,
    name: String,
    f: F,
}

impl<F> TextFn<F>
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    /// Create a text filter from `(tag, text) -> text`.
    pub fn new(scope: Scope, f: F) -> Self {
        Self {
            scope,
            name: "text closure".to_owned(),
            f,
        }
    }

    /// Set the name reported in registration errors.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> TextFilter for TextFn<F>
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn scope(&self) -> Scope {
        self.scope.clone()
    }

    fn filter_text(&self, tag: &str, text: &str) -> String {
        (self.f)(tag, text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Attribute filter backed by a closure.
pub struct AttributeFn<F> {
    scope: Scope,
    name: String,
    f: F,
}

impl<F> AttributeFn<F>
where
    F: Fn(&str, &str, &str) -> String + Send + Sync,
{
    /// Create an attribute filter from `(tag, attribute, value) -> value`.
    pub fn new(scope: Scope, f: F) -> Self {
        Self {
            scope,
            name: "attribute closure".to_owned(),
            f,
        }
    }

    /// Set the name reported in registration errors.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> AttributeFilter for AttributeFn<F>
where
    F: Fn(&str, &str, &str) -> String + Send + Sync,
{
    fn scope(&self) -> Scope {
        self.scope.clone()
    }

    fn filter_attribute(&self, tag: &str, attribute: &str, value: &str) -> String {
        (self.f)(tag, attribute, value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Redact;

    impl AttributeFilter for Redact {
        fn scope(&self) -> Scope {
            Scope::All
        }

        fn filter_attribute(&self, _tag: &str, _attribute: &str, _value: &str) -> String {
            "{R}".to_owned()
        }
    }

    #[test]
    fn test_default_name_is_type_name() {
        assert!(Redact.name().ends_with("Redact"));
        assert!(Filter::attribute(Redact).name().ends_with("Redact"));
    }

    #[test]
    fn test_closure_filters() {
        let text = TextFn::new(Scope::All, |tag, text| format!("{tag}:{text}")).with_name("tagged");
        assert_eq!(text.filter_text("p", "x"), "p:x");
        assert_eq!(text.name(), "tagged");
        assert_eq!(text.scope(), Scope::All);

        let attribute = AttributeFn::new(Scope::names(["href"]), |_, _, value| {
            value.replace("http:", "https:")
        });
        assert_eq!(
            attribute.filter_attribute("a", "href", "http://x"),
            "https://x"
        );
        assert_eq!(attribute.name(), "attribute closure");
        assert_eq!(attribute.scope(), Scope::Names(vec!["href".to_owned()]));
    }

    #[test]
    fn test_filter_debug() {
        let filter = Filter::text(TextFn::new(Scope::All, |_, t| t.to_owned()));
        assert_eq!(format!("{filter:?}"), r#"Text("text closure")"#);
    }
}
