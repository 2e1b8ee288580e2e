//! Filter lookup tables.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistrationError;
use crate::filter::{AttributeFilter, Filter, Scope, TextFilter};

/// Key under which filters for every tag or attribute are stored.
pub const WILDCARD: &str = "*";

/// Text and attribute filters keyed by lower-cased name.
///
/// Filters under the same key keep their registration order.
#[derive(Default, Clone)]
pub struct FilterRegistry {
    text: HashMap<String, Vec<Arc<dyn TextFilter>>>,
    attribute: HashMap<String, Vec<Arc<dyn AttributeFilter>>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File a filter under every name of its scope.
    ///
    /// # Errors
    ///
    /// Rejects scopes with no names or with blank names. Nothing is
    /// registered in that case.
    pub fn register(&mut self, filter: Filter) -> Result<(), RegistrationError> {
        match filter {
            Filter::Text(filter) => {
                let keys = scope_keys(filter.scope(), filter.name())?;
                for key in keys {
                    self.text.entry(key).or_default().push(Arc::clone(&filter));
                }
            }
            Filter::Attribute(filter) => {
                let keys = scope_keys(filter.scope(), filter.name())?;
                for key in keys {
                    self.attribute
                        .entry(key)
                        .or_default()
                        .push(Arc::clone(&filter));
                }
            }
        }
        Ok(())
    }

    /// Text filters stored under `key`.
    pub fn text_filters(&self, key: &str) -> &[Arc<dyn TextFilter>] {
        self.text.get(key).map_or(&[], Vec::as_slice)
    }

    /// Attribute filters stored under `key`.
    pub fn attribute_filters(&self, key: &str) -> &[Arc<dyn AttributeFilter>] {
        self.attribute.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether no filters are registered.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.attribute.is_empty()
    }

    /// Text filters for `tag`: exact tag first, then the wildcard.
    pub fn text_chain<'a>(&'a self, tag: &str) -> impl Iterator<Item = &'a Arc<dyn TextFilter>> {
        let tag = tag.to_lowercase();
        let exact = self.text_filters(&tag);
        exact.iter().chain(self.text_filters(WILDCARD))
    }

    /// Attribute filters for `attribute` of `tag`: `tag:attribute` first,
    /// then `attribute`, then the wildcard.
    pub fn attribute_chain<'a>(
        &'a self,
        tag: &str,
        attribute: &str,
    ) -> impl Iterator<Item = &'a Arc<dyn AttributeFilter>> {
        let tag = tag.to_lowercase();
        let attribute = attribute.to_lowercase();
        let composite = self.attribute_filters(&format!("{tag}:{attribute}"));
        let plain = self.attribute_filters(&attribute);
        composite
            .iter()
            .chain(plain)
            .chain(self.attribute_filters(WILDCARD))
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut text: Vec<_> = self.text.iter().map(|(k, v)| (k, v.len())).collect();
        let mut attribute: Vec<_> = self.attribute.iter().map(|(k, v)| (k, v.len())).collect();
        text.sort();
        attribute.sort();
        f.debug_struct("FilterRegistry")
            .field("text", &text)
            .field("attribute", &attribute)
            .finish()
    }
}

/// Lower-cased keys for a scope.
fn scope_keys(scope: Scope, filter: &str) -> Result<Vec<String>, RegistrationError> {
    match scope {
        Scope::All => Ok(vec![WILDCARD.to_owned()]),
        Scope::Names(names) if names.is_empty() => Err(RegistrationError::EmptyScope {
            filter: filter.to_owned(),
        }),
        Scope::Names(names) => names
            .iter()
            .map(|name| {
                let key = name.trim().to_lowercase();
                if key.is_empty() {
                    Err(RegistrationError::BlankName {
                        filter: filter.to_owned(),
                    })
                } else {
                    Ok(key)
                }
            })
            .collect(),
    }
}
