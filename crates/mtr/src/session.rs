//! The top-level filtering session.

use mtr_config::{Backend, Config, Dialect};
use mtr_dom::DomFilter;
use mtr_markup::{Parser, log_important, log_info};

use crate::changes::Change;
use crate::dispatch::FilterDispatch;
use crate::error::{ERROR_CANNOT_RENDER_MARKUP, RegistrationError, ReplaceError};
use crate::filter::{AttributeFilter, Filter, TextFilter};
use crate::registry::FilterRegistry;

/// Filters markup and keeps a log of every change.
///
/// Register all filters first, then call [`MarkupReplacer::filter`] for
/// each document. The change log grows across calls; create a new session
/// to start over.
///
/// ```
/// use mtr::{AttributeFn, MarkupReplacer, Scope};
///
/// let mut replacer = MarkupReplacer::new();
/// replacer
///     .register_attribute_filter(AttributeFn::new(Scope::names(["class"]), |_, _, _| {
///         "{R}".to_owned()
///     }))
///     .unwrap();
///
/// let output = replacer.filter(r#"<p class="x">Hello</p>"#).unwrap();
/// assert_eq!(output, r#"<p class="{R}">Hello</p>"#);
/// assert_eq!(replacer.changes().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MarkupReplacer {
    config: Config,
    registry: FilterRegistry,
    changes: Vec<Change>,
}

impl MarkupReplacer {
    /// Create a session with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a session with custom configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            registry: FilterRegistry::new(),
            changes: Vec::new(),
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a text or attribute filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter's scope names nothing.
    pub fn register(&mut self, filter: Filter) -> Result<(), RegistrationError> {
        log_info!(self.config.logging, filter = filter.name(), "registering filter");
        self.registry.register(filter)
    }

    /// Register a text filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter's scope names nothing.
    pub fn register_text_filter<F: TextFilter + 'static>(
        &mut self,
        filter: F,
    ) -> Result<(), RegistrationError> {
        self.register(Filter::text(filter))
    }

    /// Register an attribute filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter's scope names nothing.
    pub fn register_attribute_filter<F: AttributeFilter + 'static>(
        &mut self,
        filter: F,
    ) -> Result<(), RegistrationError> {
        self.register(Filter::attribute(filter))
    }

    /// Filter markup with the configured backend.
    ///
    /// Changes are appended to the log only when the whole document was
    /// filtered and rendered.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::Render`] if the DOM backend cannot read the
    /// markup. The lossless backend never fails.
    pub fn filter(&mut self, markup: &str) -> Result<String, ReplaceError> {
        match self.config.backend {
            Backend::Lossless => Ok(self.filter_lossless(markup)),
            Backend::Dom => self.filter_dom(markup, self.config.dialect),
        }
    }

    /// Filter markup with the lossless parser.
    ///
    /// Everything except filtered values is kept byte for byte.
    pub fn filter_lossless(&mut self, markup: &str) -> String {
        let log = self.config.logging;
        log_info!(log, bytes = markup.len(), "filtering markup");

        let mut document = Parser::new(markup).with_log(log).into_document();
        let mut dispatch = FilterDispatch::new(&self.registry, log);
        document.rewrite(&mut dispatch);

        let output = document.render();
        let changes = dispatch.into_changes();
        self.record(changes);
        output
    }

    /// Filter markup through the DOM backend.
    ///
    /// # Errors
    ///
    /// Returns [`ReplaceError::Render`] if the markup cannot be read in the
    /// given dialect.
    pub fn filter_dom(&mut self, markup: &str, dialect: Dialect) -> Result<String, ReplaceError> {
        let log = self.config.logging;
        let mut dispatch = FilterDispatch::new(&self.registry, log);

        let output = DomFilter::new(dialect)
            .with_log(log)
            .filter(markup, &mut dispatch)
            .map_err(|source| {
                log_important!(log, error = %source, "cannot render markup");
                ReplaceError::Render {
                    code: ERROR_CANNOT_RENDER_MARKUP,
                    source,
                }
            })?;

        let changes = dispatch.into_changes();
        self.record(changes);
        Ok(output)
    }

    /// Every change made so far, in order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    fn record(&mut self, changes: Vec<Change>) {
        log_info!(self.config.logging, changes = changes.len(), "markup filtered");
        self.changes.extend(changes);
    }
}
