//! Runs registered filters over the values a parse backend offers.

use mtr_config::LogConfig;
use mtr_markup::{Rewriter, is_blank, log_debug, log_info};

use crate::changes::Change;
use crate::registry::FilterRegistry;

/// Applies filter chains and records every value they change.
pub(crate) struct FilterDispatch<'a> {
    registry: &'a FilterRegistry,
    changes: Vec<Change>,
    log: LogConfig,
}

impl<'a> FilterDispatch<'a> {
    pub(crate) fn new(registry: &'a FilterRegistry, log: LogConfig) -> Self {
        Self {
            registry,
            changes: Vec::new(),
            log,
        }
    }

    pub(crate) fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

impl Rewriter for FilterDispatch<'_> {
    fn rewrite_attribute(&mut self, tag: &str, name: &str, value: &str) -> Option<String> {
        let filtered = self
            .registry
            .attribute_chain(tag, name)
            .fold(value.to_owned(), |current, filter| {
                filter.filter_attribute(tag, name, &current)
            });

        if filtered == value {
            log_debug!(self.log, tag, attribute = name, "attribute unchanged");
            return None;
        }

        log_info!(self.log, tag, attribute = name, "attribute value filtered");
        self.changes
            .push(Change::attribute(tag, name, value, filtered.as_str()));
        Some(filtered)
    }

    fn rewrite_text(&mut self, tag: &str, text: &str) -> Option<String> {
        if is_blank(text) {
            return None;
        }

        let filtered = self
            .registry
            .text_chain(tag)
            .fold(text.to_owned(), |current, filter| {
                filter.filter_text(tag, &current)
            });

        if filtered == text {
            log_debug!(self.log, tag, "text unchanged");
            return None;
        }

        log_info!(self.log, tag, "text filtered");
        self.changes.push(Change::text(tag, text, filtered.as_str()));
        Some(filtered)
    }
}
