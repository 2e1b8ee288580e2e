//! Walking a document and offering its values to a [`Rewriter`].

use crate::node::{Document, Node, NodeId};

/// Receives attribute values and text runs in document order.
///
/// Returning `Some` replaces the value, `None` keeps it. Implementations
/// decide on their own whether an unchanged value is worth reporting.
pub trait Rewriter {
    /// Offer one attribute of `tag`.
    fn rewrite_attribute(&mut self, tag: &str, name: &str, value: &str) -> Option<String>;

    /// Offer a non-blank text run whose parent element is `tag`.
    ///
    /// Text outside any element is offered with an empty tag name.
    fn rewrite_text(&mut self, tag: &str, text: &str) -> Option<String>;
}

impl Document {
    /// Offer every attribute and every non-blank text node to `rewriter`.
    ///
    /// Attributes of an element come before its children. Whitespace
    /// nodes, comments and doctypes are never offered.
    pub fn rewrite<R: Rewriter + ?Sized>(&mut self, rewriter: &mut R) {
        // Each entry carries the tag name of the node's parent element.
        let mut stack = vec![(NodeId::ROOT, String::new())];

        while let Some((id, parent_tag)) = stack.pop() {
            let tag = match self.get_mut(id) {
                Some(Node::Tag { element, .. } | Node::VoidTag(element)) => {
                    for attribute in element.attributes.attributes_mut() {
                        let replaced = rewriter.rewrite_attribute(
                            &element.name,
                            attribute.name(),
                            attribute.value(),
                        );
                        if let Some(value) = replaced {
                            attribute.set_value(value);
                        }
                    }
                    element.name.clone()
                }
                Some(Node::Text(text)) => {
                    if let Some(replaced) = rewriter.rewrite_text(&parent_tag, text) {
                        *text = replaced;
                    }
                    continue;
                }
                Some(Node::DocumentRoot { .. }) => String::new(),
                _ => continue,
            };

            stack.extend(
                self.children(id)
                    .iter()
                    .rev()
                    .map(|&child| (child, tag.clone())),
            );
        }
    }
}
