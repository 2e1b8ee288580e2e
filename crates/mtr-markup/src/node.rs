//! Arena-backed document tree.
//!
//! Nodes live in a flat vector owned by [`Document`] and refer to their
//! children by [`NodeId`]. The root is always at index zero.

use serde::Serialize;

use crate::attributes::AttributeParser;

/// Index of a node within a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The document root.
    pub const ROOT: Self = Self(0);

    /// Position of the node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// An element's name and opening markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the source.
    pub name: String,
    /// Parsed attributes together with the raw opening markup.
    pub attributes: AttributeParser,
}

impl Element {
    /// Build an element from its name and raw opening markup.
    #[must_use]
    pub fn new(name: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeParser::new(markup),
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Top of the tree. Renders only its children.
    DocumentRoot { children: Vec<NodeId> },
    /// Text with at least one non-blank character.
    Text(String),
    /// Text made of blank characters only.
    Whitespace(String),
    /// Verbatim `<!-- ... -->`.
    Comment(String),
    /// Verbatim `<!DOCTYPE ...>`.
    Doctype(String),
    /// An element that takes children.
    Tag {
        element: Element,
        /// Closing markup as found in the source, if it was matched.
        closing_markup: Option<String>,
        children: Vec<NodeId>,
    },
    /// An element that never takes children or a closing tag.
    VoidTag(Element),
}

impl Node {
    /// Type tag used by the tree dump.
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::DocumentRoot { .. } => NodeType::DocumentRoot,
            Self::Text(_) => NodeType::Text,
            Self::Whitespace(_) => NodeType::Whitespace,
            Self::Comment(_) => NodeType::Comment,
            Self::Doctype(_) => NodeType::Doctype,
            Self::Tag { .. } => NodeType::Tag,
            Self::VoidTag(_) => NodeType::VoidTag,
        }
    }

    /// Element data for tag nodes.
    #[must_use]
    pub const fn element(&self) -> Option<&Element> {
        match self {
            Self::Tag { element, .. } | Self::VoidTag(element) => Some(element),
            _ => None,
        }
    }

    /// Child ids, empty for leaf nodes.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::DocumentRoot { children } | Self::Tag { children, .. } => children,
            _ => &[],
        }
    }
}

/// Node type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    #[serde(rename = "document-root")]
    DocumentRoot,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "text-whitespace")]
    Whitespace,
    #[serde(rename = "comment")]
    Comment,
    #[serde(rename = "doctype")]
    Doctype,
    #[serde(rename = "tag")]
    Tag,
    #[serde(rename = "tag-void")]
    VoidTag,
}

impl NodeType {
    /// String form used in tree dumps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DocumentRoot => "document-root",
            Self::Text => "text",
            Self::Whitespace => "text-whitespace",
            Self::Comment => "comment",
            Self::Doctype => "doctype",
            Self::Tag => "tag",
            Self::VoidTag => "tag-void",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recursive shape of a node, for tests and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(rename = "tagName", skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeInfo>>,
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::DocumentRoot {
                children: Vec::new(),
            }],
        }
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no nodes besides the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Children of a node, empty for leaves and unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], Node::children)
    }

    /// Tag name of a tag or void tag node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)
            .and_then(Node::element)
            .map(|element| element.name.as_str())
    }

    /// Attributes of a tag or void tag node.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Option<&AttributeParser> {
        self.get(id)
            .and_then(Node::element)
            .map(|element| &element.attributes)
    }

    /// Payload of a text or whitespace node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.get(id)? {
            Node::Text(text) | Node::Whitespace(text) => Some(text),
            _ => None,
        }
    }

    /// All node ids in document order, root first.
    pub fn descendants(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![NodeId::ROOT];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// Append a node to a parent's children.
    ///
    /// Leaf parents cannot take children; the node is then attached to the
    /// root instead.
    pub(crate) fn append(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);

        let parent = match self.nodes.get(parent.0) {
            Some(Node::DocumentRoot { .. } | Node::Tag { .. }) => parent,
            _ => NodeId::ROOT,
        };
        if let Some(Node::DocumentRoot { children } | Node::Tag { children, .. }) =
            self.nodes.get_mut(parent.0)
        {
            children.push(id);
        }
        id
    }

    /// Record the verbatim closing markup of a tag node.
    pub(crate) fn set_closing_markup(&mut self, id: NodeId, markup: String) {
        if let Some(Node::Tag { closing_markup, .. }) = self.nodes.get_mut(id.0) {
            *closing_markup = Some(markup);
        }
    }

    /// Render the document back to markup.
    ///
    /// Without modifications the output equals the parsed input when its
    /// tags are properly nested. Ignored closing tags are not rendered, and
    /// tags left open get a synthesized `</name>`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![Visit::Enter(NodeId::ROOT)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id) => match self.get(id) {
                    Some(Node::DocumentRoot { children }) => {
                        stack.extend(children.iter().rev().map(|&child| Visit::Enter(child)));
                    }
                    Some(
                        Node::Text(text)
                        | Node::Whitespace(text)
                        | Node::Comment(text)
                        | Node::Doctype(text),
                    ) => out.push_str(text),
                    Some(Node::Tag {
                        element, children, ..
                    }) => {
                        out.push_str(&element.attributes.render());
                        stack.push(Visit::Exit(id));
                        stack.extend(children.iter().rev().map(|&child| Visit::Enter(child)));
                    }
                    Some(Node::VoidTag(element)) => out.push_str(&element.attributes.render()),
                    None => {}
                },
                Visit::Exit(id) => {
                    if let Some(Node::Tag {
                        element,
                        closing_markup,
                        ..
                    }) = self.get(id)
                    {
                        match closing_markup {
                            Some(markup) => out.push_str(markup),
                            None => {
                                out.push_str("</");
                                out.push_str(&element.name);
                                out.push('>');
                            }
                        }
                    }
                }
            }
        }

        out
    }

    /// Dump the tree shape starting at the root.
    #[must_use]
    pub fn node_tree(&self) -> NodeInfo {
        // Children are built before their parent and collected off `built`.
        let mut built: Vec<NodeInfo> = Vec::new();
        let mut stack = vec![Visit::Enter(NodeId::ROOT)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id) => {
                    stack.push(Visit::Exit(id));
                    stack.extend(
                        self.children(id)
                            .iter()
                            .rev()
                            .map(|&child| Visit::Enter(child)),
                    );
                }
                Visit::Exit(id) => {
                    let node = self.get(id);
                    let children = match node {
                        Some(Node::DocumentRoot { children } | Node::Tag { children, .. }) => {
                            let first = built.len().saturating_sub(children.len());
                            Some(built.split_off(first))
                        }
                        _ => None,
                    };
                    built.push(NodeInfo {
                        node_type: node.map_or(NodeType::DocumentRoot, Node::node_type),
                        tag_name: self.tag_name(id).map(str::to_owned),
                        children,
                    });
                }
            }
        }

        built.pop().unwrap_or(NodeInfo {
            node_type: NodeType::DocumentRoot,
            tag_name: None,
            children: None,
        })
    }
}

/// Step of an explicit-stack walk over the arena.
#[derive(Debug, Clone, Copy)]
enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

/// Whether text is empty after trimming spaces, tabs, line breaks, NUL and
/// vertical tabs.
#[must_use]
pub fn is_blank(text: &str) -> bool {
    text.chars()
        .all(|ch| matches!(ch, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0b'))
}
