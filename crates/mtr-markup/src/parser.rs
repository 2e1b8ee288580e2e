//! Tree building from tokens.
//!
//! The builder keeps a stack of open tags; the innermost one is where new
//! nodes are inserted. Closing tags that do not match the innermost open tag
//! are dropped, so overlapping markup like `<b><i>x</b></i>` still yields a
//! complete tree.

use mtr_config::LogConfig;

use crate::lexer::Lexer;
use crate::node::{Document, Element, Node, NodeId, is_blank};
use crate::tokenizer::{Token, TokenKind, tokenize};

/// Elements that never take children or a closing tag.
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "iframe", "img", "input", "link", "meta", "param",
    "source", "track", "wbr", "command", "keygen", "menuitem",
];

/// Whether `name` is a void element, ignoring case.
pub fn is_void_tag(name: &str) -> bool {
    VOID_TAGS.iter().any(|void| void.eq_ignore_ascii_case(name))
}

/// Input waiting to be parsed.
#[derive(Debug)]
enum Input {
    Markup(String),
    Tokens(Vec<Token>),
}

impl Input {
    fn take_tokens(&mut self, log: LogConfig) -> Vec<Token> {
        match std::mem::replace(self, Self::Tokens(Vec::new())) {
            Self::Markup(markup) => tokenize(&Lexer::new(&markup).with_log(log).lex()),
            Self::Tokens(tokens) => tokens,
        }
    }
}

/// Parses markup into a [`Document`] once.
///
/// ```
/// use mtr_markup::Parser;
///
/// let mut parser = Parser::new("<p>Hello</p>");
/// assert_eq!(parser.parse().render(), "<p>Hello</p>");
/// ```
#[derive(Debug)]
pub struct Parser {
    input: Input,
    log: LogConfig,
    document: Option<Document>,
}

impl Parser {
    /// Create a parser for raw markup.
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            input: Input::Markup(markup.into()),
            log: LogConfig::default(),
            document: None,
        }
    }

    /// Create a parser for an already tokenized document.
    #[must_use]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            input: Input::Tokens(tokens),
            log: LogConfig::default(),
            document: None,
        }
    }

    /// Set the logging toggles used while lexing and building.
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Build the tree on first call and return it.
    ///
    /// Later calls return the same tree without parsing again.
    pub fn parse(&mut self) -> &Document {
        let Self {
            input,
            log,
            document,
        } = self;
        document.get_or_insert_with(|| {
            let tokens = input.take_tokens(*log);
            TreeBuilder::new(*log).build(tokens)
        })
    }

    /// Whether [`Parser::parse`] has already run.
    pub fn is_parsed(&self) -> bool {
        self.document.is_some()
    }

    /// Parse if needed and hand over the tree.
    #[must_use]
    pub fn into_document(mut self) -> Document {
        self.parse();
        self.document.unwrap_or_default()
    }
}

/// Appends nodes for a token stream.
struct TreeBuilder {
    document: Document,
    tag_stack: Vec<NodeId>,
    log: LogConfig,
}

impl TreeBuilder {
    fn new(log: LogConfig) -> Self {
        Self {
            document: Document::new(),
            tag_stack: Vec::new(),
            log,
        }
    }

    fn build(mut self, tokens: Vec<Token>) -> Document {
        log_info!(self.log, tokens = tokens.len(), "building document tree");

        for token in tokens {
            self.process(token);
        }

        for &id in &self.tag_stack {
            log_important!(
                self.log,
                tag = self.document.tag_name(id).unwrap_or_default(),
                "tag never closed, closing markup will be synthesized"
            );
        }

        log_info!(self.log, nodes = self.document.len(), "document tree built");
        self.document
    }

    fn insertion_point(&self) -> NodeId {
        self.tag_stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn append(&mut self, node: Node) -> NodeId {
        let parent = self.insertion_point();
        self.document.append(parent, node)
    }

    fn process(&mut self, token: Token) {
        match token.kind {
            TokenKind::Text => {
                let node = if is_blank(&token.content) {
                    log_trivial!(self.log, "whitespace node");
                    Node::Whitespace(token.content)
                } else {
                    log_trivial!(self.log, "text node");
                    Node::Text(token.content)
                };
                self.append(node);
            }
            TokenKind::Comment => {
                log_trivial!(self.log, "comment node");
                self.append(Node::Comment(token.content));
            }
            TokenKind::Doctype => {
                log_trivial!(self.log, "doctype node");
                self.append(Node::Doctype(token.content));
            }
            TokenKind::OpeningTag => self.open_tag(token),
            TokenKind::ClosingTag => self.close_tag(token),
        }
    }

    fn open_tag(&mut self, token: Token) {
        let Some(name) = token.tag_name else {
            log_important!(self.log, "opening tag without a name, keeping it as text");
            self.append(Node::Text(token.content));
            return;
        };

        if is_void_tag(&name) {
            log_trivial!(self.log, tag = %name, "void tag node");
            self.append(Node::VoidTag(Element::new(name, token.content)));
            return;
        }

        log_trivial!(self.log, tag = %name, "tag node");
        let id = self.append(Node::Tag {
            element: Element::new(name, token.content),
            closing_markup: None,
            children: Vec::new(),
        });
        self.tag_stack.push(id);
    }

    fn close_tag(&mut self, token: Token) {
        let name = token.tag_name.unwrap_or_default();

        let Some(open) = self.tag_stack.pop() else {
            log_important!(self.log, tag = %name, "closing tag without an open tag, ignoring");
            return;
        };

        if self.document.tag_name(open) == Some(name.as_str()) {
            log_trivial!(self.log, tag = %name, "closed tag");
            self.document.set_closing_markup(open, token.content);
        } else {
            log_important!(
                self.log,
                tag = %name,
                open = self.document.tag_name(open).unwrap_or_default(),
                "ignoring closing tag that does not match the open tag"
            );
            self.tag_stack.push(open);
        }

        match self.tag_stack.last() {
            Some(&next) => log_trivial!(
                self.log,
                tag = self.document.tag_name(next).unwrap_or_default(),
                "next open tag"
            ),
            None => log_trivial!(self.log, "no open tags left"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::node::{NodeInfo, NodeType};

    fn tag(name: &str, children: Vec<NodeInfo>) -> NodeInfo {
        NodeInfo {
            node_type: NodeType::Tag,
            tag_name: Some(name.to_owned()),
            children: Some(children),
        }
    }

    fn void(name: &str) -> NodeInfo {
        NodeInfo {
            node_type: NodeType::VoidTag,
            tag_name: Some(name.to_owned()),
            children: None,
        }
    }

    fn leaf(node_type: NodeType) -> NodeInfo {
        NodeInfo {
            node_type,
            tag_name: None,
            children: None,
        }
    }

    fn root(children: Vec<NodeInfo>) -> NodeInfo {
        NodeInfo {
            node_type: NodeType::DocumentRoot,
            tag_name: None,
            children: Some(children),
        }
    }

    fn tree(markup: &str) -> NodeInfo {
        Parser::new(markup).into_document().node_tree()
    }

    const DOCUMENT: &str = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <title>Document title</title>
    </head>
    <!-- Comment here with a <br> tag -->
    <body class="dark-mode">
        <img src="/path/to/image.jpg" class="image-fluid" alt="Alt text">
        <p>
            Text with <strong>bold text</strong> here.
            Stray < tag brackets > will be ignored.
        </p>
    </body>
</html>"#;

    #[test]
    fn test_round_trip() {
        let mut parser = Parser::new(DOCUMENT);
        assert_eq!(parser.parse().render(), DOCUMENT);
    }

    #[test]
    fn test_document_shape() {
        use NodeType::{Comment, Doctype, Text, Whitespace};

        assert_eq!(
            tree(DOCUMENT),
            root(vec![
                leaf(Doctype),
                leaf(Whitespace),
                tag(
                    "html",
                    vec![
                        leaf(Whitespace),
                        tag(
                            "head",
                            vec![
                                leaf(Whitespace),
                                tag("title", vec![leaf(Text)]),
                                leaf(Whitespace),
                            ]
                        ),
                        leaf(Whitespace),
                        leaf(Comment),
                        leaf(Whitespace),
                        tag(
                            "body",
                            vec![
                                leaf(Whitespace),
                                void("img"),
                                leaf(Whitespace),
                                tag(
                                    "p",
                                    vec![
                                        leaf(Text),
                                        tag("strong", vec![leaf(Text)]),
                                        leaf(Text),
                                    ]
                                ),
                                leaf(Whitespace),
                            ]
                        ),
                        leaf(Whitespace),
                    ]
                ),
            ])
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let mut parser = Parser::new("<p>x</p>");
        assert!(!parser.is_parsed());

        let first: *const Document = parser.parse();
        assert!(parser.is_parsed());
        let second: *const Document = parser.parse();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_mismatched_close_is_ignored() {
        let document = Parser::new("<b><i>text</b></i>").into_document();
        assert_eq!(
            document.node_tree(),
            root(vec![tag("b", vec![tag("i", vec![leaf(NodeType::Text)])])])
        );
        assert_eq!(document.render(), "<b><i>text</i></b>");
    }

    #[test]
    fn test_text_after_ignored_close_stays_in_open_tag() {
        let document = Parser::new("<b><i>x</b>y</i>z").into_document();
        assert_eq!(
            document.node_tree(),
            root(vec![tag(
                "b",
                vec![
                    tag("i", vec![leaf(NodeType::Text), leaf(NodeType::Text)]),
                    leaf(NodeType::Text),
                ]
            )])
        );

        let b = document.children(NodeId::ROOT)[0];
        let i = document.children(b)[0];
        let texts = |id: NodeId| -> Vec<_> {
            document
                .children(id)
                .iter()
                .filter_map(|&child| document.text(child))
                .collect()
        };
        assert_eq!(texts(i), vec!["x", "y"]);
        assert_eq!(texts(b), vec!["z"]);
        assert_eq!(document.render(), "<b><i>xy</i>z</b>");
    }

    #[test]
    fn test_unmatched_close_is_dropped() {
        let document = Parser::new("</p>a").into_document();
        assert_eq!(document.node_tree(), root(vec![leaf(NodeType::Text)]));
        assert_eq!(document.render(), "a");
    }

    #[test]
    fn test_close_is_case_sensitive() {
        assert_eq!(
            Parser::new("<P>x</p>").into_document().render(),
            "<P>x</P>"
        );
    }

    #[test]
    fn test_void_tags() {
        let document = Parser::new(r#"<img src="a.jpg"><BR>x"#).into_document();
        assert_eq!(
            document.node_tree(),
            root(vec![void("img"), void("BR"), leaf(NodeType::Text)])
        );
        assert!(document.children(NodeId(1)).is_empty());
        assert_eq!(document.render(), r#"<img src="a.jpg"><BR>x"#);
    }

    #[test]
    fn test_invalid_tag_name_stays_text() {
        let document = Parser::new("<tag#name>").into_document();
        assert_eq!(document.node_tree(), root(vec![leaf(NodeType::Text)]));
        assert_eq!(document.text(NodeId(1)), Some("<tag#name>"));
    }

    #[test]
    fn test_late_doctype_is_not_a_doctype() {
        let markup = "<p>a</p><!DOCTYPE html>";
        let document = Parser::new(markup).into_document();
        assert!(
            document
                .descendants()
                .all(|id| document.get(id).map(Node::node_type) != Some(NodeType::Doctype))
        );
        assert_eq!(document.render(), markup);
    }

    #[test]
    fn test_unclosed_tag_gets_fallback_close() {
        assert_eq!(
            Parser::new("<div><p>a").into_document().render(),
            "<div><p>a</p></div>"
        );
    }

    #[test]
    fn test_from_tokens() {
        let tokens = vec![
            Token::tag(TokenKind::OpeningTag, "<em>", "em"),
            Token::new(TokenKind::Text, "  "),
            Token::tag(TokenKind::ClosingTag, "</em>", "em"),
        ];
        let document = Parser::from_tokens(tokens).into_document();
        assert_eq!(
            document.node_tree(),
            root(vec![tag("em", vec![leaf(NodeType::Whitespace)])])
        );
        assert_eq!(document.render(), "<em>  </em>");
    }

    #[test]
    fn test_parse_with_logging_enabled() {
        let mut parser = Parser::new("<b><i>x</b>").with_log(LogConfig::all());
        assert_eq!(parser.parse().render(), "<b><i>x</i></b>");
    }

    #[test]
    fn test_is_void_tag() {
        assert!(is_void_tag("img"));
        assert!(is_void_tag("MenuItem"));
        assert!(!is_void_tag("div"));
        assert!(!is_void_tag(""));
    }
}
