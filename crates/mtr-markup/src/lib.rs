//! Lossless markup parsing.
//!
//! Markup goes through three stages, each a single left-to-right pass:
//!
//! 1. [`Lexer`] classifies every character as text or as a structural
//!    marker (tag, comment and doctype boundaries).
//! 2. [`tokenize`] groups the classified characters into verbatim tokens.
//! 3. [`Parser`] builds an arena-backed [`Document`] tree from the tokens.
//!
//! Rendering a document that was not modified reproduces properly nested
//! input byte for byte. Malformed markup never fails: stray brackets and
//! invalid tag names stay text. Closing tags without a matching open tag are
//! dropped, and tags left open are closed with `</name>` on output.
//!
//! # Example
//!
//! ```
//! use mtr_markup::{Parser, Rewriter};
//!
//! struct Upper;
//!
//! impl Rewriter for Upper {
//!     fn rewrite_attribute(&mut self, _tag: &str, _name: &str, value: &str) -> Option<String> {
//!         Some(value.to_uppercase())
//!     }
//!
//!     fn rewrite_text(&mut self, _tag: &str, _text: &str) -> Option<String> {
//!         None
//!     }
//! }
//!
//! let mut document = Parser::new(r#"<p  class="x">Hi</p>"#).into_document();
//! document.rewrite(&mut Upper);
//! assert_eq!(document.render(), r#"<p  class="X">Hi</p>"#);
//! ```

#[macro_use]
pub mod log;

mod attributes;
pub mod lexer;
mod node;
mod parser;
mod rewrite;
pub mod tokenizer;

pub use attributes::{Attribute, AttributeParser};
pub use lexer::{CharRole, LexedChar, Lexer, lex};
pub use node::{Document, Element, Node, NodeId, NodeInfo, NodeType, is_blank};
pub use parser::{Parser, VOID_TAGS, is_void_tag};
pub use rewrite::Rewriter;
pub use tokenizer::{Token, TokenKind, tokenize};
