//! Groups classified characters back into whole tokens.
//!
//! Token boundaries only fall on the structural markers found by the lexer,
//! and every character ends up in exactly one token, so concatenating the
//! token contents reproduces the input.

use crate::lexer::{CharRole, LexedChar};

/// Kind of a markup token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A run of text.
    Text,
    /// `<name ...>`
    OpeningTag,
    /// `</name>`
    ClosingTag,
    /// `<!DOCTYPE ...>`
    Doctype,
    /// `<!-- ... -->`
    Comment,
}

/// A verbatim slice of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// The original characters of this token.
    pub content: String,
    /// Tag name for opening and closing tags.
    pub tag_name: Option<String>,
}

impl Token {
    /// Create a token without a tag name.
    #[must_use]
    pub fn new(kind: TokenKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            tag_name: None,
        }
    }

    /// Create an opening or closing tag token.
    #[must_use]
    pub fn tag(kind: TokenKind, content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            tag_name: Some(name.into()),
        }
    }
}

/// Group classified characters into tokens.
pub fn tokenize(chars: &[LexedChar]) -> Vec<Token> {
    let mut tokenizer = Tokenizer::default();
    for lexed in chars {
        tokenizer.push(lexed);
    }
    tokenizer.finish()
}

/// Accumulates characters until a structural marker ends the current token.
#[derive(Debug, Default)]
struct Tokenizer {
    tokens: Vec<Token>,
    buffer: String,
    /// Role and tag name of the first buffered character.
    head: Option<(CharRole, Option<String>)>,
    /// Which kind of tag the last tag marker opened.
    open_tag: Option<TokenKind>,
}

impl Tokenizer {
    fn push(&mut self, lexed: &LexedChar) {
        match lexed.role {
            CharRole::OpenComment | CharRole::OpenDoctype => {
                self.flush(TokenKind::Text);
                self.append(lexed);
            }
            CharRole::OpenOpeningTag => {
                self.flush(TokenKind::Text);
                self.open_tag = Some(TokenKind::OpeningTag);
                self.append(lexed);
            }
            CharRole::OpenClosingTag => {
                self.flush(TokenKind::Text);
                self.open_tag = Some(TokenKind::ClosingTag);
                self.append(lexed);
            }
            CharRole::CloseComment => {
                self.append(lexed);
                self.flush(TokenKind::Comment);
            }
            CharRole::CloseDoctype => {
                self.append(lexed);
                self.flush(TokenKind::Doctype);
            }
            CharRole::CloseTag => {
                self.append(lexed);
                let kind = self.closed_tag_kind();
                self.open_tag = None;
                self.flush(kind);
            }
            CharRole::Misc => self.append(lexed),
        }
    }

    /// Kind for a buffer ended by a tag close marker.
    ///
    /// A tag token needs its opening marker at the head of the buffer. When
    /// a comment split the tag apart, the remainder is kept as text.
    fn closed_tag_kind(&self) -> TokenKind {
        let headed_by_tag = matches!(
            self.head,
            Some((CharRole::OpenOpeningTag | CharRole::OpenClosingTag, Some(_)))
        );
        match self.open_tag {
            Some(kind) if headed_by_tag => kind,
            _ => TokenKind::Text,
        }
    }

    fn append(&mut self, lexed: &LexedChar) {
        if self.head.is_none() {
            self.head = Some((lexed.role, lexed.tag_name.clone()));
        }
        self.buffer.push(lexed.ch);
    }

    fn flush(&mut self, kind: TokenKind) {
        if self.buffer.is_empty() {
            return;
        }

        let head = self.head.take();
        let tag_name = match kind {
            TokenKind::OpeningTag | TokenKind::ClosingTag => head.and_then(|(_, name)| name),
            _ => None,
        };

        self.tokens.push(Token {
            kind,
            content: std::mem::take(&mut self.buffer),
            tag_name,
        });
    }

    /// Flush whatever is left at the end of input.
    ///
    /// An unterminated comment or doctype keeps its kind; anything else,
    /// including an unterminated tag, becomes text.
    fn finish(mut self) -> Vec<Token> {
        let kind = match self.head {
            Some((CharRole::OpenComment, _)) => TokenKind::Comment,
            Some((CharRole::OpenDoctype, _)) => TokenKind::Doctype,
            _ => TokenKind::Text,
        };
        self.flush(kind);
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::lexer::lex;

    fn tokens(markup: &str) -> Vec<Token> {
        tokenize(&lex(markup))
    }

    fn kinds(markup: &str) -> Vec<(TokenKind, String)> {
        tokens(markup)
            .into_iter()
            .map(|t| (t.kind, t.content))
            .collect()
    }

    #[test]
    fn test_simple_document() {
        assert_eq!(
            tokens(r#"<p class="x">Hello</p>"#),
            vec![
                Token::tag(TokenKind::OpeningTag, r#"<p class="x">"#, "p"),
                Token::new(TokenKind::Text, "Hello"),
                Token::tag(TokenKind::ClosingTag, "</p>", "p"),
            ]
        );
    }

    #[test]
    fn test_full_document_round_trips() {
        let markup = r#"<!DOCTYPE html>
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
        let tokens = tokens(markup);
        let rebuilt: String = tokens.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(rebuilt, markup);

        assert_eq!(tokens[0].kind, TokenKind::Doctype);
        assert_eq!(tokens[0].content, "<!DOCTYPE html>");
        assert!(
            tokens
                .iter()
                .any(|t| t.kind == TokenKind::Comment
                    && t.content == "<!-- Comment here with a <br> tag -->")
        );
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Text
            && t.content.contains("Stray < tag brackets > will be ignored.")));
    }

    #[test]
    fn test_trailing_text_is_kept() {
        assert_eq!(
            kinds("<b>x</b> tail"),
            vec![
                (TokenKind::OpeningTag, "<b>".to_owned()),
                (TokenKind::Text, "x".to_owned()),
                (TokenKind::ClosingTag, "</b>".to_owned()),
                (TokenKind::Text, " tail".to_owned()),
            ]
        );
    }

    #[test]
    fn test_plain_text_only() {
        assert_eq!(
            kinds("just text"),
            vec![(TokenKind::Text, "just text".to_owned())]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(tokens("").is_empty());
    }

    #[test]
    fn test_unterminated_comment() {
        assert_eq!(
            kinds("a<!-- open"),
            vec![
                (TokenKind::Text, "a".to_owned()),
                (TokenKind::Comment, "<!-- open".to_owned()),
            ]
        );
    }

    #[test]
    fn test_unterminated_tag_is_text() {
        assert_eq!(
            kinds(r#"<p class="x"#),
            vec![(TokenKind::Text, r#"<p class="x"#.to_owned())]
        );
    }

    #[test]
    fn test_comment_inside_open_tag() {
        let markup = "<p <!-- c --> x>";
        let tokens = tokens(markup);
        let rebuilt: String = tokens.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(rebuilt, markup);
        assert_eq!(
            tokens
                .iter()
                .map(|t| t.kind)
                .collect::<Vec<_>>(),
            vec![TokenKind::Text, TokenKind::Comment, TokenKind::Text]
        );
        assert!(tokens.iter().all(|t| t.tag_name.is_none()));
    }

    #[test]
    fn test_void_and_self_closing_tags() {
        assert_eq!(
            tokens(r#"<br/><img src="a.jpg">"#),
            vec![
                Token::tag(TokenKind::OpeningTag, "<br/>", "br"),
                Token::tag(TokenKind::OpeningTag, r#"<img src="a.jpg">"#, "img"),
            ]
        );
    }
}
