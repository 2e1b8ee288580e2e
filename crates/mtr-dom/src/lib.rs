//! DOM-style markup rewriting on a quick-xml event stream.
//!
//! Markup is read event by event, every attribute value and text run is
//! offered to a [`Rewriter`], and the result is serialized again. Values are
//! unescaped before they reach the rewriter and escaped on output, so the
//! result is normalized markup rather than a byte-exact copy:
//!
//! - attribute values are always double-quoted
//! - `&`, `<` and `>` in text are escaped
//! - valueless HTML attributes gain an empty value
//!
//! With [`Dialect::Html`], void elements such as `<br>` need no closing tag
//! and end tags are not checked against start tags. [`Dialect::Xml`] requires
//! well-formed input.

mod error;

use std::borrow::Cow;

use mtr_config::{Dialect, LogConfig};
use mtr_markup::{Rewriter, is_blank, is_void_tag, log_important, log_info, log_trivial};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

pub use error::DomError;

/// Rewrites markup through a quick-xml reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomFilter {
    dialect: Dialect,
    log: LogConfig,
}

impl DomFilter {
    /// Create a filter for the given dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            log: LogConfig::default(),
        }
    }

    /// Set the logging toggles.
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Offer every attribute and non-blank text run to `rewriter` and return
    /// the serialized result.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be read in the chosen dialect.
    pub fn filter<R: Rewriter + ?Sized>(
        &self,
        markup: &str,
        rewriter: &mut R,
    ) -> Result<String, DomError> {
        log_info!(self.log, dialect = ?self.dialect, "filtering through the DOM backend");

        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(false);
        if self.dialect == Dialect::Html {
            reader.config_mut().check_end_names = false;
        }

        let mut state = StreamState {
            out: String::with_capacity(markup.len()),
            text: String::new(),
            open: Vec::new(),
        };

        loop {
            let event = reader.read_event().map_err(|source| DomError::Xml {
                position: reader.error_position(),
                source,
            })?;

            match event {
                Event::Start(e) => {
                    state.flush_text(rewriter);
                    let name = decode_name(&reader, e.name().as_ref());
                    self.write_start(&reader, &e, &name, rewriter, &mut state.out)?;
                    state.out.push('>');

                    if self.dialect == Dialect::Html && is_void_tag(&name) {
                        log_trivial!(self.log, tag = %name, "void element");
                    } else {
                        state.open.push(name);
                    }
                }
                Event::Empty(e) => {
                    state.flush_text(rewriter);
                    let name = decode_name(&reader, e.name().as_ref());
                    self.write_start(&reader, &e, &name, rewriter, &mut state.out)?;
                    state.out.push_str("/>");
                }
                Event::End(e) => {
                    state.flush_text(rewriter);
                    let name = decode_name(&reader, e.name().as_ref());
                    match state.open.iter().rposition(|open| *open == name) {
                        Some(index) => state.open.truncate(index),
                        None => {
                            log_important!(self.log, tag = %name, "end tag without a start tag");
                        }
                    }
                    state.out.push_str("</");
                    state.out.push_str(&name);
                    state.out.push('>');
                }
                Event::Text(e) => {
                    state.text.push_str(&reader.decoder().decode(&e)?);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    match decode_entity(&entity) {
                        Some(ch) => state.text.push(ch),
                        None => {
                            // Entities this reader cannot resolve pass through untouched.
                            state.flush_text(rewriter);
                            state.out.push('&');
                            state.out.push_str(&entity);
                            state.out.push(';');
                        }
                    }
                }
                Event::CData(e) => {
                    state.flush_text(rewriter);
                    state.out.push_str("<![CDATA[");
                    state.out.push_str(std::str::from_utf8(&e)?);
                    state.out.push_str("]]>");
                }
                Event::Comment(e) => {
                    state.flush_text(rewriter);
                    state.out.push_str("<!--");
                    state.out.push_str(&reader.decoder().decode(&e)?);
                    state.out.push_str("-->");
                }
                Event::DocType(e) => {
                    state.flush_text(rewriter);
                    state.out.push_str("<!DOCTYPE ");
                    state.out.push_str(reader.decoder().decode(&e)?.trim_start());
                    state.out.push('>');
                }
                Event::Decl(e) => {
                    state.flush_text(rewriter);
                    state.out.push_str("<?");
                    state.out.push_str(&reader.decoder().decode(&e)?);
                    state.out.push_str("?>");
                }
                Event::PI(e) => {
                    state.flush_text(rewriter);
                    state.out.push_str("<?");
                    state.out.push_str(&reader.decoder().decode(&e)?);
                    state.out.push_str("?>");
                }
                Event::Eof => {
                    state.flush_text(rewriter);
                    break;
                }
            }
        }

        if !state.open.is_empty() {
            log_important!(self.log, open = state.open.len(), "elements left open at end of input");
        }

        Ok(state.out)
    }

    /// Write `<name` and the rewritten attributes.
    fn write_start<R: Rewriter + ?Sized>(
        &self,
        reader: &Reader<&[u8]>,
        e: &BytesStart<'_>,
        name: &str,
        rewriter: &mut R,
        out: &mut String,
    ) -> Result<(), DomError> {
        out.push('<');
        out.push_str(name);

        let attributes = match self.dialect {
            Dialect::Html => e.html_attributes(),
            Dialect::Xml => e.attributes(),
        };

        for attribute in attributes {
            let attribute = attribute?;
            let key = decode_name(reader, attribute.key.as_ref());
            let value = attribute.unescape_value().unwrap_or_else(|_| {
                Cow::Owned(String::from_utf8_lossy(&attribute.value).into_owned())
            });

            let value = rewriter
                .rewrite_attribute(name, &key, &value)
                .map_or(value, Cow::Owned);

            out.push(' ');
            out.push_str(&key);
            out.push_str("=\"");
            out.push_str(&escape_attr(&value));
            out.push('"');
        }

        Ok(())
    }
}

/// Output buffer plus the pending text run and open element names.
struct StreamState {
    out: String,
    text: String,
    open: Vec<String>,
}

impl StreamState {
    /// Offer the pending text run and write it escaped.
    fn flush_text<R: Rewriter + ?Sized>(&mut self, rewriter: &mut R) {
        if self.text.is_empty() {
            return;
        }

        let text = std::mem::take(&mut self.text);
        let text = if is_blank(&text) {
            text
        } else {
            let tag = self.open.last().map_or("", String::as_str);
            rewriter.rewrite_text(tag, &text).unwrap_or(text)
        };
        self.out.push_str(&escape_text(&text));
    }
}

/// Filter markup with a one-off [`DomFilter`].
///
/// # Errors
///
/// Returns an error if the markup cannot be read in the chosen dialect.
pub fn filter_dom<R: Rewriter + ?Sized>(
    markup: &str,
    dialect: Dialect,
    rewriter: &mut R,
) -> Result<String, DomError> {
    DomFilter::new(dialect).filter(markup, rewriter)
}

fn decode_name(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        Cow::into_owned,
    )
}

/// Resolve predefined and numeric character references.
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        s if s.starts_with("#x") || s.starts_with("#X") => {
            u32::from_str_radix(&s[2..], 16).ok().and_then(char::from_u32)
        }
        s if s.starts_with('#') => s[1..].parse::<u32>().ok().and_then(char::from_u32),
        _ => None,
    }
}

/// Escape text for element content.
fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

/// Escape text for double-quoted attribute values.
fn escape_attr(text: &str) -> String {
    escape_xml(text, true)
}

fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Wraps values in brackets and records what it saw.
    #[derive(Default)]
    struct Bracket {
        seen: Vec<String>,
    }

    impl Rewriter for Bracket {
        fn rewrite_attribute(&mut self, tag: &str, name: &str, value: &str) -> Option<String> {
            self.seen.push(format!("{tag}:{name}={value}"));
            Some(format!("[{value}]"))
        }

        fn rewrite_text(&mut self, tag: &str, text: &str) -> Option<String> {
            self.seen.push(format!("{tag}|{text}"));
            Some(format!("[{text}]"))
        }
    }

    /// Leaves everything alone.
    struct Keep;

    impl Rewriter for Keep {
        fn rewrite_attribute(&mut self, _: &str, _: &str, _: &str) -> Option<String> {
            None
        }

        fn rewrite_text(&mut self, _: &str, _: &str) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_well_formed_markup_is_kept() {
        let markup = r#"<div id="a"><p class="x">Hello <b>world</b></p><br/></div>"#;
        assert_eq!(filter_dom(markup, Dialect::Xml, &mut Keep).unwrap(), markup);
    }

    #[test]
    fn test_rewrites_attributes_and_text() {
        let mut bracket = Bracket::default();
        let output = filter_dom(
            r#"<p class="x">Hello <b>bold</b></p>"#,
            Dialect::Html,
            &mut bracket,
        )
        .unwrap();

        assert_eq!(output, r#"<p class="[x]">[Hello ]<b>[bold]</b></p>"#);
        assert_eq!(bracket.seen, vec!["p:class=x", "p|Hello ", "b|bold"]);
    }

    #[test]
    fn test_html_void_elements_do_not_nest() {
        let mut bracket = Bracket::default();
        let output = filter_dom("<p>a<br>b</p>", Dialect::Html, &mut bracket).unwrap();

        assert_eq!(output, "<p>[a]<br>[b]</p>");
        assert_eq!(bracket.seen, vec!["p|a", "p|b"]);
    }

    #[test]
    fn test_values_are_unescaped_then_escaped() {
        let mut bracket = Bracket::default();
        let output = filter_dom(
            r#"<a title="&quot;q&quot; &amp; co">1 &lt; 2</a>"#,
            Dialect::Xml,
            &mut bracket,
        )
        .unwrap();

        assert_eq!(bracket.seen, vec![r#"a:title="q" & co"#, "a|1 < 2"]);
        assert_eq!(output, r#"<a title="[&quot;q&quot; &amp; co]">[1 &lt; 2]</a>"#);
    }

    #[test]
    fn test_unknown_entity_passes_through() {
        let mut bracket = Bracket::default();
        let output = filter_dom("<p>a&nbsp;b</p>", Dialect::Html, &mut bracket).unwrap();

        assert_eq!(output, "<p>[a]&nbsp;[b]</p>");
    }

    #[test]
    fn test_whitespace_is_not_offered() {
        let mut bracket = Bracket::default();
        let output = filter_dom("<ul>\n  <li>x</li>\n</ul>", Dialect::Xml, &mut bracket).unwrap();

        assert_eq!(output, "<ul>\n  <li>[x]</li>\n</ul>");
        assert_eq!(bracket.seen, vec!["li|x"]);
    }

    #[test]
    fn test_comments_and_doctype_are_kept() {
        let markup = "<!DOCTYPE html><!-- note --><p>x</p>";
        assert_eq!(filter_dom(markup, Dialect::Html, &mut Keep).unwrap(), markup);
    }

    #[test]
    fn test_html_valueless_attribute() {
        let output = filter_dom("<input disabled>", Dialect::Html, &mut Keep).unwrap();
        assert_eq!(output, r#"<input disabled="">"#);
    }

    #[test]
    fn test_xml_mismatched_end_fails() {
        let err = filter_dom("<a><b></a>", Dialect::Xml, &mut Keep).unwrap_err();
        assert!(matches!(err, DomError::Xml { .. }), "got {err:?}");
    }

    #[test]
    fn test_with_log_enabled() {
        let output = DomFilter::new(Dialect::Html)
            .with_log(LogConfig::all())
            .filter("<p>x</b>", &mut Keep)
            .unwrap();
        assert_eq!(output, "<p>x</b>");
    }

    #[test]
    fn test_decode_entity() {
        assert_eq!(decode_entity("amp"), Some('&'));
        assert_eq!(decode_entity("#65"), Some('A'));
        assert_eq!(decode_entity("#x41"), Some('A'));
        assert_eq!(decode_entity("nbsp"), None);
        assert_eq!(decode_entity("#xZZ"), None);
    }
}
