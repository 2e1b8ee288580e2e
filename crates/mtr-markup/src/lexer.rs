//! Character-level markup lexer.
//!
//! Classifies every input character into a structural role. Multi-character
//! markers (`<!--`, `-->`, `<!DOCTYPE`, `</name`) are recognized with bounded
//! lookahead and lookback, both of which skip interleaved whitespace.
//!
//! A `<` that does not start a recognizable construct is emitted as a plain
//! character, which is how stray brackets in running text survive intact.

use mtr_config::LogConfig;

/// Structural role of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharRole {
    /// Any character without structural meaning.
    Misc,
    /// The `<` of `<!--`.
    OpenComment,
    /// The `>` of `-->`.
    CloseComment,
    /// The `<` of `<!DOCTYPE`.
    OpenDoctype,
    /// The `>` ending a doctype.
    CloseDoctype,
    /// The `<` of `</name`.
    OpenClosingTag,
    /// The `<` of `<name`.
    OpenOpeningTag,
    /// The `>` ending an opening or closing tag.
    CloseTag,
}

/// A classified input character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedChar {
    /// Structural role.
    pub role: CharRole,
    /// The original character.
    pub ch: char,
    /// Tag name, present for [`CharRole::OpenOpeningTag`],
    /// [`CharRole::OpenClosingTag`] and [`CharRole::CloseTag`].
    pub tag_name: Option<String>,
}

impl LexedChar {
    fn misc(ch: char) -> Self {
        Self::marker(CharRole::Misc, ch)
    }

    fn marker(role: CharRole, ch: char) -> Self {
        Self {
            role,
            ch,
            tag_name: None,
        }
    }

    fn tag(role: CharRole, ch: char, name: String) -> Self {
        Self {
            role,
            ch,
            tag_name: Some(name),
        }
    }
}

/// State carried across the lexing pass.
#[derive(Debug, Default)]
struct LexState {
    in_comment: bool,
    in_doctype: bool,
    /// Set once a doctype can no longer appear.
    doctype_done: bool,
    /// Whether a tag is currently open (between `<name` and `>`).
    open: bool,
    name_stack: Vec<String>,
}

/// Character classifier for a single markup string.
#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<char>,
    log: LogConfig,
}

/// Lex `markup` with logging disabled.
pub fn lex(markup: &str) -> Vec<LexedChar> {
    Lexer::new(markup).lex()
}

impl Lexer {
    /// Create a lexer for the given markup.
    #[must_use]
    pub fn new(markup: &str) -> Self {
        Self {
            chars: markup.chars().collect(),
            log: LogConfig::none(),
        }
    }

    /// Set the logging toggles.
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Classify every character, in input order.
    pub fn lex(&self) -> Vec<LexedChar> {
        let mut lexed = Vec::with_capacity(self.chars.len());
        let mut state = LexState::default();

        for (pos, &ch) in self.chars.iter().enumerate() {
            // Inside a comment only `-->` ends it.
            if state.in_comment {
                let closes =
                    ch == '>' && pos.checked_sub(1).and_then(|p| self.look_back(p, "--")).is_some();
                if closes {
                    log_trivial!(self.log, position = pos, "closing the comment");
                    state.in_comment = false;
                    lexed.push(LexedChar::marker(CharRole::CloseComment, ch));
                } else {
                    lexed.push(LexedChar::misc(ch));
                }
                continue;
            }

            if state.in_doctype {
                if ch == '>' {
                    log_trivial!(self.log, position = pos, "closing the doctype");
                    state.in_doctype = false;
                    state.doctype_done = true;
                    lexed.push(LexedChar::marker(CharRole::CloseDoctype, ch));
                } else {
                    lexed.push(LexedChar::misc(ch));
                }
                continue;
            }

            let classified = match ch {
                '<' => self.open_bracket(pos, &mut state),
                '>' => self.close_bracket(pos, &mut state),
                _ => {
                    log_debug!(self.log, position = pos, in_tag = state.open, "adding character");
                    LexedChar::misc(ch)
                }
            };
            lexed.push(classified);
        }

        lexed
    }

    fn open_bracket(&self, pos: usize, state: &mut LexState) -> LexedChar {
        let next = pos + 1;

        // The doctype can only come first, so stop looking once anything
        // else has been seen.
        if !state.doctype_done && self.look_ahead(next, "!DOCTYPE").is_some() {
            log_trivial!(self.log, position = pos, "detected the doctype");
            state.in_doctype = true;
            return LexedChar::marker(CharRole::OpenDoctype, '<');
        }

        if let Some(slash) = self.look_ahead(next, "/") {
            let Some(name) = self.detect_tag_name(slash + 1) else {
                log_trivial!(self.log, position = pos, "slash without a tag name");
                return LexedChar::misc('<');
            };

            log_trivial!(self.log, position = pos, tag = %name, "detected closing tag");
            state.open = true;
            state.doctype_done = true;
            state.name_stack.push(name.clone());
            return LexedChar::tag(CharRole::OpenClosingTag, '<', name);
        }

        if self.look_ahead(next, "!--").is_some() {
            log_trivial!(self.log, position = pos, "detected an opening comment");
            state.in_comment = true;
            state.doctype_done = true;
            return LexedChar::marker(CharRole::OpenComment, '<');
        }

        if state.open {
            log_trivial!(self.log, position = pos, "another tag is already open");
            return LexedChar::misc('<');
        }

        match self.detect_tag_name(next) {
            Some(name) => {
                log_trivial!(self.log, position = pos, tag = %name, "detected opening tag");
                state.open = true;
                state.doctype_done = true;
                state.name_stack.push(name.clone());
                LexedChar::tag(CharRole::OpenOpeningTag, '<', name)
            }
            None => {
                log_trivial!(self.log, position = pos, "no tag name, treating as text");
                LexedChar::misc('<')
            }
        }
    }

    fn close_bracket(&self, pos: usize, state: &mut LexState) -> LexedChar {
        if !state.open {
            log_trivial!(self.log, position = pos, "no tag open, treating as text");
            return LexedChar::misc('>');
        }

        match state.name_stack.pop() {
            Some(name) => {
                log_trivial!(self.log, position = pos, tag = %name, "closing the open tag");
                state.open = false;
                LexedChar::tag(CharRole::CloseTag, '>', name)
            }
            None => LexedChar::misc('>'),
        }
    }

    /// Detect a tag name starting at `pos`.
    ///
    /// Names consist of ASCII letters, digits, `_` and `:`. The name must be
    /// followed by `>`, `/`, whitespace or the end of input; any other
    /// character means this is not a tag.
    pub fn detect_tag_name(&self, pos: usize) -> Option<String> {
        let mut name = String::new();

        for (seek, &ch) in self.chars.iter().enumerate().skip(pos) {
            if !name.is_empty() && (ch == '>' || ch == '/' || is_whitespace(ch)) {
                log_debug!(self.log, position = seek, name = %name, "tag name complete");
                return Some(name);
            }

            if ch == '_' || ch == ':' || ch.is_ascii_alphanumeric() {
                name.push(ch);
                continue;
            }

            log_debug!(self.log, position = seek, character = ?ch, "invalid tag name character");
            return None;
        }

        (!name.is_empty()).then_some(name)
    }

    /// Match `sequence` forwards from `pos`, case-insensitively.
    ///
    /// Whitespace in the input is skipped unless the expected character is
    /// itself whitespace. Returns the position of the first matched
    /// character.
    pub fn look_ahead(&self, pos: usize, sequence: &str) -> Option<usize> {
        let expected: Vec<char> = sequence.chars().map(fold_case).collect();
        let mut matched = 0;
        let mut start = None;
        let mut seek = pos;

        while let Some(&want) = expected.get(matched) {
            let ch = fold_case(*self.chars.get(seek)?);

            if ch == want {
                start.get_or_insert(seek);
                matched += 1;
                seek += 1;
                continue;
            }

            if !is_whitespace(want) && is_whitespace(ch) {
                seek += 1;
                continue;
            }

            log_debug!(self.log, position = seek, sequence, "lookahead failed");
            return None;
        }

        start
    }

    /// Match `sequence` backwards ending at `pos`, case-sensitively.
    ///
    /// Uses the same whitespace skipping as [`Lexer::look_ahead`]. Returns
    /// the position of the first matched character, which is the last
    /// character of `sequence`.
    pub fn look_back(&self, pos: usize, sequence: &str) -> Option<usize> {
        let expected: Vec<char> = sequence.chars().collect();
        let mut remaining = expected.len();
        let mut start = None;
        let mut seek = Some(pos);

        while remaining > 0 {
            let idx = seek?;
            let ch = *self.chars.get(idx)?;
            let want = expected[remaining - 1];

            if ch == want {
                start.get_or_insert(idx);
                remaining -= 1;
                seek = idx.checked_sub(1);
                continue;
            }

            if !is_whitespace(want) && is_whitespace(ch) {
                seek = idx.checked_sub(1);
                continue;
            }

            log_debug!(self.log, position = idx, sequence, "lookback failed");
            return None;
        }

        start
    }
}

/// ASCII whitespace including vertical tab and form feed.
pub(crate) const fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

fn fold_case(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}
