//! Matching pattern literals: `m//`, `qr//`, bare `//`, `s///`, and
//! `tr///`
//!
//! These are speculative. A bare slash might be division after all, so
//! every matcher rewinds the scanner completely when it fails and leaves
//! the decision to the caller.

use super::delimiter::{closing, is_paired, nested_body, quoted_body};
use super::quotelike::skip_to_delimiter;
use super::scanner::Scanner;
use super::scope::{Flags, Frame};
use super::token::{Class, Token, Value};
use crate::error::MatchError;

impl<'r> Scanner<'r> {
    /// Match `m`, `qr`, or (for an empty operator) a bare `/.../` with the
    /// cursor just past the operator.
    pub(super) fn match_pattern(&mut self, operator: &str) -> Result<Token, MatchError> {
        let snapshot = self.snapshot();
        let result = self.read_pattern(operator);
        if result.is_err() {
            self.restore(snapshot);
        }
        result
    }

    pub(super) fn match_substitution(&mut self) -> Result<Token, MatchError> {
        let snapshot = self.snapshot();
        let result = self.read_substitution();
        if result.is_err() {
            self.restore(snapshot);
        }
        result
    }

    pub(super) fn match_transliteration(&mut self, operator: &str) -> Result<Token, MatchError> {
        let snapshot = self.snapshot();
        let result = self.read_transliteration(operator);
        if result.is_err() {
            self.restore(snapshot);
        }
        result
    }

    fn read_pattern(&mut self, operator: &str) -> Result<Token, MatchError> {
        let bare = operator.is_empty();
        let open = if bare { '/' } else { self.read_delimiter()? };
        self.pos += open.len_utf8();

        let (pattern, multiline) = self.read_pattern_body(open, closing(open), bare)?;
        let modifiers = self.read_modifiers(crate::pattern!(r"^[msixpodualngc]*"));

        if bare && multiline && !modifiers.contains('x') {
            return Err(MatchError::new("newline in pattern", &pattern));
        }

        Ok(Token {
            value: Value::Pattern {
                operator: operator.to_string(),
                pattern,
                replacement: None,
                modifiers,
            },
            descriptor: "REGEXP",
            class: Class::Regexp,
        })
    }

    fn read_substitution(&mut self) -> Result<Token, MatchError> {
        let open = self.read_delimiter()?;
        self.pos += open.len_utf8();

        let close = closing(open);
        let (pattern, _) = self.read_pattern_body(open, close, false)?;

        // a bracketed pattern is followed by a freshly delimited
        // replacement; otherwise the closing delimiter is shared
        let replacement = if is_paired(open) {
            let open = self.read_delimiter()?;
            self.pos += open.len_utf8();
            self.read_plain_body(open)?
        } else {
            self.read_plain_body(open)?
        };

        let modifiers = self.read_modifiers(crate::pattern!(r"^[msixpodualngcer]*"));

        Ok(Token {
            value: Value::Pattern {
                operator: "s".to_string(),
                pattern,
                replacement: Some(replacement),
                modifiers,
            },
            descriptor: "SUBSTITUTION",
            class: Class::Regexp,
        })
    }

    fn read_transliteration(&mut self, operator: &str) -> Result<Token, MatchError> {
        let open = self.read_delimiter()?;
        self.pos += open.len_utf8();

        let search = self.read_plain_body(open)?;
        let replacement = if is_paired(open) {
            let open = self.read_delimiter()?;
            self.pos += open.len_utf8();
            self.read_plain_body(open)?
        } else {
            self.read_plain_body(open)?
        };

        let modifiers = self.read_modifiers(crate::pattern!(r"^[cdsr]*"));

        Ok(Token {
            value: Value::Pattern {
                operator: operator.to_string(),
                pattern: search,
                replacement: Some(replacement),
                modifiers,
            },
            descriptor: "TRANSLITERATION",
            class: Class::Regexp,
        })
    }

    /// Step over whitespace and comments to the delimiter, leaving the
    /// cursor on it.
    fn read_delimiter(&mut self) -> Result<char, MatchError> {
        self.pos += skip_to_delimiter(self.rest());

        match self.peek() {
            Some(c) if !c.is_whitespace() => Ok(c),
            _ => Err(MatchError::new("expected a delimiter", self.rest())),
        }
    }

    fn read_modifiers(&mut self, allowed: &regex::Regex) -> String {
        let width = allowed
            .find(self.rest())
            .map(|m| m.end())
            .unwrap_or(0);
        let modifiers = self.rest()[..width].to_string();
        self.pos += width;
        modifiers
    }

    /// A body without any pattern structure to it: a replacement, or
    /// either half of a transliteration. The opening delimiter has been
    /// consumed; the closing one is consumed here.
    fn read_plain_body(&mut self, open: char) -> Result<String, MatchError> {
        let close = closing(open);
        let rest = self.rest();

        let width = if is_paired(open) {
            nested_body(rest, open, close)
        } else {
            quoted_body(rest, close)
        };

        match width {
            Some(width) => {
                let body = rest[..width].to_string();
                self.pos += width + close.len_utf8();
                Ok(body)
            }
            None => Err(MatchError::new("unterminated body", rest)),
        }
    }

    /// Scan a pattern body up to its closing delimiter, which is consumed.
    /// Character classes are skipped whole, so a delimiter inside one does
    /// not count, and embedded code blocks are scanned as code. Returns the
    /// body and whether it spanned lines.
    ///
    /// For a bare `/.../` we also watch for the closer of whatever bracket
    /// encloses us: meeting it first means this was division after all.
    fn read_pattern_body(
        &mut self,
        open: char,
        close: char,
        bare: bool,
    ) -> Result<(String, bool), MatchError> {
        let start = self.pos;
        let paired = is_paired(open);
        let outer = self
            .stack
            .current()
            .map(|frame| closing(frame.opener));

        let mut nesting = 1usize;
        let mut groups = 0usize;
        let mut braces = 0usize;
        let mut multiline = false;
        let mut crossed = false;

        loop {
            let rest = self.rest();
            let c = match rest
                .chars()
                .next()
            {
                Some(c) => c,
                None => {
                    return Err(MatchError::new("unterminated pattern", &self.buffer[start..]));
                }
            };

            if c == '\\' {
                self.pos += 1;
                if let Some(next) = self.peek() {
                    self.pos += next.len_utf8();
                }
                continue;
            }

            if paired && c == open {
                nesting += 1;
                self.pos += c.len_utf8();
                continue;
            }

            if c == close {
                if paired && nesting > 1 {
                    nesting -= 1;
                    self.pos += c.len_utf8();
                    continue;
                }
                break;
            }

            match c {
                '\n' => {
                    multiline = true;
                    self.pos += 1;
                }
                '#' if multiline => {
                    self.pos += rest
                        .find('\n')
                        .unwrap_or(rest.len());
                }
                '[' => self.skip_character_class()?,
                '(' if rest.starts_with("(?{") || rest.starts_with("(??{") => {
                    self.pos += if rest.starts_with("(?{") { 2 } else { 3 };
                    self.scan_embedded_code()?;
                    groups += 1;
                }
                '(' => {
                    groups += 1;
                    self.pos += 1;
                }
                ')' => {
                    if groups > 0 {
                        groups -= 1;
                    } else if bare && outer == Some(')') {
                        crossed = true;
                    }
                    self.pos += 1;
                }
                '$' | '@' if rest[1..].starts_with('{') => {
                    self.pos += 1;
                    self.scan_embedded_code()?;
                }
                '{' => {
                    let quantifier = crate::pattern!(r"^\{\d*,?\d*\}")
                        .find(rest)
                        .map(|m| m.end());
                    match quantifier {
                        Some(width) if width > 2 => self.pos += width,
                        _ => {
                            braces += 1;
                            self.pos += 1;
                        }
                    }
                }
                '}' | ']' => {
                    if c == '}' && braces > 0 {
                        braces -= 1;
                    } else if bare && outer == Some(c) {
                        crossed = true;
                    }
                    self.pos += 1;
                }
                _ => self.pos += c.len_utf8(),
            }
        }

        let body = self.buffer[start..self.pos].to_string();
        self.pos += close.len_utf8();

        if crossed {
            return Err(MatchError::new("pattern crosses an enclosing bracket", &body));
        }

        Ok((body, multiline))
    }

    /// Step over `[...]`, with the cursor on the opening bracket. A `]`
    /// first in the class is literal, and `[:alpha:]` style classes nest.
    fn skip_character_class(&mut self) -> Result<(), MatchError> {
        let start = self.pos;
        self.pos += 1;

        if self
            .rest()
            .starts_with('^')
        {
            self.pos += 1;
        }
        if self
            .rest()
            .starts_with(']')
        {
            self.pos += 1;
        }

        loop {
            let rest = self.rest();
            match rest
                .chars()
                .next()
            {
                None => {
                    return Err(MatchError::new("unterminated character class", &self.buffer[start..]));
                }
                Some('\\') => {
                    self.pos += 1;
                    if let Some(next) = self.peek() {
                        self.pos += next.len_utf8();
                    }
                }
                Some('[') if rest.starts_with("[:") => {
                    self.pos += match rest.find(":]") {
                        Some(i) => i + 2,
                        None => 1,
                    };
                }
                Some(']') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(c) => self.pos += c.len_utf8(),
            }
        }
    }

    /// Scan a `{ ... }` block of code inside a pattern, with the cursor on
    /// the opening brace.
    fn scan_embedded_code(&mut self) -> Result<(), MatchError> {
        let at = self.pos;

        self.stack
            .push(Frame {
                opener: '{',
                offset: at,
                owner: None,
            });
        self.pos += 1;

        let flags = Flags {
            expects_bracket: true,
            ..Flags::default()
        };

        match self.scan(flags, false) {
            Ok(_) if !self.ended => Ok(()),
            _ => Err(MatchError::new("bad code block in pattern", &self.buffer[at..])),
        }
    }
}
